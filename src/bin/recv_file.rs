//! Receives bytes over SWP from a `send_file` peer and writes them out.
//!
//! Usage: recv_file <local_addr> <out_path> [loss_probability] [idle_ms]
//!
//! Since the protocol core never gives up (spec §7: "a partitioned link
//! blocks forever"), this demo imposes its own idle deadline on top: once
//! no new payload has arrived for `idle_ms`, it assumes the transfer is
//! done and writes what it has.

use std::env;
use std::fs;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use swp::Receiver;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "usage: {} <local_addr> <out_path> [loss_probability] [idle_ms]",
            args[0]
        );
        return ExitCode::FAILURE;
    }

    let local_addr = &args[1];
    let out_path = &args[2];
    let loss_probability = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.0);
    let idle_ms = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(2000);

    let receiver = match Receiver::bind(local_addr, loss_probability) {
        Ok(receiver) => receiver,
        Err(e) => {
            eprintln!("failed to bind {local_addr}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || loop {
        let _ = tx.send(receiver.recv());
    });

    let mut out = Vec::new();
    while let Ok(payload) = rx.recv_timeout(Duration::from_millis(idle_ms)) {
        out.extend_from_slice(&payload);
    }

    log::info!("received {} bytes, writing to {out_path}", out.len());
    if let Err(e) = fs::write(out_path, &out) {
        eprintln!("failed to write {out_path}: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
