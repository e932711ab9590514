//! Sends a file's bytes over SWP to a waiting `recv_file`.
//!
//! Usage: send_file <local_addr> <remote_addr> <path> [loss_probability]

use std::env;
use std::fs;
use std::process::ExitCode;

use swp::Sender;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "usage: {} <local_addr> <remote_addr> <path> [loss_probability]",
            args[0]
        );
        return ExitCode::FAILURE;
    }

    let local_addr = &args[1];
    let remote_addr = &args[2];
    let path = &args[3];
    let loss_probability = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.0);

    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("failed to read {path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let sender = match Sender::connect(local_addr, remote_addr, loss_probability) {
        Ok(sender) => sender,
        Err(e) => {
            eprintln!("failed to connect: {e}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("sending {} bytes to {remote_addr}", data.len());
    sender.send(&data);
    log::info!("all fragments admitted to the window");

    ExitCode::SUCCESS
}
