use std::process::ExitCode;

use parleyd::{SupervisorExit, run_daemon};

fn main() -> ExitCode {
    match run_daemon() {
        Ok(SupervisorExit::Shutdown) => ExitCode::SUCCESS,
        Ok(SupervisorExit::Terminal(reason)) => {
            eprintln!("parleyd: connection ended: {reason}");
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("parleyd: {error}");
            ExitCode::FAILURE
        }
    }
}
