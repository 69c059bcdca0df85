use contagion::runner::run_with_args;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run_with_args() {
        Ok(outcome) => {
            println!("{outcome}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
