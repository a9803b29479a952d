use std::process::ExitCode;

fn main() -> ExitCode {
    match cuebridged::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("cuebridged: {error}");
            ExitCode::FAILURE
        }
    }
}
