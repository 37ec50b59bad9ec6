use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match hawkd::run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr(), "hawk: {error}");
            ExitCode::FAILURE
        }
    }
}
