use std::process::ExitCode;

fn main() -> ExitCode {
    cartwright_cli::run()
}
