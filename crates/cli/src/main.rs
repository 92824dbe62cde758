use std::process::ExitCode;

fn main() -> ExitCode {
    inmeet_cli::run()
}
