use std::process::ExitCode;

fn main() -> ExitCode {
    ExitCode::from(r2sort::cli::run_from_args(std::env::args_os()))
}
