use std::process::ExitCode;

fn main() -> ExitCode {
    slotboard_cli::run()
}
