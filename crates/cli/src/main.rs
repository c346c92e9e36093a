use std::process::ExitCode;

fn main() -> ExitCode {
    kiosk_cli::run()
}
