use std::process::ExitCode;

fn main() -> ExitCode {
    match order_intake::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("order-intake: {e}");
            ExitCode::FAILURE
        }
    }
}
