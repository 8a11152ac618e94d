use std::process::ExitCode;

fn main() -> ExitCode {
    match sourcetree_cli::run() {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
