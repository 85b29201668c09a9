use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Each command handles Ctrl+C itself: the terminal UI reads it as a key,
    // `watch` unmounts the page on it. Nothing here races them.
    match coinfall::cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(coinfall::errors::get_exit_code(&e))
        }
    }
}
