use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = server::start_server().await {
        eprintln!("Failed to start survey backend: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
