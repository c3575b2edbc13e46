use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match alumni_api::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "alumni-api exited with error");
            eprintln!("alumni-api: {err}");
            ExitCode::FAILURE
        }
    }
}
