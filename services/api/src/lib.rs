mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use union_action::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
