mod cli;
mod collect;
mod infra;
mod routes;
mod server;

use hiring_reviews::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
