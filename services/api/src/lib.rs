mod cli;
mod infra;
mod routes;
mod server;

use premium_rating::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
