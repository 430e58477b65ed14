use anyhow::Context;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;

mod config;
mod http;
mod models;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // This returns an error if the `.env` file doesn't exist, but that's not what we want
    // since we're not going to use a `.env` file if we deploy this application.
    dotenvy::dotenv().ok();

    // Initialize the logger. `RUST_LOG=tweetbox=debug,tower_http=debug` is a good place to start.
    env_logger::init();

    // Parse our configuration from the environment.
    // This will exit with a help message if something is wrong.
    let config = Config::parse();

    let db = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("could not connect to database_url")?;

    // Embedded migrations create the `tweet`, `user` and `follow` tables if needed.
    sqlx::migrate!()
        .run(&db)
        .await
        .context("failed to run database migrations")?;

    http::serve(config, db).await?;

    Ok(())
}
