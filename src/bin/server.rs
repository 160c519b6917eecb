use clap::Parser;
use redlite::config::Config;
use redlite::{server, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::parse();

    server::run(config).await
}
