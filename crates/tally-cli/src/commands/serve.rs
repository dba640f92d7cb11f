//! Web server command

use std::path::Path;

use anyhow::Result;
use tally_server::ServerConfig;

use super::open_db;

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16, origins: Vec<String>) -> Result<()> {
    let db = open_db(db_path)?;

    println!("Starting Tally API on http://{}:{}", host, port);
    if !origins.is_empty() {
        println!("   Allowed CORS origins: {}", origins.join(", "));
    }

    tally_server::serve(
        db,
        host,
        port,
        ServerConfig {
            allowed_origins: origins,
        },
    )
    .await
}
