//! Command line interface: argument parsing and command dispatch.

mod parser;

pub use parser::{Cli, Command};

use clap::Parser as _;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::config::ConfigLoader;
use crate::logger::init_logger;
use crate::server::Server;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Parse arguments, load configuration, and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = ConfigLoader::new()?.load()?;

    match cli.command {
        Command::Serve {
            host,
            port,
            log_level,
        } => {
            // CLI flags override file and environment configuration.
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(level) = log_level {
                settings.logger.level = level;
            }

            init_logger(&settings.logger)?;
            Server::new(settings).run().await
        }
        Command::Migrate => {
            init_logger(&settings.logger)?;
            run_migrations(&settings.database.url).await?;
            tracing::info!("Migrations complete");
            Ok(())
        }
    }
}

/// Apply pending embedded migrations against the configured database.
///
/// Diesel migrations are synchronous; the async connection is wrapped
/// and driven on a blocking thread.
pub async fn run_migrations(database_url: &str) -> anyhow::Result<()> {
    if database_url.is_empty() {
        anyhow::bail!("database.url is not configured");
    }

    let conn = AsyncPgConnection::establish(database_url)
        .await
        .map_err(|e| anyhow::anyhow!("failed to connect for migrations: {}", e))?;

    tokio::task::spawn_blocking(move || {
        let mut wrapper = AsyncConnectionWrapper::<AsyncPgConnection>::from(conn);
        wrapper
            .run_pending_migrations(MIGRATIONS)
            .map(|applied| {
                for migration in applied {
                    tracing::info!(migration = %migration, "Applied migration");
                }
            })
            .map_err(|e| anyhow::anyhow!("migration failed: {}", e))
    })
    .await??;

    Ok(())
}
