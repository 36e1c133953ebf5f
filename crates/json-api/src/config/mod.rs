//! Command-line and environment configuration for `canteen-json`.
//!
//! Every flag has an environment variable fallback, and a `.env` file in the
//! working directory is loaded first when present.

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    ledger::LedgerConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod ledger;
pub(crate) mod observability;
pub(crate) mod server;

#[derive(Debug, Parser)]
#[command(name = "canteen-json", about = "Campus canteen ledger API", long_about = None)]
pub struct ServerConfig {
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(flatten)]
    pub observability: ObservabilityConfig,

    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Voucher, loyalty and payment ledger settings.
    #[command(flatten)]
    pub ledger: LedgerConfig,
}

impl ServerConfig {
    /// Parse flags and environment, after loading `.env` if there is one.
    ///
    /// # Errors
    ///
    /// Returns the clap error for a malformed or out-of-range value.
    pub fn load() -> Result<Self, clap::Error> {
        if let Err(source) = dotenvy::dotenv()
            && !source.not_found()
        {
            return Err(clap::Error::raw(
                clap::error::ErrorKind::Io,
                format!("failed to read .env: {source}\n"),
            ));
        }

        Self::try_parse()
    }

    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}
