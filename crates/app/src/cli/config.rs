//! CLI Config

use std::path::PathBuf;

use clap::Args;
use tally_app::identity::Role;

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub(crate) log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,
}

/// Document store and operator settings.
#[derive(Debug, Args)]
pub(crate) struct StoreConfig {
    /// YAML fixture file holding the store's documents
    #[arg(long, env = "TALLY_FIXTURES", default_value = "fixtures/demo.yml")]
    pub(crate) fixtures: PathBuf,

    /// Write the store back to the fixture file after the command
    #[arg(long, env = "TALLY_PERSIST")]
    pub(crate) persist: bool,

    /// Business the operator works for
    #[arg(long, env = "TALLY_BUSINESS_ID")]
    pub(crate) business_id: Option<String>,

    /// Operator user id
    #[arg(long, env = "TALLY_USER_ID", default_value = "operator")]
    pub(crate) user_id: String,

    /// Operator role (owner, staff, customer, admin)
    #[arg(long, env = "TALLY_ROLE", default_value = "staff")]
    pub(crate) role: Role,
}
