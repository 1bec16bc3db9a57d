use clap::{Parser, Subcommand};

use crate::cli::config::{LoggingConfig, StoreConfig};

mod config;
mod extract;
mod loyalty;
mod observability;
mod redeem;
mod scan;
mod workspace;

#[derive(Debug, Parser)]
#[command(name = "tally-app", about = "Tally coupon and loyalty desk", long_about = None)]
pub(crate) struct Cli {
    /// Logging output settings.
    #[command(flatten)]
    logging: LoggingConfig,

    /// Document store settings.
    #[command(flatten)]
    store: StoreConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read a coupon QR code from an image and redeem it.
    Scan(scan::ScanArgs),

    /// Redeem a coupon code typed in by hand.
    Redeem(redeem::RedeemArgs),

    /// Show the coupon code a QR payload resolves to.
    Extract(extract::ExtractArgs),

    /// Loyalty visits and rewards.
    Loyalty(loyalty::LoyaltyCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init_subscriber(&self.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        let workspace = match self.command {
            Commands::Extract(args) => return extract::run(&args),
            Commands::Scan(args) => {
                let workspace = workspace::Workspace::open(&self.store)?;

                scan::run(&workspace, args).await?;

                workspace
            }
            Commands::Redeem(args) => {
                let workspace = workspace::Workspace::open(&self.store)?;

                redeem::run(&workspace, args).await?;

                workspace
            }
            Commands::Loyalty(command) => {
                let workspace = workspace::Workspace::open(&self.store)?;

                loyalty::run(&workspace, command).await?;

                workspace
            }
        };

        workspace.close().await
    }
}
