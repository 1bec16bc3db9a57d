use clap::{Args, Subcommand};

use crate::cli::workspace::Workspace;

mod redeem;
mod rewards;
mod visit;

#[derive(Debug, Args)]
pub(crate) struct LoyaltyCommand {
    #[command(subcommand)]
    command: LoyaltySubcommand,
}

#[derive(Debug, Subcommand)]
enum LoyaltySubcommand {
    /// Count a visit from a scanned loyalty card or typed identifier.
    Visit(visit::VisitArgs),

    /// List the rewards a customer can claim now.
    Rewards(rewards::RewardsArgs),

    /// Claim a reward for a customer.
    Redeem(redeem::RedeemRewardArgs),
}

pub(crate) async fn run(workspace: &Workspace, command: LoyaltyCommand) -> Result<(), String> {
    match command.command {
        LoyaltySubcommand::Visit(args) => visit::run(workspace, args).await,
        LoyaltySubcommand::Rewards(args) => rewards::run(workspace, args).await,
        LoyaltySubcommand::Redeem(args) => redeem::run(workspace, args).await,
    }
}
