use clap::Args;
use jiff::Timestamp;
use tally_app::domain::{customers::CustomerId, loyalty::RewardId};

use crate::cli::workspace::Workspace;

#[derive(Debug, Args)]
pub(crate) struct RedeemRewardArgs {
    /// Customer id
    customer: String,

    /// Reward id
    reward: String,
}

pub(crate) async fn run(workspace: &Workspace, args: RedeemRewardArgs) -> Result<(), String> {
    let receipt = workspace
        .app
        .loyalty
        .redeem_reward(
            workspace.business()?,
            CustomerId::from(args.customer),
            RewardId::from(args.reward),
            Timestamp::now(),
        )
        .await
        .map_err(|error| format!("failed to redeem reward: {error}"))?;

    println!("reward: {}", receipt.reward.name);
    println!("points_spent: {}", receipt.points_spent);
    println!("visits_spent: {}", receipt.visits_spent);
    println!("loyalty_points: {}", receipt.customer.loyalty_points);
    println!("total_visits: {}", receipt.customer.total_visits);

    Ok(())
}
