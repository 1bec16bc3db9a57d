use clap::Args;
use tally_app::domain::{
    customers::CustomerId,
    loyalty::eligibility::{RewardCost, reward_cost},
};

use crate::cli::workspace::Workspace;

#[derive(Debug, Args)]
pub(crate) struct RewardsArgs {
    /// Customer id
    customer: String,
}

pub(crate) async fn run(workspace: &Workspace, args: RewardsArgs) -> Result<(), String> {
    let rewards = workspace
        .app
        .loyalty
        .eligible_rewards(workspace.business()?, CustomerId::from(args.customer.as_str()))
        .await
        .map_err(|error| format!("failed to list rewards: {error}"))?;

    if rewards.is_empty() {
        println!("no rewards available for customer {}", args.customer);
        return Ok(());
    }

    for reward in rewards {
        let cost = match reward_cost(&reward) {
            RewardCost::Points(points) => format!("{points} points"),
            RewardCost::Visits(visits) => format!("{visits} visits"),
            RewardCost::Tier(tier) => format!("{tier} tier"),
            RewardCost::Free => "free".to_string(),
        };

        println!("reward_id: {}", reward.id);
        println!("name: {}", reward.name);
        println!("cost: {cost}");
        println!();
    }

    Ok(())
}
