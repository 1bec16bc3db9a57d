use clap::Args;
use jiff::Timestamp;
use tally_app::domain::loyalty::CustomerLookup;

use crate::cli::workspace::Workspace;

#[derive(Debug, Args)]
pub(crate) struct VisitArgs {
    /// Loyalty card payload, customer id or phone number
    lookup: String,
}

pub(crate) async fn run(workspace: &Workspace, args: VisitArgs) -> Result<(), String> {
    let lookup = CustomerLookup::parse(&args.lookup).map_err(|error| error.to_string())?;

    let receipt = workspace
        .app
        .loyalty
        .record_visit(workspace.business()?, lookup, Timestamp::now())
        .await
        .map_err(|error| format!("failed to record visit: {error}"))?;

    println!("customer_id: {}", receipt.customer.id);
    println!("customer: {}", receipt.customer.name);
    println!("total_visits: {}", receipt.customer.total_visits);
    println!("loyalty_points: {}", receipt.customer.loyalty_points);
    println!("points_awarded: {}", receipt.points_awarded);
    println!("tier: {}", receipt.tier.as_deref().unwrap_or("none"));

    if receipt.reward_earned {
        println!("reward earned: this visit completed a reward cycle");
    }

    Ok(())
}
