use std::sync::Arc;

use clap::Args;
use jiff::Timestamp;
use tally::{decoder::FrameDecoder, frames::Camera, scanner::Scanner};
use tally_app::{desk::RedemptionDesk, domain::coupons::Redemption, session::RedemptionState};

use crate::cli::{scan::StillImageCamera, workspace::Workspace};

#[derive(Debug, Args)]
pub(crate) struct RedeemArgs {
    /// Coupon code as typed by the operator
    code: String,

    /// Commit the redemption after a successful lookup
    #[arg(long)]
    confirm: bool,
}

pub(crate) async fn run(workspace: &Workspace, args: RedeemArgs) -> Result<(), String> {
    let mut desk = RedemptionDesk::new(
        Scanner::new(StillImageCamera::none()),
        Arc::clone(&workspace.app.redemptions),
        workspace.business()?,
    );

    desk.submit_manual(&args.code)
        .map_err(|error| error.to_string())?;

    complete(&mut desk, args.confirm).await
}

/// Resolve the code waiting on the desk, then commit it when `confirm` is set.
pub(crate) async fn complete<C: Camera, D: FrameDecoder>(
    desk: &mut RedemptionDesk<C, D>,
    confirm: bool,
) -> Result<(), String> {
    let resolved = desk
        .resolve(Timestamp::now())
        .await
        .map_err(|error| error.to_string())?;

    match resolved {
        RedemptionState::Resolved(redemption) => print_redemption(redemption),
        RedemptionState::Failed { message, .. } => return Err((*message).to_string()),
        other => return Err(format!("unexpected desk state: {}", other.name())),
    }

    if !confirm {
        println!("not redeemed; pass --confirm to commit");

        return Ok(());
    }

    match desk.confirm().await.map_err(|error| error.to_string())? {
        RedemptionState::Done(redemption) => {
            println!("redeemed: {}", redemption.coupon.code);

            Ok(())
        }
        RedemptionState::Failed { message, .. } => Err((*message).to_string()),
        other => Err(format!("unexpected desk state: {}", other.name())),
    }
}

fn print_redemption(redemption: &Redemption) {
    let coupon = &redemption.coupon;

    println!("coupon_id: {}", coupon.id);
    println!("code: {}", coupon.code);
    println!("title: {}", coupon.title);
    println!("discount: {}", coupon.discount);
    println!(
        "remaining_uses: {}",
        coupon
            .remaining_uses()
            .map_or_else(|| "unlimited".to_string(), |uses| uses.to_string())
    );
    println!("customer: {}", redemption.customer.name);
}
