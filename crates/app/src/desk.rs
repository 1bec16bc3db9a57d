//! Redemption desk: the scanner, the redemption service and the session state in one place.

use std::{sync::Arc, time::Instant};

use jiff::Timestamp;
use tally::{
    decoder::{FrameDecoder, QrDecoder},
    frames::Camera,
    scanner::{ScanEvent, ScannedCode, Scanner, TickHandle},
};
use tracing::{debug, info};

use crate::{
    domain::coupons::RedemptionService,
    identity::{BusinessId, IdentityError, IdentityProvider},
    session::{RedemptionState, SessionEvent, TransitionError},
};

/// Drives one redemption session at a time for a single business.
pub struct RedemptionDesk<C: Camera, D: FrameDecoder = QrDecoder> {
    scanner: Scanner<C, D>,
    redemptions: Arc<dyn RedemptionService>,
    business: BusinessId,
    state: RedemptionState,
    handle: Option<TickHandle>,
}

impl<C: Camera, D: FrameDecoder> RedemptionDesk<C, D> {
    pub fn new(
        scanner: Scanner<C, D>,
        redemptions: Arc<dyn RedemptionService>,
        business: BusinessId,
    ) -> Self {
        Self {
            scanner,
            redemptions,
            business,
            state: RedemptionState::Scanning,
            handle: None,
        }
    }

    /// Desk scoped to the signed-in operator's business.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityError`] unless a staff member with a business is signed in.
    pub fn from_identity(
        scanner: Scanner<C, D>,
        redemptions: Arc<dyn RedemptionService>,
        identity: &dyn IdentityProvider,
    ) -> Result<Self, IdentityError> {
        let business = identity.current().business_scope()?;

        Ok(Self::new(scanner, redemptions, business))
    }

    #[must_use]
    pub const fn state(&self) -> &RedemptionState {
        &self.state
    }

    #[must_use]
    pub const fn business(&self) -> &BusinessId {
        &self.business
    }

    /// Open the camera and begin a scan session.
    ///
    /// A camera failure is not an error here: the session moves to
    /// [`RedemptionState::Failed`] and the operator can still type a code in.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] while a lookup or commit is in flight.
    pub fn start_scan(&mut self, now: Instant) -> Result<&RedemptionState, TransitionError> {
        self.transition(SessionEvent::Rescan)?;

        match self.scanner.start(now) {
            Ok(handle) => {
                self.handle = Some(handle);

                Ok(&self.state)
            }
            Err(error) => {
                self.handle = None;

                self.transition(SessionEvent::CameraFailed(error))
            }
        }
    }

    /// Per-frame callback; returns the code once one is accepted.
    pub fn tick(&mut self, now: Instant) -> Option<ScannedCode> {
        let handle = self.handle?;

        match self.scanner.tick(handle, now) {
            ScanEvent::Accepted(scanned) => {
                self.handle = None;

                self.transition(SessionEvent::CodeAccepted(scanned.clone()))
                    .ok()?;

                Some(scanned)
            }
            ScanEvent::Cancelled => {
                self.handle = None;

                None
            }
            _ => None,
        }
    }

    /// Use a code typed in by the operator, ending any camera session.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] unless the desk is scanning or showing a lookup failure.
    pub fn submit_manual(&mut self, input: &str) -> Result<&RedemptionState, TransitionError> {
        let scanned = ScannedCode::manual(input);

        self.state.apply(SessionEvent::CodeAccepted(scanned.clone()))?;
        self.stop_camera();

        self.transition(SessionEvent::CodeAccepted(scanned))
    }

    /// Look up the accepted code.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] unless a code is waiting to be resolved.
    pub async fn resolve(
        &mut self,
        point_in_time: Timestamp,
    ) -> Result<&RedemptionState, TransitionError> {
        let RedemptionState::Resolving { code } = &self.state else {
            return Err(self.state.reject("resolve"));
        };

        let result = self
            .redemptions
            .resolve(
                self.business.clone(),
                code.code.clone(),
                code.customer_hint.clone(),
                point_in_time,
            )
            .await;

        self.transition(SessionEvent::Resolved(result))
    }

    /// Confirm the resolved redemption and commit it.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] unless a redemption is waiting for confirmation.
    pub async fn confirm(&mut self) -> Result<&RedemptionState, TransitionError> {
        self.transition(SessionEvent::Confirm)?;

        let Some(redemption) = self.state.redemption() else {
            return Err(self.state.reject("confirm"));
        };

        let coupon = redemption.coupon.id.clone();

        let result = self.redemptions.commit(coupon.clone()).await;

        if result.is_ok() {
            info!(%coupon, business_id = %self.business, "redemption confirmed");
        }

        self.transition(SessionEvent::Committed(result))
    }

    /// Close the current result.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] when there is nothing to dismiss.
    pub fn dismiss(&mut self) -> Result<&RedemptionState, TransitionError> {
        self.transition(SessionEvent::Dismiss)
    }

    /// Throw away the current session and scan again.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] while a lookup or commit is in flight.
    pub fn rescan(&mut self, now: Instant) -> Result<&RedemptionState, TransitionError> {
        self.stop_camera();

        self.start_scan(now)
    }

    fn stop_camera(&mut self) {
        self.scanner.stop();
        self.handle = None;
    }

    fn transition(&mut self, event: SessionEvent) -> Result<&RedemptionState, TransitionError> {
        let next = self.state.apply(event)?;

        debug!(from = self.state.name(), to = next.name(), "redemption session transition");

        self.state = next;

        Ok(&self.state)
    }
}
