//! Redemption session state machine.
//!
//! One session walks a scanned code through lookup, operator confirmation and commit.
//! Transitions are pure: [`RedemptionState::apply`] never touches the store or the
//! camera, so the desk can drive it from any async context.

use tally::{frames::CameraError, scanner::ScannedCode};
use thiserror::Error;

use crate::domain::coupons::{ErrorKind, Redemption, RedemptionError};

/// Where a redemption session currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum RedemptionState {
    /// Waiting for a code from the camera or the operator.
    Scanning,

    /// Looking the code up.
    Resolving { code: ScannedCode },

    /// Coupon found and waiting for the operator to confirm.
    Resolved(Redemption),

    /// Something went wrong.
    ///
    /// `resume` holds the redemption when the failure happened after lookup, so the
    /// operator can retry the commit without scanning again.
    Failed {
        kind: ErrorKind,
        message: &'static str,
        resume: Option<Redemption>,
    },

    /// Writing the redemption.
    Committing(Redemption),

    /// The coupon was redeemed.
    Done(Redemption),
}

/// Inputs that move a session forward.
#[derive(Debug)]
pub enum SessionEvent {
    CodeAccepted(ScannedCode),
    Resolved(Result<Redemption, RedemptionError>),
    CameraFailed(CameraError),
    Confirm,
    Committed(Result<(), RedemptionError>),
    Dismiss,
    Rescan,
}

impl SessionEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CodeAccepted(_) => "code_accepted",
            Self::Resolved(_) => "resolved",
            Self::CameraFailed(_) => "camera_failed",
            Self::Confirm => "confirm",
            Self::Committed(_) => "committed",
            Self::Dismiss => "dismiss",
            Self::Rescan => "rescan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply `{event}` while {state}")]
pub struct TransitionError {
    pub state: &'static str,
    pub event: &'static str,
}

impl RedemptionState {
    /// The state reached by applying `event`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] when `event` is not valid in this state; the
    /// session is left unchanged.
    pub fn apply(&self, event: SessionEvent) -> Result<Self, TransitionError> {
        let next = match (self, event) {
            (Self::Committing(_) | Self::Resolving { .. }, SessionEvent::Rescan) => {
                return Err(self.reject("rescan"));
            }
            (_, SessionEvent::Rescan) => Self::Scanning,

            (Self::Scanning | Self::Failed { resume: None, .. }, SessionEvent::CodeAccepted(code)) => {
                Self::Resolving { code }
            }
            (Self::Scanning, SessionEvent::CameraFailed(error)) => Self::Failed {
                kind: ErrorKind::CameraUnavailable,
                message: error.user_message(),
                resume: None,
            },

            (Self::Resolving { .. }, SessionEvent::Resolved(Ok(redemption))) => {
                Self::Resolved(redemption)
            }
            (Self::Resolving { .. }, SessionEvent::Resolved(Err(error))) => Self::Failed {
                kind: error.kind(),
                message: error.user_message(),
                resume: None,
            },

            (
                Self::Resolved(redemption)
                | Self::Failed {
                    resume: Some(redemption),
                    ..
                },
                SessionEvent::Confirm,
            ) => Self::Committing(redemption.clone()),

            (Self::Committing(redemption), SessionEvent::Committed(Ok(()))) => {
                Self::Done(redemption.clone())
            }
            (Self::Committing(redemption), SessionEvent::Committed(Err(error))) => Self::Failed {
                kind: error.kind(),
                message: error.user_message(),
                resume: Some(redemption.clone()),
            },

            (
                Self::Failed {
                    resume: Some(redemption),
                    ..
                },
                SessionEvent::Dismiss,
            ) => Self::Resolved(redemption.clone()),
            (
                Self::Resolved(_) | Self::Done(_) | Self::Failed { resume: None, .. },
                SessionEvent::Dismiss,
            ) => Self::Scanning,

            (_, event) => return Err(self.reject(event.name())),
        };

        Ok(next)
    }

    /// Whether a lookup or commit is in flight; further submissions are refused.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Resolving { .. } | Self::Committing(_))
    }

    /// The redemption this state carries, if any.
    #[must_use]
    pub const fn redemption(&self) -> Option<&Redemption> {
        match self {
            Self::Resolved(redemption) | Self::Committing(redemption) | Self::Done(redemption) => {
                Some(redemption)
            }
            Self::Failed { resume, .. } => resume.as_ref(),
            Self::Scanning | Self::Resolving { .. } => None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Scanning => "scanning",
            Self::Resolving { .. } => "resolving",
            Self::Resolved(_) => "resolved",
            Self::Failed { .. } => "failed",
            Self::Committing(_) => "committing",
            Self::Done(_) => "done",
        }
    }

    pub(crate) const fn reject(&self, event: &'static str) -> TransitionError {
        TransitionError {
            state: self.name(),
            event,
        }
    }
}
