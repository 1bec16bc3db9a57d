//! Identity collaborator: who is operating the scanner, and for which business.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::TypedId;

/// Marker for business-scoped ids.
#[derive(Debug)]
pub enum Business {}

/// Business (tenant) id.
pub type BusinessId = TypedId<Business>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Staff,
    Customer,
    Admin,
}

impl Role {
    /// Whether this role may scan and redeem on behalf of a business.
    #[must_use]
    pub const fn can_redeem(self) -> bool {
        matches!(self, Self::Owner | Self::Staff | Self::Admin)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Staff => "staff",
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "staff" => Ok(Self::Staff),
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownRole(value.to_string())),
        }
    }
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserContext {
    pub uid: String,
    pub role: Role,
    pub business_id: Option<BusinessId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IdentityState {
    /// The session is still being restored.
    Loading,
    SignedOut,
    SignedIn(UserContext),
}

impl IdentityState {
    /// The business the current user may redeem for.
    ///
    /// # Errors
    ///
    /// Fails while loading, when signed out, when the role may not redeem, or when the
    /// user has no business.
    pub fn business_scope(&self) -> Result<BusinessId, IdentityError> {
        match self {
            Self::Loading => Err(IdentityError::Loading),
            Self::SignedOut => Err(IdentityError::SignedOut),
            Self::SignedIn(user) if !user.role.can_redeem() => Err(IdentityError::Forbidden),
            Self::SignedIn(user) => user.business_id.clone().ok_or(IdentityError::NoBusiness),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("session is still loading")]
    Loading,

    #[error("not signed in")]
    SignedOut,

    #[error("user is not linked to a business")]
    NoBusiness,

    #[error("user may not redeem coupons")]
    Forbidden,
}

/// Supplies the current identity; read-only from the domain's point of view.
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> IdentityState;
}

/// Fixed identity, e.g. configured from the environment.
#[derive(Debug, Clone)]
pub struct StaticIdentity(IdentityState);

impl StaticIdentity {
    #[must_use]
    pub const fn new(state: IdentityState) -> Self {
        Self(state)
    }

    pub fn signed_in(uid: impl Into<String>, role: Role, business: Option<BusinessId>) -> Self {
        Self(IdentityState::SignedIn(UserContext {
            uid: uid.into(),
            role,
            business_id: business,
        }))
    }
}

impl IdentityProvider for StaticIdentity {
    fn current(&self) -> IdentityState {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(role: Role, business: Option<&str>) -> Result<BusinessId, IdentityError> {
        StaticIdentity::signed_in("u-1", role, business.map(BusinessId::from))
            .current()
            .business_scope()
    }

    #[test]
    fn staff_with_business_is_scoped() {
        assert_eq!(scope(Role::Staff, Some("b-1")), Ok(BusinessId::from("b-1")));
        assert_eq!(scope(Role::Owner, Some("b-1")), Ok(BusinessId::from("b-1")));
    }

    #[test]
    fn customers_may_not_redeem() {
        assert_eq!(scope(Role::Customer, Some("b-1")), Err(IdentityError::Forbidden));
    }

    #[test]
    fn missing_business_is_rejected() {
        assert_eq!(scope(Role::Admin, None), Err(IdentityError::NoBusiness));
    }

    #[test]
    fn loading_and_signed_out_are_distinct() {
        assert_eq!(
            IdentityState::Loading.business_scope(),
            Err(IdentityError::Loading)
        );
        assert_eq!(
            IdentityState::SignedOut.business_scope(),
            Err(IdentityError::SignedOut)
        );
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!("Staff".parse::<Role>().ok(), Some(Role::Staff));
        assert!("manager".parse::<Role>().is_err());
    }
}
