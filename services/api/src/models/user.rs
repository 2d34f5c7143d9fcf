//! User model, account roles, and the shopkeeper approval lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Shopkeeper,
    Customer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Shopkeeper => "shopkeeper",
            Role::Customer => "customer",
        }
    }
}

/// Approval status of an account.
///
/// Admin and customer accounts are created `approved`; shopkeeper accounts
/// start `pending` and an admin moves them to `approved` or `rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Approved,
    Rejected,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Approved => "approved",
            AccountStatus::Rejected => "rejected",
        }
    }
}

/// Error for an admin review decision that the lifecycle refuses
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// `pending` is not a decision an admin can hand down
    #[error("Invalid status")]
    NotADecision,

    /// `approved` and `rejected` are terminal; crossing between them is
    /// not exposed
    #[error("Cannot change a {from} account to {to}")]
    Terminal { from: &'static str, to: &'static str },
}

/// Apply an admin review decision to the account's current status.
///
/// Allowed: `pending -> approved`, `pending -> rejected`, and re-issuing
/// the current terminal state (a no-op, so reviews are idempotent).
pub fn review_transition(
    current: AccountStatus,
    decision: AccountStatus,
) -> Result<AccountStatus, ReviewError> {
    match (current, decision) {
        (_, AccountStatus::Pending) => Err(ReviewError::NotADecision),
        (AccountStatus::Pending, next) => Ok(next),
        (current, next) if current == next => Ok(next),
        (current, next) => Err(ReviewError::Terminal {
            from: current.as_str(),
            to: next.as_str(),
        }),
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shopkeeper profile, 1:1 with a shopkeeper user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShopkeeperProfile {
    pub user_id: Uuid,
    pub shop_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Shop details as exposed on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopDetails {
    pub shop_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl From<ShopkeeperProfile> for ShopDetails {
    fn from(profile: ShopkeeperProfile) -> Self {
        Self {
            shop_name: profile.shop_name,
            address: profile.address,
            city: profile.city,
            state: profile.state,
            pincode: profile.pincode,
        }
    }
}

/// User view returned by auth and admin endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_details: Option<ShopDetails>,
}

impl UserView {
    pub fn from_parts(user: User, profile: Option<ShopkeeperProfile>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            status: user.status,
            shop_details: profile.map(ShopDetails::from),
        }
    }
}

/// New user payload handed to the repository (password still in clear,
/// hashed on insert)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert_eq!(
            review_transition(AccountStatus::Pending, AccountStatus::Approved),
            Ok(AccountStatus::Approved)
        );
        assert_eq!(
            review_transition(AccountStatus::Pending, AccountStatus::Rejected),
            Ok(AccountStatus::Rejected)
        );
    }

    #[test]
    fn reissuing_the_same_decision_is_a_noop() {
        assert_eq!(
            review_transition(AccountStatus::Approved, AccountStatus::Approved),
            Ok(AccountStatus::Approved)
        );
        assert_eq!(
            review_transition(AccountStatus::Rejected, AccountStatus::Rejected),
            Ok(AccountStatus::Rejected)
        );
    }

    #[test]
    fn terminal_states_cannot_cross() {
        assert!(matches!(
            review_transition(AccountStatus::Approved, AccountStatus::Rejected),
            Err(ReviewError::Terminal { .. })
        ));
        assert!(matches!(
            review_transition(AccountStatus::Rejected, AccountStatus::Approved),
            Err(ReviewError::Terminal { .. })
        ));
    }

    #[test]
    fn pending_is_not_a_decision() {
        for current in [
            AccountStatus::Pending,
            AccountStatus::Approved,
            AccountStatus::Rejected,
        ] {
            assert_eq!(
                review_transition(current, AccountStatus::Pending),
                Err(ReviewError::NotADecision)
            );
        }
    }
}
