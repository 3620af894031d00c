//! Per-request caller identity supplied by the transport layer.

use crate::types::UserId;

/// Who is making the current request. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity {
    /// `None` for anonymous callers.
    pub user_id: Option<UserId>,
    pub is_admin: bool,
}

impl CallerIdentity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            is_admin: false,
        }
    }

    pub fn admin(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            is_admin: true,
        }
    }
}
