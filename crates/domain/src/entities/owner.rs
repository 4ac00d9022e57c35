use serde::{Deserialize, Serialize};

use super::cart_item::CartItem;

/// Closed set of account roles.
///
/// Merge eligibility hangs off the static capability rather than string
/// comparisons scattered at call sites: only roles that carry a shopping
/// cart take part in guest-cart carryover at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
    Courier,
}

impl Role {
    pub fn carries_cart(&self) -> bool {
        matches!(self, Role::Customer)
    }
}

/// Identity context of a cart. The persistence tier is determined solely
/// by the owner kind: guest carts live in browser-scoped storage, account
/// carts in the durable backend store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOwner {
    Guest,
    Account { user_id: String, role: Role },
}

impl CartOwner {
    pub fn is_guest(&self) -> bool {
        matches!(self, CartOwner::Guest)
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            CartOwner::Guest => None,
            CartOwner::Account { user_id, .. } => Some(user_id),
        }
    }

    pub fn carries_cart(&self) -> bool {
        match self {
            CartOwner::Guest => true,
            CartOwner::Account { role, .. } => role.carries_cart(),
        }
    }
}

/// Snapshot of the identity collaborator's state. Changes to this value
/// are the sole external trigger for cart lifecycle transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<String>,
    pub role: Option<Role>,
}

impl Identity {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn account(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: Some(user_id.into()),
            role: Some(role),
        }
    }

    pub fn owner(&self) -> CartOwner {
        match (&self.user_id, &self.role) {
            (Some(user_id), Some(role)) => CartOwner::Account {
                user_id: user_id.clone(),
                role: *role,
            },
            _ => CartOwner::Guest,
        }
    }
}

/// Payload of the last-resort recovery slot written when a best-effort
/// unload flush cannot be dispatched. The user id is stored alongside the
/// items so a snapshot is never replayed into a different account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryRecord {
    pub user_id: String,
    pub items: Vec<CartItem>,
}
