//! Caller identity passed explicitly into every operation.
//!
//! Nothing in this crate reads ambient session state; the HTTP layer builds
//! an [`Actor`] from the verified token and hands it down.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CommissionError;

/// Back-office role.
///
/// Roles are ordered from lowest to highest privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access.
    Viewer = 0,
    /// Sells reservations; may propose adjustments.
    Salesperson = 1,
    /// Runs closings and records ledger entries.
    Finance = 2,
    /// Approves adjustments, overrides amounts at closing time, reverses closings.
    Admin = 3,
}

impl Role {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "salesperson" | "seller" => Some(Self::Salesperson),
            "finance" => Some(Self::Finance),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Salesperson => "salesperson",
            Self::Finance => "finance",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User ID.
    pub user_id: Uuid,
    /// Display name, copied into audit fields such as `created_by`.
    pub name: String,
    /// Back-office role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub fn new(user_id: Uuid, name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            name: name.into(),
            role,
        }
    }

    /// Returns true for administrators.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with a permission error unless the actor is an administrator.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::AdminRequired` naming `action`.
    pub fn require_admin(&self, action: &'static str) -> Result<(), CommissionError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CommissionError::AdminRequired {
                action,
                role: self.role,
            })
        }
    }

    /// Fails with a permission error unless the actor holds at least `role`.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::InsufficientRole`.
    pub fn require_role(&self, role: Role) -> Result<(), CommissionError> {
        if self.role >= role {
            Ok(())
        } else {
            Err(CommissionError::InsufficientRole {
                role: self.role,
                required: role,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("FINANCE"), Some(Role::Finance));
        assert_eq!(Role::parse("seller"), Some(Role::Salesperson));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::Admin > Role::Finance);
        assert!(Role::Finance > Role::Salesperson);
        assert!(Role::Salesperson > Role::Viewer);
    }

    #[test]
    fn test_require_admin() {
        let admin = Actor::new(Uuid::new_v4(), "Ana", Role::Admin);
        let finance = Actor::new(Uuid::new_v4(), "Bruno", Role::Finance);

        assert!(admin.require_admin("reverse a closing").is_ok());
        let err = finance.require_admin("reverse a closing").unwrap_err();
        assert!(matches!(
            err,
            CommissionError::AdminRequired {
                role: Role::Finance,
                ..
            }
        ));
    }

    #[test]
    fn test_require_role() {
        let seller = Actor::new(Uuid::new_v4(), "Caro", Role::Salesperson);
        assert!(seller.require_role(Role::Viewer).is_ok());
        assert!(seller.require_role(Role::Salesperson).is_ok());
        assert!(seller.require_role(Role::Finance).is_err());
    }
}
