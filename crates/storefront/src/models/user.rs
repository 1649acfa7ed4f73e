//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use emporium_core::{Email, Role, UserId};

/// A shop account (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Account role.
    pub role: Role,
    /// Disabled accounts cannot sign in and are signed out on their next request.
    pub enabled: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
