//! Authentication user types.

use crate::db::UserDetails;

/// The user resolved for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Database user id
    pub id: i64,
    pub email: String,
    pub is_admin: bool,
}

impl From<UserDetails> for Principal {
    fn from(user: UserDetails) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_admin: user.is_admin,
        }
    }
}
