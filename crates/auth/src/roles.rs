//! User roles for route authorization

use std::fmt;

use serde::{Deserialize, Serialize};

/// Platform roles.
///
/// - `Creator` - influencer applying to campaigns
/// - `Agency` - manages creators on behalf of clients
/// - `Brand` - runs campaigns
/// - `Admin` - platform staff, unrestricted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Creator,
    Agency,
    Brand,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Creator, Role::Agency, Role::Brand, Role::Admin];

    /// Admins bypass every route restriction
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Creator => "creator",
            Role::Agency => "agency",
            Role::Brand => "brand",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
