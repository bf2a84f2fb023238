//! Role model: the five account roles and their static capabilities.
//!
//! # Responsibility
//! - Define the closed set of roles as a sum type so dispatch stays
//!   exhaustive when roles are added.
//! - Map each role to its static capability flags.
//!
//! # Invariants
//! - An unrecognized role string is fatal for the request. Callers must
//!   reject, never substitute a default role.
//! - Capability flags are static per role and carry no scoping; scoped
//!   access is resolved by the access layer.
//!
//! # See also
//! - docs/architecture/access-model.md

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Account role carried by every actor and persisted user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Agent,
    Executor,
    Beneficiary,
    Client,
}

/// Wire string for the admin role.
pub const ROLE_ADMIN: &str = "ADMIN";
/// Wire string for the agent role.
pub const ROLE_AGENT: &str = "AGENT";
/// Wire string for the executor role.
pub const ROLE_EXECUTOR: &str = "EXECUTOR";
/// Wire string for the beneficiary role.
pub const ROLE_BENEFICIARY: &str = "BENEFICIARY";
/// Wire string for the client role.
pub const ROLE_CLIENT: &str = "CLIENT";

const SUPPORTED_ROLE_STRINGS: &[&str] = &[
    ROLE_ADMIN,
    ROLE_AGENT,
    ROLE_EXECUTOR,
    ROLE_BENEFICIARY,
    ROLE_CLIENT,
];

/// Static capability flags per role.
///
/// Scoped visibility (an executor seeing its own estate's items) is not a
/// capability; it is derived by the access layer from the relationship
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCapabilities {
    pub can_manage_users: bool,
    pub can_manage_estates: bool,
    pub can_see_all_items: bool,
    pub can_see_all_messages: bool,
}

impl Role {
    /// Stable string id used in persistence and request payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Agent => ROLE_AGENT,
            Self::Executor => ROLE_EXECUTOR,
            Self::Beneficiary => ROLE_BENEFICIARY,
            Self::Client => ROLE_CLIENT,
        }
    }

    /// Returns the static capability table entry for this role.
    ///
    /// `can_see_all_messages` reports the capability table as configured;
    /// the message visibility rule is party-scoped for every role and
    /// does not consult this flag.
    pub fn capabilities(self) -> RoleCapabilities {
        match self {
            Self::Admin => RoleCapabilities {
                can_manage_users: true,
                can_manage_estates: true,
                can_see_all_items: true,
                can_see_all_messages: true,
            },
            Self::Agent => RoleCapabilities {
                can_manage_users: false,
                can_manage_estates: true,
                can_see_all_items: true,
                can_see_all_messages: false,
            },
            Self::Executor | Self::Beneficiary | Self::Client => RoleCapabilities {
                can_manage_users: false,
                can_manage_estates: false,
                can_see_all_items: false,
                can_see_all_messages: false,
            },
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns supported role wire strings.
pub fn supported_role_strings() -> &'static [&'static str] {
    SUPPORTED_ROLE_STRINGS
}

/// Parses one role from its wire string value.
pub fn parse_role(value: &str) -> Result<Role, UnknownRoleError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(UnknownRoleError::EmptyRole);
    }

    match normalized {
        ROLE_ADMIN => Ok(Role::Admin),
        ROLE_AGENT => Ok(Role::Agent),
        ROLE_EXECUTOR => Ok(Role::Executor),
        ROLE_BENEFICIARY => Ok(Role::Beneficiary),
        ROLE_CLIENT => Ok(Role::Client),
        other => Err(UnknownRoleError::UnrecognizedRole(other.to_string())),
    }
}

/// Role parse errors. Fatal for the enclosing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownRoleError {
    EmptyRole,
    UnrecognizedRole(String),
}

impl Display for UnknownRoleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRole => write!(f, "role value must not be empty"),
            Self::UnrecognizedRole(value) => write!(f, "role is unrecognized: {value}"),
        }
    }
}

impl Error for UnknownRoleError {}
