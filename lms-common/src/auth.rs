//! Caller identity and capability model
//!
//! Tenant and caller identity are always explicit function arguments in the
//! core operations; nothing is derived from ambient per-request state. The
//! anonymous/authenticated split is a sum type so every call site dispatches
//! on it explicitly instead of checking a nullable user id ad hoc.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role granted to an authenticated user within a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Learner,
    Instructor,
    Admin,
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "learner" => Ok(Role::Learner),
            "instructor" => Ok(Role::Instructor),
            "admin" => Ok(Role::Admin),
            other => Err(Error::InvalidInput(format!("Unknown role: {}", other))),
        }
    }
}

/// Capability required by an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Read published lessons (the only anonymous capability)
    ViewPublished,
    /// See lessons still in draft state
    ViewDrafts,
    /// Create, update, delete, and reorder lessons
    ManageLessons,
    /// Record completion progress for oneself
    ReportProgress,
    /// Attach uploaded media to a lesson
    UploadMedia,
}

/// Caller identity resolved by the upstream auth collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// No session; permitted read access to published content only
    Anonymous,
    /// Validated session within the request's tenant
    Authenticated { user_id: Uuid, role: Role },
}

impl Caller {
    pub fn authenticated(user_id: Uuid, role: Role) -> Self {
        Caller::Authenticated { user_id, role }
    }

    /// User id, if any
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated { user_id, .. } => Some(*user_id),
        }
    }

    /// Whether this caller holds the given capability
    pub fn can(&self, capability: Capability) -> bool {
        match self {
            Caller::Anonymous => matches!(capability, Capability::ViewPublished),
            Caller::Authenticated { role, .. } => match capability {
                Capability::ViewPublished | Capability::ReportProgress => true,
                Capability::ViewDrafts | Capability::ManageLessons | Capability::UploadMedia => {
                    matches!(role, Role::Instructor | Role::Admin)
                }
            },
        }
    }

    /// Fail with Forbidden unless the caller holds the capability
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "Caller lacks capability {:?}",
                capability
            )))
        }
    }

    /// Capability check for operations that also need a concrete user,
    /// e.g. progress reporting. Anonymous callers are rejected outright.
    pub fn require_user(&self, capability: Capability) -> Result<Uuid> {
        self.require(capability)?;
        self.user_id()
            .ok_or_else(|| Error::Forbidden("Operation requires an authenticated user".to_string()))
    }
}
