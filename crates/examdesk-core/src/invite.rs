//! Class invite links.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ClassInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    /// The user can still join.
    Pending,
    /// The user is already a member.
    Used,
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InviteStatus::Pending => write!(f, "pending"),
            InviteStatus::Used => write!(f, "used"),
        }
    }
}

/// An invite to a class, as seen by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    pub class_id: String,
    pub class_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub status: InviteStatus,
}

impl Invite {
    /// Resolve the invite for `user_id` from the class details.
    pub fn resolve(class_id: &str, info: &ClassInfo, user_id: &str) -> Self {
        let status = if info.is_member(user_id) {
            InviteStatus::Used
        } else {
            InviteStatus::Pending
        };
        Self {
            class_id: class_id.to_string(),
            class_name: info.name.clone(),
            created_at: info.create_at,
            status,
        }
    }

    pub fn can_join(&self) -> bool {
        self.status == InviteStatus::Pending
    }

    /// Mark the invite used after a successful join.
    pub fn accepted(self) -> Self {
        Self {
            status: InviteStatus::Used,
            ..self
        }
    }
}
