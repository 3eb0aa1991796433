//! Acting parties in the settlement workflow.

use serde::{Deserialize, Serialize};

/// Workflow role of the acting party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Submitter,
    Reviewer1,
    Reviewer2,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Submitter => "submitter",
            Role::Reviewer1 => "reviewer_1",
            Role::Reviewer2 => "reviewer_2",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "reviewer_1" => Role::Reviewer1,
            "reviewer_2" => Role::Reviewer2,
            _ => Role::Submitter,
        }
    }

    pub const ALL: [Role; 3] = [Role::Submitter, Role::Reviewer1, Role::Reviewer2];
}

/// The party invoking a workflow operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}
