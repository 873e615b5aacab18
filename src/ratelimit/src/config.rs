//! Rate limit configuration
//!
//! One budget per action class. Defaults match the hourly limits the forum
//! ships with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The kind of write a request is trying to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionClass {
    Post,
    Comment,
    Vote,
    Flag,
}

impl ActionClass {
    pub const ALL: [ActionClass; 4] = [
        ActionClass::Post,
        ActionClass::Comment,
        ActionClass::Vote,
        ActionClass::Flag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionClass::Post => "post",
            ActionClass::Comment => "comment",
            ActionClass::Vote => "vote",
            ActionClass::Flag => "flag",
        }
    }
}

impl fmt::Display for ActionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many actions one subject may take per window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub limit: u32,
    pub window: Duration,
}

impl Budget {
    pub fn per_hour(limit: u32) -> Self {
        Self {
            limit,
            window: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// New posts per subject (default: 5/hour)
    pub post: Budget,

    /// New comments per subject (default: 30/hour)
    pub comment: Budget,

    /// Votes per subject (default: 100/hour)
    pub vote: Budget,

    /// Flags per subject (default: 10/hour)
    pub flag: Budget,

    /// Namespace prepended to every counter key (default: "concord:rate")
    pub key_prefix: String,
}

impl RateLimitConfig {
    pub fn budget(&self, class: ActionClass) -> Budget {
        match class {
            ActionClass::Post => self.post,
            ActionClass::Comment => self.comment,
            ActionClass::Vote => self.vote,
            ActionClass::Flag => self.flag,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            post: Budget::per_hour(5),
            comment: Budget::per_hour(30),
            vote: Budget::per_hour(100),
            flag: Budget::per_hour(10),
            key_prefix: "concord:rate".to_string(),
        }
    }
}
