//! User entity and presence status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value_objects::Snowflake;

/// Account as seen by the presence core
///
/// Registration, credentials and profile data live elsewhere; this core only
/// needs to resolve ids and usernames and to persist the presence column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub status: PresenceStatus,
    pub last_seen: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: Snowflake, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            status: PresenceStatus::Offline,
            last_seen: None,
        }
    }

    #[inline]
    pub fn is_online(&self) -> bool {
        self.status != PresenceStatus::Offline
    }
}

/// Presence status carried by `buddy:status` and `status:update`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    #[default]
    Offline,
    Away,
    Busy,
}

impl PresenceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Away => "away",
            Self::Busy => "busy",
        }
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown presence status: {0:?}")]
pub struct PresenceStatusParseError(pub String);

impl FromStr for PresenceStatus {
    type Err = PresenceStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "away" => Ok(Self::Away),
            "busy" => Ok(Self::Busy),
            _ => Err(PresenceStatusParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("online".parse::<PresenceStatus>(), Ok(PresenceStatus::Online));
        assert_eq!("BUSY".parse::<PresenceStatus>(), Ok(PresenceStatus::Busy));
        assert!("idle".parse::<PresenceStatus>().is_err());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&PresenceStatus::Away).unwrap();
        assert_eq!(json, "\"away\"");
    }

    #[test]
    fn test_new_user_is_offline() {
        let user = User::new(Snowflake::new(7), "alice");
        assert!(!user.is_online());
        assert_eq!(user.status, PresenceStatus::Offline);
    }
}
