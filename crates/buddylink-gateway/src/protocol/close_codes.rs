//! WebSocket close codes
//!
//! Gateway-specific codes in the 4000 range.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Unknown error occurred
    UnknownError = 4000,
    /// Event name not recognised
    UnknownEvent = 4001,
    /// Frame is not a valid envelope or payload
    DecodeError = 4002,
    /// Event sent without an authenticated session
    NotAuthenticated = 4003,
    /// Claimed identity did not resolve
    AuthenticationFailed = 4004,
    /// A newer connection took over this user's session
    SessionReplaced = 4005,
    /// The user already has a session and the policy keeps the first one
    SessionRejected = 4006,
    /// Nothing arrived from the client within the idle timeout
    SessionTimeout = 4007,
}

impl CloseCode {
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4000 => Some(Self::UnknownError),
            4001 => Some(Self::UnknownEvent),
            4002 => Some(Self::DecodeError),
            4003 => Some(Self::NotAuthenticated),
            4004 => Some(Self::AuthenticationFailed),
            4005 => Some(Self::SessionReplaced),
            4006 => Some(Self::SessionRejected),
            4007 => Some(Self::SessionTimeout),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether a client may reconnect right away
    #[must_use]
    pub const fn should_reconnect(self) -> bool {
        matches!(
            self,
            Self::UnknownError | Self::UnknownEvent | Self::DecodeError | Self::SessionTimeout
        )
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error occurred",
            Self::UnknownEvent => "Unknown event",
            Self::DecodeError => "Invalid payload encoding",
            Self::NotAuthenticated => "Not authenticated",
            Self::AuthenticationFailed => "Authentication failed",
            Self::SessionReplaced => "Session replaced by a newer connection",
            Self::SessionRejected => "Session already active",
            Self::SessionTimeout => "Session timed out",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::UnknownError => "UnknownError",
            Self::UnknownEvent => "UnknownEvent",
            Self::DecodeError => "DecodeError",
            Self::NotAuthenticated => "NotAuthenticated",
            Self::AuthenticationFailed => "AuthenticationFailed",
            Self::SessionReplaced => "SessionReplaced",
            Self::SessionRejected => "SessionRejected",
            Self::SessionTimeout => "SessionTimeout",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}
