//! Event names carried in the envelope's `event` field

use std::fmt;

/// Events a client may send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientEvent {
    ImSend,
    ImHistory,
    StatusUpdate,
    WebRtcOffer,
    WebRtcAnswer,
    WebRtcIceCandidate,
}

impl ClientEvent {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "im:send" => Some(Self::ImSend),
            "im:history" => Some(Self::ImHistory),
            "status:update" => Some(Self::StatusUpdate),
            "webrtc:offer" => Some(Self::WebRtcOffer),
            "webrtc:answer" => Some(Self::WebRtcAnswer),
            "webrtc:ice-candidate" => Some(Self::WebRtcIceCandidate),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ImSend => "im:send",
            Self::ImHistory => "im:history",
            Self::StatusUpdate => "status:update",
            Self::WebRtcOffer => "webrtc:offer",
            Self::WebRtcAnswer => "webrtc:answer",
            Self::WebRtcIceCandidate => "webrtc:ice-candidate",
        }
    }
}

/// Events the gateway emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerEvent {
    BuddyStatus,
    ImSent,
    ImNew,
    ImError,
    ImHistory,
    WebRtcOffer,
    WebRtcAnswer,
    WebRtcIceCandidate,
    WebRtcError,
    SessionReplaced,
}

impl ServerEvent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BuddyStatus => "buddy:status",
            Self::ImSent => "im:sent",
            Self::ImNew => "im:new",
            Self::ImError => "im:error",
            Self::ImHistory => "im:history",
            Self::WebRtcOffer => "webrtc:offer",
            Self::WebRtcAnswer => "webrtc:answer",
            Self::WebRtcIceCandidate => "webrtc:ice-candidate",
            Self::WebRtcError => "webrtc:error",
            Self::SessionReplaced => "session:replaced",
        }
    }
}

impl fmt::Display for ClientEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
