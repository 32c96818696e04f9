//! Event payloads
//!
//! Server-emitted payloads and the signaling requests clients send.

mod payloads;

pub use payloads::{
    AnswerRequest, BuddyStatusEvent, ErrorEvent, IceCandidateRequest, ImEvent, ImHistoryEvent,
    OfferRequest, SessionReplacedEvent, WebRtcAnswerEvent, WebRtcIceCandidateEvent,
    WebRtcOfferEvent,
};
