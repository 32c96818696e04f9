//! Row model -> entity conversions

mod attachment;
mod message;
mod user;
