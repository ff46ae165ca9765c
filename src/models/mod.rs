//! Data models for the greetings service.
//!
//! The serialized form of [`Greeting`] is both the wire format and the on-disk format.

mod greeting;

pub use greeting::*;
