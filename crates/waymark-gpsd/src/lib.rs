//! gpsd position source for waymarkd
//!
//! Connects to a gpsd instance over its TCP/JSON interface, watches for TPV
//! reports, and delivers them as position samples gated by the subscription's
//! minimum time and distance.

mod geo;
mod protocol;
mod source;

pub use source::*;
