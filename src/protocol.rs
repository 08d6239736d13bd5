//! The fixed binary message set spoken with the pool.
//!
//! Every message starts with a one-byte [`Tag`]. Inbound frames are not
//! length-prefixed: each read from the socket is treated as exactly one
//! frame, with no reassembly across reads.

use super::*;

mod error;
mod inbound;
mod outbound;
mod tag;

pub use {error::FrameError, inbound::Inbound, outbound::Outbound, tag::Tag};
