#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

//! A crash-consistent ring-buffer object store for NOR-flash-like storage.
//!
//! `ringfs` turns a bounded region of NOR flash into an append-only, FIFO
//! queue of fixed-size records: records are consumed in insertion order,
//! and when the device fills, the oldest whole sector of records is
//! reclaimed to make room. It is meant for embedded telemetry, log
//! shipping, or store-and-forward queues where a device buffers events
//! until an upstream system acknowledges them.
//!
//! The engine does not own a flash driver; it is generic over one supplied
//! by the caller through the [`Flash`] trait. See [`RingFs`] for the public
//! operations ([`RingFs::format`], [`RingFs::scan`], [`RingFs::append`],
//! [`RingFs::fetch`], [`RingFs::discard`], [`RingFs::rewind`], and the
//! counting methods).
//!
//! # Crash safety
//!
//! Every sector and slot carries a status word whose five legal states are
//! encoded so that every forward transition only clears bits — the one
//! direction NOR flash can program without an erase. That makes a partial
//! write self-identifying: [`RingFs::scan`] can always tell, from on-flash
//! state alone, whether a sector finished erasing or a slot finished
//! committing, and repairs or skips accordingly.

mod error;
mod flash;
mod geometry;
mod loc;
mod log;
mod ring;
mod sector;
mod slot;

pub use error::Error;
pub use flash::Flash;
pub use ring::RingFs;
