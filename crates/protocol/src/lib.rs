//! Wire types for rtcgate.
//!
//! This crate contains the serde-serializable records exchanged between a page,
//! the host capability APIs, and the companion screen-capture extension. They
//! are the shapes of data as they appear on the wire, camelCase throughout.
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization and small accessors
//! - **Open-ended**: Unknown fields survive a round trip through `extra` maps
//!
//! Runtime detection, adapter selection, and media negotiation live in the
//! `rtcgate` crate.

pub mod connection;
pub mod constraints;
pub mod extension;
pub mod media;

pub use connection::*;
pub use constraints::*;
pub use extension::*;
pub use media::*;
