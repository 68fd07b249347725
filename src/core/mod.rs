//! # Core Wire Components
//!
//! Framing and serialization of map responses.
//!
//! ## Components
//! - **Frame**: length-prefixed framing, plus a Tokio codec for byte streams
//! - **Serialization**: JSON encoding of protocol objects
//!
//! ## Wire Format
//! ```text
//! [Length(4, little-endian)] [Payload(N)]
//! ```
//!
//! The payload is JSON, optionally zstd-compressed, optionally sealed,
//! depending on what the client negotiated and which transport is in use.
//!
//! ## Security
//! - Decoders reject declared lengths above 16MB before allocating

pub mod frame;
pub mod serialization;

pub use frame::{decode_frame, encode_frame, MapFrameCodec};
