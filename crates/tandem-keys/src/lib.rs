//! Terminal input decoding for Tandem.
//!
//! Translates one raw chunk of terminal input bytes into one structured
//! [`KeyStroke`]. The decoder is stateless and total: every byte sequence
//! decodes to *something*, degrading to the best available literal
//! interpretation when a sequence is not recognised.
//!
//! # Chunking
//!
//! There is no cross-call buffering. Multi-byte escape sequences and
//! multi-byte UTF-8 characters must arrive in a single chunk to be decoded
//! correctly. A sequence split across two reads decodes as two unrelated
//! strokes.
//!
//! # Components
//!
//! - [`decode`]: byte chunk to [`KeyStroke`]
//! - [`Key`]: typed key identity with a canonical name ([`Key::name`])
//! - [`KeyStroke`]: key plus modifiers, raw bytes and optional pasted text

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod decode;
mod stroke;
mod tables;

pub use decode::{ESC, decode};
pub use stroke::{Key, KeyStroke};
