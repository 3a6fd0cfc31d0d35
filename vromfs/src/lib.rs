//! Parser and decoder for `.vromfs.bin` virtual ROM filesystem containers.
//!
//! [`parse_container`] decodes the outer container framing and directory;
//! [`resolve_dictionary`] and [`decode_blk`] handle the per-entry `.blk`
//! framings, including the dictionary-compressed variant whose dictionary
//! is itself discovered inside the container.

pub mod blk;
pub mod container;
pub mod cursor;
pub mod decompress;
pub mod deobfuscate;
pub mod dictionary;
pub mod directory;
pub mod error;
pub mod header;
pub mod options;

pub use blk::{decode_blk, decode_shared_names};
pub use container::{parse_container, Container};
pub use dictionary::{resolve_dictionary, Dict};
pub use directory::{Directory, Entry};
pub use error::{Codec, Error, Result};
pub use header::{ExtendedHeader, Framing, Header};
pub use options::Options;
