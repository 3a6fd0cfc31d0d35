use thiserror::Error;

/// Codec tag attached to [`Error::DecompressFailed`], identifying which
/// decompression backend raised the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Zstd,
    ZstdWithDict,
    Zlib,
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Codec::Zstd => write!(f, "zstd"),
            Codec::ZstdWithDict => write!(f, "zstd (with dictionary)"),
            Codec::Zlib => write!(f, "zlib"),
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("truncated container: needed {needed} bytes at offset {offset}, had {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid magic: expected \"VRFs\" or \"VRFx\", got {got:02X?}")]
    MagicInvalid { got: [u8; 4] },

    #[error("invalid platform tag: {got:02X?}")]
    PlatformInvalid { got: [u8; 4] },

    #[error("unsupported framing type {got:#04x}")]
    UnsupportedFraming { got: u8 },

    #[error("invalid trailer length: expected 0 or 256 bytes, got {got}")]
    TrailerLengthInvalid { got: usize },

    #[error("malformed directory: {reason}")]
    DirectoryMalformed { reason: &'static str },

    #[error("directory entry count mismatch: filenames={filenames}, file_data_rows={file_data_rows}")]
    CountMismatch {
        filenames: usize,
        file_data_rows: usize,
    },

    #[error("offset out of range: {offset} + {len} exceeds body length {body_len}")]
    OffsetOutOfRange {
        offset: usize,
        len: usize,
        body_len: usize,
    },

    #[error("digest missing where one was required")]
    DigestMissing,

    #[error("digest mismatch: container is corrupted or was tampered with")]
    DigestMismatch,

    #[error("{codec} decompression failed: {reason}")]
    DecompressFailed { codec: Codec, reason: String },

    #[error("decompressed output of {got} bytes exceeds the {limit} byte limit")]
    OutputTooLarge { got: u64, limit: u64 },

    #[error("entry requires a dictionary but none was supplied")]
    DictionaryRequired,

    #[error("dictionary entry \"{name}\" referenced by \"nm\" is missing from the container")]
    DictionaryMissing { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
