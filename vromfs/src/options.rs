/// Tunables recognized by [`crate::parse_container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Hard ceiling on any single decompression's output, in bytes.
    pub max_decompressed_size: u64,
    /// When set, the trailer's length must be 0 or 256 bytes.
    pub strict_trailer: bool,
    /// When set, the header's platform tag must be one of the three known
    /// values.
    pub strict_platform: bool,
    /// When set and the trailer carries a digest, recompute the MD5 of the
    /// decompressed body and compare it against the trailer's digest.
    pub verify_digest: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_decompressed_size: 5_000_000,
            strict_trailer: true,
            strict_platform: true,
            verify_digest: false,
        }
    }
}
