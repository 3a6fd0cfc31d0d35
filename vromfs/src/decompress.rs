use std::io::Read;

use crate::error::{Codec, Error, Result};

const CHUNK_SIZE: usize = 64 * 1024;

/// Decompresses a raw ZSTD frame.
pub fn zstd(bytes: &[u8], max_output_size: u64) -> Result<Vec<u8>> {
    let decoder = zstd::stream::read::Decoder::new(bytes).map_err(|err| Error::DecompressFailed {
        codec: Codec::Zstd,
        reason: err.to_string(),
    })?;
    read_bounded(decoder, max_output_size, Codec::Zstd)
}

/// Decompresses a raw ZSTD frame using a pre-built dictionary.
pub fn zstd_with_dict(bytes: &[u8], dict: &[u8], max_output_size: u64) -> Result<Vec<u8>> {
    let decoder = zstd::stream::read::Decoder::with_dictionary(bytes, dict).map_err(|err| {
        Error::DecompressFailed {
            codec: Codec::ZstdWithDict,
            reason: err.to_string(),
        }
    })?;
    read_bounded(decoder, max_output_size, Codec::ZstdWithDict)
}

/// Decompresses a standard zlib (RFC 1950) wrapped DEFLATE stream.
pub fn zlib(bytes: &[u8], max_output_size: u64) -> Result<Vec<u8>> {
    let decoder = flate2::read::ZlibDecoder::new(bytes);
    read_bounded(decoder, max_output_size, Codec::Zlib)
}

fn read_bounded<R: Read>(mut reader: R, max_output_size: u64, codec: Codec) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut chunk).map_err(|err| Error::DecompressFailed {
            codec,
            reason: err.to_string(),
        })?;
        if n == 0 {
            break;
        }
        out.extend_from_slice(&chunk[..n]);
        if out.len() as u64 > max_output_size {
            return Err(Error::OutputTooLarge {
                got: out.len() as u64,
                limit: max_output_size,
            });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zstd_compress(plain: &[u8]) -> Vec<u8> {
        zstd::stream::encode_all(plain, 0).expect("zstd compression should succeed")
    }

    fn zlib_compress(plain: &[u8]) -> Vec<u8> {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(plain).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn zstd_round_trips() {
        let plain = b"the quick brown fox jumps over the lazy dog";
        let compressed = zstd_compress(plain);
        let decoded = zstd(&compressed, 1_000_000).unwrap();
        assert_eq!(decoded, plain);
    }

    #[test]
    fn zlib_round_trips() {
        let plain = b"the quick brown fox jumps over the lazy dog";
        let compressed = zlib_compress(plain);
        let decoded = zlib(&compressed, 1_000_000).unwrap();
        assert_eq!(decoded, plain);
    }

    #[test]
    fn zstd_with_dictionary_round_trips() {
        let dict: Vec<u8> = (0..4000u32).map(|i| (i % 251) as u8).collect();
        let plain = b"dictionary-assisted payload text that repeats patterns";

        let mut compressor = zstd::bulk::Compressor::with_dictionary(0, &dict).unwrap();
        let compressed = compressor.compress(plain).unwrap();

        let decoded = zstd_with_dict(&compressed, &dict, 1_000_000).unwrap();
        assert_eq!(decoded, plain);
    }

    #[test]
    fn output_exceeding_limit_is_rejected() {
        let plain = vec![b'x'; 10_000];
        let compressed = zstd_compress(&plain);
        let err = zstd(&compressed, 100).unwrap_err();
        assert!(matches!(err, Error::OutputTooLarge { .. }));
    }

    #[test]
    fn garbage_input_fails_with_decompress_failed() {
        let garbage = [0xFFu8; 32];
        let err = zstd(&garbage, 1_000_000).unwrap_err();
        assert!(matches!(err, Error::DecompressFailed { codec: Codec::Zstd, .. }));
    }
}
