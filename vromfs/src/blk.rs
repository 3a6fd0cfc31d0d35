use crate::decompress;
use crate::dictionary::Dict;
use crate::directory::Entry;
use crate::error::{Error, Result};

const PK_FAT: u8 = 1;
const PK_FAT_ZSTD: u8 = 2;
const PK_SLIM: u8 = 3;
const PK_SLIM_ZSTD: u8 = 4;
const PK_SLIM_ZSTD_DICT: u8 = 5;

const SHARED_NAMES_HEADER_LEN: usize = 40;

/// Decodes a `.blk` entry's inner framing (§4.6), returning its unwrapped
/// bytes. `max_output_size` bounds any decompression the same way
/// [`crate::parse_container`]'s `Options::max_decompressed_size` does.
pub fn decode_blk(entry: &Entry, dict: Option<&Dict>, max_output_size: u64) -> Result<Vec<u8>> {
    let payload = &entry.payload;
    if payload.is_empty() {
        return Ok(Vec::new());
    }

    let pk = payload[0];
    match pk {
        PK_FAT | PK_SLIM => bounded(payload[1..].to_vec(), max_output_size),

        PK_FAT_ZSTD => {
            let header = payload.get(1..4).ok_or(Error::DirectoryMalformed {
                reason: "FatZstd entry shorter than its 4-byte header",
            })?;
            let pk_size = u32::from(header[0]) | (u32::from(header[1]) << 8) | (u32::from(header[2]) << 16);
            let pk_size = pk_size as usize;

            let compressed = payload
                .get(4..4 + pk_size)
                .ok_or(Error::OffsetOutOfRange {
                    offset: 4,
                    len: pk_size,
                    body_len: payload.len(),
                })?;

            let decompressed = match dict {
                Some(dict) => decompress::zstd_with_dict(compressed, dict.bytes(), max_output_size)?,
                None => decompress::zstd(compressed, max_output_size)?,
            };

            Ok(decompressed.get(1..).unwrap_or_default().to_vec())
        }

        PK_SLIM_ZSTD => decompress_rest(payload, dict, max_output_size),

        PK_SLIM_ZSTD_DICT => {
            let dict = dict.ok_or(Error::DictionaryRequired)?;
            decompress::zstd_with_dict(&payload[1..], dict.bytes(), max_output_size)
        }

        _ => bounded(payload.clone(), max_output_size),
    }
}

/// Enforces `Options::max_decompressed_size` on framings that pass bytes
/// through unchanged rather than decompressing them, so P7 holds uniformly.
fn bounded(bytes: Vec<u8>, max_output_size: u64) -> Result<Vec<u8>> {
    if bytes.len() as u64 > max_output_size {
        return Err(Error::OutputTooLarge {
            got: bytes.len() as u64,
            limit: max_output_size,
        });
    }
    Ok(bytes)
}

fn decompress_rest(payload: &[u8], dict: Option<&Dict>, max_output_size: u64) -> Result<Vec<u8>> {
    let rest = &payload[1..];
    match dict {
        Some(dict) => decompress::zstd_with_dict(rest, dict.bytes(), max_output_size),
        None => decompress::zstd(rest, max_output_size),
    }
}

/// Decodes the `nm` entry's own payload: the leading 40 bytes (dictionary
/// id plus reserved fields, already consumed by [`crate::resolve_dictionary`])
/// are skipped, and the remainder is ZSTD-decompressed with the container's
/// dictionary.
pub fn decode_shared_names(entry: &Entry, dict: &Dict, max_output_size: u64) -> Result<Vec<u8>> {
    let rest = entry
        .payload
        .get(SHARED_NAMES_HEADER_LEN..)
        .ok_or(Error::DirectoryMalformed {
            reason: "\"nm\" entry shorter than its 40-byte header",
        })?;
    decompress::zstd_with_dict(rest, dict.bytes(), max_output_size)
}
