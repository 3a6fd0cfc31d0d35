use md5::{Digest, Md5};

use crate::cursor::ByteCursor;
use crate::decompress;
use crate::deobfuscate::deobfuscate;
use crate::directory::{parse_directory, Directory};
use crate::error::{Error, Result};
use crate::header::{parse_extended_header, parse_header, select_framing, ExtendedHeader, Framing, Header};
use crate::options::Options;

const DIGEST_LEN: usize = 16;
const TAIL_LEN: usize = 256;

#[derive(Debug, Clone)]
pub struct Container {
    pub header: Header,
    pub ext_header: Option<ExtendedHeader>,
    pub framing: Framing,
    pub directory: Directory,
    pub digest: Option<[u8; DIGEST_LEN]>,
    pub tail: Vec<u8>,
}

/// Parses a `.vromfs.bin` container from its raw bytes.
///
/// This is the `OuterParser` of the format: it validates the header and
/// trailer, selects and undoes the body's outer framing (§3), and hands the
/// decompressed body to the directory parser.
pub fn parse_container(bytes: &[u8], options: &Options) -> Result<Container> {
    let mut cursor = ByteCursor::new(bytes);

    let header = parse_header(&mut cursor, options.strict_platform)?;
    log::debug!(
        "parsed vromfs header: magic={:?} platform={:?}",
        header.magic,
        header.platform_tag
    );

    let ext_header = if header.is_extended() {
        Some(parse_extended_header(&mut cursor)?)
    } else {
        None
    };

    let (kind, packed_size) = header.packed_type_and_size();
    let framing = select_framing(kind, packed_size)?;
    log::debug!("selected framing: {framing:?}");

    let body_len = if packed_size > 0 {
        packed_size as usize
    } else {
        header.original_size as usize
    };
    let raw_body = cursor.read_bytes(body_len)?;

    let body = match framing {
        Framing::NotPacked => raw_body.to_vec(),
        Framing::Zstd { .. } => {
            let compressed = deobfuscate(raw_body);
            decompress::zstd(&compressed, options.max_decompressed_size)?
        }
        Framing::Zlib => decompress::zlib(raw_body, options.max_decompressed_size)?,
    };

    let no_check = matches!(framing, Framing::Zstd { no_check: true });
    let digest = if no_check {
        if options.verify_digest {
            return Err(Error::DigestMissing);
        }
        None
    } else {
        let bytes = cursor.read_bytes(DIGEST_LEN)?;
        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(bytes);
        Some(digest)
    };

    if options.verify_digest {
        if let Some(expected) = digest {
            let actual = Md5::digest(&body);
            if actual.as_slice() != expected.as_slice() {
                return Err(Error::DigestMismatch);
            }
        }
    }

    let tail = cursor.read_remainder().to_vec();
    if options.strict_trailer && tail.len() != 0 && tail.len() != TAIL_LEN {
        return Err(Error::TrailerLengthInvalid { got: tail.len() });
    }

    let directory = parse_directory(&body)?;
    log::debug!("parsed directory with {} entries", directory.entries.len());

    Ok(Container {
        header,
        ext_header,
        framing,
        directory,
        digest,
        tail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{MAGIC_PLAIN, PLATFORM_PC};

    fn sample_directory_body() -> Vec<u8> {
        let mut body = vec![0u8; 0x60];
        body[0..4].copy_from_slice(&0x40u32.to_le_bytes());
        body[4..8].copy_from_slice(&2u32.to_le_bytes());
        body[16..20].copy_from_slice(&0x20u32.to_le_bytes());

        body[0x20..0x24].copy_from_slice(&0x54u32.to_le_bytes());
        body[0x24..0x28].copy_from_slice(&4u32.to_le_bytes());

        body[0x30..0x34].copy_from_slice(&0x58u32.to_le_bytes());
        body[0x34..0x38].copy_from_slice(&5u32.to_le_bytes());

        body[0x40..0x44].copy_from_slice(&0x48u32.to_le_bytes());
        body[0x48..0x4A].copy_from_slice(b"a\0");
        body[0x4A..0x4E].copy_from_slice(b"b/c\0");

        body[0x54..0x58].copy_from_slice(b"DATA");
        body[0x58..0x5D].copy_from_slice(b"HELLO");
        body
    }

    fn not_packed_container() -> Vec<u8> {
        let body = sample_directory_body();
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC_PLAIN);
        out.extend_from_slice(&PLATFORM_PC);
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // packed_info: type=0, packed_size=0
        out.extend_from_slice(&body);
        out.extend_from_slice(&[0xAB; 16]); // digest
        out
    }

    #[test]
    fn scenario_one_not_packed_pc_container() {
        let bytes = not_packed_container();
        let container = parse_container(&bytes, &Options::default()).unwrap();
        assert_eq!(container.framing, Framing::NotPacked);
        assert_eq!(container.directory.entries.len(), 2);
        assert_eq!(container.directory.entries[0].name, "a");
        assert_eq!(container.directory.entries[1].payload, b"HELLO");
        assert_eq!(container.digest, Some([0xAB; 16]));
        assert!(container.tail.is_empty());
    }

    #[test]
    fn invalid_trailer_length_is_rejected() {
        let mut bytes = not_packed_container();
        bytes.extend_from_slice(&[0u8; 100]);
        let err = parse_container(&bytes, &Options::default()).unwrap_err();
        assert!(matches!(err, Error::TrailerLengthInvalid { got: 100 }));
    }

    #[test]
    fn trailer_of_256_bytes_is_accepted() {
        let mut bytes = not_packed_container();
        bytes.extend_from_slice(&[0u8; 256]);
        let container = parse_container(&bytes, &Options::default()).unwrap();
        assert_eq!(container.tail.len(), 256);
    }

    #[test]
    fn vrfx_no_check_zstd_round_trips() {
        let body = sample_directory_body();
        let compressed = zstd::stream::encode_all(body.as_slice(), 0).unwrap();
        let obfuscated = crate::deobfuscate::deobfuscate(&compressed);

        let mut out = Vec::new();
        out.extend_from_slice(&crate::header::MAGIC_EXTENDED);
        out.extend_from_slice(&PLATFORM_PC);
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        let packed_info = (0x10u32 << 26) | (obfuscated.len() as u32 & 0x03FF_FFFF);
        out.extend_from_slice(&packed_info.to_le_bytes());
        out.extend_from_slice(&8u16.to_le_bytes()); // ext_size
        out.extend_from_slice(&0u16.to_le_bytes()); // flags
        out.extend_from_slice(&1u32.to_le_bytes()); // version
        out.extend_from_slice(&obfuscated);
        // no digest: NoCheck variant

        let container = parse_container(&out, &Options::default()).unwrap();
        assert_eq!(
            container.framing,
            Framing::Zstd { no_check: true }
        );
        assert!(container.digest.is_none());
        assert_eq!(container.directory.entries.len(), 2);
        assert_eq!(container.ext_header.unwrap().version, 1);
    }

    #[test]
    fn zlib_framing_round_trips() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write as _;

        let body = sample_directory_body();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&body).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC_PLAIN);
        out.extend_from_slice(&PLATFORM_PC);
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        let packed_info = (0x20u32 << 26) | (compressed.len() as u32 & 0x03FF_FFFF);
        out.extend_from_slice(&packed_info.to_le_bytes());
        out.extend_from_slice(&compressed);
        out.extend_from_slice(&[0xCD; 16]); // digest

        let container = parse_container(&out, &Options::default()).unwrap();
        assert_eq!(container.framing, Framing::Zlib);
        assert_eq!(container.directory.entries.len(), 2);
        assert_eq!(container.directory.entries[0].name, "a");
        assert_eq!(container.digest, Some([0xCD; 16]));
        assert!(container.tail.is_empty());
    }

    #[test]
    fn digest_mismatch_is_detected_when_verification_enabled() {
        let mut bytes = not_packed_container();
        // corrupt the stored digest so it cannot match the body's real MD5
        let len = bytes.len();
        bytes[len - 16..].copy_from_slice(&[0u8; 16]);

        let options = Options {
            verify_digest: true,
            ..Options::default()
        };
        let err = parse_container(&bytes, &options).unwrap_err();
        assert!(matches!(err, Error::DigestMismatch));
    }
}
