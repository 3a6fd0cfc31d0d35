use crate::cursor::ByteCursor;
use crate::error::{Error, Result};

pub const MAGIC_PLAIN: [u8; 4] = *b"VRFs";
pub const MAGIC_EXTENDED: [u8; 4] = *b"VRFx";

pub const PLATFORM_PC: [u8; 4] = [0x00, 0x00, b'P', b'C'];
pub const PLATFORM_IOS: [u8; 4] = [0x00, b'i', b'O', b'S'];
pub const PLATFORM_ANDROID: [u8; 4] = [0x00, b'a', b'n', b'd'];

const PACKED_TYPE_SHIFT: u32 = 26;
const PACKED_SIZE_MASK: u32 = 0x03FF_FFFF;

const FRAMING_TYPE_ZSTD_CHECKED: u8 = 0x30;
const FRAMING_TYPE_ZSTD_NO_CHECK: u8 = 0x10;
const FRAMING_TYPE_ZLIB: u8 = 0x20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub platform_tag: [u8; 4],
    pub original_size: u32,
    pub packed_info: u32,
}

impl Header {
    pub fn is_extended(&self) -> bool {
        self.magic == MAGIC_EXTENDED
    }

    /// Splits `packed_info` into its `(type, packed_size)` components.
    pub fn packed_type_and_size(&self) -> (u8, u32) {
        let kind = (self.packed_info >> PACKED_TYPE_SHIFT) as u8;
        let size = self.packed_info & PACKED_SIZE_MASK;
        (kind, size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedHeader {
    pub ext_size: u16,
    pub flags: u16,
    pub version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    NotPacked,
    Zstd { no_check: bool },
    Zlib,
}

pub fn parse_header(cursor: &mut ByteCursor<'_>, strict_platform: bool) -> Result<Header> {
    let magic = cursor.read_array4()?;
    if magic != MAGIC_PLAIN && magic != MAGIC_EXTENDED {
        return Err(Error::MagicInvalid { got: magic });
    }

    let platform_tag = cursor.read_array4()?;
    if strict_platform
        && platform_tag != PLATFORM_PC
        && platform_tag != PLATFORM_IOS
        && platform_tag != PLATFORM_ANDROID
    {
        return Err(Error::PlatformInvalid { got: platform_tag });
    }

    let original_size = cursor.read_u32()?;
    let packed_info = cursor.read_u32()?;

    Ok(Header {
        magic,
        platform_tag,
        original_size,
        packed_info,
    })
}

pub fn parse_extended_header(cursor: &mut ByteCursor<'_>) -> Result<ExtendedHeader> {
    let ext_size = cursor.read_u16()?;
    let flags = cursor.read_u16()?;
    let version = cursor.read_u32()?;
    Ok(ExtendedHeader {
        ext_size,
        flags,
        version,
    })
}

/// Selects the body framing from the header's `(type, packed_size)` pair.
pub fn select_framing(kind: u8, packed_size: u32) -> Result<Framing> {
    if packed_size == 0 {
        return Ok(Framing::NotPacked);
    }

    match kind {
        FRAMING_TYPE_ZSTD_CHECKED => Ok(Framing::Zstd { no_check: false }),
        FRAMING_TYPE_ZSTD_NO_CHECK => Ok(Framing::Zstd { no_check: true }),
        FRAMING_TYPE_ZLIB => Ok(Framing::Zlib),
        other => Err(Error::UnsupportedFraming { got: other }),
    }
}
