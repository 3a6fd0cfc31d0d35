use std::fmt::Write as _;
use std::sync::Arc;

use crate::directory::Directory;
use crate::error::{Error, Result};

const NM_ENTRY_NAME: &str = "nm";
const DICT_ID_OFFSET: usize = 8;
const DICT_ID_LEN: usize = 32;

/// A ZSTD dictionary recovered from a container's `nm` entry. Cheaply
/// cloneable so one resolved dictionary can be reused across every
/// dictionary-compressed entry in the container.
#[derive(Debug, Clone)]
pub struct Dict(pub(crate) Arc<[u8]>);

impl Dict {
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Locates the container's dictionary, if any.
///
/// Returns `Ok(None)` when the container carries no `nm` entry or the `nm`
/// entry's dictionary-id field is all zero (no dictionary in use). Returns
/// `Err(DictionaryMissing)` when the `nm` entry names a dictionary that
/// is not present among the container's entries.
pub fn resolve_dictionary(directory: &Directory) -> Result<Option<Dict>> {
    let Some(nm_entry) = directory.find(NM_ENTRY_NAME) else {
        return Ok(None);
    };

    let id_bytes = nm_entry
        .payload
        .get(DICT_ID_OFFSET..DICT_ID_OFFSET + DICT_ID_LEN)
        .ok_or(Error::DirectoryMalformed {
            reason: "\"nm\" entry payload too short to carry a dictionary id",
        })?;

    if id_bytes.iter().all(|&b| b == 0) {
        return Ok(None);
    }

    let dict_name = format!("{}.dict", to_hex_lower(id_bytes));
    let dict_entry = directory
        .find(&dict_name)
        .ok_or_else(|| Error::DictionaryMissing {
            name: dict_name.clone(),
        })?;

    Ok(Some(Dict(Arc::from(dict_entry.payload.as_slice()))))
}

fn to_hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(out, "{byte:02x}").expect("writing to a String cannot fail");
    }
    out
}
