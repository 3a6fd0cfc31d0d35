use crate::cursor::{read_cstr, read_fixed, ByteCursor};
use crate::error::{Error, Result};

/// Magic byte sequence the format uses as a stand-in for the literal name
/// `"nm"` in the filename table.
const NM_SENTINEL: [u8; 4] = [0xFF, b'?', b'n', b'm'];

const DIRECTORY_HEADER_LEN: usize = 16;
const FILE_DATA_ROW_LEN: usize = 16;

#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub payload: Vec<u8>,
    pub reserved: [u8; 8],
}

#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub entries: Vec<Entry>,
}

impl Directory {
    pub fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

struct FileDataRow {
    data_offset: usize,
    data_size: usize,
    reserved: [u8; 8],
}

/// Parses the uncompressed directory body into an ordered list of entries.
pub fn parse_directory(body: &[u8]) -> Result<Directory> {
    if body.len() < DIRECTORY_HEADER_LEN {
        return Err(Error::DirectoryMalformed {
            reason: "body shorter than the directory header",
        });
    }

    let mut header_cursor = ByteCursor::new(body);
    let filename_table_offset = header_cursor.read_u32()? as usize;
    let files_count = header_cursor.read_u32()? as usize;
    let _reserved = header_cursor.read_bytes(8)?;
    let file_data_table_offset = header_cursor.read_u32()? as usize;

    if filename_table_offset < DIRECTORY_HEADER_LEN {
        return Err(Error::DirectoryMalformed {
            reason: "filename table starts inside the directory header",
        });
    }

    let filenames = parse_filename_table(body, filename_table_offset, files_count)?;
    let file_data_rows = parse_file_data_table(body, file_data_table_offset, files_count)?;

    if filenames.len() != file_data_rows.len() {
        return Err(Error::CountMismatch {
            filenames: filenames.len(),
            file_data_rows: file_data_rows.len(),
        });
    }

    let mut entries = Vec::with_capacity(files_count);
    for (name, row) in filenames.into_iter().zip(file_data_rows.into_iter()) {
        let end = row.data_offset.checked_add(row.data_size).ok_or(Error::OffsetOutOfRange {
            offset: row.data_offset,
            len: row.data_size,
            body_len: body.len(),
        })?;
        if end > body.len() {
            return Err(Error::OffsetOutOfRange {
                offset: row.data_offset,
                len: row.data_size,
                body_len: body.len(),
            });
        }

        entries.push(Entry {
            name,
            payload: body[row.data_offset..end].to_vec(),
            reserved: row.reserved,
        });
    }

    Ok(Directory { entries })
}

fn parse_filename_table(
    body: &[u8],
    table_offset: usize,
    files_count: usize,
) -> Result<Vec<String>> {
    let first_offset_bytes = read_fixed::<4>(body, table_offset)?;
    let mut offset = u32::from_le_bytes(first_offset_bytes) as usize;

    if offset < DIRECTORY_HEADER_LEN {
        return Err(Error::DirectoryMalformed {
            reason: "first filename offset falls inside the directory header",
        });
    }
    if offset > body.len() {
        return Err(Error::OffsetOutOfRange {
            offset,
            len: 0,
            body_len: body.len(),
        });
    }

    let mut names = Vec::with_capacity(files_count);
    for _ in 0..files_count {
        let (raw, next) = read_cstr(body, offset)?;
        names.push(decode_filename(raw));
        offset = next;
    }
    Ok(names)
}

fn decode_filename(raw: &[u8]) -> String {
    if raw == NM_SENTINEL {
        return String::from("nm");
    }
    String::from_utf8_lossy(raw).into_owned()
}

fn parse_file_data_table(
    body: &[u8],
    table_offset: usize,
    files_count: usize,
) -> Result<Vec<FileDataRow>> {
    let mut rows = Vec::with_capacity(files_count);
    for index in 0..files_count {
        let row_offset = table_offset
            .checked_add(index * FILE_DATA_ROW_LEN)
            .ok_or(Error::DirectoryMalformed {
                reason: "file data table row offset overflowed",
            })?;
        let row = read_fixed::<FILE_DATA_ROW_LEN>(body, row_offset)?;

        let data_offset = u32::from_le_bytes(row[0..4].try_into().unwrap()) as usize;
        let data_size = u32::from_le_bytes(row[4..8].try_into().unwrap()) as usize;
        let mut reserved = [0u8; 8];
        reserved.copy_from_slice(&row[8..16]);

        rows.push(FileDataRow {
            data_offset,
            data_size,
            reserved,
        });
    }
    Ok(rows)
}
