//! Interned string table.
//!
//! Strings written with interning are stored once in a header block and
//! referenced everywhere else by their `u32` index. Indices are handed out in
//! first-insertion order and never change for the life of a table.
//!
//! ## Block layout
//!
//! ```text
//! +--------------------+
//! | block size (u32)   |  bytes that follow, excluding this field
//! +--------------------+
//! | string 0 + 0x00    |  windows-1251 bytes
//! | string 1 + 0x00    |
//! | ...                |
//! +--------------------+
//! | 0x00               |  table terminator
//! +--------------------+
//! ```

use std::collections::HashMap;
use std::io::{Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use super::format::BLOCK_SIZE_PREFIX;
use crate::util::{decode_cp1251, encode_cp1251, Error, Result};

/// Insertion-ordered pool of unique strings.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<String>,
    /// Lookup map: string -> index. Indices always match `strings` positions.
    index_map: HashMap<String, u32>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of `value`, appending it if it was not seen before.
    pub fn intern(&mut self, value: &str) -> u32 {
        if let Some(&index) = self.index_map.get(value) {
            return index;
        }
        let index = self.strings.len() as u32;
        self.strings.push(value.to_string());
        self.index_map.insert(value.to_string(), index);
        index
    }

    /// Index of an already interned string.
    pub fn find(&self, value: &str) -> Option<u32> {
        self.index_map.get(value).copied()
    }

    /// String stored at `index`.
    pub fn get(&self, index: u32) -> Result<&str> {
        self.strings
            .get(index as usize)
            .map(String::as_str)
            .ok_or(Error::StringIndexOutOfRange { index, count: self.strings.len() })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Strings in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }

    /// Write the size-prefixed table block at the current position of `out`.
    ///
    /// The size placeholder is patched before returning and `out` is left
    /// positioned at the end of the block. Every string is encoded before the
    /// first byte is written, so an unencodable entry leaves `out` untouched.
    /// Returns the recorded block size.
    pub fn serialize<W: Write + Seek>(&self, out: &mut W) -> Result<u32> {
        let encoded = self
            .strings
            .iter()
            .map(|s| encode_cp1251(s))
            .collect::<Result<Vec<_>>>()?;

        let size_pos = out.stream_position()?;
        out.write_u32::<LittleEndian>(0)?;
        for bytes in &encoded {
            out.write_all(bytes)?;
            out.write_u8(0)?;
        }
        out.write_u8(0)?;

        let end_pos = out.stream_position()?;
        let block_size = u32::try_from(end_pos - (size_pos + BLOCK_SIZE_PREFIX))
            .map_err(|_| Error::invalid("String table block exceeds 4 GiB"))?;
        out.seek(SeekFrom::Start(size_pos))?;
        out.write_u32::<LittleEndian>(block_size)?;
        out.seek(SeekFrom::Start(end_pos))?;

        Ok(block_size)
    }

    /// Rebuild a table from block content (the bytes after the size field).
    pub fn from_block(block: &[u8]) -> Result<Self> {
        let (&last, entries) = block
            .split_last()
            .ok_or_else(|| Error::invalid("String table block is empty"))?;
        if last != 0 {
            return Err(Error::invalid("String table block is not terminated"));
        }

        let mut table = Self::new();
        let Some((&entry_end, entries)) = entries.split_last() else {
            return Ok(table);
        };
        if entry_end != 0 {
            return Err(Error::invalid("String table entry is not terminated"));
        }

        // Push every entry so indices match file positions even if a file
        // carries a duplicate; lookups resolve to the first occurrence.
        for raw in entries.split(|b| *b == 0) {
            let value = decode_cp1251(raw);
            let index = table.strings.len() as u32;
            table.index_map.entry(value.clone()).or_insert(index);
            table.strings.push(value);
        }
        Ok(table)
    }
}
