//! EDM stream reader.
//!
//! A byte cursor over a whole EDM buffer. Decoders registered in a
//! [`TypeRegistry`](super::TypeRegistry) pull primitives from it; it never
//! interprets type names itself.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::Mmap;

use super::format::{EDM_MAGIC, SUPPORTED_VERSIONS};
use super::strings::StringTable;
use crate::util::{
    decode_cp1251, quat_from_wire, sequence_to_matrix, sequence_to_matrix_d, DMat4, DQuat, DVec3,
    Error, Mat4, Result, Vec2, Vec3, MATRIX_ELEMENTS,
};

enum ReaderData {
    /// Memory-mapped file
    Mmap(Mmap),
    /// Owned buffer (in-memory input or buffered file read)
    Owned(Vec<u8>),
}

impl ReaderData {
    #[inline]
    fn as_slice(&self) -> &[u8] {
        match self {
            ReaderData::Mmap(mmap) => &mmap[..],
            ReaderData::Owned(buf) => buf.as_slice(),
        }
    }
}

/// Cursor over EDM bytes.
pub struct EdmReader {
    data: ReaderData,
    pos: usize,
    /// Installed string table; when present `read_string` resolves indices.
    strings: Option<StringTable>,
}

impl EdmReader {
    /// Read from an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            data: ReaderData::Owned(bytes.into()),
            pos: 0,
            strings: None,
        }
    }

    /// Open a file for reading with memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, true)
    }

    /// Open a file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let mut file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();

        let data = if use_mmap && size > 0 {
            // Safety: the map is read-only and owned by this reader.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            ReaderData::Mmap(mmap)
        } else {
            let mut buf = Vec::with_capacity(size as usize);
            file.read_to_end(&mut buf)?;
            ReaderData::Owned(buf)
        };

        Ok(Self { data, pos: 0, strings: None })
    }

    /// Current cursor position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos as u64
    }

    /// Total buffer size.
    #[inline]
    pub fn size(&self) -> u64 {
        self.data.as_slice().len() as u64
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.size() - self.pos()
    }

    /// Move the cursor to an absolute position.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.size() {
            return Err(Error::UnexpectedEof(pos));
        }
        self.pos = pos as usize;
        Ok(())
    }

    /// Installed string table, if any.
    pub fn string_table(&self) -> Option<&StringTable> {
        self.strings.as_ref()
    }

    /// Install a string table for index-based `read_string`.
    pub fn set_string_table(&mut self, table: StringTable) {
        self.strings = Some(table);
    }

    // ========================================================================
    // Raw bytes
    // ========================================================================

    /// Borrow the next `len` bytes and advance.
    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.as_slice().len())
            .ok_or(Error::UnexpectedEof(self.pos.saturating_add(len) as u64))?;
        let start = self.pos;
        self.pos = end;
        Ok(&self.data.as_slice()[start..end])
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    // ========================================================================
    // Fixed-width primitives (little-endian)
    // ========================================================================

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32s(&mut self, count: usize) -> Result<Vec<u32>> {
        (0..count).map(|_| self.read_u32()).collect()
    }

    pub fn read_f32s(&mut self, count: usize) -> Result<Vec<f32>> {
        (0..count).map(|_| self.read_f32()).collect()
    }

    pub fn read_f64s(&mut self, count: usize) -> Result<Vec<f64>> {
        (0..count).map(|_| self.read_f64()).collect()
    }

    // ========================================================================
    // Strings
    // ========================================================================

    /// Read a length-prefixed string (`u32` byte length, no terminator).
    pub fn read_inline_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        Ok(decode_cp1251(self.read_bytes(len)?))
    }

    /// Read a string in the stream's string form.
    ///
    /// With a string table installed this is a `u32` index into it,
    /// otherwise the inline length-prefixed form.
    pub fn read_string(&mut self) -> Result<String> {
        if self.strings.is_none() {
            return self.read_inline_string();
        }
        let index = self.read_u32()?;
        self.lookup_string(index)
    }

    fn lookup_string(&self, index: u32) -> Result<String> {
        match &self.strings {
            Some(table) => table.get(index).map(str::to_string),
            None => Err(Error::StringIndexOutOfRange { index, count: 0 }),
        }
    }

    /// Parse a size-prefixed string table block and install it.
    pub fn read_string_table(&mut self) -> Result<&StringTable> {
        let size = self.read_u32()? as usize;
        let table = StringTable::from_block(self.read_bytes(size)?)?;
        Ok(&*self.strings.insert(table))
    }

    /// Read and validate the `EDM` magic and version.
    pub fn read_file_header(&mut self) -> Result<u16> {
        if self.read_array::<3>()? != *EDM_MAGIC {
            return Err(Error::InvalidMagic);
        }
        let version = self.read_u16()?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(Error::UnsupportedVersion(version));
        }
        Ok(version)
    }

    // ========================================================================
    // Math shapes
    // ========================================================================

    pub fn read_vec2f(&mut self) -> Result<Vec2> {
        Ok(Vec2::new(self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec3f(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec3d(&mut self) -> Result<DVec3> {
        Ok(DVec3::new(self.read_f64()?, self.read_f64()?, self.read_f64()?))
    }

    pub fn read_matrixf(&mut self) -> Result<Mat4> {
        let mut seq = [0f32; MATRIX_ELEMENTS];
        for v in seq.iter_mut() {
            *v = self.read_f32()?;
        }
        Ok(sequence_to_matrix(&seq))
    }

    pub fn read_matrixd(&mut self) -> Result<DMat4> {
        let mut seq = [0f64; MATRIX_ELEMENTS];
        for v in seq.iter_mut() {
            *v = self.read_f64()?;
        }
        Ok(sequence_to_matrix_d(&seq))
    }

    /// Read a quaternion stored as `(x, y, z, w)` doubles.
    pub fn read_quaternion(&mut self) -> Result<DQuat> {
        Ok(quat_from_wire([self.read_f64()?, self.read_f64()?, self.read_f64()?, self.read_f64()?]))
    }
}
