//! EDM two-phase writer.
//!
//! Content is produced in two passes into two separate sinks:
//!
//! 1. **Body** - objects write themselves (`select_body`), interning strings
//!    as they go.
//! 2. **Head** - once the body is complete the caller switches to the head
//!    (`select_head`) and writes header content such as the string table,
//!    which is only known after the body pass.
//!
//! `finalize` then writes `[head bytes][body bytes]` to the destination with
//! no extra framing.

mod options;
mod sink;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::debug;

use super::format::EDM_MAGIC;
use super::strings::StringTable;
use super::value::Encode;
use crate::util::{
    encode_cp1251, matrix_to_sequence, matrix_to_sequence_d, quat_to_wire, DMat4, DQuat, DVec3,
    Error, Mat4, Result, Vec2, Vec3,
};

pub use options::{SinkKind, WriterOptions, DEFAULT_COPY_CHUNK_SIZE};
pub use sink::Sink;

/// Writer phase selecting the active sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Head,
    Body,
}

/// Two-phase EDM encoder.
pub struct EdmWriter {
    head: Option<Sink>,
    body: Option<Sink>,
    phase: Phase,
    strings: StringTable,
    /// Number of written objects per type name.
    type_counts: HashMap<String, usize>,
    options: WriterOptions,
}

impl EdmWriter {
    /// Create a writer with default options (temp file sinks, interning on).
    pub fn new() -> Result<Self> {
        Self::with_options(WriterOptions::default())
    }

    /// Create a writer with explicit options.
    ///
    /// Starts in the body phase.
    pub fn with_options(options: WriterOptions) -> Result<Self> {
        Ok(Self {
            head: Some(Sink::create(options.sink)?),
            body: Some(Sink::create(options.sink)?),
            phase: Phase::Body,
            strings: StringTable::new(),
            type_counts: HashMap::new(),
            options,
        })
    }

    #[inline]
    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Check whether the sinks were released.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.head.is_none() || self.body.is_none()
    }

    // ========================================================================
    // Phases
    // ========================================================================

    /// Route subsequent writes to the body sink.
    pub fn select_body(&mut self) {
        self.phase = Phase::Body;
    }

    /// Route subsequent writes to the head sink.
    pub fn select_head(&mut self) {
        self.phase = Phase::Head;
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Active sink for the current phase.
    fn sink(&mut self) -> Result<&mut Sink> {
        let sink = match self.phase {
            Phase::Head => self.head.as_mut(),
            Phase::Body => self.body.as_mut(),
        };
        sink.ok_or(Error::WriterClosed)
    }

    /// Write position in the active sink.
    pub fn pos(&mut self) -> Result<u64> {
        Ok(self.sink()?.stream_position()?)
    }

    // ========================================================================
    // Strings
    // ========================================================================

    /// Interned strings collected so far.
    #[inline]
    pub fn string_table(&self) -> &StringTable {
        &self.strings
    }

    /// Write a string either as a table index or inline.
    ///
    /// Interned: `u32` index into the string table.
    /// Inline: `u32` byte length followed by the windows-1251 bytes.
    pub fn write_string(&mut self, value: &str, intern: bool) -> Result<()> {
        // Validate up front so the table never holds an unwritable entry.
        let bytes = encode_cp1251(value)?;
        if intern {
            let index = self.strings.intern(value);
            self.write_u32(index)
        } else {
            let len = u32::try_from(bytes.len())
                .map_err(|_| Error::invalid("Inline string exceeds 4 GiB"))?;
            self.write_u32(len)?;
            self.write_bytes(&bytes)
        }
    }

    /// Write a string using the configured default interning mode.
    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.write_string(value, self.options.intern_strings)
    }

    /// Write the size-prefixed string table block to the active sink.
    ///
    /// Call during the head phase, after all body content is written.
    /// Returns the recorded block size.
    pub fn write_string_table(&mut self) -> Result<u32> {
        if self.phase != Phase::Head {
            debug!("Writing string table outside the head phase");
        }
        let count = self.strings.len();
        let sink = match self.phase {
            Phase::Head => self.head.as_mut(),
            Phase::Body => self.body.as_mut(),
        }
        .ok_or(Error::WriterClosed)?;
        let size = self.strings.serialize(sink)?;
        debug!(entries = count, block_size = size, "Wrote string table");
        Ok(size)
    }

    /// Write the `EDM` magic and format version to the active sink.
    pub fn write_file_header(&mut self, version: u16) -> Result<()> {
        self.write_bytes(EDM_MAGIC)?;
        self.write_u16(version)
    }

    // ========================================================================
    // Primitives (little-endian)
    // ========================================================================

    /// Write raw bytes.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.sink()?.write_all(data)?;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.sink()?.write_u8(value)?;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.sink()?.write_u16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.sink()?.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.sink()?.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.sink()?.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.sink()?.write_f64::<LittleEndian>(value)?;
        Ok(())
    }

    // List variants write elements back to back with no count.

    pub fn write_u8s(&mut self, values: &[u8]) -> Result<()> {
        self.write_bytes(values)
    }

    pub fn write_u16s(&mut self, values: &[u16]) -> Result<()> {
        values.iter().try_for_each(|v| self.write_u16(*v))
    }

    pub fn write_u32s(&mut self, values: &[u32]) -> Result<()> {
        values.iter().try_for_each(|v| self.write_u32(*v))
    }

    pub fn write_i32s(&mut self, values: &[i32]) -> Result<()> {
        values.iter().try_for_each(|v| self.write_i32(*v))
    }

    pub fn write_f32s(&mut self, values: &[f32]) -> Result<()> {
        values.iter().try_for_each(|v| self.write_f32(*v))
    }

    pub fn write_f64s(&mut self, values: &[f64]) -> Result<()> {
        values.iter().try_for_each(|v| self.write_f64(*v))
    }

    /// Write a `u32` count followed by each item.
    pub fn write_list<T, F>(&mut self, items: &[T], mut write_item: F) -> Result<()>
    where
        F: FnMut(&mut Self, &T) -> Result<()>,
    {
        let count = u32::try_from(items.len())
            .map_err(|_| Error::invalid("List length exceeds u32"))?;
        self.write_u32(count)?;
        for item in items {
            write_item(self, item)?;
        }
        Ok(())
    }

    // ========================================================================
    // Math shapes
    // ========================================================================

    pub fn write_vec2f(&mut self, v: Vec2) -> Result<()> {
        self.write_f32s(&v.to_array())
    }

    pub fn write_vec3f(&mut self, v: Vec3) -> Result<()> {
        self.write_f32s(&v.to_array())
    }

    pub fn write_vec3d(&mut self, v: DVec3) -> Result<()> {
        self.write_f64s(&v.to_array())
    }

    /// Write any-length float vector (no count).
    pub fn write_vecf(&mut self, v: &[f32]) -> Result<()> {
        self.write_f32s(v)
    }

    /// Write any-length double vector (no count).
    pub fn write_vecd(&mut self, v: &[f64]) -> Result<()> {
        self.write_f64s(v)
    }

    pub fn write_matrixf(&mut self, m: &Mat4) -> Result<()> {
        self.write_f32s(&matrix_to_sequence(m))
    }

    pub fn write_matrixd(&mut self, m: &DMat4) -> Result<()> {
        self.write_f64s(&matrix_to_sequence_d(m))
    }

    /// Write a quaternion as `(x, y, z, w)` doubles.
    pub fn write_quaternion(&mut self, q: DQuat) -> Result<()> {
        self.write_f64s(&quat_to_wire(q))
    }

    // ========================================================================
    // Named values
    // ========================================================================

    /// Write `value` preceded by its type name.
    ///
    /// The name is `type_name` when given, otherwise the value's own
    /// registered name. It is always written inline.
    pub fn write_named_value(&mut self, value: &dyn Encode, type_name: Option<&str>) -> Result<()> {
        value.validate()?;
        match type_name {
            Some(name) => self.write_string(name, false)?,
            None => self.write_string(&value.type_name(), false)?,
        }
        value.encode(self)
    }

    /// Count `count` more written objects of type `name`.
    pub fn mark_written(&mut self, name: &str, count: usize) {
        *self.type_counts.entry(name.to_string()).or_insert(0) += count;
    }

    /// Written object counts per type name.
    pub fn type_counts(&self) -> &HashMap<String, usize> {
        &self.type_counts
    }

    // ========================================================================
    // Finish
    // ========================================================================

    /// Write `[head][body]` to `path` and release both sinks.
    ///
    /// Returns `Ok(false)` without touching `path` if the writer was already
    /// finalized or closed. I/O errors are returned after the sinks have been
    /// released.
    pub fn finalize(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        // Taking the sinks out releases them on every return path.
        let (Some(mut head), Some(mut body)) = (self.head.take(), self.body.take()) else {
            return Ok(false);
        };

        concat_phases(&mut head, &mut body, path.as_ref(), self.options.copy_chunk_size)?;
        Ok(true)
    }

    /// Release both sinks. Safe to call repeatedly and after `finalize`.
    pub fn close(&mut self) {
        self.head = None;
        self.body = None;
    }
}

fn concat_phases(head: &mut Sink, body: &mut Sink, path: &Path, chunk_size: usize) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    let head_len = head.copy_to(&mut out, chunk_size)?;
    let body_len = body.copy_to(&mut out, chunk_size)?;
    out.flush()?;
    debug!(head_len, body_len, path = %path.display(), "Finalized EDM file");
    Ok(())
}

#[cfg(test)]
mod tests;
