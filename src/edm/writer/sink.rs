//! Phase sinks.
//!
//! Each writer phase (head, body) buffers into its own seekable sink until
//! `finalize` concatenates them into the destination file.

use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Seek, SeekFrom, Write};

use super::options::SinkKind;
use crate::util::Result;

enum SinkInner {
    TempFile(BufWriter<File>),
    Memory(Cursor<Vec<u8>>),
}

/// Seekable byte sink for one writer phase.
pub struct Sink {
    inner: SinkInner,
}

impl Sink {
    /// Acquire a new, empty sink.
    pub fn create(kind: SinkKind) -> Result<Self> {
        let inner = match kind {
            SinkKind::TempFile => SinkInner::TempFile(BufWriter::new(tempfile::tempfile()?)),
            SinkKind::Memory => SinkInner::Memory(Cursor::new(Vec::new())),
        };
        Ok(Self { inner })
    }

    /// Total number of bytes written, regardless of cursor position.
    pub fn len(&mut self) -> Result<u64> {
        let pos = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(pos))?;
        Ok(end)
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Copy the whole sink content into `out` in chunks of `chunk_size`.
    ///
    /// Leaves the cursor at the end of the content. Returns bytes copied.
    pub fn copy_to(&mut self, out: &mut impl Write, chunk_size: usize) -> Result<u64> {
        let mut remaining = self.len()?;
        let total = remaining;
        let mut buf = vec![0u8; chunk_size.max(1)];

        self.seek(SeekFrom::Start(0))?;
        while remaining != 0 {
            let take = remaining.min(buf.len() as u64) as usize;
            self.read_exact(&mut buf[..take])?;
            out.write_all(&buf[..take])?;
            remaining -= take as u64;
        }
        Ok(total)
    }

    /// Full content as a byte vector.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.copy_to(&mut out, 64 * 1024)?;
        Ok(out)
    }
}

impl Read for Sink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            SinkInner::TempFile(w) => {
                w.flush()?;
                w.get_mut().read(buf)
            }
            SinkInner::Memory(c) => c.read(buf),
        }
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            SinkInner::TempFile(w) => w.write(buf),
            SinkInner::Memory(c) => c.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            SinkInner::TempFile(w) => w.flush(),
            SinkInner::Memory(c) => c.flush(),
        }
    }
}

impl Seek for Sink {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        // BufWriter flushes before seeking.
        match &mut self.inner {
            SinkInner::TempFile(w) => w.seek(pos),
            SinkInner::Memory(c) => c.seek(pos),
        }
    }
}
