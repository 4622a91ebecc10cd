//! Writer configuration.

/// Backing storage for the head and body phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkKind {
    /// Anonymous temporary files, removed when the writer releases them.
    #[default]
    TempFile,
    /// In-memory buffers.
    Memory,
}

/// Default chunk size used when concatenating phases into the output file.
pub const DEFAULT_COPY_CHUNK_SIZE: usize = 1024;

/// Options for [`EdmWriter`](super::EdmWriter).
#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub sink: SinkKind,
    pub copy_chunk_size: usize,
    /// Interning mode used by `write_str` and the composite encoders.
    pub intern_strings: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            sink: SinkKind::TempFile,
            copy_chunk_size: DEFAULT_COPY_CHUNK_SIZE,
            intern_strings: true,
        }
    }
}

impl WriterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the phase storage.
    pub fn with_sink(mut self, sink: SinkKind) -> Self {
        self.sink = sink;
        self
    }

    /// Set the finalize copy chunk size (clamped to at least one byte).
    pub fn with_copy_chunk_size(mut self, size: usize) -> Self {
        self.copy_chunk_size = size.max(1);
        self
    }

    /// Set the default string interning mode.
    pub fn with_intern_strings(mut self, intern: bool) -> Self {
        self.intern_strings = intern;
        self
    }
}
