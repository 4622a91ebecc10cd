//! # EDM
//!
//! Rust implementation of the EDM binary scene/animation codec.
//!
//! The codec writes in two phases (body first, then a head carrying the
//! interned string table) and reads through a name-keyed decoder registry.
//!
//! ## Modules
//!
//! - [`util`] - Errors, math re-exports and wire layouts, string codepage
//! - [`edm`] - String table, writer, reader, type registry
//!
//! ## Example
//!
//! ```ignore
//! use edm::prelude::*;
//!
//! let mut writer = EdmWriter::new()?;
//! writer.write_named_value(&Value::Float(1.0), None)?;
//! writer.select_head();
//! writer.write_string_table()?;
//! writer.finalize("model.edm")?;
//!
//! let mut reader = EdmReader::open("model.edm")?;
//! reader.read_string_table()?;
//! let value = TypeRegistry::standard().decode_named(&mut reader)?;
//! ```

pub mod util;
pub mod edm;

// Re-export commonly used types
pub use util::{Error, Result};
pub use edm::{EdmReader, EdmWriter, TypeRegistry, Value};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result};
    pub use crate::edm::{
        AnimatedProperty, EdmReader, EdmWriter, Encode, Keyframe, NamedType, Property,
        StringTable, TypeRegistry, Value, WriterOptions,
    };
}
