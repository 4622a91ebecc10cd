//! EDM binary codec.
//!
//! EDM is a tagged, self-describing scene/animation format. Polymorphic
//! values carry their type name on the wire and are decoded by looking that
//! name up in a [`TypeRegistry`].
//!
//! ## File Structure
//!
//! ```text
//! +------------------+
//! | Head             |  written in the second pass: file header,
//! |                  |  size-prefixed string table, ...
//! +------------------+
//! | Body             |  written in the first pass: named values
//! |                  |  referencing strings by table index
//! +------------------+
//! ```
//!
//! All integers and floats are little-endian; strings are windows-1251.

pub mod format;
mod reader;
mod registry;
mod strings;
mod value;
pub mod writer;

pub use reader::EdmReader;
pub use registry::{Decoder, TypeRegistry};
pub use strings::StringTable;
pub use value::{AnimatedProperty, Encode, Keyframe, NamedType, Property, Value};
pub use writer::{EdmWriter, Phase, SinkKind, WriterOptions};
