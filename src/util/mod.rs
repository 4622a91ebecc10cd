//! Utility types and functions for EDM.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam and their wire layouts
//! - windows-1251 string conversion

mod codepage;
mod error;
mod math;

pub use codepage::*;
pub use error::*;
pub use math::*;
