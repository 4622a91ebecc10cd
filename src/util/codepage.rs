//! Legacy single-byte string encoding.
//!
//! Every string in an EDM stream is stored as windows-1251 bytes, never UTF-8.

use encoding_rs::WINDOWS_1251;

use super::{Error, Result};

/// Encode a string to windows-1251 bytes.
///
/// Characters outside the codepage are an error rather than being replaced,
/// otherwise the file would silently carry different text.
pub fn encode_cp1251(value: &str) -> Result<Vec<u8>> {
    let (bytes, _, had_errors) = WINDOWS_1251.encode(value);
    if had_errors {
        return Err(Error::Unencodable(value.to_string()));
    }
    Ok(bytes.into_owned())
}

/// Decode windows-1251 bytes to a string.
pub fn decode_cp1251(bytes: &[u8]) -> String {
    let (text, _) = WINDOWS_1251.decode_without_bom_handling(bytes);
    text.into_owned()
}
