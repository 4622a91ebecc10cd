use super::*;
use crate::edm::{AnimatedProperty, Keyframe, Property, Value};
use std::fs;
use tempfile::NamedTempFile;

fn memory_writer() -> EdmWriter {
    EdmWriter::with_options(WriterOptions::new().with_sink(SinkKind::Memory))
        .expect("memory sinks never fail")
}

#[test]
fn test_primitive_widths_le() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();

    w.write_u8(0xAB)?;
    w.write_u16(0x0102)?;
    w.write_u32(0x0A0B0C0D)?;
    w.write_i32(-1)?;
    w.write_f32(1.0)?;
    w.write_f64(2.0)?;
    assert!(w.finalize(temp.path())?);

    let mut expected = vec![0xAB, 0x02, 0x01, 0x0D, 0x0C, 0x0B, 0x0A, 0xFF, 0xFF, 0xFF, 0xFF];
    expected.extend_from_slice(&1.0f32.to_le_bytes());
    expected.extend_from_slice(&2.0f64.to_le_bytes());
    assert_eq!(fs::read(temp.path())?, expected);

    Ok(())
}

#[test]
fn test_list_variants_have_no_count() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();

    w.write_u16s(&[1, 2])?;
    w.write_i32s(&[-2])?;
    w.write_f32s(&[])?;
    assert!(w.finalize(temp.path())?);

    assert_eq!(fs::read(temp.path())?, vec![1, 0, 2, 0, 0xFE, 0xFF, 0xFF, 0xFF]);
    Ok(())
}

#[test]
fn test_write_list_prefixes_count() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();

    w.write_list(&[7u8, 9u8], |w, v| w.write_u8(*v))?;
    w.write_list::<u8, _>(&[], |w, v| w.write_u8(*v))?;
    assert!(w.finalize(temp.path())?);

    assert_eq!(fs::read(temp.path())?, vec![2, 0, 0, 0, 7, 9, 0, 0, 0, 0]);
    Ok(())
}

#[test]
fn test_interned_string_reuses_index() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();

    w.write_string("root", true)?;
    w.write_string("child", true)?;
    w.write_string("root", true)?;
    assert_eq!(w.string_table().len(), 2);
    assert_eq!(w.string_table().find("root"), Some(0));
    assert!(w.finalize(temp.path())?);

    assert_eq!(fs::read(temp.path())?, vec![0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]);
    Ok(())
}

#[test]
fn test_inline_string_layout() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();

    w.write_string("Ёж", false)?;
    assert!(w.string_table().is_empty());
    assert!(w.finalize(temp.path())?);

    // windows-1251: Ё = 0xA8, ж = 0xE6; no terminator.
    assert_eq!(fs::read(temp.path())?, vec![2, 0, 0, 0, 0xA8, 0xE6]);
    Ok(())
}

#[test]
fn test_unencodable_string_not_interned() {
    let mut w = memory_writer();
    assert!(matches!(w.write_string("\u{1F600}", true), Err(Error::Unencodable(_))));
    assert!(w.string_table().is_empty());
}

#[test]
fn test_finalize_is_head_then_body() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = EdmWriter::new()?;

    // Interleave phases; each write lands in its own sink.
    w.select_body();
    w.write_u8(1)?;
    w.select_head();
    w.write_u8(10)?;
    w.select_body();
    w.write_u8(2)?;
    w.select_head();
    w.write_u8(11)?;
    w.select_body();
    w.write_u8(3)?;

    assert!(w.finalize(temp.path())?);
    assert_eq!(fs::read(temp.path())?, vec![10, 11, 1, 2, 3]);
    Ok(())
}

#[test]
fn test_finalize_small_chunks() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = EdmWriter::with_options(WriterOptions::new().with_copy_chunk_size(3))?;

    let body: Vec<u8> = (0..=255).collect();
    w.write_bytes(&body)?;
    w.select_head();
    w.write_bytes(b"EDM")?;
    assert!(w.finalize(temp.path())?);

    let mut expected = b"EDM".to_vec();
    expected.extend_from_slice(&body);
    assert_eq!(fs::read(temp.path())?, expected);
    Ok(())
}

#[test]
fn test_finalize_twice_fails_checkably() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();
    w.write_u32(5)?;
    assert!(w.finalize(temp.path())?);
    assert!(w.is_closed());

    let other = NamedTempFile::new()?;
    assert!(!w.finalize(other.path())?);
    // The second destination was not written.
    assert!(fs::read(other.path())?.is_empty());
    Ok(())
}

#[test]
fn test_close_is_idempotent() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();
    w.close();
    w.close();
    assert!(matches!(w.write_u8(0), Err(Error::WriterClosed)));
    assert!(!w.finalize(temp.path())?);
    w.close();
    Ok(())
}

#[test]
fn test_string_table_patched_size() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();

    w.write_str("a")?;
    w.write_str("bcd")?;
    w.select_head();
    w.write_u8(0x55)?;
    let size = w.write_string_table()?;
    // Writes after the table continue at its end.
    w.write_u8(0x66)?;
    assert_eq!(size, 2 + 4 + 1);
    assert!(w.finalize(temp.path())?);

    let bytes = fs::read(temp.path())?;
    assert_eq!(
        &bytes[..13],
        &[0x55, 7, 0, 0, 0, b'a', 0, b'b', b'c', b'd', 0, 0, 0x66]
    );
    // Body: two indices.
    assert_eq!(&bytes[13..], &[0, 0, 0, 0, 1, 0, 0, 0]);
    Ok(())
}

#[test]
fn test_empty_string_table() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();
    w.select_head();
    assert_eq!(w.write_string_table()?, 1);
    assert!(w.finalize(temp.path())?);
    assert_eq!(fs::read(temp.path())?, vec![1, 0, 0, 0, 0]);
    Ok(())
}

#[test]
fn test_quaternion_wire_order() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();
    w.write_quaternion(crate::util::quat_from_wxyz([4.0, 1.0, 2.0, 3.0]))?;
    assert!(w.finalize(temp.path())?);

    let bytes = fs::read(temp.path())?;
    let values: Vec<f64> = bytes
        .chunks_exact(8)
        .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
        .collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
    Ok(())
}

#[test]
fn test_matrix_sixteen_elements() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();
    w.write_matrixf(&Mat4::IDENTITY)?;
    w.write_matrixd(&DMat4::IDENTITY)?;
    assert!(w.finalize(temp.path())?);
    assert_eq!(fs::read(temp.path())?.len(), 16 * 4 + 16 * 8);
    Ok(())
}

#[test]
fn test_named_value_uses_inline_type_name() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();

    w.write_named_value(&Value::UInt(3), None)?;
    w.write_named_value(&Value::UInt(4), Some("custom"))?;
    // Type names never enter the string table.
    assert!(w.string_table().is_empty());
    assert!(w.finalize(temp.path())?);

    let mut expected = 12u32.to_le_bytes().to_vec();
    expected.extend_from_slice(b"unsigned int");
    expected.extend_from_slice(&3u32.to_le_bytes());
    expected.extend_from_slice(&6u32.to_le_bytes());
    expected.extend_from_slice(b"custom");
    expected.extend_from_slice(&4u32.to_le_bytes());
    assert_eq!(fs::read(temp.path())?, expected);
    Ok(())
}

#[test]
fn test_composite_payload_layout() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();

    let prop = Property::new("size", Value::Float(0.5));
    prop.encode(&mut w)?;
    let anim = AnimatedProperty::new(
        "size",
        2,
        "float",
        vec![Keyframe::new(1.0, Value::Float(3.0))],
    );
    anim.encode(&mut w)?;
    assert_eq!(w.string_table().len(), 1);
    assert!(w.finalize(temp.path())?);

    let mut expected = Vec::new();
    expected.extend_from_slice(&0u32.to_le_bytes());
    expected.extend_from_slice(&0.5f32.to_le_bytes());
    expected.extend_from_slice(&0u32.to_le_bytes());
    expected.extend_from_slice(&2u32.to_le_bytes());
    expected.extend_from_slice(&1u32.to_le_bytes());
    expected.extend_from_slice(&1.0f64.to_le_bytes());
    expected.extend_from_slice(&3.0f32.to_le_bytes());
    assert_eq!(fs::read(temp.path())?, expected);
    Ok(())
}

#[test]
fn test_mismatched_animated_keys_write_nothing() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();

    let anim = AnimatedProperty::new(
        "p",
        0,
        "float",
        vec![Keyframe::new(0.0, Value::Vec3f(crate::util::Vec3::new(1.0, 2.0, 3.0)))],
    );
    let result = w.write_named_value(&Value::AnimatedProperty(anim), None);
    match result {
        Err(Error::TypeMismatch { expected, actual }) => {
            assert_eq!(expected, "float");
            assert_eq!(actual, "osg::Vec3f");
        }
        other => panic!("expected TypeMismatch, got {:?}", other),
    }
    assert!(w.string_table().is_empty());

    // The next value starts at offset 0, so the stream stays in sync.
    w.write_named_value(&Value::UInt(7), None)?;
    assert!(w.finalize(temp.path())?);

    let mut expected = 12u32.to_le_bytes().to_vec();
    expected.extend_from_slice(b"unsigned int");
    expected.extend_from_slice(&7u32.to_le_bytes());
    assert_eq!(fs::read(temp.path())?, expected);
    Ok(())
}

#[test]
fn test_type_counts() {
    let mut w = memory_writer();
    w.mark_written("model::RootNode", 1);
    w.mark_written("model::Node", 2);
    w.mark_written("model::Node", 3);
    assert_eq!(w.type_counts().get("model::Node"), Some(&5));
    assert_eq!(w.type_counts().get("model::RootNode"), Some(&1));
}

#[test]
fn test_file_header() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut w = memory_writer();
    w.select_head();
    w.write_file_header(crate::edm::format::VERSION_10)?;
    assert!(w.finalize(temp.path())?);
    assert_eq!(fs::read(temp.path())?, vec![b'E', b'D', b'M', 10, 0]);
    Ok(())
}
