//! EDM format constants and type names.

/// Magic bytes at the start of an EDM file.
pub const EDM_MAGIC: &[u8; 3] = b"EDM";

/// Size of the file header (magic + u16 version) in bytes.
pub const HEADER_SIZE: usize = 5;

/// Legacy format version without a string table.
pub const VERSION_8: u16 = 8;

/// Format version with an interned string table in the header.
pub const VERSION_10: u16 = 10;

/// Versions accepted by the reader.
pub const SUPPORTED_VERSIONS: &[u16] = &[VERSION_8, VERSION_10];

/// Size of the block-size prefix written before a string table.
pub const BLOCK_SIZE_PREFIX: u64 = 4;

// ============================================================================
// Base type names
// ============================================================================

pub const TYPE_UINT: &str = "unsigned int";
pub const TYPE_FLOAT: &str = "float";
pub const TYPE_VEC2F: &str = "osg::Vec2f";
pub const TYPE_VEC3F: &str = "osg::Vec3f";
pub const TYPE_VEC3D: &str = "osg::Vec3d";
pub const TYPE_MATRIXF: &str = "osg::Matrixf";
pub const TYPE_MATRIXD: &str = "osg::Matrixd";
pub const TYPE_QUAT: &str = "osg::Quat";

// ============================================================================
// Keyframe key names
// ============================================================================

pub const KEY_FLOAT: &str = "key::FLOAT";
pub const KEY_VEC2F: &str = "key::VEC2F";
pub const KEY_VEC3F: &str = "key::VEC3F";

/// Base types that may be wrapped in `model::Property<T>`.
pub const PROPERTY_TYPES: &[&str] = &[TYPE_UINT, TYPE_FLOAT, TYPE_VEC2F, TYPE_VEC3F, TYPE_VEC3D];

/// Animatable base types paired with the key name their keyframes use.
pub const ANIMATABLE_TYPES: &[(&str, &str)] = &[
    (TYPE_FLOAT, KEY_FLOAT),
    (TYPE_VEC2F, KEY_VEC2F),
    (TYPE_VEC3F, KEY_VEC3F),
];

/// Key name for an animatable base type, if it has one.
pub fn key_name_for(base_type: &str) -> Option<&'static str> {
    ANIMATABLE_TYPES
        .iter()
        .find(|(base, _)| *base == base_type)
        .map(|(_, key)| *key)
}

// ============================================================================
// Synthetic names
// ============================================================================

/// `model::Property<T>`
pub fn property_type_name(element: &str) -> String {
    format!("model::Property<{}>", element)
}

/// `model::Key<K>`
pub fn keyframe_type_name(key_name: &str) -> String {
    format!("model::Key<{}>", key_name)
}

/// `model::AnimatedProperty<T>`
pub fn animated_property_type_name(base: &str) -> String {
    format!("model::AnimatedProperty<{}>", base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_names() {
        assert_eq!(property_type_name(TYPE_FLOAT), "model::Property<float>");
        assert_eq!(keyframe_type_name(KEY_VEC3F), "model::Key<key::VEC3F>");
        assert_eq!(animated_property_type_name(TYPE_VEC2F), "model::AnimatedProperty<osg::Vec2f>");
    }

    #[test]
    fn test_key_names() {
        assert_eq!(key_name_for(TYPE_FLOAT), Some(KEY_FLOAT));
        assert_eq!(key_name_for(TYPE_QUAT), None);
    }
}
