//! Name-keyed decoder registry.
//!
//! EDM streams are self-describing: every polymorphic value is preceded by
//! its type name, and the reader picks a decoder by that name. A
//! [`TypeRegistry`] is an explicit value, so independent sessions can use
//! different registrations side by side.
//!
//! Composite decoders (`model::Property<T>`, `model::Key<K>`,
//! `model::AnimatedProperty<T>`) are derived from an already registered
//! element decoder and capture it when derived.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{trace, warn};

use super::format::{
    animated_property_type_name, keyframe_type_name, property_type_name, ANIMATABLE_TYPES,
    PROPERTY_TYPES, TYPE_FLOAT, TYPE_MATRIXD, TYPE_MATRIXF, TYPE_QUAT, TYPE_UINT, TYPE_VEC2F,
    TYPE_VEC3D, TYPE_VEC3F,
};
use super::reader::EdmReader;
use super::value::{AnimatedProperty, Keyframe, Property, Value};
use crate::util::{Error, Result};

/// Decode function for one type name.
pub type Decoder = Arc<dyn Fn(&mut EdmReader) -> Result<Value> + Send + Sync>;

/// Mapping from stream type name to decoder.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    decoders: HashMap<String, Decoder>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.decoders.keys().collect();
        names.sort();
        f.debug_struct("TypeRegistry").field("types", &names).finish()
    }
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in EDM type registered.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Number of registered type names.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.decoders.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.decoders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Store the decoder for `type_name`, replacing any previous one.
    pub fn register(&mut self, type_name: impl Into<String>, decoder: Decoder) {
        let type_name = type_name.into();
        trace!(type_name = %type_name, "Registering decoder");
        if self.decoders.insert(type_name.clone(), decoder).is_some() {
            warn!(type_name = %type_name, "Decoder replaced by a later registration");
        }
    }

    /// Register a plain function or closure as decoder.
    pub fn register_fn<F>(&mut self, type_name: impl Into<String>, decode: F)
    where
        F: Fn(&mut EdmReader) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(type_name, Arc::new(decode));
    }

    /// Decoder registered for `type_name`.
    pub fn lookup(&self, type_name: &str) -> Result<Decoder> {
        self.decoders
            .get(type_name)
            .cloned()
            .ok_or_else(|| Error::DecoderNotFound(type_name.to_string()))
    }

    // ========================================================================
    // Derived decoders
    // ========================================================================

    /// Decoder for `<string name><element payload>`.
    pub fn derive_property_decoder(&self, element_type: &str) -> Result<Decoder> {
        let element = self.lookup(element_type)?;
        let decoder: Decoder = Arc::new(move |r: &mut EdmReader| -> Result<Value> {
            let name = r.read_string()?;
            let value = element(r)?;
            Ok(Value::Property(Box::new(Property { name, value })))
        });
        Ok(decoder)
    }

    /// Decoder for `<f64 frame><element payload>`.
    pub fn derive_keyframe_decoder(&self, element_type: &str) -> Result<Decoder> {
        let element = self.lookup(element_type)?;
        let decoder: Decoder = Arc::new(move |r: &mut EdmReader| -> Result<Value> {
            let frame = r.read_f64()?;
            let value = element(r)?;
            Ok(Value::Keyframe(Box::new(Keyframe { frame, value })))
        });
        Ok(decoder)
    }

    /// Decoder for `<string name><u32 argument><u32 count><count x keyframe>`.
    ///
    /// `keyframe_type` names the registered keyframe decoder; `value_type`
    /// is the base type recorded on the decoded property.
    pub fn derive_animated_property_decoder(
        &self,
        keyframe_type: &str,
        value_type: &str,
    ) -> Result<Decoder> {
        let keyframe = self.lookup(keyframe_type)?;
        let value_type = value_type.to_string();
        let decoder: Decoder = Arc::new(move |r: &mut EdmReader| -> Result<Value> {
            let name = r.read_string()?;
            let argument = r.read_u32()?;
            let count = r.read_u32()? as usize;
            let mut keys = Vec::with_capacity(count.min(r.remaining() as usize / 8 + 1));
            for _ in 0..count {
                match keyframe(r)? {
                    Value::Keyframe(key) => keys.push(*key),
                    other => {
                        return Err(Error::TypeMismatch {
                            expected: "Keyframe".to_string(),
                            actual: other.kind().to_string(),
                        })
                    }
                }
            }
            Ok(Value::AnimatedProperty(AnimatedProperty {
                name,
                argument,
                value_type: value_type.clone(),
                keys,
            }))
        });
        Ok(decoder)
    }

    /// Register `model::Property<T>` for an already registered `T`.
    pub fn allow_properties(&mut self, base_type: &str) -> Result<()> {
        let decoder = self.derive_property_decoder(base_type)?;
        self.register(property_type_name(base_type), decoder);
        Ok(())
    }

    /// Register `model::Key<K>` and `model::AnimatedProperty<T>` for an
    /// already registered `T`.
    pub fn make_animatable(&mut self, base_type: &str, key_name: &str) -> Result<()> {
        let keyframe_type = keyframe_type_name(key_name);
        let keyframe = self.derive_keyframe_decoder(base_type)?;
        self.register(keyframe_type.clone(), keyframe);

        let animated = self.derive_animated_property_decoder(&keyframe_type, base_type)?;
        self.register(animated_property_type_name(base_type), animated);
        Ok(())
    }

    fn register_builtins(&mut self) {
        self.register_fn(TYPE_UINT, |r| Ok(Value::UInt(r.read_u32()?)));
        self.register_fn(TYPE_FLOAT, |r| Ok(Value::Float(r.read_f32()?)));
        self.register_fn(TYPE_VEC2F, |r| Ok(Value::Vec2f(r.read_vec2f()?)));
        self.register_fn(TYPE_VEC3F, |r| Ok(Value::Vec3f(r.read_vec3f()?)));
        self.register_fn(TYPE_VEC3D, |r| Ok(Value::Vec3d(r.read_vec3d()?)));
        self.register_fn(TYPE_MATRIXF, |r| Ok(Value::Matrixf(r.read_matrixf()?)));
        self.register_fn(TYPE_MATRIXD, |r| Ok(Value::Matrixd(r.read_matrixd()?)));
        self.register_fn(TYPE_QUAT, |r| Ok(Value::Quat(r.read_quaternion()?)));

        // Bases are all registered above.
        for base in PROPERTY_TYPES {
            if let Err(e) = self.allow_properties(base) {
                warn!(base, error = %e, "Skipping property decoder");
            }
        }
        for (base, key) in ANIMATABLE_TYPES {
            if let Err(e) = self.make_animatable(base, key) {
                warn!(base, error = %e, "Skipping animated decoders");
            }
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Decode one value of a known type name.
    pub fn decode(&self, type_name: &str, reader: &mut EdmReader) -> Result<Value> {
        let decoder = self.lookup(type_name)?;
        decoder(reader)
    }

    /// Read an inline type name from the stream and decode the value after it.
    pub fn decode_named(&self, reader: &mut EdmReader) -> Result<Value> {
        let type_name = reader.read_inline_string()?;
        trace!(type_name = %type_name, pos = reader.pos(), "Decoding named value");
        self.decode(&type_name, reader)
    }
}
