//! Decoded EDM values and the encode side of the symmetry contract.
//!
//! Every shape a decoder can produce is a [`Value`] variant. Each variant
//! knows its registered type name and encodes exactly the bytes its decoder
//! consumes.

use std::borrow::Cow;

use super::format::{self, *};
use super::writer::EdmWriter;
use crate::util::{DMat4, DQuat, DVec3, Error, Mat4, Result, Vec2, Vec3};

/// A value that is written with its registered type name in front.
pub trait NamedType {
    /// Type name the registry knows this value's decoder by.
    fn type_name(&self) -> Cow<'_, str>;
}

/// A value that can write its own payload.
pub trait Encode: NamedType {
    /// Write the payload (without type name) to the active writer phase.
    fn encode(&self, w: &mut EdmWriter) -> Result<()>;

    /// Check that the payload matches the type name before anything is
    /// written.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Tagged union of every decodable shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `unsigned int`
    UInt(u32),
    /// `float`
    Float(f32),
    /// `osg::Vec2f`
    Vec2f(Vec2),
    /// `osg::Vec3f`
    Vec3f(Vec3),
    /// `osg::Vec3d`
    Vec3d(DVec3),
    /// `osg::Matrixf`
    Matrixf(Mat4),
    /// `osg::Matrixd`
    Matrixd(DMat4),
    /// `osg::Quat`, in-memory `(w, x, y, z)` via [`quat_to_wxyz`](crate::util::quat_to_wxyz)
    Quat(DQuat),
    /// `model::Property<T>`
    Property(Box<Property>),
    /// `model::Key<K>`
    Keyframe(Box<Keyframe>),
    /// `model::AnimatedProperty<T>`
    AnimatedProperty(AnimatedProperty),
}

impl Value {
    /// Short variant name, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::UInt(_) => "UInt",
            Value::Float(_) => "Float",
            Value::Vec2f(_) => "Vec2f",
            Value::Vec3f(_) => "Vec3f",
            Value::Vec3d(_) => "Vec3d",
            Value::Matrixf(_) => "Matrixf",
            Value::Matrixd(_) => "Matrixd",
            Value::Quat(_) => "Quat",
            Value::Property(_) => "Property",
            Value::Keyframe(_) => "Keyframe",
            Value::AnimatedProperty(_) => "AnimatedProperty",
        }
    }

    pub fn as_uint(&self) -> Option<u32> {
        match self {
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_quat(&self) -> Option<DQuat> {
        match self {
            Value::Quat(q) => Some(*q),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&Property> {
        match self {
            Value::Property(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_keyframe(&self) -> Option<&Keyframe> {
        match self {
            Value::Keyframe(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_animated_property(&self) -> Option<&AnimatedProperty> {
        match self {
            Value::AnimatedProperty(a) => Some(a),
            _ => None,
        }
    }
}

impl NamedType for Value {
    fn type_name(&self) -> Cow<'_, str> {
        match self {
            Value::UInt(_) => Cow::Borrowed(TYPE_UINT),
            Value::Float(_) => Cow::Borrowed(TYPE_FLOAT),
            Value::Vec2f(_) => Cow::Borrowed(TYPE_VEC2F),
            Value::Vec3f(_) => Cow::Borrowed(TYPE_VEC3F),
            Value::Vec3d(_) => Cow::Borrowed(TYPE_VEC3D),
            Value::Matrixf(_) => Cow::Borrowed(TYPE_MATRIXF),
            Value::Matrixd(_) => Cow::Borrowed(TYPE_MATRIXD),
            Value::Quat(_) => Cow::Borrowed(TYPE_QUAT),
            Value::Property(p) => p.type_name(),
            Value::Keyframe(k) => k.type_name(),
            Value::AnimatedProperty(a) => a.type_name(),
        }
    }
}

impl Encode for Value {
    fn encode(&self, w: &mut EdmWriter) -> Result<()> {
        match self {
            Value::UInt(v) => w.write_u32(*v),
            Value::Float(v) => w.write_f32(*v),
            Value::Vec2f(v) => w.write_vec2f(*v),
            Value::Vec3f(v) => w.write_vec3f(*v),
            Value::Vec3d(v) => w.write_vec3d(*v),
            Value::Matrixf(m) => w.write_matrixf(m),
            Value::Matrixd(m) => w.write_matrixd(m),
            Value::Quat(q) => w.write_quaternion(*q),
            Value::Property(p) => p.encode(w),
            Value::Keyframe(k) => k.encode(w),
            Value::AnimatedProperty(a) => a.encode(w),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Value::Property(p) => p.validate(),
            Value::Keyframe(k) => k.validate(),
            Value::AnimatedProperty(a) => a.validate(),
            _ => Ok(()),
        }
    }
}

/// A named wrapper around one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: Value,
}

impl Property {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self { name: name.into(), value }
    }
}

impl NamedType for Property {
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Owned(property_type_name(&self.value.type_name()))
    }
}

impl Encode for Property {
    fn encode(&self, w: &mut EdmWriter) -> Result<()> {
        w.write_str(&self.name)?;
        self.value.encode(w)
    }

    fn validate(&self) -> Result<()> {
        self.value.validate()
    }
}

/// One (frame, value) sample of an animated property.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub frame: f64,
    pub value: Value,
}

impl Keyframe {
    pub fn new(frame: f64, value: Value) -> Self {
        Self { frame, value }
    }
}

impl NamedType for Keyframe {
    fn type_name(&self) -> Cow<'_, str> {
        let base = self.value.type_name();
        let key = format::key_name_for(&base).map(Cow::Borrowed).unwrap_or(base);
        Cow::Owned(keyframe_type_name(&key))
    }
}

impl Encode for Keyframe {
    fn encode(&self, w: &mut EdmWriter) -> Result<()> {
        w.write_f64(self.frame)?;
        self.value.encode(w)
    }

    fn validate(&self) -> Result<()> {
        self.value.validate()
    }
}

/// A named value over time plus an auxiliary argument.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedProperty {
    pub name: String,
    pub argument: u32,
    /// Base type name of the key values (e.g. `float`).
    pub value_type: String,
    pub keys: Vec<Keyframe>,
}

impl AnimatedProperty {
    pub fn new(
        name: impl Into<String>,
        argument: u32,
        value_type: impl Into<String>,
        keys: Vec<Keyframe>,
    ) -> Self {
        Self {
            name: name.into(),
            argument,
            value_type: value_type.into(),
            keys,
        }
    }
}

impl NamedType for AnimatedProperty {
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Owned(animated_property_type_name(&self.value_type))
    }
}

impl Encode for AnimatedProperty {
    fn encode(&self, w: &mut EdmWriter) -> Result<()> {
        self.validate()?;
        w.write_str(&self.name)?;
        w.write_u32(self.argument)?;
        w.write_list(&self.keys, |w, key| key.encode(w))
    }

    /// Every key value must have `value_type`, since the decoder reads all
    /// keys with that type's decoder.
    fn validate(&self) -> Result<()> {
        for key in &self.keys {
            let actual = key.value.type_name();
            if actual != self.value_type.as_str() {
                return Err(Error::TypeMismatch {
                    expected: self.value_type.clone(),
                    actual: actual.into_owned(),
                });
            }
            key.validate()?;
        }
        Ok(())
    }
}
