//! Type registry: value kinds a parameter accepts and how values convert between them.
//!
//! A `Type` is a handle compared by identity, never structurally: two types of the
//! same kind registered under different names are different types. The registry is
//! process-wide and pre-populated with one type per kind.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use hashbrown::HashMap;
use kairos_api_core::{coercion, Value, ValueKind};
use log::debug;
use once_cell::sync::Lazy;

use crate::error::{AnimationError, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Boolean,
    Number,
    String,
    Vector2,
    Vector3,
    Vector4,
    Matrix,
}

impl TypeKind {
    const ALL: [TypeKind; 7] = [
        TypeKind::Boolean,
        TypeKind::Number,
        TypeKind::String,
        TypeKind::Vector2,
        TypeKind::Vector3,
        TypeKind::Vector4,
        TypeKind::Matrix,
    ];

    /// Shape of the values carried by this kind.
    pub fn value_kind(self) -> ValueKind {
        match self {
            TypeKind::Boolean => ValueKind::Bool,
            TypeKind::Number => ValueKind::Number,
            TypeKind::String => ValueKind::Text,
            TypeKind::Vector2 => ValueKind::Vec2,
            TypeKind::Vector3 => ValueKind::Vec3,
            TypeKind::Vector4 => ValueKind::Vec4,
            TypeKind::Matrix => ValueKind::Mat4,
        }
    }

    /// Name under which the built-in type of this kind is registered.
    pub fn builtin_name(self) -> &'static str {
        match self {
            TypeKind::Boolean => "boolean",
            TypeKind::Number => "number",
            TypeKind::String => "string",
            TypeKind::Vector2 => "vector2",
            TypeKind::Vector3 => "vector3",
            TypeKind::Vector4 => "vector4",
            TypeKind::Matrix => "matrix",
        }
    }

    /// Component count of the vector kinds.
    pub fn vector_dimension(self) -> Option<usize> {
        match self {
            TypeKind::Vector2 => Some(2),
            TypeKind::Vector3 => Some(3),
            TypeKind::Vector4 => Some(4),
            _ => None,
        }
    }
}

struct TypeInner {
    name: String,
    kind: TypeKind,
}

#[derive(Clone)]
pub struct Type(Arc<TypeInner>);

static BUILTINS: Lazy<Vec<Type>> = Lazy::new(|| {
    TypeKind::ALL
        .iter()
        .map(|kind| Type::new(kind.builtin_name(), *kind))
        .collect()
});

static REGISTRY: Lazy<RwLock<HashMap<String, Type>>> = Lazy::new(|| {
    let map = BUILTINS
        .iter()
        .map(|ty| (ty.name().to_string(), ty.clone()))
        .collect();
    RwLock::new(map)
});

impl Type {
    fn new(name: &str, kind: TypeKind) -> Self {
        Self(Arc::new(TypeInner {
            name: name.to_string(),
            kind,
        }))
    }

    fn builtin(kind: TypeKind) -> Type {
        // BUILTINS follows TypeKind::ALL order
        let idx = TypeKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        BUILTINS[idx].clone()
    }

    pub fn boolean() -> Type {
        Self::builtin(TypeKind::Boolean)
    }

    pub fn number() -> Type {
        Self::builtin(TypeKind::Number)
    }

    pub fn string() -> Type {
        Self::builtin(TypeKind::String)
    }

    pub fn vector2() -> Type {
        Self::builtin(TypeKind::Vector2)
    }

    pub fn vector3() -> Type {
        Self::builtin(TypeKind::Vector3)
    }

    pub fn vector4() -> Type {
        Self::builtin(TypeKind::Vector4)
    }

    pub fn matrix() -> Type {
        Self::builtin(TypeKind::Matrix)
    }

    /// Create a new type of `kind` and register it under `name`.
    pub fn register(name: &str, kind: TypeKind) -> Result<Type> {
        let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
        if registry.contains_key(name) {
            return Err(AnimationError::DuplicateType {
                name: name.to_string(),
            });
        }
        let ty = Type::new(name, kind);
        registry.insert(name.to_string(), ty.clone());
        debug!("registered type {name} ({kind:?})");
        Ok(ty)
    }

    /// Look up a registered type by name.
    pub fn find(name: &str) -> Result<Type> {
        let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
        registry
            .get(name)
            .cloned()
            .ok_or_else(|| AnimationError::UnknownType {
                name: name.to_string(),
            })
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> TypeKind {
        self.0.kind
    }

    /// Values of `from` can be turned into values of `self`.
    /// Boolean and number convert into each other; every other type only
    /// accepts itself.
    pub fn is_convertible(&self, from: &Type) -> bool {
        match (self.kind(), from.kind()) {
            (TypeKind::Boolean, TypeKind::Boolean | TypeKind::Number) => true,
            (TypeKind::Number, TypeKind::Number | TypeKind::Boolean) => true,
            _ => self == from,
        }
    }

    /// Convert `value` (of type `from`) into a value of `self`.
    /// Callers check `is_convertible` first; anything else passes through unchanged.
    pub fn convert_value(&self, from: &Type, value: &Value) -> Value {
        match (self.kind(), from.kind()) {
            (TypeKind::Boolean, TypeKind::Number) => {
                Value::Bool(coercion::to_bool(value).unwrap_or(false))
            }
            (TypeKind::Number, TypeKind::Boolean) => {
                Value::Number(coercion::to_number(value).unwrap_or(0.0))
            }
            _ => value.clone(),
        }
    }

    pub fn default_value(&self) -> Value {
        Value::zero(self.kind().value_kind())
    }

    pub fn clone_value(&self, value: &Value) -> Value {
        value.clone()
    }

    /// `value` has the shape this type carries.
    pub fn accepts(&self, value: &Value) -> bool {
        value.kind() == self.kind().value_kind()
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Type").field(&self.0.name).finish()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}
