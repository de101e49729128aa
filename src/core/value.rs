//! Dynamic values passed through stubbed functions, and the kinds they carry.
//!
//! Call sites, matchers and the call ledger all speak [`Value`]. A
//! [`Kind`] names the shape a signature slot expects; [`Kind::accepts`] is
//! the single place that decides whether a value fits a slot.

#![allow(missing_docs)]

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Declared kind of a parameter or return slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Str,
    List,
    Map,
    Error,
    Handle,
    /// Accepts any value, including `Nil`.
    Any,
}

impl Kind {
    pub const ALL: [Self; 19] = [
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::Isize,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::Usize,
        Self::F32,
        Self::F64,
        Self::Str,
        Self::List,
        Self::Map,
        Self::Error,
        Self::Handle,
        Self::Any,
    ];

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Kinds whose slots also accept `Nil`.
    #[must_use]
    pub const fn is_reference_like(self) -> bool {
        KindSet::REFERENCE_LIKE.contains(self)
    }

    /// Whether `value` may occupy a slot of this kind.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value.kind()) {
            (Self::Any, _) => true,
            (_, None) => self.is_reference_like(),
            (declared, Some(actual)) => declared == actual,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "str",
            Self::List => "list",
            Self::Map => "map",
            Self::Error => "error",
            Self::Handle => "handle",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compact set of [`Kind`]s, used by matchers to declare what they support.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u32);

impl KindSet {
    pub const EMPTY: Self = Self(0);
    pub const SIGNED_INTS: Self = Self::of(&[Kind::I8, Kind::I16, Kind::I32, Kind::I64, Kind::Isize]);
    pub const UNSIGNED_INTS: Self =
        Self::of(&[Kind::U8, Kind::U16, Kind::U32, Kind::U64, Kind::Usize]);
    pub const INTS: Self = Self::SIGNED_INTS.union(Self::UNSIGNED_INTS);
    pub const FLOATS: Self = Self::of(&[Kind::F32, Kind::F64]);
    pub const REFERENCE_LIKE: Self =
        Self::of(&[Kind::List, Kind::Map, Kind::Error, Kind::Handle, Kind::Any]);
    pub const ALL: Self = Self::of(&Kind::ALL);

    #[must_use]
    pub const fn of(kinds: &[Kind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        Self(bits)
    }

    #[must_use]
    pub const fn contains(self, kind: Kind) -> bool {
        self.0 & kind.bit() != 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Kind> {
        Kind::ALL.into_iter().filter(move |kind| self.contains(*kind))
    }
}

impl fmt::Debug for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Kind> for KindSet {
    fn from_iter<I: IntoIterator<Item = Kind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::EMPTY, |set, kind| Self(set.0 | kind.bit()))
    }
}

/// Opaque shared reference carried through a stub untouched.
///
/// Equality is identity: two handles are equal when they point at the same
/// allocation.
#[derive(Clone)]
pub struct Handle(Arc<dyn Any + Send + Sync>);

impl Handle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}

/// A single argument or return value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Error-like reference; `Nil` stands for "no error".
    Error(String),
    Handle(Handle),
}

impl Value {
    /// Build an error value.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Wrap any shareable object as an opaque handle.
    pub fn handle<T: Any + Send + Sync>(value: T) -> Self {
        Self::Handle(Handle::new(value))
    }

    /// Runtime kind, `None` for `Nil`.
    #[must_use]
    pub const fn kind(&self) -> Option<Kind> {
        Some(match self {
            Self::Nil => return None,
            Self::Bool(_) => Kind::Bool,
            Self::I8(_) => Kind::I8,
            Self::I16(_) => Kind::I16,
            Self::I32(_) => Kind::I32,
            Self::I64(_) => Kind::I64,
            Self::Isize(_) => Kind::Isize,
            Self::U8(_) => Kind::U8,
            Self::U16(_) => Kind::U16,
            Self::U32(_) => Kind::U32,
            Self::U64(_) => Kind::U64,
            Self::Usize(_) => Kind::Usize,
            Self::F32(_) => Kind::F32,
            Self::F64(_) => Kind::F64,
            Self::Str(_) => Kind::Str,
            Self::List(_) => Kind::List,
            Self::Map(_) => Kind::Map,
            Self::Error(_) => Kind::Error,
            Self::Handle(_) => Kind::Handle,
        })
    }

    /// Kind name for diagnostics; `nil` for `Nil`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind().map_or("nil", Kind::name)
    }

    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// A reference-like value that is present but holds nothing.
    #[must_use]
    pub fn is_empty_reference(&self) -> bool {
        match self {
            Self::List(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_handle(&self) -> Option<&Handle> {
        match self {
            Self::Handle(h) => Some(h),
            _ => None,
        }
    }

    /// JSON rendering used by the activity journal.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Nil => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::I8(n) => Json::from(*n),
            Self::I16(n) => Json::from(*n),
            Self::I32(n) => Json::from(*n),
            Self::I64(n) => Json::from(*n),
            Self::Isize(n) => Json::from(*n),
            Self::U8(n) => Json::from(*n),
            Self::U16(n) => Json::from(*n),
            Self::U32(n) => Json::from(*n),
            Self::U64(n) => Json::from(*n),
            Self::Usize(n) => Json::from(*n),
            Self::F32(n) => serde_json::Number::from_f64(f64::from(*n)).map_or(Json::Null, Json::Number),
            Self::F64(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
            Self::Str(s) => Json::String(s.clone()),
            Self::List(items) => Json::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Error(message) => serde_json::json!({ "error": message }),
            Self::Handle(_) => Json::String("<handle>".to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::I8(n) => write!(f, "{n}"),
            Self::I16(n) => write!(f, "{n}"),
            Self::I32(n) => write!(f, "{n}"),
            Self::I64(n) => write!(f, "{n}"),
            Self::Isize(n) => write!(f, "{n}"),
            Self::U8(n) => write!(f, "{n}"),
            Self::U16(n) => write!(f, "{n}"),
            Self::U32(n) => write!(f, "{n}"),
            Self::U64(n) => write!(f, "{n}"),
            Self::Usize(n) => write!(f, "{n}"),
            Self::F32(n) => write!(f, "{n}"),
            Self::F64(n) => write!(f, "{n}"),
            Self::Str(s) | Self::Error(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("map[")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                f.write_str("]")
            }
            Self::Handle(_) => f.write_str("<handle>"),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => Str,
    BTreeMap<String, Value> => Map,
    Handle => Handle,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nil, Into::into)
    }
}

/// Build a `Vec<Value>` from heterogeneous expressions.
///
/// ```
/// use mocka::{values, Value};
///
/// let out = values![42_i64, Value::Nil];
/// assert_eq!(out, vec![Value::I64(42), Value::Nil]);
/// ```
#[macro_export]
macro_rules! values {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}

/// Render values as a parenthesised kind list, e.g. `(str, nil)`.
#[must_use]
pub fn describe_kinds(values: &[Value]) -> String {
    let names: Vec<&str> = values.iter().map(Value::type_name).collect();
    format!("({})", names.join(", "))
}
