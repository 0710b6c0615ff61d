//! Prop Values
//!
//! [`Value`] is the stringifiable payload of attributes, members and text.
//! [`Dynamic`] tags whether a value is fixed or comes from a live [`Accessor`],
//! so renderers never have to guess whether a callable is the value itself or
//! a way to read it.

use std::fmt;
use std::rc::Rc;

/// A plain, stringifiable prop value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text form of the value, `None` for [`Value::Null`].
    pub fn stringify(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Text form used for attributes.
    ///
    /// `true` becomes the empty string (a present, valueless attribute) and
    /// `false`/`Null` become `None`, which detaches the attribute.
    pub fn to_attr_string(&self) -> Option<String> {
        match self {
            Value::Bool(true) => Some(String::new()),
            Value::Bool(false) | Value::Null => None,
            other => other.stringify(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A zero-argument reader of a live value.
///
/// Accessors are compared by identity: two accessors are equal only if they
/// are clones of the same closure.
pub struct Accessor<T>(Rc<dyn Fn() -> T>);

impl<T> Accessor<T> {
    pub fn new<F>(read: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        Self(Rc::new(read))
    }

    /// Read the current value.
    pub fn get(&self) -> T {
        (self.0)()
    }
}

impl<T: 'static> Accessor<T> {
    /// Derive an accessor that converts every read.
    pub fn map<U, F>(&self, f: F) -> Accessor<U>
    where
        F: Fn(T) -> U + 'static,
    {
        let source = self.clone();
        Accessor::new(move || f(source.get()))
    }
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> PartialEq for Accessor<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Accessor").field(&Rc::as_ptr(&self.0)).finish()
    }
}

/// Either a fixed value or a live accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic<T> {
    Static(T),
    Reactive(Accessor<T>),
}

impl<T: Clone> Dynamic<T> {
    /// The current value. Reading a reactive value calls its accessor.
    pub fn get(&self) -> T {
        match self {
            Dynamic::Static(value) => value.clone(),
            Dynamic::Reactive(accessor) => accessor.get(),
        }
    }

    pub fn is_reactive(&self) -> bool {
        matches!(self, Dynamic::Reactive(_))
    }
}

impl<T: 'static> Dynamic<T> {
    pub fn map<U, F>(self, f: F) -> Dynamic<U>
    where
        F: Fn(T) -> U + 'static,
    {
        match self {
            Dynamic::Static(value) => Dynamic::Static(f(value)),
            Dynamic::Reactive(accessor) => Dynamic::Reactive(accessor.map(f)),
        }
    }
}

impl<T> From<Accessor<T>> for Dynamic<T> {
    fn from(accessor: Accessor<T>) -> Self {
        Dynamic::Reactive(accessor)
    }
}

macro_rules! static_dynamic_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Dynamic<Value> {
            fn from(value: $ty) -> Self {
                Dynamic::Static(value.into())
            }
        })*
    };
}

static_dynamic_value!(Value, &str, String, bool, i32, i64, u32, f64);

impl From<&str> for Dynamic<String> {
    fn from(value: &str) -> Self {
        Dynamic::Static(value.to_owned())
    }
}

impl From<String> for Dynamic<String> {
    fn from(value: String) -> Self {
        Dynamic::Static(value)
    }
}
