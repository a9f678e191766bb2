//! Runtime values.

use std::fmt;
use std::rc::Rc;

use sable_ir::ProcId;

use crate::instance::ObjectRef;
use crate::list::ListRef;

/// A runtime datum.
///
/// Immutable once constructed: mutating an object or list goes through the
/// referenced cell, never by replacing the `Value`. Equality is tag plus
/// payload, except object and list references which compare by identity.
#[derive(Clone)]
pub enum Value {
    Null,
    Number(f64),
    Text(Rc<str>),
    Object(ObjectRef),
    Proc(ProcId),
    List(ListRef),
}

impl Value {
    /// Create a number value.
    #[inline]
    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    /// Create a text value.
    #[inline]
    pub fn text(s: impl Into<Rc<str>>) -> Self {
        Value::Text(s.into())
    }

    /// Create an object reference value.
    #[inline]
    pub fn object(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }

    /// Create a list reference value.
    #[inline]
    pub fn list(list: ListRef) -> Self {
        Value::List(list)
    }

    /// True unless the value is null, zero, or the empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Number(n) => *n != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Object(_) | Value::Proc(_) | Value::List(_) => true,
        }
    }

    /// The payload as a number, if the tag is `Number`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The payload as text, if the tag is `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The payload as an object reference, if the tag is `Object`.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The payload as a list reference, if the tag is `List`.
    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Short tag name, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Object(_) => "object",
            Value::Proc(_) => "proc",
            Value::List(_) => "list",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Proc(a), Value::Proc(b)) => a == b,
            // Reference kinds compare by identity, never structurally
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            // Whole numbers print without a trailing ".0"
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() => {
                write!(f, "{}", *n as i64)
            }
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Object(obj) => write!(f, "{}", obj.path()),
            Value::Proc(id) => write!(f, "proc#{}", id.raw()),
            Value::List(_) => write!(f, "/list"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Text(s) => write!(f, "Text({s:?})"),
            Value::Object(obj) => write!(f, "Object({})", obj.path()),
            Value::Proc(id) => write!(f, "Proc({})", id.raw()),
            Value::List(list) => write!(f, "List(len={})", list.borrow().len()),
        }
    }
}

#[cfg(test)]
mod tests;
