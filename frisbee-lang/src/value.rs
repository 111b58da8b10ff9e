//! Runtime values.
//!
//! Primitives are immutable; arrays and passive instances are shared,
//! in-place mutable cells. An active instance exists only inside its hosting
//! process and is seen everywhere else as a [`Proxy`] carrying the pair that
//! is authoritative for routing: `(actor_id, home_env)`.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::error::RuntimeError;
use crate::ids::ActorId;

/// Shared, in-place mutable array cell.
pub type ArrayRef = Arc<Mutex<Vec<Value>>>;

/// Shared, in-place mutable passive instance.
pub type PassiveRef = Arc<Mutex<PassiveInstance>>;

/// Shared handle on the hosting actor's own instance.
pub type ActiveRef = Arc<ActiveInstance>;

/// A passive object: `(module, typename, field_map)`.
#[derive(Debug, Clone)]
pub struct PassiveInstance {
    pub module: String,
    pub typename: String,
    fields: HashMap<String, Value>,
}

impl PassiveInstance {
    pub fn new(module: String, typename: String, fields: HashMap<String, Value>) -> Self {
        Self {
            module,
            typename,
            fields,
        }
    }

    pub fn get_field(&self, name: &str) -> Result<Value, RuntimeError> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::NoField {
                object: format!("{}.{}", self.module, self.typename),
                field: name.to_string(),
            })
    }

    pub fn set_field(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }
}

/// An active object as it exists inside its hosting process:
/// `(module, typename, field_map, actor_id)` plus the environment name the
/// proxy form needs.
#[derive(Debug)]
pub struct ActiveInstance {
    pub module: String,
    pub typename: String,
    pub actor_id: ActorId,
    pub home_env: String,
    fields: Mutex<HashMap<String, Value>>,
}

impl ActiveInstance {
    pub fn new(
        module: String,
        typename: String,
        actor_id: ActorId,
        home_env: String,
        fields: HashMap<String, Value>,
    ) -> Self {
        Self {
            module,
            typename,
            actor_id,
            home_env,
            fields: Mutex::new(fields),
        }
    }

    pub fn get_field(&self, name: &str) -> Result<Value, RuntimeError> {
        self.fields
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::NoField {
                object: format!("{}.{}", self.module, self.typename),
                field: name.to_string(),
            })
    }

    pub fn set_field(&self, name: &str, value: Value) {
        self.fields.lock().insert(name.to_string(), value);
    }

    /// The remote handle other actors use to reach this instance.
    pub fn proxy(&self) -> Proxy {
        Proxy {
            actor_id: self.actor_id,
            home_env: self.home_env.clone(),
        }
    }
}

/// A remote handle to an active object. Freely copyable across
/// environments; never dereferenced locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proxy {
    pub actor_id: ActorId,
    pub home_env: String,
}

impl Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<actor {}@{}>", self.actor_id, self.home_env)
    }
}

/// A frisbee value.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
    Void,
    Array(ArrayRef),
    Passive(PassiveRef),
    /// The hosting actor's own instance; `this` inside an active method.
    /// Marshalling converts it to [`Value::Proxy`] before it leaves the
    /// process.
    Active(ActiveRef),
    Proxy(Proxy),
    /// The ambient output singleton.
    Io,
}

impl Value {
    /// Build a fresh array cell.
    pub fn array(items: Vec<Value>) -> Self {
        Self::Array(Arc::new(Mutex::new(items)))
    }

    /// Build a fresh passive instance cell.
    pub fn passive(instance: PassiveInstance) -> Self {
        Self::Passive(Arc::new(Mutex::new(instance)))
    }

    /// The kind name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Str(_) => "string",
            Self::Bool(_) => "bool",
            Self::Void => "void",
            Self::Array(_) => "array",
            Self::Passive(_) => "passive object",
            Self::Active(_) => "active object",
            Self::Proxy(_) => "actor reference",
            Self::Io => "io",
        }
    }

    /// Conditions and boolean operands must be booleans.
    pub fn as_bool(&self) -> Result<bool, RuntimeError> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(RuntimeError::TypeError(format!(
                "expected bool, found {}",
                other.kind()
            ))),
        }
    }

    pub fn as_int(&self) -> Result<i64, RuntimeError> {
        match self {
            Self::Int(i) => Ok(*i),
            other => Err(RuntimeError::TypeError(format!(
                "expected int, found {}",
                other.kind()
            ))),
        }
    }

    /// `+` - integer addition, string concatenation, array concatenation.
    pub fn add(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_add(*b)
                .map(Self::Int)
                .ok_or_else(|| RuntimeError::TypeError("integer overflow in `+`".to_string())),
            (Self::Str(a), Self::Str(b)) => Ok(Self::Str(format!("{a}{b}"))),
            (Self::Array(a), Self::Array(b)) => {
                let mut joined = a.lock().clone();
                if Arc::ptr_eq(a, b) {
                    let again = joined.clone();
                    joined.extend(again);
                } else {
                    joined.extend(b.lock().iter().cloned());
                }
                Ok(Self::array(joined))
            }
            (a, b) => Err(RuntimeError::kind_mismatch("+", a.kind(), b.kind())),
        }
    }

    pub fn sub(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_sub(*b)
                .map(Self::Int)
                .ok_or_else(|| RuntimeError::TypeError("integer overflow in `-`".to_string())),
            (a, b) => Err(RuntimeError::kind_mismatch("-", a.kind(), b.kind())),
        }
    }

    pub fn mul(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_mul(*b)
                .map(Self::Int)
                .ok_or_else(|| RuntimeError::TypeError("integer overflow in `*`".to_string())),
            (a, b) => Err(RuntimeError::kind_mismatch("*", a.kind(), b.kind())),
        }
    }

    /// `/` - flooring integer division; division by zero is a type-class
    /// runtime error.
    pub fn div(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Self::Int(_), Self::Int(0)) => {
                Err(RuntimeError::TypeError("integer division by zero".to_string()))
            }
            (Self::Int(a), Self::Int(b)) => {
                let (a, b) = (*a, *b);
                let quotient = a
                    .checked_div(b)
                    .ok_or_else(|| RuntimeError::TypeError("integer overflow in `/`".to_string()))?;
                let floored = if (a % b != 0) && ((a < 0) != (b < 0)) {
                    quotient - 1
                } else {
                    quotient
                };
                Ok(Self::Int(floored))
            }
            (a, b) => Err(RuntimeError::kind_mismatch("/", a.kind(), b.kind())),
        }
    }

    pub fn logical_and(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Ok(Self::Bool(*a && *b)),
            (a, b) => Err(RuntimeError::kind_mismatch("and", a.kind(), b.kind())),
        }
    }

    pub fn logical_or(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Ok(Self::Bool(*a || *b)),
            (a, b) => Err(RuntimeError::kind_mismatch("or", a.kind(), b.kind())),
        }
    }

    pub fn less(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Ok(Self::Bool(a < b)),
            (Self::Str(a), Self::Str(b)) => Ok(Self::Bool(a < b)),
            (a, b) => Err(RuntimeError::kind_mismatch("<", a.kind(), b.kind())),
        }
    }

    pub fn greater(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Ok(Self::Bool(a > b)),
            (Self::Str(a), Self::Str(b)) => Ok(Self::Bool(a > b)),
            (a, b) => Err(RuntimeError::kind_mismatch(">", a.kind(), b.kind())),
        }
    }

    /// `==` - defined for matching kinds; comparison with void of another
    /// kind yields `false` and never fails.
    pub fn equals(&self, other: &Value) -> Result<bool, RuntimeError> {
        match (self, other) {
            (Self::Void, Self::Void) => Ok(true),
            (Self::Void, _) | (_, Self::Void) => Ok(false),
            (Self::Int(a), Self::Int(b)) => Ok(a == b),
            (Self::Str(a), Self::Str(b)) => Ok(a == b),
            (Self::Bool(a), Self::Bool(b)) => Ok(a == b),
            // Arrays compare structurally against anything, never failing.
            (Self::Array(_), _) | (_, Self::Array(_)) => Ok(structural_eq(self, other)),
            (Self::Passive(_), Self::Passive(_)) => Ok(structural_eq(self, other)),
            (Self::Proxy(a), Self::Proxy(b)) => Ok(a.actor_id == b.actor_id),
            (Self::Active(a), Self::Active(b)) => Ok(a.actor_id == b.actor_id),
            (Self::Active(a), Self::Proxy(b)) | (Self::Proxy(b), Self::Active(a)) => {
                Ok(a.actor_id == b.actor_id)
            }
            (Self::Io, Self::Io) => Ok(true),
            (a, b) => Err(RuntimeError::kind_mismatch("==", a.kind(), b.kind())),
        }
    }

    /// `!=` - negation of [`Value::equals`] wherever that is defined.
    pub fn not_equals(&self, other: &Value) -> Result<bool, RuntimeError> {
        Ok(!self.equals(other)?)
    }

    /// `!` - boolean negation.
    pub fn negate(&self) -> Result<Value, RuntimeError> {
        Ok(Self::Bool(!self.as_bool()?))
    }

    /// Bounds-checked array read.
    pub fn index(&self, index: i64) -> Result<Value, RuntimeError> {
        match self {
            Self::Array(items) => {
                let items = items.lock();
                usize::try_from(index)
                    .ok()
                    .and_then(|i| items.get(i))
                    .cloned()
                    .ok_or(RuntimeError::IndexOutOfBounds {
                        index,
                        len: items.len(),
                    })
            }
            other => Err(RuntimeError::TypeError(format!(
                "cannot index {}",
                other.kind()
            ))),
        }
    }

    /// Bounds-checked array store.
    pub fn store_index(&self, index: i64, value: Value) -> Result<(), RuntimeError> {
        match self {
            Self::Array(items) => {
                let mut items = items.lock();
                let len = items.len();
                let slot = usize::try_from(index)
                    .ok()
                    .and_then(|i| items.get_mut(i))
                    .ok_or(RuntimeError::IndexOutOfBounds { index, len })?;
                *slot = value;
                Ok(())
            }
            other => Err(RuntimeError::TypeError(format!(
                "cannot index {}",
                other.kind()
            ))),
        }
    }

    /// Array length; the one intrinsic method arrays carry.
    pub fn array_length(&self) -> Result<Value, RuntimeError> {
        match self {
            Self::Array(items) => Ok(Self::Int(items.lock().len() as i64)),
            other => Err(RuntimeError::TypeError(format!(
                "`length` not defined for {}",
                other.kind()
            ))),
        }
    }

    /// Marshal for a message: the hosting instance travels as its proxy.
    pub fn into_sendable(self) -> Value {
        match self {
            Self::Active(instance) => Self::Proxy(instance.proxy()),
            other => other,
        }
    }
}

/// Structural comparison that never fails: mismatched kinds are unequal.
/// Shared cells short-circuit on pointer identity, which also keeps
/// self-referential arrays from recursing forever.
fn structural_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Void, Value::Void) => true,
        (Value::Array(x), Value::Array(y)) => {
            if Arc::ptr_eq(x, y) {
                return true;
            }
            let x = x.lock();
            let y = y.lock();
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| structural_eq(a, b))
        }
        (Value::Passive(x), Value::Passive(y)) => {
            if Arc::ptr_eq(x, y) {
                return true;
            }
            let x = x.lock();
            let y = y.lock();
            x.module == y.module
                && x.typename == y.typename
                && x.fields().len() == y.fields().len()
                && x.fields().iter().all(|(name, value)| {
                    y.fields()
                        .get(name)
                        .is_some_and(|other| structural_eq(value, other))
                })
        }
        (Value::Proxy(x), Value::Proxy(y)) => x.actor_id == y.actor_id,
        (Value::Active(x), Value::Active(y)) => x.actor_id == y.actor_id,
        (Value::Io, Value::Io) => true,
        _ => false,
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Void => write!(f, "void"),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.lock().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    fmt_nested(item, f)?;
                }
                write!(f, "]")
            }
            Self::Passive(instance) => {
                let instance = instance.lock();
                write!(f, "{}.{} {{", instance.module, instance.typename)?;
                let mut names: Vec<&String> = instance.fields().keys().collect();
                names.sort();
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: ")?;
                    if let Ok(value) = instance.get_field(name) {
                        fmt_nested(&value, f)?;
                    }
                }
                write!(f, "}}")
            }
            Self::Active(instance) => write!(f, "{}", instance.proxy()),
            Self::Proxy(proxy) => write!(f, "{proxy}"),
            Self::Io => write!(f, "io"),
        }
    }
}

/// Inside containers, strings are quoted so `[1, "a"]` stays readable.
fn fmt_nested(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::Str(s) => write!(f, "\"{s}\""),
        other => write!(f, "{other}"),
    }
}
