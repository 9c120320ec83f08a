//! Module defining the runtime value model.
//!
//! [`Value`] is a flat tagged union. Heavy payloads sit behind [`Shared`]
//! pointers so values clone cheaply; tables and closures additionally carry a
//! stable id from a process-wide counter, which gives closure equality and
//! table identity keys without deep comparison.
//!
//! Two different equalities coexist and must not be confused:
//!
//! * the `Eq`/`Hash` impls below are **key** equality — what a table uses to
//!   look entries up (numbers by value, strings by content, tables and
//!   closures by id);
//! * [`Value::equals`] is the **language** `==` — structural for numbers,
//!   strings, tables and errors, identity for closures.

use crate::ast::{Ast, ParamSpec};
use crate::fn_call::{FnCallArgs, NativeCallContext};
use crate::{EnvRef, Identifier, ImmutableString, Shared};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Process-wide id counter for values that need a stable identity.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[inline]
#[must_use]
pub(crate) fn new_id() -> u64 {
    NEXT_ID.fetch_add(1, AtomicOrdering::Relaxed)
}

/// The kind of non-local exit a [`Bubble`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BubbleKind {
    Return,
    Break,
    Continue,
}

/// A non-local exit sentinel. Not an error: it unwinds through sequential
/// evaluation until the nearest responsible consumer (the function body for
/// `Return`, the enclosing loop for `Break`/`Continue`).
#[derive(Debug, Clone)]
pub struct Bubble {
    pub kind: BubbleKind,
    pub value: Value,
}

/// The payload of an `Error` or `ValError` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorValue {
    pub typ: ImmutableString,
    pub value: ImmutableString,
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error({}, {})", self.typ, self.value)
    }
}

/// A script-defined function value.
#[derive(Debug, Clone)]
pub struct Closure {
    pub params: Vec<ParamSpec>,
    /// Default values, evaluated eagerly at definition time.
    pub defaults: Vec<(Identifier, Value)>,
    pub body: Shared<Vec<Ast>>,
    /// The captured environment: the live defining chain for plain closures,
    /// a snapshot for `@`-dynamic ones.
    pub env: EnvRef,
    pub is_dynamic: bool,
    pub id: u64,
}

/// The signature of a native (host-provided) function.
pub type NativeFn = dyn Fn(NativeCallContext<'_>, &mut FnCallArgs) -> Value;

/// A native function value.
#[derive(Clone)]
pub struct NativeFunction {
    func: Shared<NativeFn>,
    id: u64,
}

impl NativeFunction {
    #[must_use]
    pub fn new(f: impl Fn(NativeCallContext<'_>, &mut FnCallArgs) -> Value + 'static) -> Self {
        Self {
            func: Shared::new(f),
            id: new_id(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn call(&self, ctx: NativeCallContext<'_>, args: &mut FnCallArgs) -> Value {
        (self.func)(ctx, args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction(#{})", self.id)
    }
}

/// A shared, mutable table.
pub type TableRef = Shared<RefCell<Table>>;

/// The ordered associative container behind every `[...]` value. A table is
/// both a sequence and a map: `append` inserts at the next integer key and
/// bumps `size`, while arbitrary keys live in the same insertion-ordered map.
#[derive(Debug, Clone, Default)]
pub struct Table {
    map: IndexMap<Value, Value, ahash::RandomState>,
    size: i64,
    pub(crate) id: u64,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: IndexMap::default(),
            size: 0,
            id: new_id(),
        }
    }

    /// Wrap a fresh table into a [`Value`].
    #[must_use]
    pub fn new_value() -> Value {
        Value::Table(Shared::new(RefCell::new(Self::new())))
    }

    /// Insert at key `Number(size)`, then increment `size`.
    pub fn append(&mut self, value: Value) {
        self.map.insert(Value::Number(self.size as f64), value);
        self.size += 1;
    }

    /// Direct payload lookup; no metatable consultation.
    #[must_use]
    pub fn raw_get(&self, key: &Value) -> Option<Value> {
        self.map.get(key).cloned()
    }

    /// Overwrite an *existing* key. Returns `false` when the key is absent.
    pub fn set(&mut self, key: &Value, value: Value) -> bool {
        match self.map.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Create or overwrite a key.
    pub fn define(&mut self, key: Value, value: Value) {
        if let Value::Number(n) = key {
            if n.fract() == 0.0 && n as i64 >= self.size {
                self.size = n as i64 + 1;
            }
        }
        self.map.insert(key, value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The sequence cursor: one past the last appended integer key.
    #[must_use]
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.map.iter()
    }

    /// Values stored at `Number` keys, in insertion order.
    #[must_use]
    pub fn list_part(&self) -> Vec<Value> {
        self.map
            .iter()
            .filter(|(k, _)| matches!(k, Value::Number(_)))
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Entries stored at non-`Number` keys, in insertion order.
    #[must_use]
    pub fn map_part(&self) -> Vec<(Value, Value)> {
        self.map
            .iter()
            .filter(|(k, _)| !matches!(k, Value::Number(_)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Build a table from a list of values.
    #[must_use]
    pub fn from_list(values: impl IntoIterator<Item = Value>) -> Value {
        let mut table = Self::new();
        for value in values {
            table.append(value);
        }
        Value::Table(Shared::new(RefCell::new(table)))
    }
}

/// A Teeny runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    /// The falsy singleton.
    Nil,
    /// A 64-bit float; prints without a decimal point when integral.
    Number(f64),
    /// Text; hashed by content when used as a key.
    Str(ImmutableString),
    /// A regex literal; compiled lazily by the host regex engine.
    Regex(ImmutableString),
    /// An ordered map-and-sequence with per-instance identity.
    Table(TableRef),
    /// A script function.
    Closure(Shared<Closure>),
    /// A host function.
    Native(NativeFunction),
    /// A propagating error; short-circuits evaluation.
    Error(Shared<ErrorValue>),
    /// A caught, inert error — what `catch` handlers receive.
    ValError(Shared<ErrorValue>),
    /// The pattern wildcard and pipe placeholder.
    Underscore,
    /// A non-local exit in flight.
    Bubble(Shared<Bubble>),
}

impl Default for Value {
    #[inline(always)]
    fn default() -> Self {
        Self::Nil
    }
}

impl Value {
    /// A propagating `Error`.
    #[must_use]
    pub fn error(typ: impl Into<ImmutableString>, message: impl Into<ImmutableString>) -> Self {
        Self::Error(Shared::new(ErrorValue {
            typ: typ.into(),
            value: message.into(),
        }))
    }

    /// A runtime error, the most common `Error` type.
    #[must_use]
    pub fn runtime_error(message: impl Into<ImmutableString>) -> Self {
        Self::error("Runtime Error", message)
    }

    /// An inert `ValError`.
    #[must_use]
    pub fn val_error(typ: impl Into<ImmutableString>, message: impl Into<ImmutableString>) -> Self {
        Self::ValError(Shared::new(ErrorValue {
            typ: typ.into(),
            value: message.into(),
        }))
    }

    #[must_use]
    pub fn string(s: impl Into<ImmutableString>) -> Self {
        Self::Str(s.into())
    }

    /// Is this a propagating `Error`?
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Is this an `Error` or a `Bubble` — anything that short-circuits
    /// sequential evaluation?
    #[inline]
    #[must_use]
    pub fn interrupts(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Bubble(_))
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&ImmutableString> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&TableRef> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Can this value be called?
    #[must_use]
    pub fn is_callable(&self) -> bool {
        match self {
            Self::Closure(_) | Self::Native(_) => true,
            Self::Table(t) => t
                .borrow()
                .raw_get(&Value::string("_call_"))
                .is_some_and(|f| f.is_callable()),
            _ => false,
        }
    }

    /// The name `type(v)` reports.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Regex(_) => "regex",
            Self::Table(_) => "table",
            Self::Closure(_) | Self::Native(_) => "closure",
            Self::Error(_) | Self::ValError(_) => "error",
            Self::Underscore => "underscore",
            Self::Bubble(_) => "bubble",
        }
    }

    /// The truthiness table: `nil`, `0`, empty strings and empty tables are
    /// falsy; closures are always truthy; error values are falsy.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Table(t) => !t.borrow().is_empty(),
            Self::Closure(_) | Self::Native(_) => true,
            Self::Nil
            | Self::Regex(_)
            | Self::Error(_)
            | Self::ValError(_)
            | Self::Underscore
            | Self::Bubble(_) => false,
        }
    }

    /// The language `==`: structural for numbers, strings, tables and
    /// errors; identity for closures.
    #[must_use]
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) | (Self::Underscore, Self::Underscore) => true,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a == b,
            (Self::Error(a), Self::Error(b)) | (Self::ValError(a), Self::ValError(b)) => a == b,
            (Self::Closure(a), Self::Closure(b)) => a.id == b.id,
            (Self::Native(a), Self::Native(b)) => a.id == b.id,
            (Self::Table(a), Self::Table(b)) => {
                if Shared::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.raw_get(k).is_some_and(|w| v.equals(&w)))
            }
            _ => false,
        }
    }

    /// Convert to a number, the way `number(v)` does.
    #[must_use]
    pub fn to_number(&self) -> Value {
        match self {
            Self::Number(_) => self.clone(),
            Self::Str(s) => match s.trim().parse::<f64>() {
                Ok(n) => Value::Number(n),
                Err(_) => Value::runtime_error("convert non-Number to Number"),
            },
            _ => Value::runtime_error("convert non-Number to Number"),
        }
    }

    /// Structural copy: tables are rebuilt recursively, everything else is a
    /// cheap clone of the shared payload.
    #[must_use]
    pub fn deep_copy(&self) -> Value {
        match self {
            Self::Table(t) => {
                let mut copy = Table::new();
                for (k, v) in t.borrow().iter() {
                    copy.define(k.deep_copy(), v.deep_copy());
                }
                copy.size = t.borrow().size();
                Value::Table(Shared::new(RefCell::new(copy)))
            }
            _ => self.clone(),
        }
    }

    /// Member access: the direct payload first, then the per-type method
    /// table, then `Nil`. This is the single funnel behind both `x.name` and
    /// `x[key]`.
    #[must_use]
    pub fn get_member(&self, key: &Value) -> Value {
        match self {
            Self::Table(table) => {
                if let Some(found) = table.borrow().raw_get(key) {
                    return found;
                }
                if let Value::Str(name) = key {
                    if let Some(method) = crate::packages::table_basic::method(self, name.as_str())
                    {
                        return method;
                    }
                }
                Value::Nil
            }
            Self::Str(s) => match key {
                Value::Number(n) => {
                    let index = *n as i64;
                    let index = if index < 0 {
                        (s.chars().count() as i64 + index) as usize
                    } else {
                        index as usize
                    };
                    match s.chars().nth(index) {
                        Some(c) => Value::Str(c.into()),
                        None => Value::Nil,
                    }
                }
                Value::Str(name) => crate::packages::string_more::method(s, name.as_str())
                    .unwrap_or(Value::Nil),
                _ => Value::Nil,
            },
            Self::Number(n) => match key {
                Value::Str(name) => crate::packages::math_basic::number_method(*n, name.as_str())
                    .unwrap_or(Value::Nil),
                _ => Value::Nil,
            },
            Self::Error(e) | Self::ValError(e) => match key {
                Value::Str(name) if name.as_str() == "type" => Value::Str(e.typ.clone()),
                Value::Str(name) if name.as_str() == "value" => Value::Str(e.value.clone()),
                _ => Value::Nil,
            },
            _ => Value::Nil,
        }
    }

    /// A total order used by `sort`: numbers by value, then strings
    /// lexicographically, then everything else grouped by tag and ordered by
    /// stable id.
    #[must_use]
    pub fn cmp_natural(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Number(_) => 0,
                Value::Str(_) => 1,
                _ => 2,
            }
        }
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Str(a), Self::Str(b)) => a.as_str().cmp(b.as_str()),
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }
}

/// Normalize a float's bits so `-0.0` and every NaN hash consistently.
#[inline]
fn number_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0_f64.to_bits()
    } else if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    }
}

/// **Key** equality: what tables use to look entries up. Numbers compare by
/// value, strings by content, tables/closures by stable id.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) | (Self::Underscore, Self::Underscore) => true,
            (Self::Number(a), Self::Number(b)) => number_bits(*a) == number_bits(*b),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a == b,
            (Self::Table(a), Self::Table(b)) => a.borrow().id == b.borrow().id,
            (Self::Closure(a), Self::Closure(b)) => a.id == b.id,
            (Self::Native(a), Self::Native(b)) => a.id == b.id,
            (Self::Error(a), Self::Error(b)) | (Self::ValError(a), Self::ValError(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Nil | Self::Underscore => (),
            Self::Number(n) => number_bits(*n).hash(state),
            Self::Str(s) | Self::Regex(s) => s.hash(state),
            Self::Table(t) => t.borrow().id.hash(state),
            Self::Closure(c) => c.id.hash(state),
            Self::Native(f) => f.id.hash(state),
            Self::Error(e) | Self::ValError(e) => e.hash(state),
            Self::Bubble(b) => b.value.hash(state),
        }
    }
}

/// Canonical printed form: integral numbers print without a decimal point,
/// tables print their array part first and then `key: value` pairs, in
/// insertion order.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Self::Str(s) => f.write_str(s),
            Self::Regex(pattern) => write!(f, "`{}`", pattern),
            Self::Table(t) => {
                let table = t.borrow();
                f.write_str("[")?;
                let mut first = true;
                for value in table.list_part() {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    write!(f, "{}", value)?;
                }
                for (key, value) in table.map_part() {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("]")
            }
            Self::Closure(_) | Self::Native(_) => f.write_str("Closure"),
            Self::Error(e) | Self::ValError(e) => write!(f, "{}", e),
            Self::Underscore => f.write_str("_"),
            Self::Bubble(b) => write!(f, "{}", b.value),
        }
    }
}

impl Value {
    /// Bridge into `serde_json` for `json.encode` and friends.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Nil | Self::Underscore | Self::Bubble(_) => serde_json::Value::Null,
            Self::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map_or(serde_json::Value::Null, serde_json::Value::Number)
                }
            }
            Self::Str(s) | Self::Regex(s) => serde_json::Value::from(s.as_str()),
            Self::Closure(_) | Self::Native(_) => serde_json::Value::from("Closure"),
            Self::Error(e) | Self::ValError(e) => serde_json::Value::from(e.to_string()),
            Self::Table(t) => {
                let table = t.borrow();
                let all_integer = table.iter().all(|(k, _)| matches!(k, Value::Number(_)));
                if all_integer {
                    serde_json::Value::Array(table.iter().map(|(_, v)| v.to_json()).collect())
                } else {
                    let mut object = serde_json::Map::new();
                    for (key, value) in table.iter() {
                        object.insert(key.to_string(), value.to_json());
                    }
                    serde_json::Value::Object(object)
                }
            }
        }
    }

    /// Bridge out of `serde_json`: `null` → nil, booleans → `0`/`1`, arrays
    /// and objects → tables.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Number(if *b { 1.0 } else { 0.0 }),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::string(s.as_str()),
            serde_json::Value::Array(items) => {
                Table::from_list(items.iter().map(Value::from_json))
            }
            serde_json::Value::Object(entries) => {
                let mut table = Table::new();
                for (key, value) in entries {
                    table.define(Value::string(key.as_str()), Value::from_json(value));
                }
                Value::Table(Shared::new(RefCell::new(table)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Number(2e20).to_string(), "200000000000000000000");
    }

    #[test]
    fn test_table_append_and_display() {
        let mut t = Table::new();
        t.append(Value::Number(1.0));
        t.append(Value::Number(2.0));
        t.define(Value::string("a"), Value::Number(3.0));
        let t = Value::Table(Shared::new(RefCell::new(t)));
        assert_eq!(t.to_string(), "[1, 2, a: 3]");
    }

    #[test]
    fn test_structural_vs_key_equality() {
        let a = Table::from_list([Value::Number(1.0), Value::Number(2.0)]);
        let b = Table::from_list([Value::Number(1.0), Value::Number(2.0)]);
        // Structurally equal but distinct identities.
        assert!(a.equals(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.truthy());
        assert!(!Value::Number(0.0).truthy());
        assert!(!Value::string("").truthy());
        assert!(!Table::from_list([]).truthy());
        assert!(Value::Number(0.5).truthy());
        assert!(Value::string("x").truthy());
        assert!(!Value::val_error("E", "m").truthy());
    }

    #[test]
    fn test_json_round_trip() {
        let mut t = Table::new();
        t.define(Value::string("x"), Value::Number(5.0));
        t.define(
            Value::string("y"),
            Table::from_list([Value::Number(1.0), Value::Number(2.0)]),
        );
        let value = Value::Table(Shared::new(RefCell::new(t)));

        let round = Value::from_json(&value.to_json());
        assert!(value.equals(&round));
    }
}
