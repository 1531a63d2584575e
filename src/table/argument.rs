//! Argument shapes accepted by the table and their normalization.
//!
//! Loggers and levels may each be given as nothing, a single item, or a
//! collection. [`Arg`] carries that choice with static types; [`Value`] carries
//! it for input whose types are only known at runtime (config text and the
//! like). Both normalize to a plain `Vec` before the table is touched.

use std::{fmt, sync::Arc};

use crate::{
    log::{log_level::LogLevel, log_sink::LogSink},
    table::{table_error::TableError, threshold::ThresholdLevel},
};

/// Shared, caller-owned reference to a sink.
pub type SinkRef = Arc<dyn LogSink>;

/// Nothing, one item, or many items of the same type.
#[derive(Clone, Debug, Default)]
pub enum Arg<T> {
    #[default]
    Absent,
    One(T),
    Many(Vec<T>),
}

impl<T> Arg<T> {
    /// Materializes the argument as a sequence.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Arg::Absent => Vec::new(),
            Arg::One(item) => vec![item],
            Arg::Many(items) => items,
        }
    }
}

impl<T> From<Vec<T>> for Arg<T> {
    fn from(items: Vec<T>) -> Self {
        Arg::Many(items)
    }
}

impl<T, const N: usize> From<[T; N]> for Arg<T> {
    fn from(items: [T; N]) -> Self {
        Arg::Many(items.into())
    }
}

impl<T> From<Option<T>> for Arg<T> {
    fn from(item: Option<T>) -> Self {
        item.map_or(Arg::Absent, Arg::One)
    }
}

impl From<SinkRef> for Arg<SinkRef> {
    fn from(sink: SinkRef) -> Self {
        Arg::One(sink)
    }
}

impl From<ThresholdLevel> for Arg<ThresholdLevel> {
    fn from(level: ThresholdLevel) -> Self {
        Arg::One(level)
    }
}

impl From<i32> for Arg<ThresholdLevel> {
    fn from(level: i32) -> Self {
        Arg::One(ThresholdLevel(level))
    }
}

impl From<LogLevel> for Arg<ThresholdLevel> {
    fn from(level: LogLevel) -> Self {
        Arg::One(level.into())
    }
}

impl From<Vec<i32>> for Arg<ThresholdLevel> {
    fn from(levels: Vec<i32>) -> Self {
        Arg::Many(levels.into_iter().map(ThresholdLevel).collect())
    }
}

impl<const N: usize> From<[i32; N]> for Arg<ThresholdLevel> {
    fn from(levels: [i32; N]) -> Self {
        Arg::Many(levels.into_iter().map(ThresholdLevel).collect())
    }
}

/// Dynamically-typed argument.
#[derive(Clone)]
pub enum Value {
    None,
    Sink(SinkRef),
    Int(i32),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Short name of the variant, used in type errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Sink(_) => "sink",
            Value::Int(_) => "int",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }

    /// Reads a levels setting such as `info`, `10` or `10, 20, warn`.
    ///
    /// Blank text is `None`. Words that are neither integers nor level names
    /// come back as `Str` and are rejected later by normalization.
    #[must_use]
    pub fn parse_levels(text: &str) -> Value {
        let text = text.trim();
        if text.is_empty() {
            return Value::None;
        }
        if text.contains(',') {
            return Value::List(text.split(',').map(parse_level_scalar).collect());
        }
        parse_level_scalar(text)
    }
}

fn parse_level_scalar(text: &str) -> Value {
    let text = text.trim();
    if let Ok(n) = text.parse::<i32>() {
        return Value::Int(n);
    }
    match LogLevel::from_name(text) {
        Some(lvl) => Value::Int(lvl.threshold()),
        None => Value::Str(text.to_owned()),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Sink(s) => write!(f, "Sink({:?})", s.name()),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

impl From<SinkRef> for Value {
    fn from(sink: SinkRef) -> Self {
        Value::Sink(sink)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Element type a [`Value`] can be narrowed to.
pub trait Element: Sized {
    /// Name reported as the expected type.
    const KIND: &'static str;

    /// Narrows a single value, handing it back unchanged when it does not fit.
    fn from_value(value: Value) -> Result<Self, Value>;
}

impl Element for SinkRef {
    const KIND: &'static str = "sink";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Sink(sink) => Ok(sink),
            other => Err(other),
        }
    }
}

impl Element for ThresholdLevel {
    const KIND: &'static str = "int";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Int(n) => Ok(ThresholdLevel(n)),
            other => Err(other),
        }
    }
}

/// Normalizes a dynamic argument into a sequence of `T`.
///
/// # Errors
///
/// Returns [`TableError::TypeValidation`] when the value is neither `None`,
/// a single `T`, nor a list made only of `T`s.
pub fn normalize<T: Element>(value: Value) -> Result<Vec<T>, TableError> {
    let mismatch = |v: Value| TableError::TypeValidation {
        actual: v.kind(),
        expected: T::KIND,
    };

    match value {
        Value::None => Ok(Vec::new()),
        Value::List(items) => items
            .into_iter()
            .map(|item| T::from_value(item).map_err(mismatch))
            .collect(),
        other => T::from_value(other).map(|item| vec![item]).map_err(mismatch),
    }
}
