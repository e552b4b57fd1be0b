//! Named string-to-value conversions.
//!
//! A [`TransformRegistry`] maps each [`TransformId`] to a plain function
//! taking the raw flag string. The process-wide instance returned by
//! [`TransformRegistry::global`] holds the built-ins and is never mutated;
//! custom registries are assembled with [`TransformRegistry::with`] before any
//! mapper is built.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use labctl_core::{TransformId, TransformRegistry, Value};
//!
//! let registry = TransformRegistry::global();
//! let value = registry.apply("expires_at", TransformId::IsoDate, "2016-09-26").unwrap();
//! assert_eq!(value, Value::Date(NaiveDate::from_ymd_opt(2016, 9, 26).unwrap()));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};

use crate::error::{MapError, TransformError};
use crate::types::{TransformId, Value};
use crate::values::{AccessLevel, CommitAction, Labels, Visibility};

/// Date-only format accepted by the date transforms.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Signature shared by every transform.
pub type TransformFn = fn(&str) -> Result<Value, TransformError>;

static GLOBAL: LazyLock<TransformRegistry> = LazyLock::new(TransformRegistry::builtin);

/// Lookup table from [`TransformId`] to conversion function.
#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: HashMap<TransformId, TransformFn>,
}

impl TransformRegistry {
    /// Creates a registry with no transforms.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in transform.
    pub fn builtin() -> Self {
        Self::empty()
            .with(TransformId::Labels, string_to_labels)
            .with(TransformId::Visibility, string_to_visibility)
            .with(TransformId::IsoDate, string_to_iso_date)
            .with(TransformId::Time, string_to_time)
            .with(TransformId::AccessLevel, string_to_access_level)
            .with(TransformId::CommitActions, json_to_commit_actions)
    }

    /// The shared, read-only registry of built-in transforms.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Registers (or replaces) the function for `id`.
    pub fn with(mut self, id: TransformId, transform: TransformFn) -> Self {
        self.transforms.insert(id, transform);
        self
    }

    pub fn contains(&self, id: TransformId) -> bool {
        self.transforms.contains_key(&id)
    }

    pub fn get(&self, id: TransformId) -> Option<TransformFn> {
        self.transforms.get(&id).copied()
    }

    /// Runs transform `id` on `input` for flag `flag`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::TransformNotRegistered`] if `id` is missing,
    /// [`MapError::Transform`] if the function rejects the input, and
    /// [`MapError::TypeMismatch`] if it returns a value of a kind other than
    /// [`TransformId::output_kind`].
    pub fn apply(&self, flag: &str, id: TransformId, input: &str) -> Result<Value, MapError> {
        let transform = self.get(id).ok_or_else(|| MapError::TransformNotRegistered {
            flag: flag.to_string(),
            transform: id,
        })?;
        let value = transform(input).map_err(|source| MapError::Transform {
            flag: flag.to_string(),
            source,
        })?;
        if value.kind() != id.output_kind() {
            return Err(MapError::TypeMismatch {
                flag: flag.to_string(),
                expected: id.output_kind(),
                found: value.kind(),
            });
        }
        Ok(value)
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&'static str> = self.transforms.keys().map(TransformId::name).collect();
        ids.sort_unstable();
        f.debug_struct("TransformRegistry")
            .field("transforms", &ids)
            .finish()
    }
}

/// Splits a comma-separated string into trimmed, non-empty labels.
pub fn string_to_labels(input: &str) -> Result<Value, TransformError> {
    let labels = input
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(String::from)
        .collect::<Vec<_>>();
    Ok(Value::Labels(Labels(labels)))
}

pub fn string_to_visibility(input: &str) -> Result<Value, TransformError> {
    input
        .parse::<Visibility>()
        .map(Value::Visibility)
        .map_err(TransformError::UnknownVisibility)
}

pub fn string_to_iso_date(input: &str) -> Result<Value, TransformError> {
    parse_date(input).map(Value::Date)
}

/// Parses a date and returns midnight UTC of that day.
pub fn string_to_time(input: &str) -> Result<Value, TransformError> {
    let date = parse_date(input)?;
    Ok(Value::Time(date.and_time(NaiveTime::MIN).and_utc()))
}

pub fn string_to_access_level(input: &str) -> Result<Value, TransformError> {
    let level = match input {
        "10" => AccessLevel::Guest,
        "20" => AccessLevel::Reporter,
        "30" => AccessLevel::Developer,
        "40" => AccessLevel::Maintainer,
        "50" => AccessLevel::Owner,
        other => return Err(TransformError::UnknownAccessLevel(other.to_string())),
    };
    Ok(Value::AccessLevel(level))
}

pub fn json_to_commit_actions(input: &str) -> Result<Value, TransformError> {
    let actions: Vec<CommitAction> = serde_json::from_str(input)?;
    Ok(Value::CommitActions(actions))
}

fn parse_date(input: &str) -> Result<NaiveDate, TransformError> {
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|source| TransformError::InvalidDate {
        input: input.to_string(),
        source,
    })
}
