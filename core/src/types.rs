//! Field descriptor and value type definitions.
//!
//! A command's flags are described by a list of [`FieldSpec`]s. Each spec
//! names the flag, its [`FlagKind`], whether it is required, and optionally a
//! [`TransformId`] that converts the raw string into a richer [`Value`].
//! The types serialize with [`serde`] so descriptors can be exported and
//! inspected.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::values::{AccessLevel, CommitAction, Labels, Visibility};

/// Primitive shape of a command-line flag.
///
/// # Examples
///
/// ```
/// use labctl_core::{FlagKind, ValueKind};
///
/// assert_eq!(FlagKind::IntegerList.value_kind(), ValueKind::IntegerList);
/// assert!(FlagKind::StringList.is_repeatable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlagKind {
    /// Signed integer (`--limit 10`).
    Integer,
    /// Free-form string (`--name demo`).
    String,
    /// Switch; a bare `--flag` means `true`, `--flag=false` is accepted.
    Boolean,
    /// Repeatable string (`--tag a --tag b`).
    StringList,
    /// Comma-separated integers (`--ids 1,2,3`), repeatable.
    IntegerList,
}

impl FlagKind {
    /// The value kind this flag produces when no transform is applied.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::Integer => ValueKind::Integer,
            Self::String => ValueKind::String,
            Self::Boolean => ValueKind::Boolean,
            Self::StringList => ValueKind::StringList,
            Self::IntegerList => ValueKind::IntegerList,
        }
    }

    /// Whether the flag may be given more than once.
    pub fn is_repeatable(&self) -> bool {
        matches!(self, Self::StringList | Self::IntegerList)
    }
}

/// Discriminant of [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    Integer,
    String,
    Boolean,
    StringList,
    IntegerList,
    Date,
    Time,
    Visibility,
    AccessLevel,
    Labels,
    CommitActions,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::StringList => "string-list",
            Self::IntegerList => "integer-list",
            Self::Date => "date",
            Self::Time => "time",
            Self::Visibility => "visibility",
            Self::AccessLevel => "access-level",
            Self::Labels => "labels",
            Self::CommitActions => "commit-actions",
        };
        f.write_str(name)
    }
}

/// A typed flag value, either read directly from the command line or
/// produced by a transform.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    String(String),
    Boolean(bool),
    StringList(Vec<String>),
    IntegerList(Vec<i64>),
    Date(NaiveDate),
    Time(DateTime<Utc>),
    Visibility(Visibility),
    AccessLevel(AccessLevel),
    Labels(Labels),
    CommitActions(Vec<CommitAction>),
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::String(_) => ValueKind::String,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::StringList(_) => ValueKind::StringList,
            Self::IntegerList(_) => ValueKind::IntegerList,
            Self::Date(_) => ValueKind::Date,
            Self::Time(_) => ValueKind::Time,
            Self::Visibility(_) => ValueKind::Visibility,
            Self::AccessLevel(_) => ValueKind::AccessLevel,
            Self::Labels(_) => ValueKind::Labels,
            Self::CommitActions(_) => ValueKind::CommitActions,
        }
    }
}

/// A Rust type that can receive a [`Value`] of one fixed kind.
///
/// Bindings use this to check, when a mapper is built, that the destination
/// field accepts exactly what the flag produces.
pub trait OptionValue: Sized {
    /// The only value kind this type accepts.
    const KIND: ValueKind;

    /// Extracts `Self` from a value of kind [`Self::KIND`].
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! option_value {
    ($ty:ty, $variant:ident) => {
        impl OptionValue for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

option_value!(i64, Integer);
option_value!(String, String);
option_value!(bool, Boolean);
option_value!(Vec<String>, StringList);
option_value!(Vec<i64>, IntegerList);
option_value!(NaiveDate, Date);
option_value!(DateTime<Utc>, Time);
option_value!(Visibility, Visibility);
option_value!(AccessLevel, AccessLevel);
option_value!(Labels, Labels);
option_value!(Vec<CommitAction>, CommitActions);

/// Identifier of a registered string-to-value conversion.
///
/// The serialized names are the identifiers used in descriptor files.
///
/// # Examples
///
/// ```
/// use labctl_core::{TransformId, ValueKind};
///
/// let id: TransformId = "str2AccessLevel".parse().unwrap();
/// assert_eq!(id, TransformId::AccessLevel);
/// assert_eq!(id.output_kind(), ValueKind::AccessLevel);
/// assert!("toUpper".parse::<TransformId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformId {
    /// Comma-separated string to [`Labels`].
    #[serde(rename = "string2Labels")]
    Labels,
    /// `private` / `internal` / `public` to [`Visibility`].
    #[serde(rename = "string2visibility")]
    Visibility,
    /// `YYYY-MM-DD` to a calendar date.
    #[serde(rename = "string2IsoTime")]
    IsoDate,
    /// `YYYY-MM-DD` to a UTC timestamp at midnight.
    #[serde(rename = "string2Time", alias = "string2TimeVal")]
    Time,
    /// `10`..`50` to [`AccessLevel`].
    #[serde(rename = "str2AccessLevel")]
    AccessLevel,
    /// JSON array to a list of [`CommitAction`]s.
    #[serde(rename = "json2CommitActions")]
    CommitActions,
}

impl TransformId {
    pub const ALL: [TransformId; 6] = [
        Self::Labels,
        Self::Visibility,
        Self::IsoDate,
        Self::Time,
        Self::AccessLevel,
        Self::CommitActions,
    ];

    /// Descriptor name of this transform.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Labels => "string2Labels",
            Self::Visibility => "string2visibility",
            Self::IsoDate => "string2IsoTime",
            Self::Time => "string2Time",
            Self::AccessLevel => "str2AccessLevel",
            Self::CommitActions => "json2CommitActions",
        }
    }

    /// The kind of value every implementation of this transform returns.
    pub fn output_kind(&self) -> ValueKind {
        match self {
            Self::Labels => ValueKind::Labels,
            Self::Visibility => ValueKind::Visibility,
            Self::IsoDate => ValueKind::Date,
            Self::Time => ValueKind::Time,
            Self::AccessLevel => ValueKind::AccessLevel,
            Self::CommitActions => ValueKind::CommitActions,
        }
    }
}

impl std::str::FromStr for TransformId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "string2TimeVal" {
            return Ok(Self::Time);
        }
        Self::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| format!("unknown transform: {s}"))
    }
}

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Descriptor of one command-line flag.
///
/// Use the kind constructors ([`integer`](FieldSpec::integer),
/// [`string`](FieldSpec::string), ...) and chain builder methods.
///
/// # Examples
///
/// ```
/// use labctl_core::{FieldSpec, FlagKind, TransformId};
///
/// let spec = FieldSpec::string("group_access")
///     .with_short('a')
///     .with_transform(TransformId::AccessLevel)
///     .with_description("The permissions level to grant the group")
///     .required();
///
/// assert_eq!(spec.kind, FlagKind::String);
/// assert_eq!(spec.help_text(), "(required) The permissions level to grant the group");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Long flag name without the leading dashes.
    pub name: String,
    /// Single-character alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    /// Primitive shape on the command line.
    pub kind: FlagKind,
    /// Whether mapping fails when the flag is absent.
    #[serde(default)]
    pub required: bool,
    /// Help text.
    #[serde(default)]
    pub description: String,
    /// Conversion applied to the raw string before binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformId>,
}

impl FieldSpec {
    pub fn new(name: &str, kind: FlagKind) -> Self {
        Self {
            name: name.to_string(),
            short: None,
            kind,
            required: false,
            description: String::new(),
            transform: None,
        }
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, FlagKind::Integer)
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, FlagKind::String)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, FlagKind::Boolean)
    }

    pub fn string_list(name: &str) -> Self {
        Self::new(name, FlagKind::StringList)
    }

    pub fn integer_list(name: &str) -> Self {
        Self::new(name, FlagKind::IntegerList)
    }

    /// Sets the single-character alias.
    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    /// Routes the raw string through a transform.
    pub fn with_transform(mut self, transform: TransformId) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Marks the flag as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The kind of value mapping produces for this field.
    pub fn output_kind(&self) -> ValueKind {
        match self.transform {
            Some(transform) => transform.output_kind(),
            None => self.kind.value_kind(),
        }
    }

    /// Help text with the required/optional marker prepended.
    pub fn help_text(&self) -> String {
        let marker = if self.required {
            "(required)"
        } else {
            "(optional)"
        };
        if self.description.is_empty() {
            marker.to_string()
        } else {
            format!("{marker} {}", self.description)
        }
    }
}

/// Exported description of one leaf command and its flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// Full command path, e.g. `"project share"`.
    pub command: String,
    /// One-line summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    /// Flags in declaration order.
    pub fields: Vec<FieldSpec>,
}
