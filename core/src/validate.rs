//! Flags descriptor validation.
//!
//! Validates structural invariants of a command's field descriptors before
//! they are registered with clap, catching errors such as duplicate flags,
//! malformed names and transforms the registry cannot serve.
//!
//! # Examples
//!
//! ```
//! use labctl_core::*;
//!
//! let fields = vec![
//!     FieldSpec::string("id").with_short('i').required(),
//!     FieldSpec::boolean("archived"),
//! ];
//! assert!(validate_fields(&fields, TransformRegistry::global()).is_empty());
//!
//! // Invalid: the same flag twice
//! let fields = vec![FieldSpec::string("id"), FieldSpec::integer("id")];
//! assert!(!validate_fields(&fields, TransformRegistry::global()).is_empty());
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::transform::TransformRegistry;
use crate::types::{FieldSpec, FlagKind, TransformId, ValueKind};

static FLAG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("static regex must compile"));

/// Flag names and short aliases a command's own fields may not use.
///
/// The default reserves clap's `--help`/`-h`. Callers that add global
/// arguments to every command reserve those too, usually by reading them
/// from the root command with [`ReservedFlags::from_command`].
///
/// # Examples
///
/// ```
/// use labctl_core::*;
///
/// let reserved = ReservedFlags::default().name("config").short('v');
/// let fields = vec![FieldSpec::boolean("visible").with_short('v')];
/// let errors = validate_fields_with(&fields, TransformRegistry::global(), &reserved);
/// assert_eq!(errors, vec![DescriptorError::ReservedShort('v')]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedFlags {
    names: HashSet<String>,
    shorts: HashSet<char>,
}

impl Default for ReservedFlags {
    fn default() -> Self {
        Self {
            names: HashSet::from(["help".to_string()]),
            shorts: HashSet::from(['h']),
        }
    }
}

impl ReservedFlags {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    pub fn short(mut self, short: char) -> Self {
        self.shorts.insert(short);
        self
    }

    /// Reserves the ids, long names and short aliases of every argument of
    /// `cmd`, on top of the defaults.
    pub fn from_command(cmd: &clap::Command) -> Self {
        cmd.get_arguments().fold(Self::default(), |reserved, arg| {
            let reserved = reserved.name(arg.get_id().as_str());
            let reserved = match arg.get_long() {
                Some(long) => reserved.name(long),
                None => reserved,
            };
            match arg.get_short() {
                Some(short) => reserved.short(short),
                None => reserved,
            }
        })
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn contains_short(&self, short: char) -> bool {
        self.shorts.contains(&short)
    }
}

/// Descriptor validation errors.
///
/// Every variant is a defect in a command definition rather than in user
/// input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// Flag name is empty or whitespace-only.
    #[error("flag name cannot be empty")]
    EmptyFlagName,
    /// Flag name is not lowercase snake case.
    #[error("invalid flag name: {0}")]
    InvalidFlagName(String),
    /// Two fields in the same command share a name.
    #[error("duplicate flag: --{0}")]
    DuplicateFlag(String),
    /// Two fields in the same command share a short alias.
    #[error("duplicate short flag: -{0}")]
    DuplicateShort(char),
    /// A field uses a reserved flag name.
    #[error("flag --{0} is reserved")]
    ReservedName(String),
    /// A field uses a reserved short alias.
    #[error("short flag -{0} is reserved")]
    ReservedShort(char),
    /// A transform is attached to a field that is not a string.
    #[error("flag --{flag} is a {kind:?} flag; transforms need a string flag")]
    TransformRequiresString { flag: String, kind: FlagKind },
    /// The field's transform is missing from the registry.
    #[error("flag --{flag} uses transform {transform}, which is not registered")]
    UnregisteredTransform { flag: String, transform: TransformId },
    /// A binding's destination type does not accept the field's value.
    #[error("flag --{flag} produces {produced} but is bound to a {accepted} field")]
    BindingTypeMismatch {
        flag: String,
        produced: ValueKind,
        accepted: ValueKind,
    },
}

/// Validates a command's field descriptors against the default
/// [`ReservedFlags`].
///
/// # Examples
///
/// ```
/// use labctl_core::*;
///
/// let fields = vec![FieldSpec::integer("group_access").with_transform(TransformId::AccessLevel)];
/// let errors = validate_fields(&fields, TransformRegistry::global());
/// assert!(matches!(errors[0], DescriptorError::TransformRequiresString { .. }));
/// ```
pub fn validate_fields(fields: &[FieldSpec], registry: &TransformRegistry) -> Vec<DescriptorError> {
    validate_fields_with(fields, registry, &ReservedFlags::default())
}

/// Validates a command's field descriptors.
///
/// Checks for empty and malformed names, duplicate names and short aliases,
/// names and aliases in `reserved`, transforms on non-string fields, and
/// transforms that `registry` does not hold. Stops at the first field with
/// an error.
pub fn validate_fields_with(
    fields: &[FieldSpec],
    registry: &TransformRegistry,
    reserved: &ReservedFlags,
) -> Vec<DescriptorError> {
    let mut errors = Vec::new();
    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut seen_shorts: HashSet<char> = HashSet::new();

    for field in fields {
        let name = field.name.trim();
        if name.is_empty() {
            errors.push(DescriptorError::EmptyFlagName);
            return errors;
        }

        if !FLAG_NAME_RE.is_match(&field.name) {
            errors.push(DescriptorError::InvalidFlagName(field.name.clone()));
            return errors;
        }

        if reserved.contains_name(name) {
            errors.push(DescriptorError::ReservedName(name.to_string()));
            return errors;
        }

        if !seen_names.insert(name) {
            errors.push(DescriptorError::DuplicateFlag(name.to_string()));
            return errors;
        }

        if let Some(short) = field.short {
            if reserved.contains_short(short) {
                errors.push(DescriptorError::ReservedShort(short));
                return errors;
            }
            if !seen_shorts.insert(short) {
                errors.push(DescriptorError::DuplicateShort(short));
                return errors;
            }
        }

        if let Some(transform) = field.transform {
            if field.kind != FlagKind::String {
                errors.push(DescriptorError::TransformRequiresString {
                    flag: name.to_string(),
                    kind: field.kind,
                });
                return errors;
            }
            if !registry.contains(transform) {
                errors.push(DescriptorError::UnregisteredTransform {
                    flag: name.to_string(),
                    transform,
                });
                return errors;
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(fields: &[FieldSpec]) -> Vec<DescriptorError> {
        validate_fields(fields, TransformRegistry::global())
    }

    #[test]
    fn test_valid_descriptor() {
        let fields = vec![
            FieldSpec::string("id").with_short('i').required(),
            FieldSpec::integer("group_id").with_short('g').required(),
            FieldSpec::string("group_access")
                .with_short('a')
                .with_transform(TransformId::AccessLevel),
            FieldSpec::string_list("tag_list"),
            FieldSpec::integer_list("assignee_ids"),
        ];
        assert!(validate(&fields).is_empty());
    }

    #[test]
    fn test_empty_name() {
        let errors = validate(&[FieldSpec::string("  ")]);
        assert_eq!(errors, vec![DescriptorError::EmptyFlagName]);
    }

    #[test]
    fn test_invalid_name() {
        for bad in ["Name", "with-dash", "1st", "--id"] {
            let errors = validate(&[FieldSpec::string(bad)]);
            assert_eq!(errors, vec![DescriptorError::InvalidFlagName(bad.to_string())]);
        }
    }

    #[test]
    fn test_duplicate_name() {
        let errors = validate(&[FieldSpec::string("id"), FieldSpec::integer("id")]);
        assert_eq!(errors, vec![DescriptorError::DuplicateFlag("id".into())]);
    }

    #[test]
    fn test_duplicate_short() {
        let errors = validate(&[
            FieldSpec::string("id").with_short('i'),
            FieldSpec::boolean("issues_enabled").with_short('i'),
        ]);
        assert_eq!(errors, vec![DescriptorError::DuplicateShort('i')]);
    }

    #[test]
    fn test_reserved_short() {
        let errors = validate(&[FieldSpec::integer("hook_id").with_short('h')]);
        assert_eq!(errors, vec![DescriptorError::ReservedShort('h')]);
    }

    #[test]
    fn test_reserved_globals() {
        let reserved = ReservedFlags::default().name("config").name("verbose").short('v');

        let fields = [FieldSpec::boolean("visible").with_short('v')];
        let errors = validate_fields_with(&fields, TransformRegistry::global(), &reserved);
        assert_eq!(errors, vec![DescriptorError::ReservedShort('v')]);

        let fields = [FieldSpec::string("config")];
        let errors = validate_fields_with(&fields, TransformRegistry::global(), &reserved);
        assert_eq!(errors, vec![DescriptorError::ReservedName("config".into())]);

        // the defaults leave both alone
        assert!(validate(&[FieldSpec::string("config").with_short('v')]).is_empty());
    }

    #[test]
    fn test_reserved_from_command() {
        let root = clap::Command::new("labctl")
            .arg(clap::Arg::new("config").long("config").global(true))
            .arg(clap::Arg::new("verbose").short('v').long("verbose").global(true));
        let reserved = ReservedFlags::from_command(&root);

        assert!(reserved.contains_name("config"));
        assert!(reserved.contains_name("verbose"));
        assert!(reserved.contains_name("help"));
        assert!(reserved.contains_short('v'));
        assert!(reserved.contains_short('h'));
        assert!(!reserved.contains_short('i'));
    }

    #[test]
    fn test_transform_needs_string_kind() {
        let errors = validate(&[FieldSpec::boolean("visibility").with_transform(TransformId::Visibility)]);
        assert!(matches!(
            errors[0],
            DescriptorError::TransformRequiresString {
                kind: FlagKind::Boolean,
                ..
            }
        ));
    }

    #[test]
    fn test_unregistered_transform() {
        let fields = [FieldSpec::string("labels").with_transform(TransformId::Labels)];
        let errors = validate_fields(&fields, &TransformRegistry::empty());
        assert_eq!(
            errors,
            vec![DescriptorError::UnregisteredTransform {
                flag: "labels".into(),
                transform: TransformId::Labels,
            }]
        );
    }
}
