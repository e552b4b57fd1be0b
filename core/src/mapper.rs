//! Flag registration and flag-to-options mapping.
//!
//! A [`FlagMapper`] pairs a command's field descriptors with explicit
//! bindings into an options type `O`. It registers one clap [`Arg`] per field
//! and, once the command line is parsed, copies every supplied value into a
//! fresh `O`.
//!
//! Bindings are checked when the mapper is built: a field whose value kind
//! (after its transform, if any) differs from what the bound setter accepts
//! is rejected with [`DescriptorError::BindingTypeMismatch`] before any
//! command line is parsed.
//!
//! # Example
//!
//! ```
//! use clap::Command;
//! use labctl_core::*;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct ShareOptions {
//!     group_id: Option<i64>,
//!     group_access: Option<AccessLevel>,
//! }
//!
//! let mapper = FlagMapper::<ShareOptions>::builder("project share")
//!     .flag(FieldSpec::string("id").with_short('i').required())
//!     .bind(FieldSpec::integer("group_id").required(), |o, v| o.group_id = Some(v))
//!     .bind(
//!         FieldSpec::string("group_access").with_transform(TransformId::AccessLevel),
//!         |o, v| o.group_access = Some(v),
//!     )
//!     .build(TransformRegistry::global())
//!     .unwrap();
//!
//! let cmd = mapper.register(Command::new("share"));
//! let matches = cmd
//!     .try_get_matches_from(["share", "-i", "7", "--group_id", "3", "--group_access", "30"])
//!     .unwrap();
//! let mapped = mapper.map(&matches, TransformRegistry::global()).unwrap();
//!
//! assert_eq!(mapped.string("id"), Some("7"));
//! assert_eq!(
//!     mapped.options(),
//!     &ShareOptions { group_id: Some(3), group_access: Some(AccessLevel::Developer) }
//! );
//! ```

use std::collections::BTreeMap;
use std::fmt;

use clap::parser::{MatchesError, ValueSource};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use tracing::debug;

use crate::error::MapError;
use crate::transform::TransformRegistry;
use crate::types::{CommandDescriptor, FieldSpec, FlagKind, OptionValue, Value, ValueKind};
use crate::validate::{DescriptorError, ReservedFlags, validate_fields_with};

/// Type-erased setter; returns the offending kind when the value does not fit.
type Setter<O> = Box<dyn Fn(&mut O, Value) -> Result<(), ValueKind>>;

struct Binding<O> {
    field: FieldSpec,
    setter: Option<Setter<O>>,
}

/// Collects field descriptors and bindings for one command.
pub struct MapperBuilder<O> {
    command: String,
    bindings: Vec<Binding<O>>,
    mismatches: Vec<DescriptorError>,
    reserved: ReservedFlags,
}

impl<O: 'static> MapperBuilder<O> {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            bindings: Vec::new(),
            mismatches: Vec::new(),
            reserved: ReservedFlags::default(),
        }
    }

    /// Full command path this builder belongs to.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Replaces the names and aliases the fields may not use.
    pub fn reserve(mut self, reserved: ReservedFlags) -> Self {
        self.reserved = reserved;
        self
    }

    /// Declares a flag with no options counterpart.
    ///
    /// Its value is still available from [`Mapped`] and it is still subject
    /// to required-flag validation.
    pub fn flag(mut self, field: FieldSpec) -> Self {
        self.bindings.push(Binding {
            field,
            setter: None,
        });
        self
    }

    /// Declares a flag and binds its value to a field of `O`.
    pub fn bind<T, F>(mut self, field: FieldSpec, setter: F) -> Self
    where
        T: OptionValue + 'static,
        F: Fn(&mut O, T) + 'static,
    {
        let produced = field.output_kind();
        if produced != T::KIND {
            self.mismatches.push(DescriptorError::BindingTypeMismatch {
                flag: field.name.clone(),
                produced,
                accepted: T::KIND,
            });
        }
        let setter: Setter<O> = Box::new(move |options, value| {
            let found = value.kind();
            let typed = T::from_value(value).ok_or(found)?;
            setter(options, typed);
            Ok(())
        });
        self.bindings.push(Binding {
            field,
            setter: Some(setter),
        });
        self
    }

    /// Validates the descriptor and finishes the mapper.
    ///
    /// # Errors
    ///
    /// Returns every [`DescriptorError`] found by [`validate_fields_with`]
    /// plus any binding type mismatches.
    pub fn build(self, registry: &TransformRegistry) -> Result<FlagMapper<O>, Vec<DescriptorError>> {
        let fields: Vec<FieldSpec> = self.bindings.iter().map(|b| b.field.clone()).collect();
        let mut errors = validate_fields_with(&fields, registry, &self.reserved);
        errors.extend(self.mismatches);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(FlagMapper {
            command: self.command,
            bindings: self.bindings,
        })
    }
}

/// Registers a command's flags and maps parsed values into `O`.
///
/// Use `O = ()` for commands that only read their flags through [`Mapped`].
pub struct FlagMapper<O> {
    command: String,
    bindings: Vec<Binding<O>>,
}

impl<O: Default + 'static> FlagMapper<O> {
    pub fn builder(command: impl Into<String>) -> MapperBuilder<O> {
        MapperBuilder::new(command)
    }

    /// Full command path this mapper belongs to.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Field descriptors in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.bindings.iter().map(|b| &b.field)
    }

    /// Exportable description of this command's flags.
    pub fn descriptor(&self, about: Option<&str>) -> CommandDescriptor {
        CommandDescriptor {
            command: self.command.clone(),
            about: about.map(String::from),
            fields: self.fields().cloned().collect(),
        }
    }

    /// Adds one argument per field to `cmd`.
    pub fn register(&self, cmd: Command) -> Command {
        self.fields().fold(cmd, |cmd, field| cmd.arg(flag_arg(field)))
    }

    /// Copies the supplied flag values into a fresh `O`.
    ///
    /// Fields are processed in declaration order. A field counts as supplied
    /// only when its value came from the command line.
    ///
    /// # Errors
    ///
    /// The first missing required flag, rejected value, or configuration
    /// defect aborts the mapping; the partially filled options value is
    /// dropped.
    pub fn map(&self, matches: &ArgMatches, registry: &TransformRegistry) -> Result<Mapped<O>, MapError> {
        let mut options = O::default();
        let mut values = BTreeMap::new();

        for binding in &self.bindings {
            let field = &binding.field;
            let Some(raw) = read_supplied(matches, field)? else {
                if field.required {
                    debug!(command = %self.command, flag = %field.name, "Required flag missing");
                    return Err(MapError::MissingRequired {
                        flag: field.name.clone(),
                    });
                }
                continue;
            };

            let value = match (field.transform, &raw) {
                (Some(transform), Value::String(input)) => registry.apply(&field.name, transform, input)?,
                (Some(_), other) => {
                    return Err(MapError::TypeMismatch {
                        flag: field.name.clone(),
                        expected: ValueKind::String,
                        found: other.kind(),
                    });
                }
                (None, raw) => raw.clone(),
            };

            match &binding.setter {
                Some(setter) => {
                    setter(&mut options, value).map_err(|found| MapError::TypeMismatch {
                        flag: field.name.clone(),
                        expected: field.output_kind(),
                        found,
                    })?;
                    debug!(command = %self.command, flag = %field.name, "Mapped flag");
                }
                None => {
                    debug!(command = %self.command, flag = %field.name, "Flag has no options field");
                }
            }
            values.insert(field.name.clone(), raw);
        }

        Ok(Mapped { options, values })
    }
}

impl<O> fmt::Debug for FlagMapper<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.bindings.iter().map(|b| b.field.name.as_str()).collect();
        f.debug_struct("FlagMapper")
            .field("command", &self.command)
            .field("fields", &fields)
            .finish()
    }
}

/// Result of one mapping session.
///
/// Holds the populated options value and the raw (pre-transform) value of
/// every flag that was supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapped<O> {
    options: O,
    values: BTreeMap<String, Value>,
}

impl<O> Mapped<O> {
    pub fn options(&self) -> &O {
        &self.options
    }

    pub fn into_options(self) -> O {
        self.options
    }

    /// Whether `flag` was given on the command line.
    pub fn is_set(&self, flag: &str) -> bool {
        self.values.contains_key(flag)
    }

    /// Raw value of `flag`, before any transform.
    pub fn value(&self, flag: &str) -> Option<&Value> {
        self.values.get(flag)
    }

    pub fn string(&self, flag: &str) -> Option<&str> {
        match self.values.get(flag) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, flag: &str) -> Option<i64> {
        match self.values.get(flag) {
            Some(Value::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn boolean(&self, flag: &str) -> Option<bool> {
        match self.values.get(flag) {
            Some(Value::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    /// Like [`string`](Mapped::string) but fails when the flag is absent.
    pub fn require_string(&self, flag: &str) -> Result<&str, MapError> {
        self.string(flag).ok_or_else(|| MapError::MissingRequired {
            flag: flag.to_string(),
        })
    }

    /// Like [`integer`](Mapped::integer) but fails when the flag is absent.
    pub fn require_integer(&self, flag: &str) -> Result<i64, MapError> {
        self.integer(flag).ok_or_else(|| MapError::MissingRequired {
            flag: flag.to_string(),
        })
    }
}

fn flag_arg(field: &FieldSpec) -> Arg {
    let mut arg = Arg::new(field.name.clone())
        .long(field.name.clone())
        .help(field.help_text());
    if let Some(short) = field.short {
        arg = arg.short(short);
    }

    match field.kind {
        FlagKind::Integer => arg
            .action(ArgAction::Set)
            .value_name("INT")
            .allow_negative_numbers(true)
            .value_parser(value_parser!(i64)),
        FlagKind::String => arg
            .action(ArgAction::Set)
            .value_name("STRING")
            .value_parser(value_parser!(String)),
        FlagKind::Boolean => arg
            .action(ArgAction::Set)
            .value_name("BOOL")
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_parser(value_parser!(bool)),
        FlagKind::StringList => arg
            .action(ArgAction::Append)
            .value_name("STRING")
            .value_parser(value_parser!(String)),
        FlagKind::IntegerList => arg
            .action(ArgAction::Append)
            .value_name("INT,...")
            .value_parser(value_parser!(String)),
    }
}

/// Reads `field` if and only if it was given on the command line.
fn read_supplied(matches: &ArgMatches, field: &FieldSpec) -> Result<Option<Value>, MapError> {
    let flag = field.name.as_str();
    let read_error = |source: MatchesError| MapError::FlagRead {
        flag: flag.to_string(),
        source,
    };

    // Unknown ids would otherwise panic inside clap in debug builds.
    matches.try_contains_id(flag).map_err(read_error)?;
    if matches.value_source(flag) != Some(ValueSource::CommandLine) {
        return Ok(None);
    }

    let value = match field.kind {
        FlagKind::Integer => matches
            .try_get_one::<i64>(flag)
            .map_err(read_error)?
            .map(|n| Value::Integer(*n)),
        FlagKind::String => matches
            .try_get_one::<String>(flag)
            .map_err(read_error)?
            .map(|s| Value::String(s.clone())),
        FlagKind::Boolean => matches
            .try_get_one::<bool>(flag)
            .map_err(read_error)?
            .map(|b| Value::Boolean(*b)),
        FlagKind::StringList => matches
            .try_get_many::<String>(flag)
            .map_err(read_error)?
            .map(|values| Value::StringList(values.cloned().collect())),
        FlagKind::IntegerList => match matches.try_get_many::<String>(flag).map_err(read_error)? {
            Some(occurrences) => Some(Value::IntegerList(parse_integer_list(flag, occurrences)?)),
            None => None,
        },
    };
    Ok(value)
}

/// Splits each occurrence on commas and parses every element.
fn parse_integer_list<'a>(
    flag: &str,
    occurrences: impl Iterator<Item = &'a String>,
) -> Result<Vec<i64>, MapError> {
    let mut numbers = Vec::new();
    for occurrence in occurrences {
        for element in occurrence.split(',').map(str::trim) {
            let number = element.parse::<i64>().map_err(|_| MapError::InvalidInteger {
                flag: flag.to_string(),
                element: element.to_string(),
            })?;
            numbers.push(number);
        }
    }
    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::error::TransformError;
    use crate::types::TransformId;
    use crate::values::{AccessLevel, Labels, Visibility};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Options {
        count: Option<i64>,
        name: Option<String>,
        enabled: Option<bool>,
        tags: Option<Vec<String>>,
        ids: Option<Vec<i64>>,
        visibility: Option<Visibility>,
        expires_at: Option<NaiveDate>,
        access: Option<AccessLevel>,
        labels: Option<Labels>,
    }

    fn mapper() -> FlagMapper<Options> {
        FlagMapper::builder("test")
            .flag(FieldSpec::string("id").with_short('i').required())
            .bind(FieldSpec::integer("count").with_short('c'), |o: &mut Options, v| o.count = Some(v))
            .bind(FieldSpec::string("name"), |o: &mut Options, v| o.name = Some(v))
            .bind(FieldSpec::boolean("enabled"), |o: &mut Options, v| o.enabled = Some(v))
            .bind(FieldSpec::string_list("tag"), |o: &mut Options, v| o.tags = Some(v))
            .bind(FieldSpec::integer_list("ids"), |o: &mut Options, v| o.ids = Some(v))
            .bind(
                FieldSpec::string("visibility").with_transform(TransformId::Visibility),
                |o: &mut Options, v| o.visibility = Some(v),
            )
            .bind(
                FieldSpec::string("expires_at").with_transform(TransformId::IsoDate),
                |o: &mut Options, v| o.expires_at = Some(v),
            )
            .bind(
                FieldSpec::string("access").with_transform(TransformId::AccessLevel),
                |o: &mut Options, v| o.access = Some(v),
            )
            .bind(
                FieldSpec::string("labels").with_transform(TransformId::Labels),
                |o: &mut Options, v| o.labels = Some(v),
            )
            .flag(FieldSpec::boolean("dry_run"))
            .build(TransformRegistry::global())
            .unwrap()
    }

    fn run(args: &[&str]) -> Result<Mapped<Options>, MapError> {
        let mapper = mapper();
        let cmd = mapper.register(Command::new("test"));
        let argv = std::iter::once("test").chain(args.iter().copied());
        let matches = cmd.try_get_matches_from(argv).unwrap();
        mapper.map(&matches, TransformRegistry::global())
    }

    #[test]
    fn test_required_flag_missing() {
        let err = run(&["--name", "demo"]).unwrap_err();
        assert!(matches!(err, MapError::MissingRequired { ref flag } if flag == "id"));
        assert_eq!(err.to_string(), "required flag --id was not provided");
    }

    #[test]
    fn test_required_flag_without_binding_still_checked() {
        let mapper = FlagMapper::<()>::builder("get")
            .flag(FieldSpec::string("id").required())
            .build(TransformRegistry::global())
            .unwrap();
        let matches = mapper
            .register(Command::new("get"))
            .try_get_matches_from(["get"])
            .unwrap();
        assert!(mapper.map(&matches, TransformRegistry::global()).is_err());
    }

    #[test]
    fn test_unsupplied_flags_stay_unset() {
        let mapped = run(&["-i", "1"]).unwrap();
        assert_eq!(mapped.options(), &Options::default());
        assert!(mapped.is_set("id"));
        assert!(!mapped.is_set("enabled"));
    }

    #[test]
    fn test_every_kind_maps_unchanged() {
        let mapped = run(&[
            "-i", "group/project", "-c", "-3", "--name", "demo", "--enabled", "--tag", "a", "--tag",
            "b c", "--ids", "1,2,3",
        ])
        .unwrap();
        let options = mapped.options();
        assert_eq!(options.count, Some(-3));
        assert_eq!(options.name.as_deref(), Some("demo"));
        assert_eq!(options.enabled, Some(true));
        assert_eq!(options.tags, Some(vec!["a".to_string(), "b c".to_string()]));
        assert_eq!(options.ids, Some(vec![1, 2, 3]));
        assert_eq!(mapped.string("id"), Some("group/project"));
    }

    #[test]
    fn test_boolean_explicit_false_is_supplied() {
        let mapped = run(&["-i", "1", "--enabled=false"]).unwrap();
        assert_eq!(mapped.options().enabled, Some(false));
        assert_eq!(mapped.boolean("enabled"), Some(false));
    }

    #[test]
    fn test_integer_list_across_occurrences() {
        let mapped = run(&["-i", "1", "--ids", "4, 5", "--ids", "6"]).unwrap();
        assert_eq!(mapped.options().ids, Some(vec![4, 5, 6]));
    }

    #[test]
    fn test_integer_list_rejects_non_numeric() {
        let err = run(&["-i", "1", "--ids", "1,x,3"]).unwrap_err();
        assert!(matches!(
            err,
            MapError::InvalidInteger { ref flag, ref element } if flag == "ids" && element == "x"
        ));
    }

    #[test]
    fn test_transforms_applied() {
        let mapped = run(&[
            "-i", "1", "--visibility", "internal", "--expires_at", "2016-09-26", "--access", "30",
            "--labels", "bug,ui",
        ])
        .unwrap();
        let options = mapped.options();
        assert_eq!(options.visibility, Some(Visibility::Internal));
        assert_eq!(options.expires_at, NaiveDate::from_ymd_opt(2016, 9, 26));
        assert_eq!(options.access, Some(AccessLevel::Developer));
        assert_eq!(
            options.labels,
            Some(Labels(vec!["bug".into(), "ui".into()]))
        );
        // raw value is kept for flag access
        assert_eq!(mapped.string("access"), Some("30"));
    }

    #[test]
    fn test_transform_failure_aborts() {
        let err = run(&["-i", "1", "--expires_at", "not-a-date"]).unwrap_err();
        assert!(matches!(
            err,
            MapError::Transform {
                source: TransformError::InvalidDate { .. },
                ..
            }
        ));

        let err = run(&["-i", "1", "--access", "99"]).unwrap_err();
        assert!(err.to_string().contains("unknown access level: 99"));

        let err = run(&["-i", "1", "--visibility", "secret"]).unwrap_err();
        assert!(err.to_string().contains("unknown visibility: secret"));
    }

    #[test]
    fn test_unbound_flag_not_copied() {
        let mapped = run(&["-i", "1", "--dry_run"]).unwrap();
        assert_eq!(mapped.options(), &Options::default());
        assert_eq!(mapped.boolean("dry_run"), Some(true));
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let mapper = mapper();
        let cmd = mapper.register(Command::new("test"));
        let full = cmd
            .clone()
            .try_get_matches_from(["test", "-i", "1", "--name", "x", "--ids", "1,2", "--labels", "a"])
            .unwrap();
        let bare = cmd.try_get_matches_from(["test", "-i", "2"]).unwrap();

        let first = mapper.map(&full, TransformRegistry::global()).unwrap();
        let between = mapper.map(&bare, TransformRegistry::global()).unwrap();
        let second = mapper.map(&full, TransformRegistry::global()).unwrap();

        assert_eq!(first, second);
        // nothing from the earlier session leaks into the next one
        assert_eq!(between.options(), &Options::default());
        assert!(!between.is_set("name"));
    }

    #[test]
    fn test_unreadable_flag_is_configuration_defect() {
        let mapper = FlagMapper::<Options>::builder("test")
            .bind(FieldSpec::integer("count"), |o: &mut Options, v| o.count = Some(v))
            .build(TransformRegistry::global())
            .unwrap();

        // registered outside the mapper with a different value type
        let matches = Command::new("test")
            .arg(Arg::new("count").long("count"))
            .try_get_matches_from(["test", "--count", "3"])
            .unwrap();
        let err = mapper.map(&matches, TransformRegistry::global()).unwrap_err();
        assert!(matches!(err, MapError::FlagRead { ref flag, .. } if flag == "count"));
        assert!(err.is_configuration_defect());

        // matches from a command that never registered the flag
        let matches = Command::new("other").try_get_matches_from(["other"]).unwrap();
        let err = mapper.map(&matches, TransformRegistry::global()).unwrap_err();
        assert!(matches!(err, MapError::FlagRead { .. }));
        assert!(err.is_configuration_defect());
        assert!(err.to_string().starts_with("cannot read flag --count"));
    }

    #[test]
    fn test_binding_type_mismatch_rejected_at_build() {
        let errors = FlagMapper::<Options>::builder("bad")
            .bind(
                FieldSpec::string("expires_at").with_transform(TransformId::IsoDate),
                |o: &mut Options, v: String| o.name = Some(v),
            )
            .build(TransformRegistry::global())
            .unwrap_err();
        assert_eq!(
            errors,
            vec![DescriptorError::BindingTypeMismatch {
                flag: "expires_at".into(),
                produced: ValueKind::Date,
                accepted: ValueKind::String,
            }]
        );
    }

    #[test]
    fn test_unregistered_transform_rejected_at_build() {
        let errors = FlagMapper::<Options>::builder("bad")
            .bind(
                FieldSpec::string("labels").with_transform(TransformId::Labels),
                |o: &mut Options, v| o.labels = Some(v),
            )
            .build(&TransformRegistry::empty())
            .unwrap_err();
        assert!(matches!(
            errors[0],
            DescriptorError::UnregisteredTransform { .. }
        ));
    }

    #[test]
    fn test_transform_missing_at_map_time() {
        let mapper = mapper();
        let matches = mapper
            .register(Command::new("test"))
            .try_get_matches_from(["test", "-i", "1", "--labels", "a"])
            .unwrap();
        let err = mapper.map(&matches, &TransformRegistry::empty()).unwrap_err();
        assert!(err.is_configuration_defect());
    }

    #[test]
    fn test_help_marks_required() {
        let cmd = mapper().register(Command::new("test"));
        let id = cmd.get_arguments().find(|a| a.get_id() == "id").unwrap();
        assert_eq!(id.get_help().unwrap().to_string(), "(required)");
        assert!(!id.is_required_set());
    }

    #[test]
    fn test_descriptor_lists_fields_in_order() {
        let descriptor = mapper().descriptor(Some("Test command"));
        let names: Vec<&str> = descriptor.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names[..3], ["id", "count", "name"]);
        assert_eq!(descriptor.about.as_deref(), Some("Test command"));
    }
}
