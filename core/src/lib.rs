//! Declarative mapping of command-line flags into API request options.
//!
//! This crate defines how a command's flags are described, registered with
//! clap, validated, and copied into the options value an API call consumes:
//!
//! - [`FieldSpec`]: one flag with its name, short alias, [`FlagKind`],
//!   required marker, help text and optional [`TransformId`].
//! - [`FlagMapper`]: a command's descriptors plus explicit bindings into an
//!   options type; registers the flags and maps parsed values.
//! - [`TransformRegistry`]: named string-to-[`Value`] conversions (dates,
//!   visibility and access levels, label lists, commit actions).
//! - [`validate_fields`]: structural checks run when a mapper is built.
//!
//! # Example
//!
//! ```
//! use clap::Command;
//! use labctl_core::*;
//!
//! #[derive(Debug, Default)]
//! struct ListOptions {
//!     archived: Option<bool>,
//!     visibility: Option<Visibility>,
//! }
//!
//! let mapper = FlagMapper::<ListOptions>::builder("project ls")
//!     .bind(FieldSpec::boolean("archived"), |o, v| o.archived = Some(v))
//!     .bind(
//!         FieldSpec::string("visibility").with_transform(TransformId::Visibility),
//!         |o, v| o.visibility = Some(v),
//!     )
//!     .build(TransformRegistry::global())
//!     .unwrap();
//!
//! let matches = mapper
//!     .register(Command::new("ls"))
//!     .try_get_matches_from(["ls", "--visibility", "public"])
//!     .unwrap();
//! let options = mapper.map(&matches, TransformRegistry::global()).unwrap().into_options();
//!
//! assert_eq!(options.archived, None);
//! assert_eq!(options.visibility, Some(Visibility::Public));
//! ```

mod error;
mod mapper;
mod transform;
mod types;
mod validate;
mod values;

pub use error::{MapError, TransformError};
pub use mapper::{FlagMapper, MapperBuilder, Mapped};
pub use transform::{DATE_FORMAT, TransformFn, TransformRegistry};
pub use types::*;
pub use validate::{DescriptorError, ReservedFlags, validate_fields, validate_fields_with};
pub use values::{AccessLevel, CommitAction, FileAction, Labels, Visibility};
