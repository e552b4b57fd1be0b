//! `namespaces` commands.

use labctl_api::{ListNamespacesOptions, PreparedRequest};
use labctl_core::{FieldSpec, FlagMapper, TransformRegistry};

use super::{Endpoint, Group};
use crate::error::CliError;

pub fn group(registry: &TransformRegistry) -> Result<Group, CliError> {
    let list = Endpoint::build(
        FlagMapper::<ListNamespacesOptions>::builder("namespaces ls").bind(
            FieldSpec::string("search")
                .with_short('s')
                .with_description("Only namespaces whose name or path contains this string"),
            |o, v| o.search = Some(v),
        ),
        "List namespaces of the current user (all namespaces for admins)",
        |m| Ok(PreparedRequest::get("/namespaces").with_query(m.options())?),
        registry,
    )?;

    Ok(Group::new("namespaces", "Manage namespaces").leaf(list))
}
