//! `user` commands.

use labctl_api::{CreateUserOptions, ListUsersOptions, PreparedRequest};
use labctl_core::{FieldSpec, FlagMapper, Mapped, TransformRegistry};

use super::{Endpoint, Group};
use crate::error::CliError;

pub fn group(registry: &TransformRegistry) -> Result<Group, CliError> {
    Ok(Group::new("user", "Manage users")
        .leaf(list(registry)?)
        .leaf(get(registry)?)
        .leaf(create(registry)?))
}

fn list(registry: &TransformRegistry) -> Result<Endpoint<ListUsersOptions>, CliError> {
    let builder = FlagMapper::<ListUsersOptions>::builder("user ls")
        .bind(
            FieldSpec::string("username").with_short('u').with_description("Exact username to look up"),
            |o, v| o.username = Some(v),
        )
        .bind(
            FieldSpec::string("search").with_short('s').with_description("Search by name, username or email"),
            |o, v| o.search = Some(v),
        )
        .bind(
            FieldSpec::boolean("active").with_description("Only active users"),
            |o, v| o.active = Some(v),
        )
        .bind(
            FieldSpec::boolean("blocked").with_description("Only blocked users"),
            |o, v| o.blocked = Some(v),
        )
        .bind(
            FieldSpec::boolean("external").with_description("Only external users"),
            |o, v| o.external = Some(v),
        );
    Endpoint::build(
        builder,
        "List users",
        |m| Ok(PreparedRequest::get("/users").with_query(m.options())?),
        registry,
    )
}

/// Looks a user up by ID, or by username through the list endpoint.
fn lookup(mapped: &Mapped<()>) -> Result<PreparedRequest, CliError> {
    match (mapped.integer("id"), mapped.string("username")) {
        (Some(id), None) => Ok(PreparedRequest::get(format!("/users/{id}"))),
        (None, Some(username)) => Ok(PreparedRequest::get("/users").with_param("username", username)),
        _ => Err(CliError::Usage("provide exactly one of --id or --username".to_string())),
    }
}

fn get(registry: &TransformRegistry) -> Result<Endpoint<()>, CliError> {
    let builder = FlagMapper::builder("user get")
        .flag(
            FieldSpec::integer("id")
                .with_short('i')
                .with_description("ID of the user; mandatory unless --username is given"),
        )
        .flag(
            FieldSpec::string("username")
                .with_short('u')
                .with_description("Username of the user; mandatory unless --id is given"),
        );
    Endpoint::build(builder, "Get details of a single user", lookup, registry)
}

fn create(registry: &TransformRegistry) -> Result<Endpoint<CreateUserOptions>, CliError> {
    let builder = FlagMapper::<CreateUserOptions>::builder("user create")
        .bind(
            FieldSpec::string("email").with_short('e').with_description("Email").required(),
            |o, v| o.email = Some(v),
        )
        .bind(
            FieldSpec::string("password").with_short('p').with_description("Password").required(),
            |o, v| o.password = Some(v),
        )
        .bind(
            FieldSpec::string("username").with_short('u').with_description("Username").required(),
            |o, v| o.username = Some(v),
        )
        .bind(
            FieldSpec::string("name").with_short('n').with_description("Name").required(),
            |o, v| o.name = Some(v),
        )
        .bind(
            FieldSpec::string("skype").with_description("Skype ID"),
            |o, v| o.skype = Some(v),
        )
        .bind(
            FieldSpec::string("linkedin").with_description("LinkedIn"),
            |o, v| o.linkedin = Some(v),
        )
        .bind(
            FieldSpec::string("twitter").with_description("Twitter account"),
            |o, v| o.twitter = Some(v),
        )
        .bind(
            FieldSpec::string("website_url").with_description("Website URL"),
            |o, v| o.website_url = Some(v),
        )
        .bind(
            FieldSpec::string("organization").with_description("Organization name"),
            |o, v| o.organization = Some(v),
        )
        .bind(
            FieldSpec::integer("projects_limit").with_description("Number of projects the user can create"),
            |o, v| o.projects_limit = Some(v),
        )
        .bind(
            FieldSpec::string("extern_uid").with_description("External UID"),
            |o, v| o.extern_uid = Some(v),
        )
        .bind(
            FieldSpec::string("provider").with_description("External provider name"),
            |o, v| o.provider = Some(v),
        )
        .bind(
            FieldSpec::string("bio").with_description("Biography"),
            |o, v| o.bio = Some(v),
        )
        .bind(
            FieldSpec::string("location").with_description("Location"),
            |o, v| o.location = Some(v),
        )
        .bind(
            FieldSpec::boolean("admin").with_short('a').with_description("Make the user an admin"),
            |o, v| o.admin = Some(v),
        )
        .bind(
            FieldSpec::boolean("can_create_group").with_description("Allow the user to create groups"),
            |o, v| o.can_create_group = Some(v),
        )
        .bind(
            FieldSpec::boolean("skip_confirmation").with_description("Skip the confirmation email"),
            |o, v| o.skip_confirmation = Some(v),
        )
        .bind(
            FieldSpec::boolean("external").with_description("Flag the user as external"),
            |o, v| o.external = Some(v),
        );
    Endpoint::build(
        builder,
        "Create a new user",
        |m| Ok(PreparedRequest::post("/users").with_body(m.options())?),
        registry,
    )
}
