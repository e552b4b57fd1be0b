//! `issues` commands.

use labctl_api::{CreateIssueOptions, PreparedRequest, project_path};
use labctl_core::{FieldSpec, FlagMapper, TransformId, TransformRegistry};

use super::{Endpoint, Group};
use crate::error::CliError;

pub fn group(registry: &TransformRegistry) -> Result<Group, CliError> {
    let builder = FlagMapper::<CreateIssueOptions>::builder("issues create")
        .flag(
            FieldSpec::string("id")
                .with_short('i')
                .with_description("The ID or URL-encoded path of the project")
                .required(),
        )
        .bind(
            FieldSpec::string("title").with_short('t').with_description("Title of the issue").required(),
            |o, v| o.title = Some(v),
        )
        .bind(
            FieldSpec::string("description").with_short('d').with_description("Description of the issue"),
            |o, v| o.description = Some(v),
        )
        .bind(
            FieldSpec::boolean("confidential").with_short('c').with_description("Mark the issue confidential"),
            |o, v| o.confidential = Some(v),
        )
        .bind(
            FieldSpec::integer_list("assignee_ids")
                .with_short('a')
                .with_description("Comma-separated IDs of the users to assign"),
            |o, v| o.assignee_ids = Some(v),
        )
        .bind(
            FieldSpec::integer("milestone_id").with_short('m').with_description("ID of the milestone"),
            |o, v| o.milestone_id = Some(v),
        )
        .bind(
            FieldSpec::string("labels")
                .with_short('l')
                .with_description("Comma-separated label names")
                .with_transform(TransformId::Labels),
            |o, v| o.labels = Some(v),
        )
        .bind(
            FieldSpec::string("created_at")
                .with_description("Creation date (admins and project owners only), e.g. 2016-03-11")
                .with_transform(TransformId::Time),
            |o, v| o.created_at = Some(v),
        )
        .bind(
            FieldSpec::string("due_date")
                .with_description("Due date, e.g. 2016-03-11")
                .with_transform(TransformId::IsoDate),
            |o, v| o.due_date = Some(v),
        )
        .bind(
            FieldSpec::integer("merge_request_to_resolve_discussions_of")
                .with_description("IID of a merge request whose unresolved discussions this issue resolves"),
            |o, v| o.merge_request_to_resolve_discussions_of = Some(v),
        )
        .bind(
            FieldSpec::string("discussion_to_resolve")
                .with_description("ID of a single discussion to resolve; needs the merge request flag"),
            |o, v| o.discussion_to_resolve = Some(v),
        );

    let create = Endpoint::build(
        builder,
        "Create a new project issue",
        |m| {
            let project = project_path(m.require_string("id")?);
            Ok(PreparedRequest::post(format!("{project}/issues")).with_body(m.options())?)
        },
        registry,
    )?;

    Ok(Group::new("issues", "Manage project issues").leaf(create))
}
