//! `project` commands.

use labctl_api::{
    CreateProjectOptions, EditProjectOptions, ForkProjectOptions, GetProjectOptions, HasProjectSettings,
    ListProjectsOptions, PreparedRequest, ProjectHookOptions, ShareWithGroupOptions, project_path,
};
use labctl_core::{FieldSpec, FlagMapper, Mapped, MapperBuilder, TransformId, TransformRegistry};

use super::{Endpoint, Group, Prepare};
use crate::error::CliError;

const ID_HELP: &str = "The ID or URL-encoded path of the project";

fn id() -> FieldSpec {
    FieldSpec::string("id").with_short('i').with_description(ID_HELP).required()
}

fn project(mapped: &Mapped<impl Sized>) -> Result<String, CliError> {
    Ok(project_path(mapped.require_string("id")?))
}

pub fn group(registry: &TransformRegistry) -> Result<Group, CliError> {
    Ok(Group::new("project", "Manage projects")
        .leaf(list(registry)?)
        .leaf(get(registry)?)
        .leaf(create(registry)?)
        .leaf(edit(registry)?)
        .leaf(id_only(
            "project delete",
            "Remove a project and everything it owns",
            |m| Ok(PreparedRequest::delete(project(m)?)),
            registry,
        )?)
        .leaf(fork(registry)?)
        .leaf(list_forks(registry)?)
        .leaf(id_only(
            "project star",
            "Star a project",
            |m| Ok(PreparedRequest::post(format!("{}/star", project(m)?))),
            registry,
        )?)
        .leaf(id_only(
            "project unstar",
            "Unstar a project",
            |m| Ok(PreparedRequest::post(format!("{}/unstar", project(m)?))),
            registry,
        )?)
        .leaf(id_only(
            "project archive",
            "Archive a project",
            |m| Ok(PreparedRequest::post(format!("{}/archive", project(m)?))),
            registry,
        )?)
        .leaf(id_only(
            "project unarchive",
            "Unarchive a project",
            |m| Ok(PreparedRequest::post(format!("{}/unarchive", project(m)?))),
            registry,
        )?)
        .leaf(share(registry)?)
        .leaf(unshare(registry)?)
        .leaf(upload_file(registry)?)
        .group(hooks(registry)?)
        .group(forks(registry)?))
}

fn id_only(
    command: &'static str,
    about: &'static str,
    prepare: Prepare<()>,
    registry: &TransformRegistry,
) -> Result<Endpoint<()>, CliError> {
    Endpoint::build(FlagMapper::builder(command).flag(id()), about, prepare, registry)
}

/// Filters shared by `ls` and `list-forks`.
fn list_filters(builder: MapperBuilder<ListProjectsOptions>) -> MapperBuilder<ListProjectsOptions> {
    builder
        .bind(
            FieldSpec::boolean("archived").with_description("Limit by archived status"),
            |o, v| o.archived = Some(v),
        )
        .bind(
            FieldSpec::string("visibility")
                .with_description("Limit by visibility: public, internal or private")
                .with_transform(TransformId::Visibility),
            |o, v| o.visibility = Some(v),
        )
        .bind(
            FieldSpec::string("order_by")
                .with_description("Order by id, name, path, created_at, updated_at or last_activity_at"),
            |o, v| o.order_by = Some(v),
        )
        .bind(
            FieldSpec::string("sort").with_description("Sort in asc or desc order"),
            |o, v| o.sort = Some(v),
        )
        .bind(
            FieldSpec::string("search").with_description("Return projects matching the search criteria"),
            |o, v| o.search = Some(v),
        )
        .bind(
            FieldSpec::boolean("simple").with_description("Return only ID, URL, name and path"),
            |o, v| o.simple = Some(v),
        )
        .bind(
            FieldSpec::boolean("owned").with_description("Limit to projects owned by the current user"),
            |o, v| o.owned = Some(v),
        )
        .bind(
            FieldSpec::boolean("membership").with_description("Limit to projects the current user is a member of"),
            |o, v| o.membership = Some(v),
        )
        .bind(
            FieldSpec::boolean("starred").with_description("Limit to projects starred by the current user"),
            |o, v| o.starred = Some(v),
        )
        .bind(
            FieldSpec::boolean("statistics").with_description("Include project statistics"),
            |o, v| o.statistics = Some(v),
        )
        .bind(
            FieldSpec::boolean("with_issues_enabled").with_description("Limit by enabled issues feature"),
            |o, v| o.with_issues_enabled = Some(v),
        )
        .bind(
            FieldSpec::boolean("with_merge_requests_enabled")
                .with_description("Limit by enabled merge requests feature"),
            |o, v| o.with_merge_requests_enabled = Some(v),
        )
}

fn list(registry: &TransformRegistry) -> Result<Endpoint<ListProjectsOptions>, CliError> {
    Endpoint::build(
        list_filters(FlagMapper::builder("project ls")),
        "List all projects visible to the authenticated user",
        |m| Ok(PreparedRequest::get("/projects").with_query(m.options())?),
        registry,
    )
}

fn list_forks(registry: &TransformRegistry) -> Result<Endpoint<ListProjectsOptions>, CliError> {
    Endpoint::build(
        list_filters(FlagMapper::builder("project list-forks").flag(id())),
        "List forks of a project",
        |m| Ok(PreparedRequest::get(format!("{}/forks", project(m)?)).with_query(m.options())?),
        registry,
    )
}

fn get(registry: &TransformRegistry) -> Result<Endpoint<GetProjectOptions>, CliError> {
    let builder = FlagMapper::<GetProjectOptions>::builder("project get")
        .flag(FieldSpec::string("id").with_short('i').required().with_description(
            "Either the numeric project ID or 'namespace/project-name'",
        ))
        .bind(
            FieldSpec::boolean("statistics").with_short('s').with_description("Include project statistics"),
            |o, v| o.statistics = Some(v),
        );
    Endpoint::build(
        builder,
        "Get detailed information for a project",
        |m| Ok(PreparedRequest::get(project(m)?).with_query(m.options())?),
        registry,
    )
}

/// Binds every [`ProjectSettings`](labctl_api::ProjectSettings) flag except `name`.
fn settings<O: HasProjectSettings + Default + 'static>(builder: MapperBuilder<O>) -> MapperBuilder<O> {
    builder
        .bind(
            FieldSpec::string("path").with_description("Repository name; generated from the name by default"),
            |o: &mut O, v| o.settings_mut().path = Some(v),
        )
        .bind(
            FieldSpec::string("default_branch").with_description("Default branch (master by default)"),
            |o: &mut O, v| o.settings_mut().default_branch = Some(v),
        )
        .bind(
            FieldSpec::string("description").with_description("Short project description"),
            |o: &mut O, v| o.settings_mut().description = Some(v),
        )
        .bind(
            FieldSpec::boolean("issues_enabled").with_description("Enable issues"),
            |o: &mut O, v| o.settings_mut().issues_enabled = Some(v),
        )
        .bind(
            FieldSpec::boolean("merge_requests_enabled").with_description("Enable merge requests"),
            |o: &mut O, v| o.settings_mut().merge_requests_enabled = Some(v),
        )
        .bind(
            FieldSpec::boolean("jobs_enabled").with_description("Enable jobs"),
            |o: &mut O, v| o.settings_mut().jobs_enabled = Some(v),
        )
        .bind(
            FieldSpec::boolean("wiki_enabled").with_description("Enable the wiki"),
            |o: &mut O, v| o.settings_mut().wiki_enabled = Some(v),
        )
        .bind(
            FieldSpec::boolean("snippets_enabled").with_description("Enable snippets"),
            |o: &mut O, v| o.settings_mut().snippets_enabled = Some(v),
        )
        .bind(
            FieldSpec::boolean("resolve_outdated_diff_discussions")
                .with_description("Resolve diff discussions on lines changed with a push"),
            |o: &mut O, v| o.settings_mut().resolve_outdated_diff_discussions = Some(v),
        )
        .bind(
            FieldSpec::boolean("container_registry_enabled").with_description("Enable the container registry"),
            |o: &mut O, v| o.settings_mut().container_registry_enabled = Some(v),
        )
        .bind(
            FieldSpec::boolean("shared_runners_enabled").with_description("Enable shared runners"),
            |o: &mut O, v| o.settings_mut().shared_runners_enabled = Some(v),
        )
        .bind(
            FieldSpec::string("visibility")
                .with_description("Project visibility: private, internal or public")
                .with_transform(TransformId::Visibility),
            |o: &mut O, v| o.settings_mut().visibility = Some(v),
        )
        .bind(
            FieldSpec::string("import_url").with_description("URL to import the repository from"),
            |o: &mut O, v| o.settings_mut().import_url = Some(v),
        )
        .bind(
            FieldSpec::boolean("public_jobs").with_description("Let non-members view jobs"),
            |o: &mut O, v| o.settings_mut().public_jobs = Some(v),
        )
        .bind(
            FieldSpec::boolean("only_allow_merge_if_pipeline_succeeds")
                .with_description("Only merge when the pipeline succeeded"),
            |o: &mut O, v| o.settings_mut().only_allow_merge_if_pipeline_succeeds = Some(v),
        )
        .bind(
            FieldSpec::boolean("only_allow_merge_if_all_discussions_are_resolved")
                .with_description("Only merge when all discussions are resolved"),
            |o: &mut O, v| o.settings_mut().only_allow_merge_if_all_discussions_are_resolved = Some(v),
        )
        .bind(
            FieldSpec::boolean("lfs_enabled").with_description("Enable LFS"),
            |o: &mut O, v| o.settings_mut().lfs_enabled = Some(v),
        )
        .bind(
            FieldSpec::boolean("request_access_enabled").with_description("Allow users to request access"),
            |o: &mut O, v| o.settings_mut().request_access_enabled = Some(v),
        )
        .bind(
            FieldSpec::string_list("tag_list").with_description("Tag for the project; repeat for several"),
            |o: &mut O, v| o.settings_mut().tag_list = Some(v),
        )
        .bind(
            FieldSpec::boolean("printing_merge_request_link_enabled")
                .with_description("Show the merge request link when pushing from the command line"),
            |o: &mut O, v| o.settings_mut().printing_merge_request_link_enabled = Some(v),
        )
        .bind(
            FieldSpec::string("ci_config_path").with_description("Path to the CI configuration file"),
            |o: &mut O, v| o.settings_mut().ci_config_path = Some(v),
        )
}

fn create(registry: &TransformRegistry) -> Result<Endpoint<CreateProjectOptions>, CliError> {
    let builder = FlagMapper::<CreateProjectOptions>::builder("project create")
        .bind(
            FieldSpec::string("name").with_short('n').with_description("Name of the new project").required(),
            |o, v| o.settings.name = Some(v),
        )
        .bind(
            FieldSpec::integer("namespace_id")
                .with_description("Namespace (group) ID; defaults to the current user's namespace"),
            |o, v| o.namespace_id = Some(v),
        );
    Endpoint::build(
        settings(builder),
        "Create a new project",
        |m| Ok(PreparedRequest::post("/projects").with_body(m.options())?),
        registry,
    )
}

fn edit(registry: &TransformRegistry) -> Result<Endpoint<EditProjectOptions>, CliError> {
    let builder = FlagMapper::<EditProjectOptions>::builder("project edit")
        .flag(id())
        .bind(
            FieldSpec::string("name").with_short('n').with_description("New name of the project"),
            |o, v| o.settings.name = Some(v),
        );
    Endpoint::build(
        settings(builder),
        "Update an existing project",
        |m| Ok(PreparedRequest::put(project(m)?).with_body(m.options())?),
        registry,
    )
}

fn fork(registry: &TransformRegistry) -> Result<Endpoint<ForkProjectOptions>, CliError> {
    let builder = FlagMapper::builder("project fork").flag(id()).bind(
        FieldSpec::string("namespace")
            .with_short('n')
            .with_description("ID or path of the namespace to fork into")
            .required(),
        |o: &mut ForkProjectOptions, v| o.namespace = Some(v),
    );
    Endpoint::build(
        builder,
        "Fork a project",
        |m| Ok(PreparedRequest::post(format!("{}/fork", project(m)?)).with_body(m.options())?),
        registry,
    )
}

fn share(registry: &TransformRegistry) -> Result<Endpoint<ShareWithGroupOptions>, CliError> {
    let builder = FlagMapper::<ShareWithGroupOptions>::builder("project share")
        .flag(id())
        .bind(
            FieldSpec::integer("group_id")
                .with_short('g')
                .with_description("ID of the group to share with")
                .required(),
            |o, v| o.group_id = Some(v),
        )
        .bind(
            FieldSpec::string("group_access")
                .with_short('a')
                .with_description("Access level to grant: 10, 20, 30, 40 or 50")
                .with_transform(TransformId::AccessLevel)
                .required(),
            |o, v| o.group_access = Some(v),
        )
        .bind(
            FieldSpec::string("expires_at")
                .with_short('e')
                .with_description("Share expiration date, e.g. 2016-09-26")
                .with_transform(TransformId::IsoDate),
            |o, v| o.expires_at = Some(v),
        );
    Endpoint::build(
        builder,
        "Share a project with a group",
        |m| Ok(PreparedRequest::post(format!("{}/share", project(m)?)).with_body(m.options())?),
        registry,
    )
}

fn unshare(registry: &TransformRegistry) -> Result<Endpoint<()>, CliError> {
    let builder = FlagMapper::builder("project unshare").flag(id()).flag(
        FieldSpec::integer("group_id")
            .with_short('g')
            .with_description("ID of the group")
            .required(),
    );
    Endpoint::build(
        builder,
        "Stop sharing a project with a group",
        |m| {
            let group = m.require_integer("group_id")?;
            Ok(PreparedRequest::delete(format!("{}/share/{group}", project(m)?)))
        },
        registry,
    )
}

fn upload_file(registry: &TransformRegistry) -> Result<Endpoint<()>, CliError> {
    let builder = FlagMapper::builder("project upload-file").flag(id()).flag(
        FieldSpec::string("file")
            .with_short('f')
            .with_description("Path of the local file to upload")
            .required(),
    );
    Endpoint::build(
        builder,
        "Upload a file for use in issue or merge request descriptions and comments",
        |m: &Mapped<()>| {
            let file = m.require_string("file")?;
            Ok(PreparedRequest::post(format!("{}/uploads", project(m)?)).with_upload(file)?)
        },
        registry,
    )
}

/// Admin-only fork relations; both take the numeric project ID.
fn forks(registry: &TransformRegistry) -> Result<Group, CliError> {
    let numeric_id = || {
        FieldSpec::integer("id")
            .with_short('i')
            .with_description("The numeric ID of the project")
            .required()
    };

    let create = Endpoint::build(
        FlagMapper::builder("project forks create").flag(numeric_id()).flag(
            FieldSpec::integer("forked_from_id")
                .with_short('f')
                .with_description("The ID of the project it was forked from")
                .required(),
        ),
        "Create a forked from/to relation between existing projects",
        |m: &Mapped<()>| {
            let id = m.require_integer("id")?;
            let from = m.require_integer("forked_from_id")?;
            Ok(PreparedRequest::post(format!("/projects/{id}/fork/{from}")))
        },
        registry,
    )?;

    let delete = Endpoint::build(
        FlagMapper::builder("project forks delete").flag(numeric_id()),
        "Delete an existing forked from relationship",
        |m: &Mapped<()>| Ok(PreparedRequest::delete(format!("/projects/{}/fork", m.require_integer("id")?))),
        registry,
    )?;

    Ok(Group::new("forks", "Administer fork relations between existing projects")
        .leaf(create)
        .leaf(delete))
}

fn hook_id() -> FieldSpec {
    FieldSpec::integer("hook_id").with_description("ID of the project hook").required()
}

fn hook_path(mapped: &Mapped<impl Sized>) -> Result<String, CliError> {
    let hook = mapped.require_integer("hook_id")?;
    Ok(format!("{}/hooks/{hook}", project(mapped)?))
}

fn hook_fields(builder: MapperBuilder<ProjectHookOptions>) -> MapperBuilder<ProjectHookOptions> {
    builder
        .bind(
            FieldSpec::string("url").with_short('u').with_description("The hook URL").required(),
            |o, v| o.url = Some(v),
        )
        .bind(
            FieldSpec::boolean("push_events").with_description("Trigger on push events"),
            |o, v| o.push_events = Some(v),
        )
        .bind(
            FieldSpec::boolean("issues_events").with_description("Trigger on issues events"),
            |o, v| o.issues_events = Some(v),
        )
        .bind(
            FieldSpec::boolean("merge_requests_events").with_description("Trigger on merge request events"),
            |o, v| o.merge_requests_events = Some(v),
        )
        .bind(
            FieldSpec::boolean("tag_push_events").with_description("Trigger on tag push events"),
            |o, v| o.tag_push_events = Some(v),
        )
        .bind(
            FieldSpec::boolean("note_events").with_description("Trigger on note events"),
            |o, v| o.note_events = Some(v),
        )
        .bind(
            FieldSpec::boolean("job_events").with_description("Trigger on job events"),
            |o, v| o.job_events = Some(v),
        )
        .bind(
            FieldSpec::boolean("pipeline_events").with_description("Trigger on pipeline events"),
            |o, v| o.pipeline_events = Some(v),
        )
        .bind(
            FieldSpec::boolean("wiki_events").with_description("Trigger on wiki events"),
            |o, v| o.wiki_events = Some(v),
        )
        .bind(
            FieldSpec::boolean("enable_ssl_verification").with_description("Verify SSL when triggering the hook"),
            |o, v| o.enable_ssl_verification = Some(v),
        )
        .bind(
            FieldSpec::string("token").with_description("Secret token to validate received payloads"),
            |o, v| o.token = Some(v),
        )
}

fn hooks(registry: &TransformRegistry) -> Result<Group, CliError> {
    let list = id_only(
        "project hooks ls",
        "List project hooks",
        |m| Ok(PreparedRequest::get(format!("{}/hooks", project(m)?))),
        registry,
    )?;

    let get = Endpoint::build(
        FlagMapper::builder("project hooks get").flag(id()).flag(hook_id()),
        "Get a project hook",
        |m: &Mapped<()>| Ok(PreparedRequest::get(hook_path(m)?)),
        registry,
    )?;

    let add = Endpoint::build(
        hook_fields(FlagMapper::builder("project hooks add").flag(id())),
        "Add a hook to a project",
        |m| Ok(PreparedRequest::post(format!("{}/hooks", project(m)?)).with_body(m.options())?),
        registry,
    )?;

    let edit = Endpoint::build(
        hook_fields(FlagMapper::builder("project hooks edit").flag(id()).flag(hook_id())),
        "Edit a project hook",
        |m| Ok(PreparedRequest::put(hook_path(m)?).with_body(m.options())?),
        registry,
    )?;

    let delete = Endpoint::build(
        FlagMapper::builder("project hooks delete").flag(id()).flag(hook_id()),
        "Remove a hook from a project",
        |m: &Mapped<()>| Ok(PreparedRequest::delete(hook_path(m)?)),
        registry,
    )?;

    Ok(Group::new("hooks", "Manage project hooks")
        .leaf(list)
        .leaf(get)
        .leaf(add)
        .leaf(edit)
        .leaf(delete))
}
