//! `branches` commands.

use labctl_api::{
    CreateBranchOptions, ListBranchesOptions, PreparedRequest, ProtectBranchOptions, project_path, segment,
};
use labctl_core::{FieldSpec, FlagMapper, Mapped, TransformRegistry};

use super::{Endpoint, Group};
use crate::error::CliError;

fn id() -> FieldSpec {
    FieldSpec::string("id")
        .with_short('i')
        .with_description("The ID or URL-encoded path of the project")
        .required()
}

fn branch() -> FieldSpec {
    FieldSpec::string("branch")
        .with_short('b')
        .with_description("The name of the branch")
        .required()
}

fn branches_path(mapped: &Mapped<impl Sized>) -> Result<String, CliError> {
    Ok(format!("{}/repository/branches", project_path(mapped.require_string("id")?)))
}

fn branch_path(mapped: &Mapped<impl Sized>) -> Result<String, CliError> {
    let name = segment(mapped.require_string("branch")?);
    Ok(format!("{}/{name}", branches_path(mapped)?))
}

pub fn group(registry: &TransformRegistry) -> Result<Group, CliError> {
    let list = Endpoint::build(
        FlagMapper::<ListBranchesOptions>::builder("branches list").flag(id()).bind(
            FieldSpec::string("search").with_short('s').with_description("Only branches containing this string"),
            |o, v| o.search = Some(v),
        ),
        "List repository branches",
        |m| Ok(PreparedRequest::get(branches_path(m)?).with_query(m.options())?),
        registry,
    )?;

    let get = Endpoint::build(
        FlagMapper::builder("branches get").flag(id()).flag(branch()),
        "Get a single repository branch",
        |m: &Mapped<()>| Ok(PreparedRequest::get(branch_path(m)?)),
        registry,
    )?;

    let protect = Endpoint::build(
        FlagMapper::<ProtectBranchOptions>::builder("branches protect")
            .flag(id())
            .flag(branch())
            .bind(
                FieldSpec::boolean("developers_can_push")
                    .with_short('p')
                    .with_description("Whether developers can push to the branch"),
                |o, v| o.developers_can_push = Some(v),
            )
            .bind(
                FieldSpec::boolean("developers_can_merge")
                    .with_short('m')
                    .with_description("Whether developers can merge into the branch"),
                |o, v| o.developers_can_merge = Some(v),
            ),
        "Protect a repository branch",
        |m| Ok(PreparedRequest::put(format!("{}/protect", branch_path(m)?)).with_body(m.options())?),
        registry,
    )?;

    let unprotect = Endpoint::build(
        FlagMapper::builder("branches unprotect").flag(id()).flag(branch()),
        "Unprotect a repository branch",
        |m: &Mapped<()>| Ok(PreparedRequest::put(format!("{}/unprotect", branch_path(m)?))),
        registry,
    )?;

    let create = Endpoint::build(
        FlagMapper::<CreateBranchOptions>::builder("branches create")
            .flag(id())
            .bind(branch(), |o, v| o.branch = Some(v))
            .bind(
                FieldSpec::string("ref")
                    .with_short('r')
                    .with_description("Branch name or commit SHA to create the branch from")
                    .required(),
                |o, v| o.reference = Some(v),
            ),
        "Create a repository branch",
        |m| Ok(PreparedRequest::post(branches_path(m)?).with_body(m.options())?),
        registry,
    )?;

    let delete = Endpoint::build(
        FlagMapper::builder("branches delete").flag(id()).flag(branch()),
        "Delete a repository branch",
        |m: &Mapped<()>| Ok(PreparedRequest::delete(branch_path(m)?)),
        registry,
    )?;

    let delete_merged = Endpoint::build(
        FlagMapper::builder("branches delete-merged").flag(id()),
        "Delete every branch merged into the default branch; protected branches are kept",
        |m: &Mapped<()>| {
            let project = project_path(m.require_string("id")?);
            Ok(PreparedRequest::delete(format!("{project}/repository/merged_branches")))
        },
        registry,
    )?;

    Ok(Group::new("branches", "Manage repository branches")
        .alias("branch")
        .leaf(list)
        .leaf(get)
        .leaf(protect)
        .leaf(unprotect)
        .leaf(create)
        .leaf(delete)
        .leaf(delete_merged))
}

#[cfg(test)]
mod tests {
    use clap::Command;
    use labctl_api::Method;
    use serde_json::json;

    use super::*;

    fn prepare(args: &[&str]) -> Result<PreparedRequest, CliError> {
        let group = group(TransformRegistry::global()).unwrap();
        let argv = std::iter::once("branches").chain(args.iter().copied());
        let matches = Command::new("branches")
            .subcommands(group.subcommands())
            .try_get_matches_from(argv)
            .unwrap();
        let (action, leaf) = group.find(&matches).unwrap();
        action.prepare(leaf, TransformRegistry::global())
    }

    #[test]
    fn test_branch_names_are_encoded() {
        let request = prepare(&["delete", "-i", "group/app", "-b", "feature/login"]).unwrap();
        assert_eq!(request.method, Method::Delete);
        assert_eq!(
            request.path,
            "/projects/group%2Fapp/repository/branches/feature%2Flogin"
        );
    }

    #[test]
    fn test_protect_body_only_has_supplied_flags() {
        let request = prepare(&["protect", "-i", "7", "-b", "main", "-p"]).unwrap();
        assert_eq!(request.path, "/projects/7/repository/branches/main/protect");
        assert_eq!(request.body, Some(json!({"developers_can_push": true})));
    }

    #[test]
    fn test_create_requires_ref() {
        let err = prepare(&["create", "-i", "7", "-b", "topic"]).unwrap_err();
        assert_eq!(err.to_string(), "required flag --ref was not provided");

        let request = prepare(&["create", "-i", "7", "-b", "topic", "-r", "main"]).unwrap();
        assert_eq!(request.body, Some(json!({"branch": "topic", "ref": "main"})));
    }

    #[test]
    fn test_delete_merged() {
        let request = prepare(&["delete-merged", "-i", "7"]).unwrap();
        assert_eq!(request.path, "/projects/7/repository/merged_branches");
    }
}
