//! Command tree.
//!
//! Every leaf command is an [`Endpoint`]: a flag mapper for its flags plus
//! a function turning the mapped options into a [`PreparedRequest`]. Groups
//! nest leaves and other groups and only exist to route to a leaf.

mod branches;
mod commits;
mod issues;
mod namespaces;
mod project;
mod users;

use clap::{ArgMatches, Command};
use labctl_api::PreparedRequest;
use labctl_core::{CommandDescriptor, FlagMapper, Mapped, MapperBuilder, TransformRegistry};
use tracing::debug;

use crate::error::CliError;

/// A runnable leaf command.
pub trait Action {
    /// Subcommand name as typed on the command line.
    fn name(&self) -> &str;

    fn command(&self) -> Command;

    fn descriptor(&self) -> CommandDescriptor;

    /// Maps the leaf's flags and builds the request they describe.
    fn prepare(&self, matches: &ArgMatches, registry: &TransformRegistry) -> Result<PreparedRequest, CliError>;
}

/// Builds a request from a finished mapping session.
pub type Prepare<O> = fn(&Mapped<O>) -> Result<PreparedRequest, CliError>;

/// Leaf command backed by a flag mapper into options type `O`.
pub struct Endpoint<O> {
    about: &'static str,
    mapper: FlagMapper<O>,
    prepare: Prepare<O>,
}

impl<O: Default + 'static> Endpoint<O> {
    /// Finishes `builder` against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Descriptor`] if the flags descriptor or one of
    /// its bindings is invalid, including flags that clash with the global
    /// `--config` and `-v/--verbose`.
    pub fn build(
        builder: MapperBuilder<O>,
        about: &'static str,
        prepare: Prepare<O>,
        registry: &TransformRegistry,
    ) -> Result<Self, CliError> {
        let command = builder.command().to_string();
        let mapper = builder
            .reserve(crate::GLOBAL_FLAGS.clone())
            .build(registry)
            .map_err(|errors| CliError::Descriptor { command, errors })?;
        Ok(Self {
            about,
            mapper,
            prepare,
        })
    }
}

impl<O: Default + 'static> Action for Endpoint<O> {
    fn name(&self) -> &str {
        let path = self.mapper.command();
        path.rsplit(' ').next().unwrap_or(path)
    }

    fn command(&self) -> Command {
        self.mapper
            .register(Command::new(self.name().to_string()).about(self.about))
    }

    fn descriptor(&self) -> CommandDescriptor {
        self.mapper.descriptor(Some(self.about))
    }

    fn prepare(&self, matches: &ArgMatches, registry: &TransformRegistry) -> Result<PreparedRequest, CliError> {
        debug!(command = %self.mapper.command(), "Mapping flags");
        let mapped = self.mapper.map(matches, registry)?;
        (self.prepare)(&mapped)
    }
}

enum Node {
    Leaf(Box<dyn Action>),
    Group(Group),
}

/// A named set of subcommands that requires one of them to be chosen.
pub struct Group {
    name: &'static str,
    about: &'static str,
    aliases: Vec<&'static str>,
    children: Vec<Node>,
}

impl Group {
    pub fn new(name: &'static str, about: &'static str) -> Self {
        Self {
            name,
            about,
            aliases: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: &'static str) -> Self {
        self.aliases.push(alias);
        self
    }

    pub fn leaf(mut self, action: impl Action + 'static) -> Self {
        self.children.push(Node::Leaf(Box::new(action)));
        self
    }

    pub fn group(mut self, group: Group) -> Self {
        self.children.push(Node::Group(group));
        self
    }

    /// The clap subcommands of this group.
    pub fn subcommands(&self) -> Vec<Command> {
        self.children
            .iter()
            .map(|child| match child {
                Node::Leaf(action) => action.command(),
                Node::Group(group) => group.command(),
            })
            .collect()
    }

    pub fn command(&self) -> Command {
        Command::new(self.name)
            .about(self.about)
            .visible_aliases(self.aliases.iter().copied())
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommands(self.subcommands())
    }

    /// Follows the chosen subcommands down to a leaf.
    pub fn find<'a>(&'a self, matches: &'a ArgMatches) -> Option<(&'a dyn Action, &'a ArgMatches)> {
        let (name, sub) = matches.subcommand()?;
        self.children.iter().find_map(|child| match child {
            Node::Leaf(action) if action.name() == name => Some((action.as_ref(), sub)),
            Node::Group(group) if group.name == name => group.find(sub),
            _ => None,
        })
    }

    /// Descriptors of every leaf below this group, depth first.
    pub fn descriptors(&self) -> Vec<CommandDescriptor> {
        self.children
            .iter()
            .flat_map(|child| match child {
                Node::Leaf(action) => vec![action.descriptor()],
                Node::Group(group) => group.descriptors(),
            })
            .collect()
    }
}

/// Builds every command group.
///
/// # Errors
///
/// Fails on the first command whose flags descriptor is invalid.
pub fn root(registry: &TransformRegistry) -> Result<Group, CliError> {
    Ok(Group::new("labctl", "")
        .group(project::group(registry)?)
        .group(branches::group(registry)?)
        .group(namespaces::group(registry)?)
        .group(users::group(registry)?)
        .group(issues::group(registry)?)
        .group(commits::group(registry)?))
}

#[cfg(test)]
mod tests {
    use labctl_core::{DescriptorError, FieldSpec, TransformId};

    use super::*;

    fn cli() -> (Group, Command) {
        let tree = root(TransformRegistry::global()).unwrap();
        let command = crate::app(&tree);
        (tree, command)
    }

    fn leaf_paths(descriptors: &[CommandDescriptor]) -> Vec<&str> {
        descriptors.iter().map(|d| d.command.as_str()).collect()
    }

    #[test]
    fn test_tree_builds_and_passes_clap_checks() {
        let (_, command) = cli();
        command.debug_assert();
    }

    #[test]
    fn test_every_leaf_is_described() {
        let (tree, _) = cli();
        let descriptors = tree.descriptors();
        let paths = leaf_paths(&descriptors);
        for expected in [
            "project ls",
            "project upload-file",
            "project hooks add",
            "project forks create",
            "project forks delete",
            "branches delete-merged",
            "namespaces ls",
            "user get",
            "issues create",
            "commits create",
        ] {
            assert!(paths.contains(&expected), "{expected} missing");
        }
    }

    #[test]
    fn test_find_routes_through_aliases() {
        let (tree, command) = cli();
        let matches = command
            .try_get_matches_from(["labctl", "branch", "get", "-i", "7", "-b", "main"])
            .unwrap();
        let (action, leaf) = tree.find(&matches).unwrap();
        assert_eq!(action.name(), "get");

        let request = action.prepare(leaf, TransformRegistry::global()).unwrap();
        assert_eq!(request.path, "/projects/7/repository/branches/main");
    }

    #[test]
    fn test_group_requires_subcommand() {
        let (_, command) = cli();
        assert!(command.try_get_matches_from(["labctl", "project"]).is_err());
    }

    #[test]
    fn test_global_flags_are_reserved() {
        let builder = FlagMapper::<()>::builder("project watch").flag(FieldSpec::boolean("visible").with_short('v'));
        let Err(err) = Endpoint::build(builder, "", |_| Ok(PreparedRequest::get("/")), TransformRegistry::global())
        else {
            panic!("-v belongs to --verbose");
        };
        assert!(matches!(
            err,
            CliError::Descriptor { ref errors, .. } if errors == &[DescriptorError::ReservedShort('v')]
        ));

        let builder = FlagMapper::<()>::builder("project watch").flag(FieldSpec::string("config"));
        let Err(err) = Endpoint::build(builder, "", |_| Ok(PreparedRequest::get("/")), TransformRegistry::global())
        else {
            panic!("--config is global");
        };
        assert!(err.to_string().contains("flag --config is reserved"));
        assert_eq!(err.exit_code(), crate::error::EXIT_SOFTWARE);
    }

    #[test]
    fn test_invalid_descriptor_is_reported() {
        let builder = FlagMapper::<()>::builder("broken")
            .flag(FieldSpec::integer("labels").with_transform(TransformId::Labels));
        let result = Endpoint::build(builder, "", |_| Ok(PreparedRequest::get("/")), TransformRegistry::global());
        let Err(err) = result else {
            panic!("expected a descriptor error");
        };
        assert!(matches!(err, CliError::Descriptor { ref command, .. } if command == "broken"));
        assert_eq!(err.exit_code(), crate::error::EXIT_SOFTWARE);
    }
}
