//! The command tree: an arena of nodes rooted at a hidden group.
//!
//! Nodes are stored by index; children and parent links are [`NodeId`]s, so
//! the tree owns every node exactly once. The tree is assembled before the
//! first dispatch and is not restructured afterwards.

use std::iter;

use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::argument::Argument;
use crate::error::{CallbackResult, PromptrError};
use crate::node::{Node, NodeId, NodeKind, NodeSpec};
use crate::dispatch::Call;
use crate::template;

/// Name of the root group. It is never matched against user input.
pub const ROOT_NAME: &str = "_root";

pub struct CommandTree {
    nodes: Vec<Node>,
}

impl Default for CommandTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTree {
    /// A tree holding the root group and its `exit` command.
    pub fn new() -> Self {
        let mut tree = CommandTree { nodes: Vec::new() };
        tree.nodes.push(Node::new(NodeSpec::group(ROOT_NAME), None));
        let root = tree.root();
        tree.push_exit(root);
        tree
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Adds a node described by `spec` under `parent`.
    ///
    /// States receive their own `exit` command as first child.
    pub fn add(&mut self, parent: NodeId, spec: NodeSpec) -> Result<NodeId, PromptrError> {
        self.validate(parent, &spec)?;

        let kind = spec.kind;
        let id = NodeId(self.nodes.len());
        debug!(?parent, ?id, name = spec.name.as_str(), %kind, "Adding node");
        self.nodes.push(Node::new(spec, Some(parent)));
        self.node_mut(parent).children.push(id);

        if kind == NodeKind::State {
            self.push_exit(id);
        }
        Ok(id)
    }

    /// Appends a positional argument to an existing node.
    pub fn add_argument(&mut self, id: NodeId, arg: Argument) -> Result<(), PromptrError> {
        let node = self.lookup(id)?;
        if node.params.iter().any(|p| p.name() == arg.name()) {
            return Err(PromptrError::Build(format!(
                "duplicate argument \"{}\" on \"{}\"",
                arg.name(),
                node.name
            )));
        }
        self.node_mut(id).params.push(arg);
        Ok(())
    }

    /// Registers the hook run when the user exits state `id`.
    pub fn set_on_exit<F>(&mut self, id: NodeId, hook: F) -> Result<(), PromptrError>
    where
        F: FnMut(&mut Call<'_>) -> CallbackResult + 'static,
    {
        let node = self.lookup(id)?;
        if node.kind != NodeKind::State {
            return Err(PromptrError::Build(format!(
                "\"{}\" is a {}, only states have exit hooks",
                node.name, node.kind
            )));
        }
        self.node_mut(id).on_exit = Some(Box::new(hook));
        Ok(())
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.node(id)
            .children
            .iter()
            .map(move |&child| (child, self.node(child)))
    }

    /// `id` followed by each ancestor up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        iter::successors(Some(id), move |&current| self.node(current).parent)
    }

    /// Space-separated names from below the root down to `id`.
    pub fn path(&self, id: NodeId) -> String {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .filter(|&ancestor| ancestor != self.root())
            .map(|ancestor| self.node(ancestor).name())
            .collect();
        names.reverse();
        names.join(" ")
    }

    /// The breadcrumb of state `id`, formatted with its last call bindings.
    pub fn render_label(&self, id: NodeId) -> Result<Option<String>, PromptrError> {
        let node = self.node(id);
        node.prompt
            .as_deref()
            .map(|prompt| template::render(prompt, &node.last_call_bindings))
            .transpose()
    }

    /// One line per child of `id`, indented by `indent` spaces, recursing
    /// into grandchildren when `deep` is set.
    pub fn list_children(&self, id: NodeId, deep: bool, indent: usize) -> Vec<String> {
        let mut lines = Vec::new();
        self.collect_children(id, deep, indent, &mut lines);
        lines
    }

    fn collect_children(&self, id: NodeId, deep: bool, indent: usize, lines: &mut Vec<String>) {
        for (child, node) in self.children(id) {
            lines.push(format!("{}{}", " ".repeat(indent), node));
            if deep {
                self.collect_children(child, deep, indent + 2, lines);
            }
        }
    }

    /// JSON description of the subtree rooted at `id`.
    pub fn describe(&self, id: NodeId) -> JsonValue {
        let node = self.node(id);
        let arguments: Vec<JsonValue> = node
            .params
            .iter()
            .map(|arg| json!({ "name": arg.name(), "completions": arg.candidates() }))
            .collect();
        let children: Vec<JsonValue> = node
            .children
            .iter()
            .map(|&child| self.describe(child))
            .collect();

        json!({
            "kind": node.kind.to_string(),
            "name": node.name,
            "names": node.names,
            "arguments": arguments,
            "help": node.options.help,
            "prompt": node.prompt,
            "children": children,
        })
    }

    fn push_exit(&mut self, parent: NodeId) {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::exit(parent));
        self.node_mut(parent).children.push(id);
    }

    fn lookup(&self, id: NodeId) -> Result<&Node, PromptrError> {
        self.get(id)
            .ok_or_else(|| PromptrError::Build(format!("unknown node id {}", id.0)))
    }

    fn validate(&self, parent: NodeId, spec: &NodeSpec) -> Result<(), PromptrError> {
        let parent_node = self.lookup(parent)?;
        if !parent_node.kind.has_children() {
            return Err(PromptrError::Build(format!(
                "cannot add \"{}\" under command \"{}\"",
                spec.name, parent_node.name
            )));
        }
        if spec.name.is_empty() || spec.name.chars().any(char::is_whitespace) {
            return Err(PromptrError::Build(format!(
                "invalid node name \"{}\"",
                spec.name
            )));
        }
        if let Some(prefix) = spec
            .options
            .optional_prefixes
            .iter()
            .find(|prefix| prefix.is_empty() || prefix.chars().any(char::is_whitespace))
        {
            return Err(PromptrError::Build(format!(
                "invalid optional prefix \"{}\" on \"{}\"",
                prefix, spec.name
            )));
        }
        if self
            .children(parent)
            .any(|(_, sibling)| sibling.name == spec.name)
        {
            return Err(PromptrError::Build(format!(
                "\"{}\" already has a child named \"{}\"",
                parent_node.name, spec.name
            )));
        }
        for (i, arg) in spec.params.iter().enumerate() {
            if spec.params[..i].iter().any(|p| p.name() == arg.name()) {
                return Err(PromptrError::Build(format!(
                    "duplicate argument \"{}\" on \"{}\"",
                    arg.name(),
                    spec.name
                )));
            }
        }
        if spec.kind != NodeKind::State && (spec.prompt.is_some() || spec.on_exit.is_some()) {
            return Err(PromptrError::Build(format!(
                "\"{}\" is a {}, only states take a prompt or exit hook",
                spec.name, spec.kind
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::EXIT;

    #[test]
    fn new_tree_has_root_exit() {
        let tree = CommandTree::new();
        let names: Vec<_> = tree.children(tree.root()).map(|(_, n)| n.name()).collect();
        assert_eq!(names, vec![EXIT]);
        assert!(tree.node(tree.root()).parent().is_none());
    }

    #[test]
    fn states_get_exit_first() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        let state = tree.add(root, NodeSpec::state("enable")).unwrap();
        tree.add(state, NodeSpec::command("ping")).unwrap();

        let names: Vec<_> = tree.children(state).map(|(_, n)| n.name()).collect();
        assert_eq!(names, vec![EXIT, "ping"]);
        let (exit, _) = tree.children(state).next().unwrap();
        assert!(tree.node(exit).is_exit());
        assert_eq!(tree.node(exit).parent(), Some(state));
    }

    #[test]
    fn rejects_invalid_specs() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        let cmd = tree.add(root, NodeSpec::command("ping")).unwrap();

        assert!(matches!(
            tree.add(cmd, NodeSpec::command("nested")),
            Err(PromptrError::Build(_))
        ));
        assert!(tree.add(root, NodeSpec::command("two words")).is_err());
        assert!(tree.add(root, NodeSpec::command("")).is_err());
        assert!(tree.add(root, NodeSpec::command("ping")).is_err());
        assert!(tree.add(root, NodeSpec::group("show").prompt("x")).is_err());
        assert!(tree
            .add(
                root,
                NodeSpec::command("dup")
                    .argument(Argument::new("a"))
                    .argument(Argument::new("a"))
            )
            .is_err());
        assert!(tree
            .add(root, NodeSpec::command("bad").optional_prefix("no way"))
            .is_err());
    }

    #[test]
    fn add_argument_and_exit_hook() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        let group = tree.add(root, NodeSpec::group("group2")).unwrap();
        tree.add_argument(group, Argument::new("arg2")).unwrap();
        assert!(tree.add_argument(group, Argument::new("arg2")).is_err());
        assert_eq!(tree.node(group).params().len(), 1);

        assert!(tree.set_on_exit(group, |_| Ok(())).is_err());
        let state = tree.add(root, NodeSpec::state("state1")).unwrap();
        assert!(tree.set_on_exit(state, |_| Ok(())).is_ok());
    }

    #[test]
    fn path_and_ancestors() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        let show = tree.add(root, NodeSpec::group("show")).unwrap();
        let intf = tree.add(show, NodeSpec::group("interface")).unwrap();
        let counters = tree.add(intf, NodeSpec::command("counters")).unwrap();

        assert_eq!(tree.path(counters), "show interface counters");
        let chain: Vec<_> = tree.ancestors(counters).collect();
        assert_eq!(chain, vec![counters, intf, show, root]);
    }

    #[test]
    fn list_children_deep() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        tree.add(root, NodeSpec::command("cmd1")).unwrap();
        let state = tree.add(root, NodeSpec::state("state2")).unwrap();
        tree.add(state, NodeSpec::group("group2").argument(Argument::new("arg2")))
            .unwrap();

        assert_eq!(
            tree.list_children(root, true, 2),
            vec![
                "  <Command exit []>",
                "  <Command cmd1 []>",
                "  <State state2 []>",
                "    <Command exit []>",
                "    <Group group2 [<Argument arg2 []>]>",
            ]
        );
        assert_eq!(tree.list_children(root, false, 0).len(), 3);
    }

    #[test]
    fn describe_emits_json() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        tree.add(
            root,
            NodeSpec::command("ping")
                .help("Send echo messages")
                .argument(Argument::new("host").completions(["r1"])),
        )
        .unwrap();

        let json = tree.describe(root);
        assert_eq!(json["name"], ROOT_NAME);
        let ping = &json["children"][1];
        assert_eq!(ping["kind"], "Command");
        assert_eq!(ping["help"], "Send echo messages");
        assert_eq!(ping["arguments"][0]["completions"][0], "r1");
    }

    #[test]
    fn render_label_uses_last_call() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        let state = tree
            .add(root, NodeSpec::state("interface").prompt("{intf}"))
            .unwrap();
        assert!(tree.render_label(state).is_err());

        tree.node_mut(state)
            .last_call_bindings
            .insert("intf".into(), "g0".into());
        assert_eq!(tree.render_label(state).unwrap().as_deref(), Some("g0"));

        let plain = tree.add(root, NodeSpec::state("plain")).unwrap();
        assert_eq!(tree.render_label(plain).unwrap(), None);
    }
}
