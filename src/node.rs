//! Tree elements: commands, groups and states.
//!
//! Nodes live in the arena owned by [`CommandTree`](crate::tree::CommandTree)
//! and refer to each other by [`NodeId`]. A [`NodeSpec`] describes a node to
//! be added; the tree validates it and assigns the id.

use std::collections::BTreeMap;
use std::fmt;

use crate::argument::Argument;
use crate::dispatch::Call;
use crate::error::CallbackResult;

/// Index of a node inside its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Values handed to a callback, keyed by argument or context name.
pub type Bindings = BTreeMap<String, String>;

/// Callback run when a node is called, and the type of state exit hooks.
pub type Callback = Box<dyn FnMut(&mut Call<'_>) -> CallbackResult>;

/// Name bound to the matched name when `pass_called_name` is set.
pub const CALLED_NAME: &str = "called_name";

/// Name of the synthetic command owned by every state and the root.
pub const EXIT: &str = "exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Command,
    Group,
    State,
}

impl NodeKind {
    pub fn has_children(self) -> bool {
        !matches!(self, NodeKind::Command)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Behavior options recognized on every node kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeOptions {
    /// Words that may precede the name, e.g. `no` for `no shutdown`.
    pub optional_prefixes: Vec<String>,
    /// Bind [`CALLED_NAME`] to the name the user actually matched.
    pub pass_called_name: bool,
    /// Context keys looked up and added to the call's bindings.
    pub pass_context: Vec<String>,
    pub help: Option<String>,
}

pub(crate) enum Action {
    Callback(Option<Callback>),
    ExitState,
}

pub struct Node {
    pub(crate) name: String,
    pub(crate) names: Vec<String>,
    pub(crate) kind: NodeKind,
    pub(crate) params: Vec<Argument>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) options: NodeOptions,
    pub(crate) prompt: Option<String>,
    pub(crate) on_exit: Option<Callback>,
    pub(crate) action: Action,
    pub(crate) last_call_bindings: Bindings,
}

impl Node {
    pub(crate) fn new(spec: NodeSpec, parent: Option<NodeId>) -> Self {
        let names = expand_names(&spec.name, &spec.options.optional_prefixes);
        Node {
            name: spec.name,
            names,
            kind: spec.kind,
            params: spec.params,
            children: Vec::new(),
            parent,
            options: spec.options,
            prompt: spec.prompt,
            on_exit: spec.on_exit,
            action: Action::Callback(spec.callback),
            last_call_bindings: Bindings::new(),
        }
    }

    pub(crate) fn exit(parent: NodeId) -> Self {
        let mut node = Node::new(NodeSpec::command(EXIT), Some(parent));
        node.action = Action::ExitState;
        node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name followed by every `"{prefix} {name}"` form.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn params(&self) -> &[Argument] {
        &self.params
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn options(&self) -> &NodeOptions {
        &self.options
    }

    pub fn help(&self) -> Option<&str> {
        self.options.help.as_deref()
    }

    pub fn prompt_template(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Bindings recorded by the last successful call of this node.
    pub fn last_call_bindings(&self) -> &Bindings {
        &self.last_call_bindings
    }

    pub fn is_exit(&self) -> bool {
        matches!(self.action, Action::ExitState)
    }

    /// Every name starting with `word`, paired with whether it equals `word`.
    pub fn matches<'a>(&'a self, word: &'a str) -> impl Iterator<Item = (&'a str, bool)> + 'a {
        self.names
            .iter()
            .filter(move |name| name.starts_with(word))
            .map(move |name| (name.as_str(), name.as_str() == word))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "<{} {} [{}]", self.kind, self.name, params.join(", "))?;

        let mut opts = Vec::new();
        if let Some(help) = &self.options.help {
            opts.push(format!("help={:?}", help));
        }
        if !self.options.optional_prefixes.is_empty() {
            opts.push(format!("optional_prefixes={:?}", self.options.optional_prefixes));
        }
        if !self.options.pass_context.is_empty() {
            opts.push(format!("pass_context={:?}", self.options.pass_context));
        }
        if self.options.pass_called_name {
            opts.push("pass_called_name=true".to_string());
        }
        if let Some(prompt) = &self.prompt {
            opts.push(format!("prompt={:?}", prompt));
        }
        if !opts.is_empty() {
            write!(f, " {}", opts.join(", "))?;
        }
        write!(f, ">")
    }
}

fn expand_names(name: &str, prefixes: &[String]) -> Vec<String> {
    std::iter::once(name.to_string())
        .chain(prefixes.iter().map(|prefix| format!("{} {}", prefix, name)))
        .collect()
}

/// Declaration of a node, consumed by
/// [`CommandTree::add`](crate::tree::CommandTree::add).
pub struct NodeSpec {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) params: Vec<Argument>,
    pub(crate) options: NodeOptions,
    pub(crate) prompt: Option<String>,
    pub(crate) on_exit: Option<Callback>,
    pub(crate) callback: Option<Callback>,
}

impl NodeSpec {
    fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        NodeSpec {
            name: name.into(),
            kind,
            params: Vec::new(),
            options: NodeOptions::default(),
            prompt: None,
            on_exit: None,
            callback: None,
        }
    }

    pub fn command(name: impl Into<String>) -> Self {
        NodeSpec::new(name, NodeKind::Command)
    }

    pub fn group(name: impl Into<String>) -> Self {
        NodeSpec::new(name, NodeKind::Group)
    }

    pub fn state(name: impl Into<String>) -> Self {
        NodeSpec::new(name, NodeKind::State)
    }

    pub fn argument(mut self, arg: Argument) -> Self {
        self.params.push(arg);
        self
    }

    pub fn optional_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.optional_prefixes.push(prefix.into());
        self
    }

    pub fn pass_called_name(mut self) -> Self {
        self.options.pass_called_name = true;
        self
    }

    pub fn pass_context(mut self, key: impl Into<String>) -> Self {
        self.options.pass_context.push(key.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.options.help = Some(help.into());
        self
    }

    pub fn options(mut self, options: NodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Breadcrumb template for a state, formatted with its call bindings.
    pub fn prompt(mut self, template: impl Into<String>) -> Self {
        self.prompt = Some(template.into());
        self
    }

    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut Call<'_>) -> CallbackResult + 'static,
    {
        self.on_exit = Some(Box::new(hook));
        self
    }

    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut Call<'_>) -> CallbackResult + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
