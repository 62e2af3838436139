//! Resolution of input words against the command tree.
//!
//! A word selects the child of the current position whose names match it:
//! exact matches first, then prefix matches. More than one candidate in the
//! winning tier is ambiguous. The selected child consumes its arguments from
//! the following words, runs its callback, and resolution continues into its
//! children until a state is entered or a leaf is reached.

use std::collections::VecDeque;

use tracing::debug;

use crate::context::StateStack;
use crate::error::PromptrError;
use crate::node::{Action, Bindings, Node, NodeId, NodeKind, CALLED_NAME};
use crate::tree::CommandTree;

/// What the caller must do with the state stack after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Enter(NodeId),
    Exit,
}

/// Outcome of matching one word against the children of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(NodeId),
    Ambiguous(Vec<NodeId>),
    NotFound,
}

/// Handle passed to callbacks: the call's bindings plus the context store.
pub struct Call<'a> {
    node: &'a str,
    bindings: &'a Bindings,
    context: &'a mut StateStack,
}

impl<'a> Call<'a> {
    pub(crate) fn new(node: &'a str, bindings: &'a Bindings, context: &'a mut StateStack) -> Self {
        Call {
            node,
            bindings,
            context,
        }
    }

    /// Name of the node being called.
    pub fn node(&self) -> &str {
        self.node
    }

    pub fn bindings(&self) -> &Bindings {
        self.bindings
    }

    /// Value bound to an argument, context key or `called_name`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.bindings.get(key).map(String::as_str)
    }

    pub fn called_name(&self) -> Option<&str> {
        self.get(CALLED_NAME)
    }

    pub fn set_context(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.context.set_context(key, value);
    }

    pub fn get_context(&self, key: &str) -> Option<&str> {
        self.context.get_context(key)
    }

    pub fn context(&self) -> &StateStack {
        self.context
    }
}

/// Picks the child of `position` that `word` designates.
pub fn resolve_child(tree: &CommandTree, position: NodeId, word: &str) -> Resolution {
    let mut exact = Vec::new();
    let mut prefix = Vec::new();

    for (id, node) in tree.children(position) {
        let mut matched = false;
        let mut is_exact = false;
        for (_, exact_name) in node.matches(word) {
            matched = true;
            is_exact |= exact_name;
        }
        if is_exact {
            exact.push(id);
        } else if matched {
            prefix.push(id);
        }
    }

    let tier = if exact.is_empty() { prefix } else { exact };
    match tier.len() {
        0 => Resolution::NotFound,
        1 => Resolution::Found(tier[0]),
        _ => Resolution::Ambiguous(tier),
    }
}

/// True when `cmd` selected a `"{prefix} {name}"` form of `node` and `next`
/// spells out (a prefix of) the base name, which then belongs to the name
/// rather than to the arguments.
pub(crate) fn selected_prefixed_form(node: &Node, cmd: &str, next: Option<&str>) -> bool {
    let Some((called, _)) = node.matches(cmd).next() else {
        return false;
    };
    called != node.name()
        && next.is_some_and(|word| !word.is_empty() && node.name().starts_with(word))
}

/// Dispatches `tokens` starting at the children of `position`.
///
/// Consumed words are removed from `tokens`; words left over once a state
/// is entered or a leaf command is reached are ignored.
pub fn resolve_and_call(
    tree: &mut CommandTree,
    stack: &mut StateStack,
    position: NodeId,
    tokens: &mut VecDeque<String>,
) -> Result<Transition, PromptrError> {
    let Some(cmd) = tokens.pop_front() else {
        return Ok(Transition::Stay);
    };
    if cmd.is_empty() {
        return Ok(Transition::Stay);
    }

    let child = match resolve_child(tree, position, &cmd) {
        Resolution::Found(child) => child,
        Resolution::Ambiguous(candidates) => {
            return Err(PromptrError::AmbiguousCommand {
                candidates: candidates
                    .into_iter()
                    .map(|id| tree.node(id).name().to_string())
                    .collect(),
                cmd,
            })
        }
        Resolution::NotFound => return Err(PromptrError::CommandNotFound { cmd }),
    };
    debug!(cmd = cmd.as_str(), node = %tree.path(child), "Resolved command");

    call(tree, stack, child, &cmd, tokens)?;

    let node = tree.node(child);
    if node.is_exit() {
        debug!(state = ?position, "Exit requested");
        return Ok(Transition::Exit);
    }
    match node.kind() {
        NodeKind::State => Ok(Transition::Enter(child)),
        _ if !node.children().is_empty() => resolve_and_call(tree, stack, child, tokens),
        _ => {
            if !tokens.is_empty() {
                debug!(ignored = ?tokens, "Ignoring trailing words");
            }
            Ok(Transition::Stay)
        }
    }
}

/// Binds arguments and context for `id`, then runs its callback (or, for
/// `exit`, the owning state's exit hook).
fn call(
    tree: &mut CommandTree,
    stack: &mut StateStack,
    id: NodeId,
    cmd: &str,
    tokens: &mut VecDeque<String>,
) -> Result<(), PromptrError> {
    let node = tree.node(id);
    if selected_prefixed_form(node, cmd, tokens.front().map(String::as_str)) {
        tokens.pop_front();
    }
    if node.params().len() > tokens.len() {
        return Err(PromptrError::NotEnoughArgs {
            cmd: cmd.to_string(),
            required: node.params().iter().map(|p| p.name().to_string()).collect(),
        });
    }

    let mut bindings = Bindings::new();
    if node.options().pass_called_name {
        if let Some((called, _)) = node.matches(cmd).next() {
            bindings.insert(CALLED_NAME.to_string(), called.to_string());
        }
    }

    // A state's arguments seed the frame pushed for it instead.
    let scoped_to_new_frame = node.kind() == NodeKind::State;
    let count = node.params().len();
    for (param, value) in node.params().iter().zip(tokens.drain(..count)) {
        if !scoped_to_new_frame {
            stack.set_context(param.name(), value.clone());
        }
        bindings.insert(param.name().to_string(), value);
    }

    for key in &node.options().pass_context {
        if let Some(value) = stack.get_context(key) {
            bindings.insert(key.clone(), value.to_string());
        }
    }

    let name = node.name().to_string();
    let parent = node.parent();
    let is_exit = node.is_exit();

    let target = if is_exit {
        match parent {
            Some(state) => tree.node_mut(state).on_exit.as_mut(),
            None => None,
        }
    } else if let Action::Callback(callback) = &mut tree.node_mut(id).action {
        callback.as_mut()
    } else {
        None
    };
    if let Some(callback) = target {
        let mut call = Call::new(&name, &bindings, stack);
        callback(&mut call).map_err(|source| PromptrError::Callback {
            node: name.clone(),
            source,
        })?;
    }

    tree.node_mut(id).last_call_bindings = bindings;
    Ok(())
}
