//! State stack with scoped context bindings.
//!
//! Each frame pairs the active state (or the root group) with its own
//! context map. Lookups walk the frames innermost first, so a frame sees its
//! own bindings and those of every enclosing frame, but never the bindings of
//! a frame that has already been popped.

use tracing::debug;

use crate::node::{Bindings, NodeId};

#[derive(Debug)]
struct Frame {
    state: NodeId,
    bindings: Bindings,
    label: Option<String>,
}

#[derive(Debug)]
pub struct StateStack {
    frames: Vec<Frame>,
    breadcrumbs: Vec<String>,
}

impl StateStack {
    /// A stack holding only the root frame.
    pub fn new(root: NodeId) -> Self {
        StateStack {
            frames: vec![Frame {
                state: root,
                bindings: Bindings::new(),
                label: None,
            }],
            breadcrumbs: Vec::new(),
        }
    }

    /// Enters `state`. `label` is the rendered breadcrumb, if the state has
    /// a prompt template; `bindings` seed the new frame's context.
    pub fn push(&mut self, state: NodeId, label: Option<String>, bindings: Bindings) {
        debug!(?state, ?label, depth = self.frames.len() + 1, "Entering state");
        if let Some(label) = &label {
            self.breadcrumbs.push(label.clone());
        }
        self.frames.push(Frame { state, bindings, label });
    }

    /// Leaves the innermost state and returns it.
    ///
    /// # Panics
    ///
    /// Panics when only the root frame is left.
    pub fn pop(&mut self) -> NodeId {
        assert!(self.frames.len() > 1, "attempted to pop the root frame");
        let frame = self.frames.pop().expect("stack holds more than the root frame");
        if frame.label.is_some() {
            self.breadcrumbs.pop();
        }
        debug!(state = ?frame.state, depth = self.frames.len(), "Left state");
        frame.state
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_at_root(&self) -> bool {
        self.frames.len() == 1
    }

    pub fn current_state(&self) -> NodeId {
        self.top().state
    }

    pub fn breadcrumbs(&self) -> &[String] {
        &self.breadcrumbs
    }

    /// Binds `key` in the innermost frame.
    pub fn set_context(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.top_mut().bindings.insert(key.into(), value.into());
    }

    /// Innermost binding of `key`.
    pub fn get_context(&self, key: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.bindings.get(key))
            .map(String::as_str)
    }

    pub fn get_context_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_context(key).unwrap_or(default)
    }

    fn top(&self) -> &Frame {
        self.frames.last().expect("state stack always holds the root frame")
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("state stack always holds the root frame")
    }
}
