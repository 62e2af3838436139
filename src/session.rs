//! A prompt session: the command tree, the state stack and prompt rendering.

use std::collections::{BTreeMap, VecDeque};
use std::env;
use std::fs;

use tracing::debug;

use crate::complete;
use crate::context::StateStack;
use crate::dispatch::{self, Transition};
use crate::error::PromptrError;
use crate::node::{Bindings, NodeId};
use crate::template;
use crate::tokenizer::split_words;
use crate::tree::CommandTree;

/// Prompt rendering settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptConfig {
    /// Format of the whole prompt. `{state}` expands to the breadcrumbs;
    /// every other placeholder comes from `placeholders`.
    pub prompt_fmt: String,
    pub state_delim: String,
    pub state_paren_l: String,
    pub state_paren_r: String,
    pub placeholders: BTreeMap<String, String>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        PromptConfig {
            prompt_fmt: "{host}{state}# ".to_string(),
            state_delim: "-".to_string(),
            state_paren_l: "(".to_string(),
            state_paren_r: ")".to_string(),
            placeholders: host_placeholders(&detect_hostname()),
        }
    }
}

impl PromptConfig {
    /// Defaults, overridden by `PROMPTR_PROMPT_FMT` and `PROMPTR_STATE_DELIM`.
    pub fn from_env() -> Self {
        let mut config = PromptConfig::default();
        if let Ok(fmt) = env::var("PROMPTR_PROMPT_FMT") {
            config.prompt_fmt = fmt;
        }
        if let Ok(delim) = env::var("PROMPTR_STATE_DELIM") {
            config.state_delim = delim;
        }
        config
    }

    pub fn prompt_fmt(mut self, fmt: impl Into<String>) -> Self {
        self.prompt_fmt = fmt.into();
        self
    }

    pub fn state_delim(mut self, delim: impl Into<String>) -> Self {
        self.state_delim = delim.into();
        self
    }

    pub fn parens(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.state_paren_l = left.into();
        self.state_paren_r = right.into();
        self
    }

    /// Adds static placeholder values, replacing existing ones.
    pub fn extra_placeholders<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.placeholders
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

fn detect_hostname() -> String {
    env::var("HOSTNAME")
        .ok()
        .or_else(|| fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// `fqdn`, `host` (first label) and `domain` (the remaining labels).
fn host_placeholders(fqdn: &str) -> BTreeMap<String, String> {
    let (host, domain) = fqdn.split_once('.').unwrap_or((fqdn, ""));
    BTreeMap::from([
        ("fqdn".to_string(), fqdn.to_string()),
        ("host".to_string(), host.to_string()),
        ("domain".to_string(), domain.to_string()),
    ])
}

/// Why a session stopped reading lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// `exit` was issued at the root.
    Exited,
    EndOfInput,
}

/// Result of handling one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Terminate,
}

pub struct Prompt {
    tree: CommandTree,
    stack: StateStack,
    config: PromptConfig,
}

impl Prompt {
    pub fn new(tree: CommandTree, config: PromptConfig) -> Self {
        let stack = StateStack::new(tree.root());
        Prompt {
            tree,
            stack,
            config,
        }
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    pub fn stack(&self) -> &StateStack {
        &self.stack
    }

    pub fn config(&self) -> &PromptConfig {
        &self.config
    }

    pub fn current_state(&self) -> NodeId {
        self.stack.current_state()
    }

    pub fn breadcrumbs(&self) -> &[String] {
        self.stack.breadcrumbs()
    }

    pub fn set_context(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.stack.set_context(key, value);
    }

    pub fn get_context(&self, key: &str) -> Option<&str> {
        self.stack.get_context(key)
    }

    pub fn get_context_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.stack.get_context_or(key, default)
    }

    /// The prompt string for the current state.
    pub fn current_prompt(&self) -> Result<String, PromptrError> {
        let crumbs = self.stack.breadcrumbs();
        let state = if crumbs.is_empty() {
            String::new()
        } else {
            format!(
                "{}{}{}",
                self.config.state_paren_l,
                crumbs.join(&self.config.state_delim),
                self.config.state_paren_r
            )
        };
        let mut values = self.config.placeholders.clone();
        values.insert("state".to_string(), state);
        template::render(&self.config.prompt_fmt, &values)
    }

    /// Dispatches one raw line against the current state.
    pub fn handle_line(&mut self, line: &str) -> Result<LineOutcome, PromptrError> {
        let mut tokens: VecDeque<String> = split_words(line).into();
        if tokens.is_empty() {
            return Ok(LineOutcome::Continue);
        }

        let position = self.stack.current_state();
        match dispatch::resolve_and_call(&mut self.tree, &mut self.stack, position, &mut tokens)? {
            Transition::Stay => {}
            Transition::Enter(state) => self.enter(state)?,
            Transition::Exit if self.stack.is_at_root() => {
                debug!("Exit at root, ending session");
                return Ok(LineOutcome::Terminate);
            }
            Transition::Exit => {
                self.stack.pop();
            }
        }
        Ok(LineOutcome::Continue)
    }

    /// Dispatches each line in turn. Errors stop the run and are returned.
    pub fn run_lines<I, S>(&mut self, lines: I) -> Result<SessionEnd, PromptrError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            if self.handle_line(line.as_ref())? == LineOutcome::Terminate {
                return Ok(SessionEnd::Exited);
            }
        }
        Ok(SessionEnd::EndOfInput)
    }

    pub fn run_text(&mut self, text: &str) -> Result<SessionEnd, PromptrError> {
        self.run_lines(text.lines())
    }

    /// Completions for the buffer `line` with the cursor at byte `pos`.
    /// Returns the start of the word being completed and the candidates.
    pub fn completions(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let (tokens, last_word, start) = complete::split_at_cursor(line, pos);
        let candidates =
            complete::complete(&self.tree, self.stack.current_state(), &tokens, last_word).collect();
        (start, candidates)
    }

    fn enter(&mut self, state: NodeId) -> Result<(), PromptrError> {
        let label = self.tree.render_label(state)?;
        let node = self.tree.node(state);
        let seed: Bindings = node
            .params()
            .iter()
            .filter_map(|param| {
                node.last_call_bindings()
                    .get(param.name())
                    .map(|value| (param.name().to_string(), value.clone()))
            })
            .collect();
        self.stack.push(state, label, seed);
        Ok(())
    }
}
