//! Completion candidates for a partially typed line.
//!
//! Replays the dispatcher's walk over the words already typed, without
//! running callbacks or touching context, and offers whatever can follow:
//! values of the next pending argument, or the names of the landed node's
//! children. Input that would fail to dispatch just stops the walk.

use std::collections::VecDeque;

use tracing::trace;

use crate::dispatch::{resolve_child, selected_prefixed_form, Resolution};
use crate::node::NodeId;
use crate::tokenizer::is_separator;
use crate::tree::CommandTree;

/// Where a completion walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub node: NodeId,
    /// Index of the next argument still expecting a value, if any.
    pub pending_param: Option<usize>,
}

/// Walks `tokens` (the fully typed words before the cursor) from `position`.
pub fn walk(tree: &CommandTree, position: NodeId, tokens: &[String]) -> Landing {
    let mut node = position;
    let mut words: VecDeque<&str> = tokens.iter().map(String::as_str).collect();

    while let Some(word) = words.pop_front() {
        let child = match resolve_child(tree, node, word) {
            Resolution::Found(child) => child,
            _ => {
                trace!(word, "Completion walk stopped");
                break;
            }
        };
        if selected_prefixed_form(tree.node(child), word, words.front().copied()) {
            words.pop_front();
        }
        node = child;

        let params = tree.node(node).params().len();
        let supplied = params.min(words.len());
        words.drain(..supplied);
        if supplied < params {
            return Landing {
                node,
                pending_param: Some(supplied),
            };
        }
    }

    Landing {
        node,
        pending_param: None,
    }
}

/// Candidates for `last_word`, given the words typed before it.
///
/// The sequence is computed lazily from the current tree; argument
/// providers are invoked when it is first advanced.
pub fn complete<'a>(
    tree: &'a CommandTree,
    position: NodeId,
    tokens: &[String],
    last_word: &'a str,
) -> Box<dyn Iterator<Item = String> + 'a> {
    let landing = walk(tree, position, tokens);
    trace!(?landing, last_word, "Completing");

    match landing.pending_param {
        Some(index) => {
            let param = &tree.node(landing.node).params()[index];
            Box::new(
                std::iter::once(param)
                    .flat_map(|param| param.candidates())
                    .filter(move |candidate| candidate.starts_with(last_word)),
            )
        }
        None => Box::new(
            tree.children(landing.node)
                .flat_map(move |(_, child)| child.matches(last_word))
                .map(|(name, _)| name.to_string()),
        ),
    }
}

/// Splits a buffer at the cursor into the completed words and the word
/// being typed, returning the byte offset where that word starts.
///
/// A cursor past the end of `line`, or inside a multi-byte character, is
/// moved back to the nearest character boundary.
pub fn split_at_cursor(line: &str, pos: usize) -> (Vec<String>, &str, usize) {
    let mut pos = pos.min(line.len());
    while !line.is_char_boundary(pos) {
        pos -= 1;
    }
    let head = &line[..pos];
    let start = head
        .rfind(is_separator)
        .map(|i| i + head[i..].chars().next().map_or(1, char::len_utf8))
        .unwrap_or(0);
    let tokens = crate::tokenizer::split_words(&head[..start]);
    (tokens, &head[start..], start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Argument;
    use crate::node::NodeSpec;

    fn tree() -> (CommandTree, NodeId) {
        let mut tree = CommandTree::new();
        let root = tree.root();
        tree.add(root, NodeSpec::command("cmd1")).unwrap();
        let state = tree
            .add(
                root,
                NodeSpec::state("state1")
                    .argument(Argument::new("arg1").completions(["test1", "test2", "other"])),
            )
            .unwrap();
        tree.add(state, NodeSpec::command("cmd2").optional_prefix("no"))
            .unwrap();
        (tree, state)
    }

    fn words(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    fn collect(tree: &CommandTree, position: NodeId, line: &str, last: &str) -> Vec<String> {
        complete(tree, position, &words(line), last).collect()
    }

    #[test]
    fn empty_buffer_lists_children() {
        let (tree, _) = tree();
        assert_eq!(collect(&tree, tree.root(), "", ""), vec!["exit", "cmd1", "state1"]);
        assert_eq!(collect(&tree, tree.root(), "", "st"), vec!["state1"]);
    }

    #[test]
    fn pending_argument_offers_values() {
        let (tree, state) = tree();
        assert_eq!(collect(&tree, tree.root(), "state1", "t"), vec!["test1", "test2"]);
        assert_eq!(
            walk(&tree, tree.root(), &words("state1")),
            Landing {
                node: state,
                pending_param: Some(0)
            }
        );
    }

    #[test]
    fn satisfied_argument_moves_to_children() {
        let (tree, _) = tree();
        assert_eq!(
            collect(&tree, tree.root(), "state1 test1", ""),
            vec!["exit", "cmd2", "no cmd2"]
        );
        assert_eq!(collect(&tree, tree.root(), "state1 test1", "no"), vec!["no cmd2"]);
    }

    #[test]
    fn unresolved_words_stop_the_walk() {
        let (tree, _) = tree();
        assert_eq!(collect(&tree, tree.root(), "bogus", "c"), vec!["cmd1"]);
    }

    #[test]
    fn split_at_cursor_finds_last_word() {
        let (tokens, word, start) = split_at_cursor("state1 te", 9);
        assert_eq!(tokens, vec!["state1"]);
        assert_eq!(word, "te");
        assert_eq!(start, 7);

        let (tokens, word, start) = split_at_cursor("state1 ", 7);
        assert_eq!(tokens, vec!["state1"]);
        assert_eq!(word, "");
        assert_eq!(start, 7);

        let (tokens, word, start) = split_at_cursor("c", 1);
        assert!(tokens.is_empty());
        assert_eq!(word, "c");
        assert_eq!(start, 0);
    }

    #[test]
    fn prefixed_form_walks_past_the_base_name() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        let shutdown = tree
            .add(
                root,
                NodeSpec::command("shutdown")
                    .optional_prefix("no")
                    .argument(Argument::new("intf").completions(["g0", "g1"])),
            )
            .unwrap();

        assert_eq!(
            walk(&tree, root, &words("no shutdown")),
            Landing {
                node: shutdown,
                pending_param: Some(0)
            }
        );
        assert_eq!(collect(&tree, root, "no shutdown", "g"), vec!["g0", "g1"]);
        assert!(collect(&tree, root, "no shutdown g0", "").is_empty());
    }

    #[test]
    fn unicode_whitespace_separates_words() {
        let (tree, _) = tree();
        let line = "state1\u{a0}t";
        let (tokens, word, start) = split_at_cursor(line, line.len());
        assert_eq!(tokens, vec!["state1"]);
        assert_eq!(word, "t");
        assert_eq!(start, "state1\u{a0}".len());
        assert_eq!(
            complete(&tree, tree.root(), &tokens, word).collect::<Vec<_>>(),
            vec!["test1", "test2"]
        );
    }

    #[test]
    fn cursor_is_clamped_to_the_line() {
        let (tokens, word, start) = split_at_cursor("state1 te", 99);
        assert_eq!(tokens, vec!["state1"]);
        assert_eq!(word, "te");
        assert_eq!(start, 7);

        // Byte 2 falls inside the two-byte 'é'.
        let (tokens, word, start) = split_at_cursor("aé", 2);
        assert!(tokens.is_empty());
        assert_eq!(word, "a");
        assert_eq!(start, 0);
    }
}
