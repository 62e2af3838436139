/*
 * promptr - Cisco-style command prompts
 *
 * === Overview ===
 * A program declares a tree of commands, groups and states, then hands raw
 * input lines to a `Prompt`. Each line is split into words and resolved
 * against the children of the current state: exact name matches win over
 * prefix matches, and a tie within a tier is an ambiguity error.
 *
 * 1.  **Arena tree (`tree`, `node`):**
 * Nodes are stored by index in a `CommandTree`. Children and parent links are
 * `NodeId`s, so there are no ownership cycles. Every state, and the root,
 * owns a synthetic `exit` command.
 *
 * 2.  **Dispatch (`dispatch`):**
 * The selected node consumes its positional arguments, runs its callback and
 * either stays put, descends into its children, or asks for a state to be
 * entered. `exit` is a `Transition`, never an error.
 *
 * 3.  **State stack (`context`):**
 * Frames pair a state with its own context map. Lookups walk innermost
 * first; a popped frame's bindings disappear with it. Entered states with a
 * prompt template contribute a breadcrumb to the prompt string.
 *
 * 4.  **Completion (`complete`, `readline`):**
 * Completion replays the dispatch walk read-only and offers the next
 * argument's values or the next tier of command names. The `rustyline`
 * helper exposes it to the interactive loop.
 */

// --- Modules ---
pub mod argument;
pub mod complete;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod node;
pub mod readline;
pub mod session;
pub mod template;
pub mod tokenizer;
pub mod tree;

// --- Re-exports ---
pub use argument::Argument;
pub use context::StateStack;
pub use dispatch::{Call, Transition};
pub use error::{CallbackError, CallbackResult, PromptrError};
pub use node::{Bindings, Node, NodeId, NodeKind, NodeOptions, NodeSpec};
pub use readline::run_prompt_loop;
pub use session::{LineOutcome, Prompt, PromptConfig, SessionEnd};
pub use tree::CommandTree;
