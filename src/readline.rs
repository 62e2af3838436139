//! Interactive front end built on `rustyline`.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::debug;

use crate::error::PromptrError;
use crate::session::{LineOutcome, Prompt, SessionEnd};

/// Line-editor helper completing against the session's current state.
pub struct PromptrHelper {
    prompt: Rc<RefCell<Prompt>>,
}

impl PromptrHelper {
    pub fn new(prompt: Rc<RefCell<Prompt>>) -> Self {
        PromptrHelper { prompt }
    }
}

impl Completer for PromptrHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = self.prompt.borrow().completions(line, pos);
        let pairs = candidates
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for PromptrHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for PromptrHelper {}

impl Validator for PromptrHelper {}

impl Helper for PromptrHelper {}

/// Reads and dispatches lines until `exit` at the root or end of input.
///
/// Line errors are printed and the loop continues; Ctrl-C discards the
/// current line. Any other error ends the loop and is returned.
pub fn run_prompt_loop(prompt: Prompt) -> Result<SessionEnd, PromptrError> {
    let prompt = Rc::new(RefCell::new(prompt));
    let mut rl: Editor<PromptrHelper, DefaultHistory> =
        Editor::new().map_err(|e| PromptrError::Init(e.to_string()))?;
    rl.set_helper(Some(PromptrHelper::new(Rc::clone(&prompt))));

    loop {
        let prompt_text = prompt.borrow().current_prompt()?;
        let line = match rl.readline(&prompt_text) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                debug!("End of input");
                return Ok(SessionEnd::EndOfInput);
            }
            Err(err) => return Err(err.into()),
        };
        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.as_str());
        }

        let outcome = prompt.borrow_mut().handle_line(&line);
        if let Some(end) = settle_line(outcome, &mut io::stderr())? {
            return Ok(end);
        }
    }
}

/// Decides what a dispatched line means for the loop.
///
/// A recoverable error is reported once on `out` and the loop goes on.
fn settle_line(
    outcome: Result<LineOutcome, PromptrError>,
    out: &mut impl Write,
) -> Result<Option<SessionEnd>, PromptrError> {
    match outcome {
        Ok(LineOutcome::Continue) => Ok(None),
        Ok(LineOutcome::Terminate) => Ok(Some(SessionEnd::Exited)),
        Err(err) if err.is_recoverable() => {
            debug!(error = %err, "Line rejected");
            let _ = writeln!(out, "{}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
