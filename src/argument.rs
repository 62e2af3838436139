//! Positional arguments and their completion providers.

use std::fmt;

/// Produces completion candidates for an argument. Evaluated on every
/// request; nothing is cached.
pub type CompletionProvider = Box<dyn Fn() -> Vec<String>>;

/// A named positional parameter of a command, group or state.
pub struct Argument {
    name: String,
    completions: CompletionProvider,
}

impl Argument {
    pub fn new(name: impl Into<String>) -> Self {
        Argument {
            name: name.into(),
            completions: Box::new(Vec::new),
        }
    }

    /// Completes from a fixed list.
    pub fn completions<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.completions = Box::new(move || values.clone());
        self
    }

    /// Completes from a function called each time candidates are needed.
    pub fn completions_with<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Vec<String> + 'static,
    {
        self.completions = Box::new(provider);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current completion candidates.
    pub fn candidates(&self) -> Vec<String> {
        (self.completions)()
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("completions", &self.candidates())
            .finish()
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Argument {} {:?}>", self.name, self.candidates())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn static_completions() {
        let arg = Argument::new("intf").completions(["g0", "g1"]);
        assert_eq!(arg.name(), "intf");
        assert_eq!(arg.candidates(), vec!["g0", "g1"]);
        assert_eq!(arg.to_string(), "<Argument intf [\"g0\", \"g1\"]>");
    }

    #[test]
    fn lazy_completions_are_recomputed() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let arg = Argument::new("vlan").completions_with(move || {
            counter.set(counter.get() + 1);
            vec![format!("v{}", counter.get())]
        });
        assert_eq!(arg.candidates(), vec!["v1"]);
        assert_eq!(arg.candidates(), vec!["v2"]);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn default_has_no_candidates() {
        assert!(Argument::new("arg2").candidates().is_empty());
    }
}
