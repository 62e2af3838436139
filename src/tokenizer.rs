//! Lexers for input lines and prompt templates.

use logos::{Lexer, Logos};

/// A word of an input line. Runs of Unicode whitespace separate words and
/// never produce empty tokens.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"\s+")]
pub enum LineToken<'a> {
    #[regex(r"\S+", |lex| lex.slice())]
    Word(&'a str),
}

/// Whether `c` separates words, matching what [`LineToken`] skips.
pub fn is_separator(c: char) -> bool {
    c.is_whitespace()
}

/// Splits a raw line into its non-empty words.
pub fn split_words(line: &str) -> Vec<String> {
    LineToken::lexer(line)
        .filter_map(|token| match token {
            Ok(LineToken::Word(word)) => Some(word.to_string()),
            Err(()) => None,
        })
        .collect()
}

/// Pieces of a `{name}` style format template.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum TemplatePiece<'a> {
    #[token("{{")]
    OpenBrace,

    #[token("}}")]
    CloseBrace,

    #[regex(r"\{[A-Za-z_][A-Za-z0-9_]*\}", placeholder_name)]
    Placeholder(&'a str),

    #[regex(r"[^{}]+", |lex| lex.slice())]
    Text(&'a str),
}

fn placeholder_name<'a>(lex: &mut Lexer<'a, TemplatePiece<'a>>) -> &'a str {
    let slice = lex.slice();
    &slice[1..slice.len() - 1]
}
