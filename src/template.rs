//! `{name}` placeholder formatting for prompts and state labels.

use std::collections::BTreeMap;

use logos::Logos;

use crate::error::PromptrError;
use crate::tokenizer::TemplatePiece;

/// Renders `template`, replacing each `{name}` with `values[name]`.
///
/// `{{` and `}}` render as literal braces. A placeholder with no value, or a
/// stray brace, is an error.
pub fn render(template: &str, values: &BTreeMap<String, String>) -> Result<String, PromptrError> {
    let mut out = String::with_capacity(template.len());
    for piece in TemplatePiece::lexer(template) {
        match piece {
            Ok(TemplatePiece::Text(text)) => out.push_str(text),
            Ok(TemplatePiece::OpenBrace) => out.push('{'),
            Ok(TemplatePiece::CloseBrace) => out.push('}'),
            Ok(TemplatePiece::Placeholder(name)) => match values.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    return Err(PromptrError::Template {
                        template: template.to_string(),
                        reason: format!("no value for placeholder \"{}\"", name),
                    })
                }
            },
            Err(()) => {
                return Err(PromptrError::Template {
                    template: template.to_string(),
                    reason: "unbalanced brace".to_string(),
                })
            }
        }
    }
    Ok(out)
}
