//! Console input tokenization.
//!
//! Splits a text line into terminals the way the interactive driver wants
//! them: an alphabetic character starts a whole alphanumeric word, any other
//! non-space character stands alone, so `id+ab2` lexes as `id`, `+`, `ab2`.

use crate::grammar::{Grammar, TerminalID};
use kanon_runtime::Token;
use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[regex(r"[A-Za-z][A-Za-z0-9]*", priority = 2)]
    Word,

    #[regex(r"\S", priority = 1)]
    Mark,
}

/// One terminal pulled from an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputToken {
    terminal: TerminalID,
    text: String,
}

impl InputToken {
    pub fn new(terminal: TerminalID, text: impl Into<String>) -> Self {
        Self {
            terminal,
            text: text.into(),
        }
    }
}

impl Token<TerminalID> for InputToken {
    fn to_index(&self) -> TerminalID {
        self.terminal
    }

    fn text(&self) -> &str {
        &self.text
    }
}

/// The line mentions something that is not a terminal of the grammar.
#[derive(Debug, thiserror::Error)]
#[error("unknown terminal `{text}' at column {column}")]
pub struct TokenizeError {
    pub text: String,
    pub column: usize,
}

/// Split `line` into grammar terminals.
///
/// Every lexeme must name a terminal; reporting unknown ones here keeps the
/// engine's own errors about grammar symbols only.
pub fn tokenize(grammar: &Grammar, line: &str) -> Result<Vec<InputToken>, TokenizeError> {
    let mut lexer = RawToken::lexer(line);
    let mut tokens = vec![];

    while let Some(raw) = lexer.next() {
        let text = lexer.slice();
        let column = lexer.span().start;
        if raw.is_err() {
            return Err(TokenizeError {
                text: text.to_owned(),
                column,
            });
        }
        let terminal = grammar
            .terminal_by_name(text)
            .ok_or_else(|| TokenizeError {
                text: text.to_owned(),
                column,
            })?;
        tokens.push(InputToken::new(terminal, text));
    }

    Ok(tokens)
}
