//! Grammar-file loading.
//!
//! The format is line oriented, one production per line:
//!
//! ```text
//! # arithmetic
//! { init() }
//! E E + T   { left + right }
//! E T       { child }
//! T id      { leaf }
//! ```
//!
//! The first word is the left-hand side, the remaining words the right-hand
//! side (none at all denotes an ε-production), and an optional trailing
//! `{ ... }` block carries the semantic-action source for that production.
//! A bare `{ ... }` line before the first production is the one-time
//! initialization block. Lines starting with `#` and blank lines are
//! skipped. Symbols classify lexically, exactly as in [`GrammarDef`].
//!
//! Action snippets are returned as raw text: binding them to executable
//! callbacks is the caller's job, via
//! [`SemanticActions`](kanon_runtime::SemanticActions).

use crate::grammar::{Grammar, GrammarDef, GrammarDefError};
use std::{fs, io, path::Path};

/// A loaded grammar file: the grammar plus its unbound action sources.
#[derive(Debug)]
pub struct GrammarFile {
    pub grammar: Grammar,
    /// Action source per user production id; `None` where the line had no
    /// block.
    pub actions: Vec<Option<String>>,
    /// The one-time initialization block, if any.
    pub init: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {}", _0)]
    Io(#[from] io::Error),

    #[error("line {line}: {msg}")]
    Malformed { line: usize, msg: String },

    #[error("line {line}: {source}")]
    Grammar {
        line: usize,
        #[source]
        source: GrammarDefError,
    },
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<GrammarFile, LoadError> {
    let source = fs::read_to_string(path)?;
    parse(&source)
}

pub fn parse(source: &str) -> Result<GrammarFile, LoadError> {
    struct Record<'s> {
        line: usize,
        symbols: Vec<&'s str>,
        action: Option<String>,
    }

    let mut records: Vec<Record<'_>> = vec![];
    let mut init = None;

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (symbols, action) = match trimmed.find('{') {
            Some(open) => {
                let block = &trimmed[open..];
                if !block.ends_with('}') {
                    return Err(LoadError::Malformed {
                        line,
                        msg: "unterminated action block".to_owned(),
                    });
                }
                let action = block[1..block.len() - 1].trim().to_owned();
                (&trimmed[..open], Some(action))
            }
            None => (trimmed, None),
        };

        let symbols: Vec<&str> = symbols.split_whitespace().collect();
        if symbols.is_empty() {
            match (&init, records.is_empty(), action) {
                (None, true, Some(action)) => {
                    init = Some(action);
                    continue;
                }
                (Some(_), true, _) => {
                    return Err(LoadError::Malformed {
                        line,
                        msg: "duplicate initialization block".to_owned(),
                    })
                }
                _ => {
                    return Err(LoadError::Malformed {
                        line,
                        msg: "initialization block must precede all productions".to_owned(),
                    })
                }
            }
        }

        records.push(Record {
            line,
            symbols,
            action,
        });
    }

    let mut actions = Vec::with_capacity(records.len());
    let mut failed_at = 0;
    let grammar = Grammar::define(|g| {
        for record in &mut records {
            failed_at = record.line;
            define_production(g, &record.symbols)?;
            actions.push(record.action.take());
        }
        Ok(())
    })
    .map_err(|source| LoadError::Grammar {
        line: failed_at,
        source,
    })?;

    Ok(GrammarFile {
        grammar,
        actions,
        init,
    })
}

fn define_production(g: &mut GrammarDef, symbols: &[&str]) -> Result<(), GrammarDefError> {
    g.production(symbols[0], &symbols[1..])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoketest() {
        let input = "\
# a tiny arithmetic grammar
{ reset() }
E E + T   { add }
E T
T id      { leaf }
";
        let parsed = parse(input).unwrap();
        assert_eq!(parsed.init.as_deref(), Some("reset()"));
        assert_eq!(parsed.actions.len(), 3);
        assert_eq!(parsed.actions[0].as_deref(), Some("add"));
        assert_eq!(parsed.actions[1], None);
        assert_eq!(parsed.actions[2].as_deref(), Some("leaf"));

        let grammar = parsed.grammar;
        assert_eq!(grammar.nonterminal_name(grammar.start_symbol()), "E");
        // Two user E-productions, one T-production, plus the accept rule.
        assert_eq!(grammar.productions.len(), 4);
        assert!(grammar.terminal_by_name("+").is_some());
        assert!(grammar.terminal_by_name("id").is_some());
    }

    #[test]
    fn epsilon_production_line() {
        let input = "\
S A b { seq }
A { empty }
";
        let parsed = parse(input).unwrap();
        let a_epsilon = parsed.grammar.productions().nth(1).unwrap();
        assert!(a_epsilon.right().is_empty());
        assert_eq!(parsed.actions[1].as_deref(), Some("empty"));
    }

    #[test]
    fn unterminated_block_is_malformed() {
        let err = parse("E T { add\n").unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 1, .. }));
    }

    #[test]
    fn misplaced_init_block_is_malformed() {
        let err = parse("E T\n{ late }\n").unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 2, .. }));
    }

    #[test]
    fn grammar_errors_carry_the_line() {
        let err = parse("E a $\n").unwrap_err();
        match err {
            LoadError::Grammar { line, source } => {
                assert_eq!(line, 1);
                assert!(matches!(source, GrammarDefError::ReservedEndOfInput));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
