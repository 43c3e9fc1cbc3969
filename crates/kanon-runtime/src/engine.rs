//! The table-driven shift-reduce engine.

use crate::{
    actions::{SemanticActions, SemanticError},
    definition::{ParseAction, ParserDef},
    tree::{NodeID, ParseTree},
};
use std::fmt;

/// A trait for abstracting input token symbols.
pub trait Token<TIdx> {
    /// Return the terminal index corresponding to this token.
    fn to_index(&self) -> TIdx;

    /// The token's own text, used as its parse-tree leaf label.
    fn text(&self) -> &str;
}

/// The result of a successful parse attempt.
#[derive(Debug)]
pub struct Parsed<V> {
    /// The value synthesized by the start production's action.
    pub value: V,
    /// The concrete parse tree.
    pub tree: ParseTree,
}

/// The shift-reduce engine driving a [`ParserDef`] against a token stream.
///
/// The definition and the action registry are retained across parse
/// attempts; the three runtime stacks are created fresh for every call to
/// [`parse`](Self::parse), so a failed attempt leaves the engine ready for
/// new input.
pub struct Engine<TDef, TTok, V>
where
    TDef: ParserDef,
    TTok: Token<TDef::TerminalIndex>,
{
    definition: TDef,
    actions: SemanticActions<TTok, V>,
}

impl<TDef, TTok, V> fmt::Debug for Engine<TDef, TTok, V>
where
    TDef: ParserDef + fmt::Debug,
    TTok: Token<TDef::TerminalIndex>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("definition", &self.definition)
            .field("actions", &self.actions)
            .finish()
    }
}

impl<TDef, TTok, V> Engine<TDef, TTok, V>
where
    TDef: ParserDef,
    TTok: Token<TDef::TerminalIndex>,
    V: Default,
{
    /// Create an engine from a parser definition and an action registry.
    pub fn new(definition: TDef, actions: SemanticActions<TTok, V>) -> Self {
        Self {
            definition,
            actions,
        }
    }

    /// Run one parse attempt over a pull-based token source.
    ///
    /// The source is read one token at a time; once it is exhausted the
    /// engine behaves as if it kept yielding the end-of-input marker.
    pub fn parse<I>(&mut self, tokens: I) -> Result<Parsed<V>, ParseError>
    where
        I: IntoIterator<Item = TTok>,
    {
        let def = &self.definition;
        let mut tokens = tokens.into_iter();

        self.actions.start_parse();

        let mut states = vec![def.initial_state()];
        let mut values: Vec<V> = vec![];
        let mut nodes: Vec<NodeID> = vec![];
        let mut tree = ParseTree::new();
        let mut lookahead = tokens.next();

        loop {
            let current = *states.last().expect("states stack underflow");
            let mut cell = def.actions(current, lookahead.as_ref().map(Token::to_index));

            if cell.len() > 1 {
                return Err(ParseError::Conflict {
                    state: current.to_string(),
                    token: token_text(&lookahead).to_owned(),
                });
            }
            let action = cell.pop().ok_or_else(|| ParseError::Syntax {
                state: current.to_string(),
                token: token_text(&lookahead).to_owned(),
            })?;

            match action {
                ParseAction::Shift(next) => {
                    let token = lookahead.take().expect("shifted token must not be EOI");
                    values.push(self.actions.synthesize_shift(&token));
                    nodes.push(tree.leaf(token.text()));
                    states.push(next);
                    lookahead = tokens.next();
                }

                ParseAction::Reduce {
                    production,
                    left,
                    arity,
                } => {
                    let children = nodes.split_off(nodes.len() - arity);
                    let child_values = values.split_off(values.len() - arity);
                    states.truncate(states.len() - arity);

                    if def.is_start(left) {
                        // The accept production wraps exactly one symbol and
                        // has no action of its own; its child is the result.
                        let value = child_values.into_iter().next().unwrap_or_default();
                        let root = match children.into_iter().next() {
                            Some(node) => node,
                            None => tree.branch(def.nonterminal_name(left), vec![]),
                        };
                        tree.set_root(root);
                        return Ok(Parsed { value, tree });
                    }

                    let value = self
                        .actions
                        .synthesize_reduce(production, child_values)
                        .map_err(|source| ParseError::Semantic { production, source })?;
                    let node = tree.branch(def.nonterminal_name(left), children);

                    nodes.push(node);
                    values.push(value);

                    let current = *states.last().expect("states stack underflow");
                    let gotos = def.gotos(current, left);
                    match gotos[..] {
                        [next] => states.push(next),
                        _ => {
                            return Err(ParseError::Invariant {
                                state: current.to_string(),
                                symbol: def.nonterminal_name(left).to_owned(),
                                candidates: gotos.len(),
                            })
                        }
                    }
                }
            }
        }
    }
}

fn token_text<TIdx, TTok: Token<TIdx>>(lookahead: &Option<TTok>) -> &str {
    match lookahead {
        Some(token) => token.text(),
        None => "$",
    }
}

/// The ways a parse attempt can fail.
///
/// None of these are retried; the caller reports the error and may start a
/// new attempt on fresh input.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// No action is defined for the current state and lookahead.
    #[error("no action for `{token}' in state {state}")]
    Syntax { state: String, token: String },

    /// More than one action is defined, i.e. the grammar is ambiguous and
    /// the table was driven without a conflict check.
    #[error("more than one action for `{token}' in state {state}")]
    Conflict { state: String, token: String },

    /// A bound semantic action failed.
    #[error("semantic action for production {production} failed")]
    Semantic {
        production: usize,
        #[source]
        source: SemanticError,
    },

    /// A post-reduce goto resolved to zero or multiple targets; the table
    /// was built incorrectly. Never expected, never tolerated.
    #[error("goto on `{symbol}' in state {state} has {candidates} targets")]
    Invariant {
        state: String,
        symbol: String,
        candidates: usize,
    },
}
