//! Runtime parser definition backed by a generated table.

use crate::grammar::{Grammar, NonterminalID, TerminalID};
use crate::lr1::StateID;
use crate::parse_table::{Action, ParseTable};
use kanon_runtime::{ParseAction, ParserDef};

/// Bridges a [`Grammar`] and its [`ParseTable`] into the runtime engine's
/// view of a parser.
#[derive(Debug, Copy, Clone)]
pub struct ParserDefinition<'g> {
    grammar: &'g Grammar,
    table: &'g ParseTable,
}

impl<'g> ParserDefinition<'g> {
    pub fn new(grammar: &'g Grammar, table: &'g ParseTable) -> Self {
        Self { grammar, table }
    }
}

impl ParserDef for ParserDefinition<'_> {
    type StateIndex = StateID;
    type TerminalIndex = TerminalID;
    type NonterminalIndex = NonterminalID;

    fn initial_state(&self) -> Self::StateIndex {
        StateID::START
    }

    fn actions(
        &self,
        current: Self::StateIndex,
        lookahead: Option<Self::TerminalIndex>,
    ) -> Vec<ParseAction<StateID, NonterminalID>> {
        let lookahead = lookahead.unwrap_or(TerminalID::EOI);
        self.table
            .row(current)
            .actions(lookahead)
            .iter()
            .map(|action| match *action {
                Action::Shift(next) => ParseAction::Shift(next),
                Action::Reduce(id) => {
                    let production = self.grammar.production(id);
                    ParseAction::Reduce {
                        production: id.index(),
                        left: production.left(),
                        arity: production.right().len(),
                    }
                }
            })
            .collect()
    }

    fn gotos(&self, current: Self::StateIndex, symbol: Self::NonterminalIndex) -> Vec<StateID> {
        self.table.row(current).gotos(symbol).to_vec()
    }

    fn nonterminal_name(&self, symbol: Self::NonterminalIndex) -> &str {
        self.grammar.nonterminal_name(symbol)
    }

    fn is_start(&self, symbol: Self::NonterminalIndex) -> bool {
        symbol == self.grammar.augmented_start()
    }
}
