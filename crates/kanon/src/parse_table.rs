//! Shift/reduce/goto table construction.

use crate::grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID};
use crate::lr1::{display_item_set, Automaton, StateID};
use crate::types::Map;
use crate::util::display_fn;
use std::fmt;

/// One entry of an action cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    /// Consume the terminal and transition to the state.
    Shift(StateID),

    /// Reduce by the production.
    Reduce(ProductionID),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift(state) => write!(f, "S{}", state),
            Self::Reduce(production) => write!(f, "R{}", production),
        }
    }
}

/// One table row: the action cells and goto cells of a single state.
///
/// Cells keep *every* gathered entry; nothing is resolved away. An absent
/// cell means there is no legal move, a cell with several entries is a
/// conflict.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Row {
    actions: Map<TerminalID, Vec<Action>>,
    gotos: Map<NonterminalID, Vec<StateID>>,
}

impl Row {
    pub fn actions(&self, terminal: TerminalID) -> &[Action] {
        self.actions.get(&terminal).map_or(&[], Vec::as_slice)
    }

    pub fn gotos(&self, nonterminal: NonterminalID) -> &[StateID] {
        self.gotos.get(&nonterminal).map_or(&[], Vec::as_slice)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseTable {
    rows: Vec<Row>,
}

impl ParseTable {
    /// Derive the table from a finished automaton.
    ///
    /// Shifts come from the transition relation, reduces from reduce-ready
    /// items whose lookahead contains the terminal, in that order within a
    /// cell; gotos from the nonterminal-labeled transitions.
    pub fn generate(grammar: &Grammar, automaton: &Automaton) -> Self {
        let mut rows = Vec::with_capacity(automaton.state_count());

        for (_, state) in automaton.states() {
            let mut row = Row::default();

            for (symbol, target) in state.edges() {
                match symbol {
                    SymbolID::T(t) => row.actions.entry(t).or_default().push(Action::Shift(target)),
                    SymbolID::N(n) => row.gotos.entry(n).or_default().push(target),
                }
            }

            for (core, lookaheads) in state.items() {
                if !core.is_reducible(grammar) {
                    continue;
                }
                for lookahead in lookaheads {
                    row.actions
                        .entry(*lookahead)
                        .or_default()
                        .push(Action::Reduce(core.production));
                }
            }

            rows.push(row);
        }

        Self { rows }
    }

    pub fn row(&self, state: StateID) -> &Row {
        &self.rows[state.index()]
    }

    pub fn state_count(&self) -> usize {
        self.rows.len()
    }

    /// Scan every cell for conflicts, failing on the first one found.
    ///
    /// Ambiguity is a property of the grammar, not of any input, so this
    /// runs at build time and the driver aborts before reading anything.
    pub fn check(&self, grammar: &Grammar, automaton: &Automaton) -> Result<(), AmbiguityError> {
        for (id, state) in automaton.states() {
            let row = self.row(id);

            for (terminal, cell) in &row.actions {
                if cell.len() > 1 {
                    return Err(AmbiguityError {
                        state: id,
                        symbol: grammar.terminals[terminal].to_string(),
                        actions: cell.iter().map(Action::to_string).collect::<Vec<_>>().join("/"),
                        item_set: display_item_set(state.items(), grammar).to_string(),
                    });
                }
            }
            for (nonterminal, cell) in &row.gotos {
                if cell.len() > 1 {
                    return Err(AmbiguityError {
                        state: id,
                        symbol: grammar.nonterminals[nonterminal].to_string(),
                        actions: cell
                            .iter()
                            .map(StateID::to_string)
                            .collect::<Vec<_>>()
                            .join("/"),
                        item_set: display_item_set(state.items(), grammar).to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Render the table as a grid: one row per state, terminal columns
    /// (end-of-input included) followed by nonterminal columns.
    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            const WIDTH: usize = 8;

            write!(f, "{:>4} ", "")?;
            for terminal in grammar.terminals.values() {
                write!(f, "{:<WIDTH$}", terminal.to_string())?;
            }
            write!(f, " | ")?;
            for nonterminal in grammar.nonterminals.values() {
                write!(f, "{:<WIDTH$}", nonterminal.to_string())?;
            }
            writeln!(f)?;

            for (index, row) in self.rows.iter().enumerate() {
                write!(f, "{:>4} ", index)?;
                for terminal in grammar.terminals.values() {
                    let cell = row
                        .actions(terminal.id())
                        .iter()
                        .map(Action::to_string)
                        .collect::<Vec<_>>()
                        .join("/");
                    write!(f, "{:<WIDTH$}", cell)?;
                }
                write!(f, " | ")?;
                for nonterminal in grammar.nonterminals.values() {
                    let cell = row
                        .gotos(nonterminal.id())
                        .iter()
                        .map(StateID::to_string)
                        .collect::<Vec<_>>()
                        .join("/");
                    write!(f, "{:<WIDTH$}", cell)?;
                }
                writeln!(f)?;
            }
            Ok(())
        })
    }
}

/// The grammar admits more than one action for some state and symbol.
///
/// Carries the conflicting entries and the item set of the offending state
/// for diagnosis.
#[derive(Debug, thiserror::Error)]
#[error(
    "ambiguous grammar: more than one action for `{symbol}' in state {state} ({actions})\n{item_set}"
)]
pub struct AmbiguityError {
    pub state: StateID,
    pub symbol: String,
    pub actions: String,
    pub item_set: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lr1::Automaton;

    fn build(grammar: &Grammar) -> (Automaton, ParseTable) {
        let automaton = Automaton::generate(grammar);
        let table = ParseTable::generate(grammar, &automaton);
        (automaton, table)
    }

    #[test]
    fn arithmetic_table_is_conflict_free() {
        let grammar = Grammar::define(|g| {
            g.production("E", &["E", "+", "T"])?;
            g.production("E", &["T"])?;
            g.production("T", &["T", "*", "F"])?;
            g.production("T", &["F"])?;
            g.production("F", &["(", "E", ")"])?;
            g.production("F", &["id"])?;
            Ok(())
        })
        .unwrap();

        let (automaton, table) = build(&grammar);
        assert_eq!(table.state_count(), automaton.state_count());
        table.check(&grammar, &automaton).unwrap();
    }

    #[test]
    fn reduce_reduce_conflict_is_reported() {
        // S := A | B ; A := a ; B := a. Reducing `a` is ambiguous.
        let grammar = Grammar::define(|g| {
            g.production("S", &["A"])?;
            g.production("S", &["B"])?;
            g.production("A", &["a"])?;
            g.production("B", &["a"])?;
            Ok(())
        })
        .unwrap();

        let (automaton, table) = build(&grammar);
        let err = table.check(&grammar, &automaton).unwrap_err();
        assert!(err.actions.contains("R2") && err.actions.contains("R3"));
        assert!(err.item_set.contains(":= a ."));
    }

    #[test]
    fn table_regeneration_is_identical() {
        let grammar = Grammar::define(|g| {
            g.production("S", &["S", "a"])?;
            g.production("S", &["a"])?;
            Ok(())
        })
        .unwrap();

        let automaton = Automaton::generate(&grammar);
        let first = ParseTable::generate(&grammar, &automaton);
        let second = ParseTable::generate(&grammar, &automaton);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_cells_stay_empty() {
        let grammar = Grammar::define(|g| {
            g.production("S", &["a", "b"])?;
            Ok(())
        })
        .unwrap();

        let (_, table) = build(&grammar);
        let b = grammar.terminal_by_name("b").unwrap();
        // State 0 has no legal move on `b`.
        assert!(table.row(StateID::START).actions(b).is_empty());
    }
}
