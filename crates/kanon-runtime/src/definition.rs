//! Parser definition.

use std::fmt;

/// The trait for abstracting a generated LR(1) parse table.
///
/// The engine only ever reads through this trait, so a definition may be
/// backed by an in-memory table, a borrowed one, or anything else that can
/// answer action and goto queries per state.
pub trait ParserDef {
    /// The number identifying a state of the LR(1) automaton.
    type StateIndex: Copy + fmt::Display;

    /// The number identifying a terminal symbol.
    type TerminalIndex: Copy;

    /// The number identifying a nonterminal symbol.
    type NonterminalIndex: Copy;

    /// Return the initial state number.
    fn initial_state(&self) -> Self::StateIndex;

    /// Return every action registered for the specified state and lookahead
    /// symbol, in table order.
    ///
    /// `None` is passed as the lookahead once the input is exhausted. An
    /// empty cell means there is no legal move; a cell with more than one
    /// entry is a grammar conflict and is surfaced as such by the engine,
    /// never resolved.
    fn actions(
        &self,
        current: Self::StateIndex,
        lookahead: Option<Self::TerminalIndex>,
    ) -> Vec<ParseAction<Self::StateIndex, Self::NonterminalIndex>>;

    /// Return the goto targets for the specified state and nonterminal.
    ///
    /// A correctly built table has exactly one target wherever this is
    /// consulted; anything else is reported by the engine as a construction
    /// defect.
    fn gotos(&self, current: Self::StateIndex, symbol: Self::NonterminalIndex)
        -> Vec<Self::StateIndex>;

    /// The display name of a nonterminal, used to label parse-tree nodes.
    fn nonterminal_name(&self, symbol: Self::NonterminalIndex) -> &str;

    /// Whether `symbol` is the start nonterminal; reducing to it accepts.
    fn is_start(&self, symbol: Self::NonterminalIndex) -> bool;
}

impl<T: ?Sized> ParserDef for &T
where
    T: ParserDef,
{
    type StateIndex = T::StateIndex;
    type TerminalIndex = T::TerminalIndex;
    type NonterminalIndex = T::NonterminalIndex;

    fn initial_state(&self) -> Self::StateIndex {
        (**self).initial_state()
    }

    fn actions(
        &self,
        current: Self::StateIndex,
        lookahead: Option<Self::TerminalIndex>,
    ) -> Vec<ParseAction<Self::StateIndex, Self::NonterminalIndex>> {
        (**self).actions(current, lookahead)
    }

    fn gotos(
        &self,
        current: Self::StateIndex,
        symbol: Self::NonterminalIndex,
    ) -> Vec<Self::StateIndex> {
        (**self).gotos(current, symbol)
    }

    fn nonterminal_name(&self, symbol: Self::NonterminalIndex) -> &str {
        (**self).nonterminal_name(symbol)
    }

    fn is_start(&self, symbol: Self::NonterminalIndex) -> bool {
        (**self).is_start(symbol)
    }
}

/// A single table entry, as seen by the engine.
#[derive(Debug, Copy, Clone)]
#[non_exhaustive]
pub enum ParseAction<TState, TSymbol> {
    /// Consume the lookahead and transition to the specified state.
    Shift(TState),

    /// Reduce by the specified production.
    Reduce {
        /// Stable production id, equal to its position in the grammar.
        production: usize,
        /// The left-hand side the reduction produces.
        left: TSymbol,
        /// Number of right-hand-side symbols to pop.
        arity: usize,
    },
}
