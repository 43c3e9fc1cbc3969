//! Construction of the canonical LR(1) collection.
//!
//! States are built the way the source grammar demands it: closures start
//! with empty lookaheads, and a per-state FOLLOW pass fills them in before
//! the state is compared against the already-discovered collection. Two
//! states with the same cores but different lookaheads stay distinct, so the
//! result is a true canonical LR(1) automaton, never an LALR merge.

use crate::first_sets::FirstSets;
use crate::grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID};
use crate::types::Set;
use crate::util::display_fn;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateID {
    raw: u32,
}

impl StateID {
    pub const START: Self = Self::new(0);

    #[inline]
    const fn new(raw: u32) -> Self {
        Self { raw }
    }

    pub fn index(self) -> usize {
        self.raw as usize
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// An LR(1) item core: a production with a marker position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemCore {
    pub production: ProductionID,
    pub marker: usize,
}

impl ItemCore {
    fn start(production: ProductionID) -> Self {
        Self {
            production,
            marker: 0,
        }
    }

    /// Whether the marker has reached the end of the right-hand side.
    pub fn is_reducible(&self, g: &Grammar) -> bool {
        self.marker >= g.production(self.production).right().len()
    }

    /// The symbol immediately after the marker, if any.
    pub fn next_symbol(&self, g: &Grammar) -> Option<SymbolID> {
        g.production(self.production).right().get(self.marker).copied()
    }

    fn advanced(&self) -> Self {
        Self {
            production: self.production,
            marker: self.marker + 1,
        }
    }

    // `"(E := E . + T)"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            let production = g.production(self.production);
            write!(f, "({} :=", g.nonterminals[&production.left()])?;
            for (i, symbol) in production.right().iter().enumerate() {
                if i == self.marker {
                    f.write_str(" .")?;
                }
                match symbol {
                    SymbolID::T(t) => write!(f, " {}", g.terminals[t])?,
                    SymbolID::N(n) => write!(f, " {}", g.nonterminals[n])?,
                }
            }
            if self.marker == production.right().len() {
                f.write_str(" .")?;
            }
            f.write_str(")")
        })
    }
}

pub type Lookaheads = BTreeSet<TerminalID>;

/// One automaton state: each core carries exactly one lookahead set, and
/// the whole map (lookaheads included) is the state's identity.
pub type ItemSet = BTreeMap<ItemCore, Lookaheads>;

#[derive(Debug, PartialEq, Eq)]
pub struct State {
    items: ItemSet,
    edges: BTreeMap<SymbolID, StateID>,
}

impl State {
    pub fn items(&self) -> &ItemSet {
        &self.items
    }

    /// The GOTO/shift edges out of this state.
    pub fn edges(&self) -> impl Iterator<Item = (SymbolID, StateID)> + '_ {
        self.edges.iter().map(|(symbol, target)| (*symbol, *target))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Automaton {
    states: Vec<State>,
}

impl Automaton {
    /// Build the canonical collection for `grammar`.
    pub fn generate(grammar: &Grammar) -> Self {
        let builder = Builder {
            grammar,
            first_sets: FirstSets::new(grammar),
        };

        let mut items = ItemSet::new();
        builder.close_item(
            &mut items,
            ItemCore::start(grammar.accept_production()),
            Lookaheads::from([TerminalID::EOI]),
            &mut Set::default(),
        );
        builder.propagate_follows(&mut items);

        let mut states = vec![State {
            items,
            edges: BTreeMap::new(),
        }];
        let mut pending = VecDeque::from([StateID::START]);

        while let Some(current) = pending.pop_front() {
            // Deterministic: items iterate in core order, so both the symbol
            // list and the discovery order of new states are reproducible.
            let current_items = states[current.index()].items.clone();
            let mut symbols: Set<SymbolID> = Set::default();
            for core in current_items.keys() {
                if let Some(symbol) = core.next_symbol(grammar) {
                    symbols.insert(symbol);
                }
            }

            for symbol in symbols {
                let mut new_items = ItemSet::new();
                for (core, lookaheads) in &current_items {
                    if core.next_symbol(grammar) != Some(symbol) {
                        continue;
                    }
                    builder.close_item(
                        &mut new_items,
                        core.advanced(),
                        lookaheads.clone(),
                        &mut Set::default(),
                    );
                }
                builder.propagate_follows(&mut new_items);

                // Full set equality, lookaheads included.
                let existing = states.iter().position(|state| state.items == new_items);
                let target = match existing {
                    Some(index) => StateID::new(index as u32),
                    None => {
                        let id = StateID::new(states.len() as u32);
                        states.push(State {
                            items: new_items,
                            edges: BTreeMap::new(),
                        });
                        pending.push_back(id);
                        id
                    }
                };
                states[current.index()].edges.insert(symbol, target);
            }
        }

        Self { states }
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, id: StateID) -> &State {
        &self.states[id.index()]
    }

    pub fn states(&self) -> impl Iterator<Item = (StateID, &State)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(index, state)| (StateID::new(index as u32), state))
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            for (i, (id, state)) in self.states().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {:02}", id)?;
                writeln!(f, "## items")?;
                for (core, lookaheads) in state.items() {
                    write!(f, "- {}  [", core.display(g))?;
                    for (i, lookahead) in lookaheads.iter().enumerate() {
                        if i > 0 {
                            f.write_str(" ")?;
                        }
                        write!(f, "{}", g.terminals[lookahead])?;
                    }
                    f.write_str("]\n")?;
                }
                writeln!(f, "## transitions")?;
                for (symbol, target) in state.edges() {
                    match symbol {
                        SymbolID::T(t) => writeln!(f, "- {} => shift({:02})", g.terminals[&t], target)?,
                        SymbolID::N(n) => {
                            writeln!(f, "- {} => goto({:02})", g.nonterminals[&n], target)?
                        }
                    }
                }
            }
            Ok(())
        })
    }
}

/// Render one item set the way diagnostics want it, one item per line.
pub fn display_item_set<'g>(items: &'g ItemSet, g: &'g Grammar) -> impl fmt::Display + 'g {
    display_fn(move |f| {
        for (core, lookaheads) in items {
            write!(f, "{}  [", core.display(g))?;
            for (i, lookahead) in lookaheads.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", g.terminals[lookahead])?;
            }
            f.write_str("]\n")?;
        }
        Ok(())
    })
}

struct Builder<'g> {
    grammar: &'g Grammar,
    first_sets: FirstSets<'g>,
}

impl Builder<'_> {
    /// ε-closure of one kernel item into `items`.
    ///
    /// Freshly generated items start with empty lookaheads; the FOLLOW pass
    /// fills them in afterwards. The visited set is scoped to one kernel
    /// item's closure, which is what keeps directly and mutually recursive
    /// nonterminals from expanding forever.
    fn close_item(
        &self,
        items: &mut ItemSet,
        core: ItemCore,
        lookaheads: Lookaheads,
        visited: &mut Set<NonterminalID>,
    ) {
        items.entry(core).or_default().extend(lookaheads);

        if let Some(SymbolID::N(next)) = core.next_symbol(self.grammar) {
            if visited.insert(next) {
                for production in self.grammar.productions_of(next) {
                    self.close_item(
                        items,
                        ItemCore::start(production.id()),
                        Lookaheads::new(),
                        visited,
                    );
                }
            }
        }
    }

    /// In-state FOLLOW of `nonterminal`, restricted to `items`.
    ///
    /// For every item `A := α . N β` the FOLLOW of N picks up FIRST(β);
    /// when β can vanish it also picks up the lookaheads already attached to
    /// A's items plus, guarded against mutual dependence, the in-state
    /// FOLLOW of A itself.
    fn follow_of(
        &self,
        items: &ItemSet,
        nonterminal: NonterminalID,
        seen: &Set<NonterminalID>,
    ) -> Lookaheads {
        let mut follow = Lookaheads::new();

        for (core, _) in items {
            if core.next_symbol(self.grammar) != Some(SymbolID::N(nonterminal)) {
                continue;
            }

            let production = self.grammar.production(core.production);
            let beta = &production.right()[core.marker + 1..];
            let first = self.first_sets.first(beta);
            follow.extend(first.tokens);

            if first.nullable {
                let left = production.left();
                for (other, lookaheads) in items {
                    if self.grammar.production(other.production).left() == left {
                        follow.extend(lookaheads.iter().copied());
                    }
                }
                if !seen.contains(&left) {
                    let mut inner = seen.clone();
                    inner.insert(left);
                    follow.extend(self.follow_of(items, left, &inner));
                }
            }
        }

        follow
    }

    /// Fill in the lookaheads of a finished item set.
    ///
    /// Runs on every newly built state: lookaheads are context per state,
    /// never global FOLLOW sets.
    fn propagate_follows(&self, items: &mut ItemSet) {
        let mut lefts: Set<NonterminalID> = Set::default();
        for core in items.keys() {
            lefts.insert(self.grammar.production(core.production).left());
        }

        for left in lefts {
            let follow = self.follow_of(items, left, &Set::default());
            for (core, lookaheads) in items.iter_mut() {
                if self.grammar.production(core.production).left() == left {
                    lookaheads.extend(follow.iter().copied());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arithmetic() -> Grammar {
        Grammar::define(|g| {
            g.production("E", &["E", "+", "T"])?;
            g.production("E", &["T"])?;
            g.production("T", &["T", "*", "F"])?;
            g.production("T", &["F"])?;
            g.production("F", &["(", "E", ")"])?;
            g.production("F", &["id"])?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn start_state_closes_over_start_symbol() {
        let grammar = arithmetic();
        let automaton = Automaton::generate(&grammar);

        let start = automaton.state(StateID::START);
        // The accept kernel plus all six grammar productions at marker 0.
        assert_eq!(start.items().len(), 7);
        assert!(start.items().keys().all(|core| core.marker == 0));

        let kernel = &start.items()[&ItemCore::start(grammar.accept_production())];
        assert_eq!(*kernel, Lookaheads::from([TerminalID::EOI]));
    }

    #[test]
    fn epsilon_production_follow_reaches_the_next_terminal() {
        // S := A b ; A := ε. FOLLOW(A) inside state 0 must contain `b`.
        let grammar = Grammar::define(|g| {
            g.production("S", &["A", "b"])?;
            g.production("A", &[])?;
            Ok(())
        })
        .unwrap();
        let automaton = Automaton::generate(&grammar);

        let b = grammar.terminal_by_name("b").unwrap();
        let start = automaton.state(StateID::START);
        let epsilon_item = ItemCore {
            production: grammar.productions().nth(1).unwrap().id(),
            marker: 0,
        };
        assert!(start.items()[&epsilon_item].contains(&b));
    }

    #[test]
    fn deterministic_construction() {
        let grammar = arithmetic();
        let first = Automaton::generate(&grammar);
        let second = Automaton::generate(&grammar);
        assert_eq!(first.state_count(), second.state_count());
        assert_eq!(first, second);
    }

    #[test]
    fn in_state_follow_fills_closure_lookaheads() {
        // Hand-computed lookaheads for state 0 of the arithmetic grammar:
        // FOLLOW(E) = {+, $}, FOLLOW(T) = FOLLOW(F) = {+, *, $}, and the
        // accept kernel keeps its plain {$}. Items sharing a left-hand
        // side end up with identical sets here.
        let grammar = arithmetic();
        let automaton = Automaton::generate(&grammar);
        let start = automaton.state(StateID::START);

        let plus = grammar.terminal_by_name("+").unwrap();
        let star = grammar.terminal_by_name("*").unwrap();
        let la_of = |nth: usize| {
            let id = grammar.productions().nth(nth).unwrap().id();
            start.items()[&ItemCore::start(id)].clone()
        };

        let e_follow = Lookaheads::from([plus, TerminalID::EOI]);
        let t_follow = Lookaheads::from([plus, star, TerminalID::EOI]);
        assert_eq!(la_of(0), e_follow);
        assert_eq!(la_of(1), e_follow);
        assert_eq!(la_of(2), t_follow);
        assert_eq!(la_of(3), t_follow);
        assert_eq!(la_of(4), t_follow);
        assert_eq!(la_of(5), t_follow);
    }

    #[test]
    fn states_with_distinct_lookaheads_stay_distinct() {
        // In a canonical collection the `T := . id` items reached from the
        // left and from inside parentheses carry different lookaheads, so
        // the automaton must hold more states than an LALR merge would.
        let grammar = Grammar::define(|g| {
            g.production("S", &["T", "x"])?;
            g.production("S", &["(", "T", ")"])?;
            g.production("T", &["id"])?;
            Ok(())
        })
        .unwrap();
        let automaton = Automaton::generate(&grammar);

        let id = grammar.terminal_by_name("id").unwrap();
        let reducing_states: Vec<_> = automaton
            .states()
            .filter(|(_, state)| {
                state
                    .items()
                    .iter()
                    .any(|(core, _)| core.is_reducible(&grammar) && core.marker == 1)
            })
            .collect();
        // `T := id .` appears twice, under different lookaheads.
        let mut lookahead_sets: Vec<&Lookaheads> = vec![];
        for (_, state) in reducing_states {
            for (core, lookaheads) in state.items() {
                if core.is_reducible(&grammar)
                    && grammar.production(core.production).right() == &[SymbolID::T(id)]
                {
                    lookahead_sets.push(lookaheads);
                }
            }
        }
        assert_eq!(lookahead_sets.len(), 2);
        assert_ne!(lookahead_sets[0], lookahead_sets[1]);
    }
}
