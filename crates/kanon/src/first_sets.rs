//! Nullable-set and FIRST computation.

use crate::grammar::{Grammar, NonterminalID, SymbolID, TerminalID};
use crate::types::Set;
use std::collections::BTreeSet;

/// `FIRST(α)` for a symbol sequence α.
///
/// ε-membership is kept as an explicit flag instead of a sentinel element:
/// `nullable` holds exactly when α is empty or nullable through to the end
/// of the sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct First {
    pub tokens: BTreeSet<TerminalID>,
    pub nullable: bool,
}

#[derive(Debug)]
pub struct FirstSets<'g> {
    grammar: &'g Grammar,
    nulls: Set<NonterminalID>,
}

impl<'g> FirstSets<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        let nulls = nulls_set(grammar);
        Self { grammar, nulls }
    }

    pub fn is_nullable(&self, symbol: NonterminalID) -> bool {
        self.nulls.contains(&symbol)
    }

    pub fn nulls(&self) -> &Set<NonterminalID> {
        &self.nulls
    }

    /// Compute `FIRST(symbols)`.
    pub fn first(&self, symbols: &[SymbolID]) -> First {
        self.first_guarded(symbols, &Set::default())
    }

    // The guard holds the nonterminals currently being expanded in this call
    // chain; re-entering one of them is blocked. Expanding a nonterminal
    // grows the guard, and the tail continuation for a nullable head keeps
    // the caller's guard while strictly shrinking the sequence, so the
    // recursion terminates even for left-nullable-recursive grammars.
    fn first_guarded(&self, symbols: &[SymbolID], expanding: &Set<NonterminalID>) -> First {
        let head = match symbols.first() {
            Some(head) => *head,
            None => {
                return First {
                    tokens: BTreeSet::new(),
                    nullable: true,
                }
            }
        };

        let mut first = First::default();
        match head {
            SymbolID::T(t) => {
                first.tokens.insert(t);
            }
            SymbolID::N(n) if !expanding.contains(&n) => {
                let mut inner = expanding.clone();
                inner.insert(n);
                for production in self.grammar.productions_of(n) {
                    if production.right().is_empty() {
                        continue;
                    }
                    let sub = self.first_guarded(production.right(), &inner);
                    first.tokens.extend(sub.tokens);
                }
            }
            SymbolID::N(_) => {}
        }

        if let SymbolID::N(n) = head {
            if self.nulls.contains(&n) {
                let tail = self.first_guarded(&symbols[1..], expanding);
                first.tokens.extend(tail.tokens);
                first.nullable = tail.nullable;
            }
        }

        first
    }
}

/// Calculate the set of nullable nonterminals in this grammar.
///
/// The set grows monotonically and is bounded by the nonterminal count, so
/// the loop always converges.
fn nulls_set(grammar: &Grammar) -> Set<NonterminalID> {
    let mut nulls: Set<NonterminalID> = grammar
        .productions()
        .filter_map(|p| p.right().is_empty().then(|| p.left()))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions() {
            if nulls.contains(&production.left()) {
                continue;
            }
            let is_rhs_nullable = production
                .right()
                .iter()
                .all(|symbol| matches!(symbol, SymbolID::N(n) if nulls.contains(n)));
            if is_rhs_nullable {
                changed = true;
                nulls.insert(production.left());
            }
        }
    }

    nulls
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(grammar: &Grammar, nulls: &Set<NonterminalID>) -> Vec<String> {
        let mut out: Vec<_> = nulls
            .iter()
            .map(|n| grammar.nonterminal_name(*n).to_owned())
            .collect();
        out.sort();
        out
    }

    #[test]
    fn nullable_fixpoint() {
        // S := A S | ε ; A := a | ε
        let grammar = Grammar::define(|g| {
            g.production("S", &["A", "S"])?;
            g.production("S", &[])?;
            g.production("A", &["a"])?;
            g.production("A", &[])?;
            Ok(())
        })
        .unwrap();

        let first_sets = FirstSets::new(&grammar);
        assert_eq!(names(&grammar, first_sets.nulls()), ["A", "S"]);
    }

    #[test]
    fn nullable_through_chain() {
        // B is nullable only through A, which needs a second pass.
        let grammar = Grammar::define(|g| {
            g.production("B", &["A", "A"])?;
            g.production("A", &[])?;
            g.production("A", &["x"])?;
            Ok(())
        })
        .unwrap();

        let first_sets = FirstSets::new(&grammar);
        assert_eq!(names(&grammar, first_sets.nulls()), ["A", "B"]);
    }

    #[test]
    fn first_of_terminal_head() {
        let grammar = Grammar::define(|g| {
            g.production("S", &["a", "B"])?;
            g.production("B", &["b"])?;
            Ok(())
        })
        .unwrap();

        let first_sets = FirstSets::new(&grammar);
        let s = grammar.production(crate::grammar::ProductionID::START);
        let first = first_sets.first(s.right());
        assert_eq!(first.tokens.len(), 1);
        assert!(first.tokens.contains(&grammar.terminal_by_name("a").unwrap()));
        assert!(!first.nullable);
    }

    #[test]
    fn epsilon_iff_nullable_to_the_end() {
        // S := A B ; A := a | ε ; B := b | ε
        let grammar = Grammar::define(|g| {
            g.production("S", &["A", "B"])?;
            g.production("A", &["a"])?;
            g.production("A", &[])?;
            g.production("B", &["b"])?;
            g.production("B", &[])?;
            Ok(())
        })
        .unwrap();

        let first_sets = FirstSets::new(&grammar);
        let a = grammar.terminal_by_name("a").unwrap();
        let b = grammar.terminal_by_name("b").unwrap();
        let s = grammar.production(crate::grammar::ProductionID::START);

        // FIRST(A B) = {a, b, ε}: both symbols are nullable.
        let first = first_sets.first(s.right());
        assert_eq!(first.tokens, BTreeSet::from([a, b]));
        assert!(first.nullable);

        // FIRST(A b) loses ε: the sequence is not nullable to the end.
        let mixed = [s.right()[0], SymbolID::T(b)];
        let first = first_sets.first(&mixed);
        assert_eq!(first.tokens, BTreeSet::from([a, b]));
        assert!(!first.nullable);

        assert_eq!(first_sets.first(&[]).nullable, true);
    }

    #[test]
    fn left_nullable_recursion_does_not_loop() {
        // T := A T x with nullable A: erasing A regenerates the sequence
        // `T x`, the pathological shape for an unguarded tail continuation.
        let grammar = Grammar::define(|g| {
            g.production("E", &["E", "+", "T"])?;
            g.production("E", &["T"])?;
            g.production("T", &["A", "T", "x"])?;
            g.production("T", &["y"])?;
            g.production("A", &[])?;
            Ok(())
        })
        .unwrap();

        let first_sets = FirstSets::new(&grammar);
        let first = first_sets.first(&[SymbolID::N(grammar.start_symbol())]);
        let y = grammar.terminal_by_name("y").unwrap();
        assert!(first.tokens.contains(&y));
        assert!(!first.nullable);
    }
}
