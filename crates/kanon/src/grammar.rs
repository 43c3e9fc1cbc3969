//! Grammar types.

use crate::{types::Map, util::display_fn};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalID {
    raw: u16,
}

impl TerminalID {
    /// Reserved symbol used as a terminal meaning the end of input (`$`).
    pub const EOI: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }
}

#[derive(Debug)]
pub struct Terminal {
    id: TerminalID,
    name: Option<String>,
}

impl Terminal {
    pub fn id(&self) -> TerminalID {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            TerminalID::EOI => f.write_str("$"),
            _ => f.write_str(self.name().unwrap_or("<unknown>")),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonterminalID {
    raw: u16,
}

impl NonterminalID {
    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }
}

#[derive(Debug)]
pub struct Nonterminal {
    id: NonterminalID,
    name: String,
}

impl Nonterminal {
    pub fn id(&self) -> NonterminalID {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}

/// Stable production id, equal to the production's position in the grammar.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProductionID {
    raw: u16,
}

impl ProductionID {
    /// The first production of the grammar; reducing it accepts the input.
    pub const START: Self = Self::new(0);

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    pub fn index(self) -> usize {
        self.raw as usize
    }
}

impl fmt::Display for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// A production rule. Immutable once the grammar is built.
#[derive(Debug)]
pub struct Production {
    id: ProductionID,
    left: NonterminalID,
    right: Vec<SymbolID>,
}

impl Production {
    pub fn id(&self) -> ProductionID {
        self.id
    }

    /// The left-hand side of this production.
    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// The right-hand side; empty for an ε-production.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    // `"LHS := R1 R2 R3"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            write!(f, "{} :=", g.nonterminals[&self.left()])?;
            if self.right().is_empty() {
                write!(f, " ε")?;
            }
            for symbol in self.right() {
                match symbol {
                    SymbolID::T(t) => write!(f, " {}", g.terminals[t])?,
                    SymbolID::N(n) => write!(f, " {}", g.nonterminals[n])?,
                }
            }
            Ok(())
        })
    }
}

/// The grammar definition the parser tables are derived from.
///
/// Built grammars are always augmented: a hidden production
/// `$start := S` (appended after the user's productions, so their ids keep
/// matching their grammar positions) provides the automaton's start kernel,
/// and reducing it is the accept signal.
#[derive(Debug)]
#[non_exhaustive]
pub struct Grammar {
    pub terminals: Map<TerminalID, Terminal>,
    pub nonterminals: Map<NonterminalID, Nonterminal>,
    pub productions: Map<ProductionID, Production>,
    pub start_symbol: NonterminalID,
    pub augmented_start: NonterminalID,
    pub accept_production: ProductionID,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in self.terminals.values() {
            writeln!(f, "{}", terminal)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for nonterminal in self.nonterminals.values() {
            write!(f, "{}", nonterminal)?;
            if nonterminal.id() == self.start_symbol {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## productions:")?;
        for production in self.productions.values() {
            writeln!(f, "{}", production.display(self))?;
        }

        Ok(())
    }
}

impl Grammar {
    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarDefError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>,
    {
        let mut def = GrammarDef {
            terminals: Map::default(),
            nonterminals: Map::default(),
            productions: Map::default(),
            symbols: Map::default(),
            next_terminal_id: TerminalID::OFFSET,
            next_nonterminal_id: 0,
        };

        def.terminals.insert(
            TerminalID::EOI,
            Terminal {
                id: TerminalID::EOI,
                name: None,
            },
        );

        f(&mut def)?;

        def.end()
    }

    pub fn production(&self, id: ProductionID) -> &Production {
        &self.productions[&id]
    }

    pub fn productions(&self) -> impl Iterator<Item = &Production> + '_ {
        self.productions.values()
    }

    /// Productions whose left-hand side is `left`, in grammar order.
    pub fn productions_of(&self, left: NonterminalID) -> impl Iterator<Item = &Production> + '_ {
        self.productions.values().filter(move |p| p.left() == left)
    }

    pub fn start_symbol(&self) -> NonterminalID {
        self.start_symbol
    }

    /// The left-hand side of the hidden accept production.
    pub fn augmented_start(&self) -> NonterminalID {
        self.augmented_start
    }

    /// The hidden `$start := S` production.
    pub fn accept_production(&self) -> ProductionID {
        self.accept_production
    }

    pub fn nonterminal_name(&self, id: NonterminalID) -> &str {
        self.nonterminals[&id].name()
    }

    /// Resolve a terminal by its written name. `$` resolves to nothing; it
    /// is not a grammar symbol.
    pub fn terminal_by_name(&self, name: &str) -> Option<TerminalID> {
        self.terminals
            .values()
            .find(|t| t.name() == Some(name))
            .map(|t| t.id())
    }
}

/// How a symbol name classifies, decided purely lexically: a name whose
/// cased characters are all uppercase (with at least one of them) is a
/// nonterminal, anything else a terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
}

pub fn classify(name: &str) -> SymbolKind {
    let mut cased = false;
    for ch in name.chars() {
        if ch.is_lowercase() {
            return SymbolKind::Terminal;
        }
        if ch.is_uppercase() {
            cased = true;
        }
    }
    if cased {
        SymbolKind::Nonterminal
    } else {
        SymbolKind::Terminal
    }
}

/// The contextual values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    productions: Map<ProductionID, Production>,
    symbols: Map<String, SymbolID>,
    next_terminal_id: u16,
    next_nonterminal_id: u16,
}

impl GrammarDef {
    /// Intern a symbol name, classifying it lexically.
    pub fn symbol(&mut self, name: &str) -> Result<SymbolID, GrammarDefError> {
        if name == "$" {
            return Err(GrammarDefError::ReservedEndOfInput);
        }
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(GrammarDefError::InvalidName {
                name: name.to_owned(),
            });
        }

        if let Some(id) = self.symbols.get(name) {
            return Ok(*id);
        }

        let id = match classify(name) {
            SymbolKind::Terminal => {
                let id = TerminalID::new(self.next_terminal_id);
                self.next_terminal_id += 1;
                self.terminals.insert(
                    id,
                    Terminal {
                        id,
                        name: Some(name.to_owned()),
                    },
                );
                SymbolID::T(id)
            }
            SymbolKind::Nonterminal => {
                let id = NonterminalID::new(self.next_nonterminal_id);
                self.next_nonterminal_id += 1;
                self.nonterminals.insert(
                    id,
                    Nonterminal {
                        id,
                        name: name.to_owned(),
                    },
                );
                SymbolID::N(id)
            }
        };
        self.symbols.insert(name.to_owned(), id);

        Ok(id)
    }

    /// Append a production. Ids are handed out in call order, so the first
    /// production becomes the start production.
    pub fn production(&mut self, left: &str, right: &[&str]) -> Result<ProductionID, GrammarDefError> {
        let left = match self.symbol(left)? {
            SymbolID::N(n) => n,
            SymbolID::T(_) => {
                return Err(GrammarDefError::TerminalLeftHandSide {
                    name: left.to_owned(),
                })
            }
        };

        let mut right_ = Vec::with_capacity(right.len());
        for name in right {
            right_.push(self.symbol(name)?);
        }

        let id = ProductionID::new(self.productions.len() as u16);
        self.productions.insert(
            id,
            Production {
                id,
                left,
                right: right_,
            },
        );

        Ok(id)
    }

    fn end(mut self) -> Result<Grammar, GrammarDefError> {
        let start_symbol = self
            .productions
            .get(&ProductionID::START)
            .map(|p| p.left())
            .ok_or(GrammarDefError::EmptyGrammar)?;

        // Augment with `$start := S`, appended so user ids stay positional.
        let augmented_start = NonterminalID::new(self.next_nonterminal_id);
        self.nonterminals.insert(
            augmented_start,
            Nonterminal {
                id: augmented_start,
                name: "$start".to_owned(),
            },
        );
        let accept_production = ProductionID::new(self.productions.len() as u16);
        self.productions.insert(
            accept_production,
            Production {
                id: accept_production,
                left: augmented_start,
                right: vec![SymbolID::N(start_symbol)],
            },
        );

        Ok(Grammar {
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            productions: self.productions,
            start_symbol,
            augmented_start,
            accept_production,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarDefError {
    #[error("`$' is reserved for end-of-input and cannot appear in the grammar")]
    ReservedEndOfInput,

    #[error("invalid symbol name: `{name}'")]
    InvalidName { name: String },

    #[error("left-hand side `{name}' classifies as a terminal")]
    TerminalLeftHandSide { name: String },

    #[error("the grammar has no productions")]
    EmptyGrammar,
}
