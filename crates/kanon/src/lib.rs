//! kanon: a canonical LR(1) parser generator and table-driven engine.
//!
//! A grammar is an ordered list of productions over lexically classified
//! symbols (all-uppercase names are nonterminals). From it the generator
//! derives nullability, FIRST sets, the canonical LR(1) collection and a
//! shift/reduce/goto table; the `kanon-runtime` engine then drives the
//! table against a token stream, running registered semantic actions on
//! every reduction and building a concrete parse tree.

pub mod first_sets;
pub mod grammar;
pub mod lr1;
pub mod parse_table;
pub mod parser;
pub mod syntax;
pub mod tokenize;
pub mod types;
mod util;
