/*
    This module is for storing grammars: the symbols a grammar declares, the
    rules attached to its nonterminals and the designated start symbol
*/

pub mod store;
mod symbol_table;

use std::fmt::Display;
use std::path::PathBuf;

pub use symbol_table::{KindConflict, SymbolTable};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(usize);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
    // Only seen on a right-hand side so far
    Unresolved,
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Terminal => write!(f, "terminal"),
            SymbolKind::Nonterminal => write!(f, "nonterminal"),
            SymbolKind::Unresolved => write!(f, "unresolved symbol"),
        }
    }
}

// One alternative of a nonterminal's definition. The symbols are borrowed
// from the table by id, never copied.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub symbols: Vec<SymbolId>,
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub rules: Vec<Rule>,
    pub first_seen: usize,
    pub defined_at: Option<usize>,
}

impl Symbol {
    pub fn is_defined(&self) -> bool {
        self.defined_at.is_some()
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == SymbolKind::Terminal
    }

    pub fn is_nonterminal(&self) -> bool {
        self.kind == SymbolKind::Nonterminal
    }
}

// A `%start` that named a different symbol than the first one did
#[derive(Clone, Debug, PartialEq)]
pub struct ExtraStart {
    pub symbol: SymbolId,
    pub line: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grammar {
    // Where the grammar was read from, for diagnostics
    pub file: PathBuf,
    pub symbols: SymbolTable,
    pub start: Option<SymbolId>,
    pub start_line: usize,
    pub extra_starts: Vec<ExtraStart>,
}

impl Grammar {
    pub fn from_file(file: PathBuf) -> Self {
        Grammar { file, ..Self::default() }
    }

    pub fn declare_start(&mut self, symbol: SymbolId, line: usize) {
        match self.start {
            None => {
                self.start = Some(symbol);
                self.start_line = line;
            }
            Some(start) if start == symbol => {}
            Some(_) => self.extra_starts.push(ExtraStart { symbol, line }),
        }
    }

    pub fn start_symbol(&self) -> Option<&Symbol> {
        self.start.map(|id| self.symbols.symbol(id))
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.symbols.symbol(id).name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_start_is_idempotent() {
        let mut grammar = Grammar::default();
        let s = grammar.symbols.intern_nonterminal("s", 1).unwrap();
        let t = grammar.symbols.intern_nonterminal("t", 2).unwrap();

        grammar.declare_start(s, 1);
        grammar.declare_start(s, 3);
        assert_eq!(grammar.start, Some(s));
        assert_eq!(grammar.start_line, 1);
        assert!(grammar.extra_starts.is_empty());

        grammar.declare_start(t, 4);
        assert_eq!(grammar.start, Some(s));
        assert_eq!(grammar.extra_starts, vec![ExtraStart { symbol: t, line: 4 }]);
        assert_eq!(grammar.start_symbol().map(|s| s.name.as_str()), Some("s"));
    }
}
