use log::trace;
use thiserror::Error;

use super::store::Store;
use super::{Rule, Symbol, SymbolId, SymbolKind};

#[derive(Debug, Clone, PartialEq, Error)]
#[error("`{name}` is already a {existing} and cannot also be used as a {requested}")]
pub struct KindConflict {
    pub name: String,
    pub existing: SymbolKind,
    pub requested: SymbolKind,
}

// Owns every symbol of one grammar. Ids handed out stay valid for as long as
// the table lives.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    index: Store<SymbolId>,
}

impl PartialEq for SymbolTable {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl SymbolTable {
    fn lookup_or_insert(&mut self, name: &str, line: usize, kind: SymbolKind) -> (SymbolId, bool) {
        if let Some(&id) = self.index.get(name.as_bytes()) {
            return (id, false);
        }

        let id = SymbolId(self.symbols.len());
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            rules: Vec::new(),
            first_seen: line,
            defined_at: None,
        });
        self.index.insert(name.as_bytes(), id);
        debug_assert_eq!(self.index.len(), self.symbols.len());
        trace!("interned {} `{}` as {:?}", kind, name, id);
        (id, true)
    }

    /// Record a right-hand-side use of `name` without committing its kind.
    pub fn reference(&mut self, name: &str, line: usize) -> SymbolId {
        self.lookup_or_insert(name, line, SymbolKind::Unresolved).0
    }

    pub fn intern_terminal(&mut self, name: &str, line: usize) -> Result<SymbolId, KindConflict> {
        let id = self.commit(name, line, SymbolKind::Terminal)?;
        let symbol = &mut self.symbols[id.0];
        if symbol.defined_at.is_none() {
            symbol.defined_at = Some(line);
        }
        Ok(id)
    }

    pub fn intern_nonterminal(&mut self, name: &str, line: usize) -> Result<SymbolId, KindConflict> {
        self.commit(name, line, SymbolKind::Nonterminal)
    }

    fn commit(&mut self, name: &str, line: usize, kind: SymbolKind) -> Result<SymbolId, KindConflict> {
        let (id, _) = self.lookup_or_insert(name, line, kind);
        let symbol = &mut self.symbols[id.0];

        if symbol.kind == SymbolKind::Unresolved {
            symbol.kind = kind;
        }

        if symbol.kind != kind {
            return Err(KindConflict {
                name: name.to_string(),
                existing: symbol.kind,
                requested: kind,
            });
        }

        Ok(id)
    }

    pub fn mark_defined(&mut self, id: SymbolId, line: usize) {
        let symbol = &mut self.symbols[id.0];
        debug_assert_eq!(symbol.kind, SymbolKind::Nonterminal);
        if symbol.defined_at.is_none() {
            symbol.defined_at = Some(line);
        }
    }

    pub fn attach_rule(&mut self, id: SymbolId, rule: Rule) {
        let symbol = &mut self.symbols[id.0];
        debug_assert_eq!(symbol.kind, SymbolKind::Nonterminal);
        symbol.rules.push(rule);
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.index.get(name.as_bytes()).copied()
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter().enumerate().map(|(i, s)| (SymbolId(i), s))
    }

    fn of_kind(&self, kind: SymbolKind) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.iter().filter(move |(_, s)| s.kind == kind)
    }

    pub fn terminals(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.of_kind(SymbolKind::Terminal)
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.of_kind(SymbolKind::Nonterminal)
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals().count()
    }

    pub fn nonterminal_count(&self) -> usize {
        self.nonterminals().count()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_interning_is_idempotent() {
        let mut table = SymbolTable::default();
        let first = table.intern_terminal("x", 1).unwrap();
        let second = table.intern_terminal("x", 5).unwrap();

        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
        assert!(table.symbol(first).is_terminal());
        assert_eq!(table.symbol(first).defined_at, Some(1));
    }

    #[test]
    fn kind_conflict_either_way() {
        let mut table = SymbolTable::default();
        table.intern_terminal("x", 1).unwrap();
        assert_eq!(table.intern_nonterminal("x", 2), Err(KindConflict {
            name: "x".to_string(),
            existing: SymbolKind::Terminal,
            requested: SymbolKind::Nonterminal
        }));

        table.intern_nonterminal("y", 3).unwrap();
        assert_eq!(table.intern_terminal("y", 4), Err(KindConflict {
            name: "y".to_string(),
            existing: SymbolKind::Nonterminal,
            requested: SymbolKind::Terminal
        }));

        // The failed calls must not have changed anything
        assert!(table.symbol(table.get("x").unwrap()).is_terminal());
        assert!(table.symbol(table.get("y").unwrap()).is_nonterminal());
    }

    #[test]
    fn reference_commits_later() {
        let mut table = SymbolTable::default();
        let a = table.reference("a", 1);
        let e = table.reference("e", 1);
        assert_eq!(table.symbol(a).kind, SymbolKind::Unresolved);
        assert!(!table.symbol(a).is_defined());

        assert_eq!(table.intern_terminal("a", 4), Ok(a));
        assert_eq!(table.intern_nonterminal("e", 6), Ok(e));
        assert_eq!(table.reference("a", 9), a);

        assert_eq!(table.symbol(a).kind, SymbolKind::Terminal);
        assert_eq!(table.symbol(a).first_seen, 1);
        assert_eq!(table.symbol(a).defined_at, Some(4));
        assert_eq!(table.symbol(e).kind, SymbolKind::Nonterminal);
        assert!(!table.symbol(e).is_defined());
        assert_eq!(table.terminal_count(), 1);
        assert_eq!(table.nonterminal_count(), 1);
        assert!(table.iter().all(|(_, symbol)| symbol.kind != SymbolKind::Unresolved));
    }

    #[test]
    fn rules_attach_to_nonterminals() {
        let mut table = SymbolTable::default();
        let s = table.intern_nonterminal("s", 1).unwrap();
        let a = table.reference("a", 1);
        table.attach_rule(s, Rule { symbols: vec![a, a], line: 1 });
        table.attach_rule(s, Rule { symbols: vec![s], line: 2 });
        table.mark_defined(s, 1);
        table.mark_defined(s, 2);

        let symbol = table.symbol(s);
        assert_eq!(symbol.rules.len(), 2);
        assert_eq!(symbol.rules[0].symbols, vec![a, a]);
        assert_eq!(symbol.defined_at, Some(1));
    }
}
