/*
    This module checks a parsed grammar for defects that only show up once
    the whole file has been read: undefined symbols, start symbol problems and
    nonterminals that can never finish deriving
*/

use std::path::Path;

use log::{debug, info};

use crate::error_handling::*;
use crate::grammar::*;
use crate::parser::{Defect, DefectKind, Defects, FileResult};

// The rank of a productive symbol is the height of its shortest derivation
// tree. Terminals have rank 0; unproductive symbols have none.
#[derive(Debug, Clone, PartialEq)]
pub struct Productivity {
    ranks: Vec<Option<usize>>,
}

impl Productivity {
    pub fn compute(grammar: &Grammar) -> Self {
        let order: Vec<SymbolId> = grammar.symbols.nonterminals().map(|(id, _)| id).collect();
        Self::compute_in_order(grammar, &order)
    }

    // Every pass reads the ranks as they stood after the previous pass, so a
    // nonterminal's rank is the pass that proved it and the result cannot
    // depend on `order`. Each pass that changes something proves at least one
    // nonterminal, so there are at most `order.len()` of them.
    fn compute_in_order(grammar: &Grammar, order: &[SymbolId]) -> Self {
        let mut productivity = Productivity {
            ranks: vec![None; grammar.symbols.len()],
        };
        for (id, _) in grammar.symbols.terminals() {
            productivity.ranks[id.index()] = Some(0);
        }

        for pass in 1..=order.len() {
            let proven: Vec<SymbolId> = order
                .iter()
                .copied()
                .filter(|&id| !productivity.is_productive(id))
                .filter(|&id| {
                    grammar.symbols.symbol(id).rules.iter().any(|rule| productivity.rule_rank(rule).is_some())
                })
                .collect();

            debug!("productivity pass {}: {} nonterminals proven", pass, proven.len());
            if proven.is_empty() {
                break;
            }
            for id in proven {
                productivity.ranks[id.index()] = Some(pass);
            }
        }

        productivity
    }

    pub fn is_productive(&self, id: SymbolId) -> bool {
        self.rank(id).is_some()
    }

    pub fn rank(&self, id: SymbolId) -> Option<usize> {
        self.ranks.get(id.index()).copied().flatten()
    }

    /// The highest rank among the rule's symbols, or `None` if any of them is
    /// unproductive.
    pub fn rule_rank(&self, rule: &Rule) -> Option<usize> {
        rule.symbols.iter().try_fold(0, |highest, &id| self.rank(id).map(|rank| highest.max(rank)))
    }
}

#[derive(Debug)]
pub struct Analysis {
    pub productivity: Productivity,
    pub defects: Defects,
}

fn defect(file: &Path, line: usize, error: DefectKind) -> Defect {
    Defect::new(Location::new(file.to_path_buf(), line), error)
}

fn start_defects(grammar: &Grammar) -> Defects {
    let Some(start) = grammar.start_symbol() else {
        return vec![defect(&grammar.file, 0, DefectKind::MissingStart)];
    };

    let mut defects = Vec::new();
    if !start.is_defined() {
        defects.push(defect(&grammar.file, grammar.start_line, DefectKind::StartUndefined(start.name.clone())));
    }

    defects.extend(grammar.extra_starts.iter().map(|extra| {
        defect(&grammar.file, extra.line, DefectKind::DuplicateStart {
            first: start.name.clone(),
            second: grammar.name(extra.symbol).to_string(),
        })
    }));

    defects
}

fn undefined_symbols(grammar: &Grammar) -> Defects {
    let mut referenced = vec![false; grammar.symbols.len()];
    for (_, symbol) in grammar.symbols.nonterminals() {
        for id in symbol.rules.iter().flat_map(|rule| rule.symbols.iter()) {
            referenced[id.index()] = true;
        }
    }

    // An undefined start symbol has its own defect
    grammar.symbols
        .iter()
        .filter(|&(id, symbol)| referenced[id.index()] && !symbol.is_defined() && grammar.start != Some(id))
        .map(|(_, symbol)| defect(&grammar.file, symbol.first_seen, DefectKind::UndefinedSymbol(symbol.name.clone())))
        .collect()
}

// A nonterminal without rules, such as an undefined start symbol, is
// unproductive as well and is reported alongside its other defects
fn unproductive_nonterminals(grammar: &Grammar, productivity: &Productivity) -> Defects {
    grammar.symbols
        .nonterminals()
        .filter(|&(id, _)| !productivity.is_productive(id))
        .map(|(_, symbol)| {
            let line = symbol.defined_at.unwrap_or(symbol.first_seen);
            defect(&grammar.file, line, DefectKind::UnproductiveNonterminal(symbol.name.clone()))
        })
        .collect()
}

pub fn analyze(grammar: &Grammar) -> Analysis {
    let productivity = Productivity::compute(grammar);

    let mut defects = start_defects(grammar);
    defects.extend(undefined_symbols(grammar));
    defects.extend(unproductive_nonterminals(grammar, &productivity));
    debug_assert!(defects.iter().all(|d| !d.error.is_fatal()));

    info!(
        "{} of {} nonterminals are productive, {} defects",
        grammar.symbols.nonterminals().filter(|&(id, _)| productivity.is_productive(id)).count(),
        grammar.symbols.nonterminal_count(),
        defects.len()
    );

    Analysis { productivity, defects }
}

pub fn verify(grammar: &Grammar) -> FileResult<Productivity> {
    let Analysis { productivity, defects } = analyze(grammar);

    if defects.is_empty() {
        Ok(productivity)
    } else {
        Err(defects)
    }
}
