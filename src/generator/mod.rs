/*
    This module generates sentences from a verified grammar
*/

use rand::prelude::*;
use std::fmt::Display;

use crate::analyzer::Productivity;
use crate::error_handling::*;
use crate::grammar::*;

#[derive(Debug, PartialEq)]
pub enum GenerateErrorType {
    // The grammar has no `%start` directive and no symbol was given
    NoStartSymbol,
    // The requested symbol does not appear in the grammar
    UnknownSymbol(String),
    // Generation has to begin at a nonterminal
    NotNonterminal(String),
    // The requested symbol can never finish deriving
    Unproductive(String),
}

impl ErrorType for GenerateErrorType {}

impl Display for GenerateErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateErrorType::NoStartSymbol => write!(f, "No start symbol to generate from"),
            GenerateErrorType::UnknownSymbol(name) => write!(f, "No symbol named `{}`", name),
            GenerateErrorType::NotNonterminal(name) => write!(f, "`{}` is not a nonterminal", name),
            GenerateErrorType::Unproductive(name) => write!(f, "`{}` never derives a finite sentence", name),
        }
    }
}

pub type GenerateError = Error<GenerateErrorType>;
pub type GenResult<T> = Result<T, GenerateError>;

pub const DEFAULT_MAX_DEPTH: usize = 16;

// Once a sentence has this many words every expansion takes the shortest way out
pub const MAX_WORDS: usize = 4096;

pub struct Generator<'g> {
    grammar: &'g Grammar,
    productivity: &'g Productivity,
    max_depth: usize,
}

impl<'g> Generator<'g> {
    pub fn new(grammar: &'g Grammar, productivity: &'g Productivity, max_depth: usize) -> Self {
        Generator { grammar, productivity, max_depth }
    }

    fn error(&self, line: usize, error: GenerateErrorType) -> GenerateError {
        GenerateError::new(Location::new(self.grammar.file.clone(), line), error)
    }

    // Generates a sentence starting with the declared start symbol
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> GenResult<String> {
        let start = self.grammar.start.ok_or_else(|| self.error(0, GenerateErrorType::NoStartSymbol))?;
        self.generate_from(self.grammar.name(start), rng)
    }

    // Generates a sentence in the grammar starting with the given symbol
    pub fn generate_from<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> GenResult<String> {
        let id = self.grammar.symbols
            .get(name)
            .ok_or_else(|| self.error(0, GenerateErrorType::UnknownSymbol(name.to_string())))?;

        let symbol = self.grammar.symbols.symbol(id);
        if !symbol.is_nonterminal() {
            return Err(self.error(symbol.first_seen, GenerateErrorType::NotNonterminal(name.to_string())));
        }
        if !self.productivity.is_productive(id) {
            let line = symbol.defined_at.unwrap_or(symbol.first_seen);
            return Err(self.error(line, GenerateErrorType::Unproductive(name.to_string())));
        }

        let mut words = Vec::new();
        self.generate_symbol(id, 0, rng, &mut words);
        Ok(words.join(" "))
    }

    // Past the depth limit, or once the word budget is spent, only alternatives
    // whose symbols all rank below the symbol being expanded are allowed.
    // Ranks strictly drop from then on, so the derivation always finishes.
    fn generate_symbol<R: Rng + ?Sized>(&self, id: SymbolId, depth: usize, rng: &mut R, words: &mut Vec<&'g str>) {
        let grammar: &'g Grammar = self.grammar;
        let symbol = grammar.symbols.symbol(id);

        if symbol.is_terminal() {
            words.push(&symbol.name);
            return;
        }

        let rank = self.productivity.rank(id);
        let unbounded = depth < self.max_depth && words.len() < MAX_WORDS;
        let alternatives: Vec<&Rule> = symbol.rules
            .iter()
            .filter(|rule| match self.productivity.rule_rank(rule) {
                Some(rule_rank) => unbounded || Some(rule_rank) < rank,
                None => false,
            })
            .collect();

        if let Some(rule) = alternatives.choose(rng) {
            for &child in &rule.symbols {
                self.generate_symbol(child, depth + 1, rng, words);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rand::rngs::StdRng;

    use super::*;
    use crate::analyzer::verify;
    use crate::parser::{parse_file, parse_str};

    fn samples(source: &str, max_depth: usize, count: usize) -> Vec<String> {
        let grammar = parse_str(source).unwrap();
        let productivity = verify(&grammar).unwrap();
        let generator = Generator::new(&grammar, &productivity, max_depth);
        let mut rng = StdRng::seed_from_u64(7);

        (0..count).map(|_| generator.generate(&mut rng).unwrap()).collect()
    }

    #[test]
    fn generate_balanced_sentences() {
        for sentence in samples("%start s\n%token a b\ns -> a s b | a b", 6, 50) {
            let words: Vec<&str> = sentence.split(' ').collect();
            let half = words.len() / 2;

            assert_eq!(words.len() % 2, 0, "{}", sentence);
            assert!(words[..half].iter().all(|&w| w == "a"), "{}", sentence);
            assert!(words[half..].iter().all(|&w| w == "b"), "{}", sentence);
        }
    }

    #[test]
    fn generate_terminates_on_explosive_recursion() {
        for sentence in samples("%start s\n%token a\ns -> s s s | a", 3, 50) {
            assert!(sentence.split(' ').all(|w| w == "a"), "{}", sentence);
        }
    }

    #[test]
    fn generate_stays_within_word_budget() {
        // Eight-way branching would reach billions of words by the default depth
        let source = "%start s\n%token a\ns -> s s s s s s s s | a";
        for sentence in samples(source, DEFAULT_MAX_DEPTH, 20) {
            let words: Vec<&str> = sentence.split(' ').collect();

            assert!(words.iter().all(|&w| w == "a"));
            assert!(words.len() <= MAX_WORDS + 8 * (DEFAULT_MAX_DEPTH + 1), "{} words", words.len());
        }
    }

    #[test]
    fn generate_shortest_at_depth_zero() {
        let grammar = parse_file(Path::new("example_data/arithmetic.bnf")).unwrap();
        let productivity = verify(&grammar).unwrap();
        let generator = Generator::new(&grammar, &productivity, 0);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..10 {
            assert_eq!(generator.generate(&mut rng).unwrap(), "number");
        }
        assert_eq!(generator.generate_from("factor", &mut rng).unwrap(), "number");
    }

    #[test]
    fn generate_from_bad_symbols() {
        let grammar = parse_str("%token a\ns -> a\nloop -> loop a").unwrap();
        let productivity = Productivity::compute(&grammar);
        let generator = Generator::new(&grammar, &productivity, DEFAULT_MAX_DEPTH);
        let mut rng = StdRng::seed_from_u64(3);

        let errors = vec![
            generator.generate(&mut rng),
            generator.generate_from("nothing", &mut rng),
            generator.generate_from("a", &mut rng),
            generator.generate_from("loop", &mut rng)
        ];
        let answers = vec![
            GenerateErrorType::NoStartSymbol,
            GenerateErrorType::UnknownSymbol("nothing".to_string()),
            GenerateErrorType::NotNonterminal("a".to_string()),
            GenerateErrorType::Unproductive("loop".to_string())
        ];

        for (result, answer) in std::iter::zip(errors, answers) {
            assert_eq!(result.unwrap_err().error, answer);
        }
        assert_eq!(generator.generate_from("s", &mut rng).unwrap(), "a");
    }
}
