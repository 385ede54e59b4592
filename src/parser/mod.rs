/*
    This module parses grammar definition files into a symbol table
*/

pub mod lexer;

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error_handling::*;
use crate::grammar::*;
use lexer::*;

#[derive(Debug, thiserror::Error)]
pub enum DefectKind {
    // A malformed character sequence
    #[error(transparent)]
    Lex(#[from] LexError),
    // A token sequence the grammar dialect does not allow
    #[error("expected {expected}, found {found}")]
    Syntax { expected: &'static str, found: String },
    // An identifier used both as a terminal and a nonterminal
    #[error(transparent)]
    KindConflict(#[from] KindConflict),
    #[error("start symbol is already `{first}`, cannot also declare `{second}`")]
    DuplicateStart { first: String, second: String },
    #[error("no start symbol declared, add a `%start` directive")]
    MissingStart,
    #[error("start symbol `{0}` is never defined by a rule")]
    StartUndefined(String),
    #[error("`{0}` is used but never declared with `%token` or defined by a rule")]
    UndefinedSymbol(String),
    #[error("`{0}` can never derive a string of terminals")]
    UnproductiveNonterminal(String),
    // There was an issue with reading a file
    #[error("file error: {0}")]
    FileError(std::io::Error),
}

impl DefectKind {
    // Fatal defects mean the symbol table cannot be trusted for analysis
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DefectKind::Lex(_)
                | DefectKind::Syntax { .. }
                | DefectKind::KindConflict(_)
                | DefectKind::FileError(_)
        )
    }
}

impl ErrorType for DefectKind {}

impl PartialEq for DefectKind {
    fn eq(&self, other: &Self) -> bool {
        use DefectKind::*;

        match (self, other) {
            (FileError(a), FileError(b)) => a.kind() == b.kind(),
            (Lex(a), Lex(b)) => a == b,
            (Syntax { expected: e1, found: f1 }, Syntax { expected: e2, found: f2 }) => e1 == e2 && f1 == f2,
            (KindConflict(a), KindConflict(b)) => a == b,
            (DuplicateStart { first: f1, second: s1 }, DuplicateStart { first: f2, second: s2 }) => f1 == f2 && s1 == s2,
            (MissingStart, MissingStart) => true,
            (StartUndefined(a), StartUndefined(b)) => a == b,
            (UndefinedSymbol(a), UndefinedSymbol(b)) => a == b,
            (UnproductiveNonterminal(a), UnproductiveNonterminal(b)) => a == b,
            _ => false,
        }
    }
}

pub type Defect = Error<DefectKind>;
pub type Defects = Errors<DefectKind>;

pub type LineResult<T> = std::result::Result<T, Defect>;
pub type FileResult<T> = std::result::Result<T, Defects>;

fn io_error(error: std::io::Error, file: PathBuf) -> Defect {
    Defect::new(Location::file_only(file), DefectKind::FileError(error))
}

// Holds the current token and one token of lookahead. An identifier followed
// by `->` always starts a new rule, which is how rules that are not separated
// by a blank line are told apart from a continued alternative.
struct Parser<'a> {
    lexer: Lexer<'a>,
    current: TokenAndLine,
    lookahead: TokenAndLine,
    consumed: usize,
    file: PathBuf,
    grammar: Grammar,
    errors: Defects,
}

impl<'a> Parser<'a> {
    fn new(mut lexer: Lexer<'a>, file: PathBuf) -> Self {
        let current = lexer.next_token();
        let lookahead = lexer.next_token();

        Parser {
            lexer,
            current,
            lookahead,
            consumed: 0,
            grammar: Grammar::from_file(file.clone()),
            file,
            errors: Vec::new(),
        }
    }

    fn advance(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.lookahead, next);
        self.consumed += 1;
    }

    fn location(&self, line: usize) -> Location {
        Location::new(self.file.clone(), line)
    }

    fn starts_construct(&self) -> bool {
        match self.current.token {
            Token::StartDirective | Token::TokenDirective => true,
            Token::Identifier(_) => self.lookahead.token == Token::Arrow,
            _ => false,
        }
    }

    fn at_boundary(&self) -> bool {
        matches!(self.current.token, Token::BlankLine | Token::EndOfFile) || self.starts_construct()
    }

    // Builds the defect for an unexpected current token
    fn unexpected(&self, expected: &'static str) -> Defect {
        let error = match &self.current.token {
            Token::Error(lex_error) => DefectKind::Lex(lex_error.clone()),
            token => DefectKind::Syntax {
                expected,
                found: token.to_string(),
            },
        };
        Defect::new(self.location(self.current.line), error)
    }

    fn conflict(&mut self, conflict: KindConflict, line: usize) {
        let defect = Defect::new(self.location(line), conflict.into());
        debug!("{}", defect.error);
        self.errors.push(defect);
    }

    // Skips to the next blank line, directive or rule header. Always moves
    // past the offending token if the construct made no progress at all.
    fn recover(&mut self, start: usize) {
        if self.consumed == start {
            self.advance();
        }
        while !self.at_boundary() {
            self.advance();
        }
    }

    fn parse(mut self) -> FileResult<Grammar> {
        loop {
            let start = self.consumed;
            let outcome = match self.current.token {
                Token::EndOfFile => break,
                Token::BlankLine => {
                    self.advance();
                    continue;
                }
                Token::Identifier(_) => self.parse_rule(),
                Token::TokenDirective => self.parse_terminals(),
                Token::StartDirective => self.parse_start(),
                _ => Err(self.unexpected("a rule or a directive")),
            };

            if let Err(defect) = outcome {
                debug!("{}: {}", defect.location, defect.error);
                self.errors.push(defect);
                self.recover(start);
            }
        }

        if self.errors.is_empty() {
            info!(
                "parsed {} terminals and {} nonterminals",
                self.grammar.symbols.terminal_count(),
                self.grammar.symbols.nonterminal_count()
            );
            Ok(self.grammar)
        } else {
            Err(self.errors)
        }
    }

    // sequence := Identifier+
    fn parse_sequence(&mut self) -> LineResult<Rule> {
        let line = self.current.line;
        let mut symbols = Vec::new();

        while let Token::Identifier(name) = &self.current.token {
            if self.lookahead.token == Token::Arrow {
                break;
            }
            symbols.push(self.grammar.symbols.reference(name, self.current.line));
            self.advance();
        }

        if symbols.is_empty() {
            return Err(self.unexpected("a symbol"));
        }

        Ok(Rule { symbols, line })
    }

    // rule := Identifier "->" sequence ("|" sequence)*
    fn parse_rule(&mut self) -> LineResult<()> {
        let Token::Identifier(name) = &self.current.token else {
            return Err(self.unexpected("a nonterminal"));
        };
        let name = name.clone();
        let line = self.current.line;

        if self.lookahead.token != Token::Arrow {
            let found = &self.lookahead;
            return Err(Defect::new(self.location(found.line), match &found.token {
                Token::Error(lex_error) => DefectKind::Lex(lex_error.clone()),
                token => DefectKind::Syntax {
                    expected: "`->`",
                    found: token.to_string(),
                },
            }));
        }

        let lhs = self.grammar.symbols.intern_nonterminal(&name, line);
        self.advance();
        self.advance();

        let mut alternatives = vec![self.parse_sequence()?];
        while self.current.token == Token::Pipe {
            self.advance();
            alternatives.push(self.parse_sequence()?);
        }

        if !self.at_boundary() {
            return Err(self.unexpected("`|` or the end of the rule"));
        }

        match lhs {
            Ok(id) => {
                debug!("rule `{}` with {} alternatives", name, alternatives.len());
                for rule in alternatives {
                    self.grammar.symbols.attach_rule(id, rule);
                }
                self.grammar.symbols.mark_defined(id, line);
            }
            Err(conflict) => self.conflict(conflict, line),
        }

        Ok(())
    }

    // directive := "%token" Identifier+
    fn parse_terminals(&mut self) -> LineResult<()> {
        self.advance();

        let mut declared = 0;
        while let Token::Identifier(name) = &self.current.token {
            if self.lookahead.token == Token::Arrow {
                break;
            }
            let line = self.current.line;
            if let Err(conflict) = self.grammar.symbols.intern_terminal(name, line) {
                self.conflict(conflict, line);
            }
            declared += 1;
            self.advance();
        }

        if declared == 0 {
            return Err(self.unexpected("a terminal name after `%token`"));
        }
        if !self.at_boundary() {
            return Err(self.unexpected("a terminal name"));
        }

        debug!("declared {} terminals", declared);
        Ok(())
    }

    // directive := "%start" Identifier
    fn parse_start(&mut self) -> LineResult<()> {
        self.advance();

        let Token::Identifier(name) = &self.current.token else {
            return Err(self.unexpected("a start symbol after `%start`"));
        };
        let line = self.current.line;

        match self.grammar.symbols.intern_nonterminal(name, line) {
            Ok(id) => {
                debug!("start symbol `{}`", name);
                self.grammar.declare_start(id, line);
            }
            Err(conflict) => self.conflict(conflict, line),
        }
        self.advance();

        if !self.at_boundary() {
            return Err(self.unexpected("the end of the `%start` directive"));
        }

        Ok(())
    }
}

pub fn parse(lexer: Lexer, file: PathBuf) -> FileResult<Grammar> {
    Parser::new(lexer, file).parse()
}

pub fn parse_str(source: &str) -> FileResult<Grammar> {
    parse(Lexer::new(source), PathBuf::new())
}

// Bytes that are not valid UTF-8 decode to U+FFFD, which the lexer reports
// as an unexpected character on its line
pub fn parse_file(path: &Path) -> FileResult<Grammar> {
    let bytes = std::fs::read(path).map_err(|e| vec![io_error(e, path.to_path_buf())])?;
    let source = String::from_utf8_lossy(&bytes);
    parse(Lexer::new(&source), path.to_path_buf())
}
