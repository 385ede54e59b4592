use std::fmt::Display;
use std::iter::Peekable;
use std::str::Chars;

use itertools::Itertools;
use log::trace;
use thiserror::Error;

pub const MAX_IDENT: usize = 50;
const MAX_DIRECTIVE: usize = 16;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("expected `->`, found `{0}`")]
    BrokenArrow(String),
    #[error("unknown directive `%{0}`")]
    UnknownDirective(String),
    #[error("identifier `{0}...` is longer than {max} characters", max = MAX_IDENT)]
    IdentifierTooLong(String),
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),
}

impl LexError {
    // The characters the lexer had consumed when it gave up, if printable
    pub fn text(&self) -> Option<String> {
        match self {
            LexError::BrokenArrow(text) => Some(text.clone()),
            LexError::UnknownDirective(word) => Some(format!("%{}", word)),
            LexError::IdentifierTooLong(prefix) => Some(prefix.clone()),
            LexError::UnexpectedCharacter(c) if c.is_control() => None,
            LexError::UnexpectedCharacter(c) => Some(c.to_string()),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum Token {
    StartDirective,
    TokenDirective,
    Arrow,
    Pipe,
    Identifier(String),
    EndOfFile,
    BlankLine,
    Error(LexError),
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::StartDirective => write!(f, "%start"),
            Token::TokenDirective => write!(f, "%token"),
            Token::Arrow => write!(f, "->"),
            Token::Pipe => write!(f, "|"),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::EndOfFile => write!(f, "End of file"),
            Token::BlankLine => write!(f, "double newline"),
            Token::Error(error) => match error.text() {
                Some(text) => write!(f, "{}", text),
                None => write!(f, "invalid input"),
            },
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct TokenAndLine {
    pub token: Token,
    pub line: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    // Blank lines are only separators once something has been seen
    seen_token: bool,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            seen_token: false,
            done: false,
        }
    }

    // Skips whitespace and returns the line of the first blank line in it,
    // if there was one. A run of blank lines counts once.
    fn skip_whitespace(&mut self) -> Option<usize> {
        let mut blank = None;
        let mut newlines = 0;

        while let Some(&c) = self.chars.peek() {
            match c {
                '\n' => {
                    newlines += 1;
                    if newlines == 2 && blank.is_none() {
                        blank = Some(self.line);
                    }
                    self.line += 1;
                }
                ' ' | '\t' => newlines = 0,
                '\r' => {}
                _ => break,
            }
            self.chars.next();
        }

        blank
    }

    // Whitespace after a lone `-` stays in the input so line counting and
    // blank-line separators are unaffected
    fn lex_arrow(&mut self) -> Token {
        match self.chars.next_if(|&c| !c.is_whitespace()) {
            Some('>') => Token::Arrow,
            Some(c) => Token::Error(LexError::BrokenArrow(format!("-{}", c))),
            None => Token::Error(LexError::BrokenArrow("-".to_string())),
        }
    }

    fn lex_directive(&mut self) -> Token {
        let mut word = String::new();
        for c in self.chars.peeking_take_while(|c| c.is_ascii_alphabetic()) {
            if word.len() < MAX_DIRECTIVE {
                word.push(c);
            }
        }

        match word.as_str() {
            "start" => Token::StartDirective,
            "token" => Token::TokenDirective,
            _ => Token::Error(LexError::UnknownDirective(word)),
        }
    }

    fn lex_identifier(&mut self, first: char) -> Token {
        let mut name = String::from(first);
        name.extend(self.chars.peeking_take_while(|&c| is_ident_char(c)).take(MAX_IDENT - 1));

        if self.chars.peek().is_some_and(|&c| is_ident_char(c)) {
            // Swallow the rest so the overflow is reported once
            self.chars.peeking_take_while(|&c| is_ident_char(c)).for_each(drop);
            return Token::Error(LexError::IdentifierTooLong(name));
        }

        Token::Identifier(name)
    }

    pub fn next_token(&mut self) -> TokenAndLine {
        let blank = self.skip_whitespace();
        if let Some(line) = blank {
            if self.seen_token {
                return TokenAndLine { token: Token::BlankLine, line };
            }
        }

        let line = self.line;
        let token = match self.chars.next() {
            None => Token::EndOfFile,
            Some('|') => Token::Pipe,
            Some('-') => self.lex_arrow(),
            Some('%') => self.lex_directive(),
            Some(c) if is_ident_start(c) => self.lex_identifier(c),
            Some(c) => Token::Error(LexError::UnexpectedCharacter(c)),
        };

        if token != Token::EndOfFile {
            self.seen_token = true;
        }
        trace!("line {}: {:?}", line, token);

        TokenAndLine { token, line }
    }
}

impl Iterator for Lexer<'_> {
    type Item = TokenAndLine;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let token = self.next_token();
        self.done = token.token == Token::EndOfFile;
        Some(token)
    }
}
