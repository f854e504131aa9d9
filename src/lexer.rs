use std::fmt;

use thiserror::Error;

pub use crate::position::Position;

/// Tokens of the condition syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `$name`
    Variable(String),
    /// Bare name, used for typenames inside `type(...)`
    Identifier(String),
    /// `type` keyword
    Type,
    True,
    False,
    /// `&`, `&&` or `and`
    And,
    /// `|`, `||` or `or`
    Or,
    /// `!` or `not`
    Not,
    LParen,
    RParen,
    Comma,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Variable(name) => write!(f, "'${}'", name),
            Token::Identifier(name) => write!(f, "'{}'", name),
            Token::Type => write!(f, "'type'"),
            Token::True => write!(f, "'true'"),
            Token::False => write!(f, "'false'"),
            Token::And => write!(f, "'&'"),
            Token::Or => write!(f, "'|'"),
            Token::Not => write!(f, "'!'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {position}")]
    UnexpectedCharacter { ch: char, position: Position },

    #[error("'$' must be followed by a variable name at {position}")]
    EmptyVariable { position: Position },
}

pub struct Lexer {
    input: Vec<char>,
    offset: usize,
    position: Position,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            offset: 0,
            position: Position::start(),
        }
    }

    /// Position of the next unread character.
    pub fn position(&self) -> Position {
        self.position
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.offset).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.offset + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.position.line += 1;
                self.position.column = 1;
            } else {
                self.position.column += 1;
            }
            self.offset += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Consumes one character, or two when the second one doubles it
    /// (`&&`, `||`).
    fn single_or_double(&mut self, ch: char, token: Token) -> Token {
        self.advance();
        if self.current_char() == Some(ch) {
            self.advance();
        }
        token
    }

    /// Returns the next token and the position it starts at.
    pub fn next_spanned(&mut self) -> Result<(Token, Position), LexError> {
        self.skip_whitespace();
        let start = self.position;

        let token = match self.current_char() {
            None => Token::Eof,
            Some('$') => {
                let is_name = self
                    .peek_char(1)
                    .is_some_and(|c| c.is_alphabetic() || c == '_');
                if !is_name {
                    return Err(LexError::EmptyVariable { position: start });
                }
                self.advance();
                Token::Variable(self.read_identifier())
            }
            Some('&') => self.single_or_double('&', Token::And),
            Some('|') => self.single_or_double('|', Token::Or),
            Some('!') => {
                self.advance();
                Token::Not
            }
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "true" => Token::True,
                    "false" => Token::False,
                    "type" => Token::Type,
                    _ => Token::Identifier(ident),
                }
            }
            Some(ch) => {
                return Err(LexError::UnexpectedCharacter { ch, position: start });
            }
        };

        Ok((token, start))
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.next_spanned().map(|(token, _)| token)
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and or not true false type");
    assert_eq!(lexer.next_token(), Ok(Token::And));
    assert_eq!(lexer.next_token(), Ok(Token::Or));
    assert_eq!(lexer.next_token(), Ok(Token::Not));
    assert_eq!(lexer.next_token(), Ok(Token::True));
    assert_eq!(lexer.next_token(), Ok(Token::False));
    assert_eq!(lexer.next_token(), Ok(Token::Type));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_condition() {
    let mut lexer = Lexer::new("$a && !(type(Droid) || $b)");
    assert_eq!(lexer.next_token(), Ok(Token::Variable("a".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::And));
    assert_eq!(lexer.next_token(), Ok(Token::Not));
    assert_eq!(lexer.next_token(), Ok(Token::LParen));
    assert_eq!(lexer.next_token(), Ok(Token::Type));
    assert_eq!(lexer.next_token(), Ok(Token::LParen));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("Droid".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::RParen));
    assert_eq!(lexer.next_token(), Ok(Token::Or));
    assert_eq!(lexer.next_token(), Ok(Token::Variable("b".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::RParen));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}
