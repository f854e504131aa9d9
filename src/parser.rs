use thiserror::Error;

use crate::{
    condition::{BooleanExpression, ExpressionError},
    lexer::{LexError, Lexer, Token},
    position::Position,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, found {found} at {position}")]
    UnexpectedToken {
        expected: String,
        found: Token,
        position: Position,
    },

    #[error("invalid condition at {position}: {source}")]
    Expression {
        source: ExpressionError,
        position: Position,
    },

    #[error("condition nested deeper than {limit} levels at {position}")]
    TooDeep { limit: usize, position: Position },
}

/// How many `!` and `(` may be open at once.
pub const MAX_NESTING: usize = 128;

/// Recursive-descent parser for the condition syntax.
///
/// ```text
/// expr    := and ( '|' and )*
/// and     := unary ( '&' unary )*
/// unary   := '!' unary | primary
/// primary := 'true' | 'false' | '$' NAME | 'type' '(' NAME (',' NAME)* ')' | '(' expr ')'
/// ```
///
/// A chain of the same operator becomes a single flat `And`/`Or`.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    current_position: Position,
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let (current_token, current_position) = lexer.next_spanned()?;
        Ok(Parser {
            lexer,
            current_token,
            current_position,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        let (token, position) = self.lexer.next_spanned()?;
        self.current_token = token;
        self.current_position = position;
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(&self.current_token) == std::mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.unexpected(expected.to_string()));
        }
        self.advance()
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: self.current_token.clone(),
            position: self.current_position,
        }
    }

    /// Runs `parse` one level deeper. Called at the opening token.
    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<BooleanExpression, ParseError>,
    ) -> Result<BooleanExpression, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep {
                limit: MAX_NESTING,
                position: self.current_position,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parses the whole input as one condition.
    pub fn parse(&mut self) -> Result<BooleanExpression, ParseError> {
        let expr = self.parse_or()?;
        if !self.check(&Token::Eof) {
            return Err(self.unexpected("an operator or end of input"));
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<BooleanExpression, ParseError> {
        let mut operands = vec![self.parse_and()?];
        while self.check(&Token::Or) {
            self.advance()?;
            operands.push(self.parse_and()?);
        }
        Ok(BooleanExpression::any(operands))
    }

    fn parse_and(&mut self) -> Result<BooleanExpression, ParseError> {
        let mut operands = vec![self.parse_unary()?];
        while self.check(&Token::And) {
            self.advance()?;
            operands.push(self.parse_unary()?);
        }
        Ok(BooleanExpression::all(operands))
    }

    fn parse_unary(&mut self) -> Result<BooleanExpression, ParseError> {
        if self.check(&Token::Not) {
            let operand = self.nested(|parser| {
                parser.advance()?;
                parser.parse_unary()
            })?;
            return Ok(!operand);
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<BooleanExpression, ParseError> {
        match &self.current_token {
            Token::True => {
                self.advance()?;
                Ok(BooleanExpression::True)
            }
            Token::False => {
                self.advance()?;
                Ok(BooleanExpression::False)
            }
            Token::Variable(name) => {
                let expr = BooleanExpression::variable(name.clone());
                self.advance()?;
                Ok(expr)
            }
            Token::Type => {
                self.advance()?;
                self.parse_type_condition()
            }
            Token::LParen => self.nested(|parser| {
                parser.advance()?;
                let expr = parser.parse_or()?;
                parser.expect(Token::RParen)?;
                Ok(expr)
            }),
            _ => Err(self.unexpected("a condition")),
        }
    }

    /// Parses `(Name, Name, ...)` after the `type` keyword.
    fn parse_type_condition(&mut self) -> Result<BooleanExpression, ParseError> {
        let position = self.current_position;
        self.expect(Token::LParen)?;

        let mut names = Vec::new();
        loop {
            match &self.current_token {
                Token::Identifier(name) => {
                    names.push(name.clone());
                    self.advance()?;
                }
                _ => return Err(self.unexpected("a type name")),
            }
            if self.check(&Token::Comma) {
                self.advance()?;
            } else {
                break;
            }
        }
        self.expect(Token::RParen)?;

        BooleanExpression::possible_types(names)
            .map_err(|source| ParseError::Expression { source, position })
    }
}

/// Parses a condition from text.
///
/// # Examples
///
/// ```
/// use gqlshape::parser::parse_condition;
///
/// let condition = parse_condition("$a & !type(Droid)").unwrap();
/// assert_eq!(condition.to_string(), "$a & !type(Droid)");
/// ```
pub fn parse_condition(text: &str) -> Result<BooleanExpression, ParseError> {
    Parser::new(Lexer::new(text))?.parse()
}
