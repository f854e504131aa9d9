use gqlshape::lexer::{LexError, Lexer, Position, Token};

fn tokens(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut out = Vec::new();
    loop {
        let token = lexer.next_token().unwrap();
        if token == Token::Eof {
            break;
        }
        out.push(token);
    }
    out
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_single_and_double_operators() {
    assert_eq!(tokens("& && | ||"), vec![Token::And, Token::And, Token::Or, Token::Or]);
}

#[test]
fn test_word_operators() {
    assert_eq!(
        tokens("$a and not $b or $c"),
        vec![
            Token::Variable("a".into()),
            Token::And,
            Token::Not,
            Token::Variable("b".into()),
            Token::Or,
            Token::Variable("c".into()),
        ]
    );
}

#[test]
fn test_variable_names() {
    assert_eq!(
        tokens("$with_friends $x2"),
        vec![Token::Variable("with_friends".into()), Token::Variable("x2".into())]
    );
}

#[test]
fn test_type_condition_tokens() {
    assert_eq!(
        tokens("type(Droid,Human)"),
        vec![
            Token::Type,
            Token::LParen,
            Token::Identifier("Droid".into()),
            Token::Comma,
            Token::Identifier("Human".into()),
            Token::RParen,
        ]
    );
}

#[test]
fn test_empty_input() {
    assert_eq!(tokens("   \n "), vec![]);
}

// ============================================================================
// Positions and errors
// ============================================================================

#[test]
fn test_spans() {
    let mut lexer = Lexer::new("$a\n  & $b");
    assert_eq!(lexer.next_spanned().unwrap().1, Position { line: 1, column: 1 });
    assert_eq!(lexer.next_spanned().unwrap().1, Position { line: 2, column: 3 });
    assert_eq!(lexer.next_spanned().unwrap().1, Position { line: 2, column: 5 });
}

#[test]
fn test_unexpected_character() {
    let mut lexer = Lexer::new("$a &\n  @");
    lexer.next_token().unwrap();
    lexer.next_token().unwrap();
    assert_eq!(
        lexer.next_token(),
        Err(LexError::UnexpectedCharacter {
            ch: '@',
            position: Position { line: 2, column: 3 },
        })
    );
}

#[test]
fn test_dollar_without_name() {
    let mut lexer = Lexer::new("$ a");
    assert_eq!(
        lexer.next_token(),
        Err(LexError::EmptyVariable {
            position: Position::start(),
        })
    );

    let mut lexer = Lexer::new("$1");
    assert!(matches!(lexer.next_token(), Err(LexError::EmptyVariable { .. })));
}
