use crate::scanner::{tokenize, ScanningError};
use crate::token::{Token, TokenType};

/// Scans code that is expected to be free of lexical errors.
pub fn scan(code: &str) -> Vec<Token> {
    tokenize(code, &mut |error: ScanningError| panic!("{}", error))
}

pub fn scan_with_errors(code: &str) -> (Vec<Token>, Vec<ScanningError>) {
    let mut errors = vec![];
    let tokens = tokenize(code, &mut |error: ScanningError| errors.push(error));
    (tokens, errors)
}

pub fn token_types(tokens: &[Token]) -> Vec<TokenType> {
    tokens.iter().map(|token| token.r#type).collect()
}
