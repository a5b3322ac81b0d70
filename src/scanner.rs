use thiserror::Error;
use tracing::{debug, trace};

use crate::reporter::ErrorReporter;
use crate::token::{keyword, Literal, Token, TokenType};

/// public interface for tokenizing
///
/// Always returns a full token list ending in a single EOF token. Lexical errors go to
/// `reporter` and scanning carries on with the next character.
pub fn tokenize<R: ErrorReporter>(source: &str, reporter: &mut R) -> Vec<Token> {
    let mut scanner = Scanner::new(source, reporter);
    scanner.scan_tokens();
    debug!(
        source_len = source.len(),
        tokens = scanner.tokens.len(),
        errors = scanner.error_count,
        "scanned source"
    );
    scanner.tokens
}

struct Scanner<'a, R: ErrorReporter> {
    source: &'a str,
    tokens: Vec<Token>,
    error_reporter: &'a mut R,
    error_count: usize,

    // position of the start of lexeme, in bytes
    current_lexeme_start: usize,
    current_lexeme_line: usize,
    current: usize,
    line: usize,

    // a failed search for `*/` from here means there is none further on either
    no_comment_end_from: Option<usize>,
}

#[derive(Debug, PartialEq, Error)]
pub enum ScanningError {
    #[error("Unexpected character '{character}'.")]
    UnexpectedCharacter { line: usize, character: char },
    #[error("Unterminated string.")]
    UnterminatedString { line: usize },
    #[error("Invalid number '{lexeme}'.")]
    InvalidNumber { line: usize, lexeme: String },
}

impl ScanningError {
    pub fn line(&self) -> usize {
        match self {
            ScanningError::UnexpectedCharacter { line, .. }
            | ScanningError::UnterminatedString { line }
            | ScanningError::InvalidNumber { line, .. } => *line,
        }
    }
}

/// Where the search for a block comment's closing `*/` ended up.
enum BlockComment {
    Closed,
    Unterminated,
}

impl<'a, R: ErrorReporter> Scanner<'a, R> {
    fn new(source: &'a str, error_reporter: &'a mut R) -> Scanner<'a, R> {
        Scanner {
            source,
            tokens: vec![],
            error_reporter,
            error_count: 0,
            current_lexeme_start: 0,
            current_lexeme_line: 1,
            current: 0,
            line: 1,
            no_comment_end_from: None,
        }
    }

    fn scan_tokens(&mut self) {
        while !self.is_at_end() {
            if let Err(scanning_error) = self.scan_token() {
                self.error_count += 1;
                self.error_reporter.error(scanning_error);
            }
        }
        self.tokens.push(Token {
            r#type: TokenType::EOF,
            lexeme: "".to_string(),
            literal: Literal::None,
            line: self.line,
        });
    }

    fn scan_token(&mut self) -> Result<(), ScanningError> {
        // set start of lexeme
        self.current_lexeme_start = self.current;
        self.current_lexeme_line = self.line;
        let Some(c) = self.advance() else {
            return Ok(());
        };
        let maybe_token_type = match c {
            '(' => Some(TokenType::LeftParen),
            ')' => Some(TokenType::RightParen),
            '{' => Some(TokenType::LeftBrace),
            '}' => Some(TokenType::RightBrace),
            ',' => Some(TokenType::Comma),
            '.' => Some(TokenType::Dot),
            '-' => Some(TokenType::Minus),
            '+' => Some(TokenType::Plus),
            ';' => Some(TokenType::Semicolon),
            '*' => Some(TokenType::Star),
            '!' => match self.match_one('=') {
                true => Some(TokenType::BangEqual),
                false => Some(TokenType::Bang),
            },
            '=' => match self.match_one('=') {
                true => Some(TokenType::EqualEqual),
                false => Some(TokenType::Equal),
            },
            '<' => match self.match_one('=') {
                true => Some(TokenType::LessEqual),
                false => Some(TokenType::Less),
            },
            '>' => match self.match_one('=') {
                true => Some(TokenType::GreaterEqual),
                false => Some(TokenType::Greater),
            },
            '/' => {
                if self.match_one('/') {
                    while self.peek_one().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                    None
                } else if self.peek_one() == Some('*') {
                    match self.consume_if_match_block_comment() {
                        BlockComment::Closed => None,
                        BlockComment::Unterminated => Some(TokenType::Slash),
                    }
                } else {
                    Some(TokenType::Slash)
                }
            }
            ' ' | '\r' | '\t' => None,
            '\n' => {
                self.line += 1;
                None
            }
            '"' => {
                let literal = self.consume_if_match_string()?;
                self.add_token_with_literal(TokenType::String, literal);
                return Ok(());
            }
            c if is_digit(c) => {
                let literal = self.consume_if_match_number()?;
                self.add_token_with_literal(TokenType::Number, literal);
                return Ok(());
            }
            c if is_alpha(c) => Some(self.consume_if_match_identifier()),
            _ => {
                return Err(ScanningError::UnexpectedCharacter {
                    line: self.line,
                    character: c,
                });
            }
        };

        if let Some(token_type) = maybe_token_type {
            self.add_token(token_type);
        }
        Ok(())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn match_one(&mut self, expected: char) -> bool {
        if self.peek_one() != Some(expected) {
            return false;
        }
        self.advance();
        true
    }

    /// `None` only at the end of the source, callers guard with `is_at_end` or a peek.
    fn advance(&mut self) -> Option<char> {
        let current_char = self.peek_one()?;
        // offsets are in bytes, a char can take up to 4 of them.
        self.current += current_char.len_utf8();
        Some(current_char)
    }

    fn add_token(&mut self, token_type: TokenType) {
        self.add_token_with_literal(token_type, Literal::None)
    }

    fn add_token_with_literal(&mut self, token_type: TokenType, literal: Literal) {
        let token = Token {
            r#type: token_type,
            lexeme: self.current_lexeme().to_string(),
            literal,
            line: self.current_lexeme_line,
        };
        trace!(%token, line = token.line, "token");
        self.tokens.push(token);
    }

    /// Always on char boundaries: both ends only ever move by whole chars.
    fn current_lexeme(&self) -> &'a str {
        &self.source[self.current_lexeme_start..self.current]
    }

    /// like advance but does not consume the character. 1 lookahead.
    fn peek_one(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    /// 2 lookahead
    fn peek_two(&self) -> Option<char> {
        self.source[self.current..].chars().nth(1)
    }

    fn consume_if_match_string(&mut self) -> Result<Literal, ScanningError> {
        while self.peek_one().is_some_and(|c| c != '"') {
            if self.peek_one() == Some('\n') {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return Err(ScanningError::UnterminatedString { line: self.line });
        }

        // consume closing quote
        self.advance();

        // both quotes are one byte wide
        let lexeme = self.current_lexeme();
        Ok(Literal::Text(lexeme[1..lexeme.len() - 1].to_string()))
    }

    fn consume_if_match_number(&mut self) -> Result<Literal, ScanningError> {
        while self.peek_one().is_some_and(is_digit) {
            self.advance();
        }

        if self.peek_one() == Some('.') && self.peek_two().is_some_and(is_digit) {
            // consume the '.'
            self.advance();

            while self.peek_one().is_some_and(is_digit) {
                self.advance();
            }
        }

        // only ascii digits and at most one inner '.' got here, parse never fails on those.
        self.current_lexeme()
            .parse()
            .map(Literal::Number)
            .map_err(|_| ScanningError::InvalidNumber {
                line: self.line,
                lexeme: self.current_lexeme().to_string(),
            })
    }

    fn consume_if_match_identifier(&mut self) -> TokenType {
        while self.peek_one().is_some_and(is_alphanumeric) {
            self.advance();
        }

        keyword(self.current_lexeme()).unwrap_or(TokenType::Identifier)
    }

    /// Called right after the `/`, with the cursor on the `*`. The search for `*/` starts on
    /// that same `*`, so `/*/` closes itself. Comments do not nest.
    ///
    /// Without a terminator nothing is consumed: cursor and line go back to just after the `/`
    /// and the caller emits a SLASH.
    fn consume_if_match_block_comment(&mut self) -> BlockComment {
        if self.no_comment_end_from.is_some_and(|from| self.current >= from) {
            return BlockComment::Unterminated;
        }
        let (saved_current, saved_line) = (self.current, self.line);

        while !self.is_at_end() {
            if self.peek_one() == Some('*') && self.peek_two() == Some('/') {
                // consume '*' and '/'
                self.advance();
                self.advance();
                return BlockComment::Closed;
            }
            if self.advance() == Some('\n') {
                self.line += 1;
            }
        }

        debug!(
            line = saved_line,
            "unterminated block comment, scanning '/' as a slash"
        );
        self.no_comment_end_from = Some(saved_current);
        self.current = saved_current;
        self.line = saved_line;
        BlockComment::Unterminated
    }
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Identifiers are made of ascii letters and dashes. No underscores.
fn is_alpha(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '-')
}

fn is_alphanumeric(c: char) -> bool {
    is_digit(c) || is_alpha(c)
}
