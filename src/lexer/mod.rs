//! Lexical analysis: UTF-8 source text in, a finite token stream out.
//!
//! Follows the teacher's hand-rolled `Peekable<Chars>` scanning approach
//! (whitespace/line tracking, alphanumeric vs. numeric vs. "everything else"
//! dispatch) rather than a grammar-file-driven lexer, extended with string
//! literals (with escapes and `${...}` template detection), floats, line
//! comments, and the full two-character operator set spec.md §4.1 requires.

mod token;

pub use token::{Token, TokenKind};

use std::error::Error;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.message, self.line, self.column)
    }
}

impl Error for LexError {}

pub type LexResult<T> = Result<T, LexError>;

/// Scans a source string into a token stream.
pub struct Lexer<'a> {
    iterator: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            iterator: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Scans the whole source into a token stream ending with `TokenKind::Eof`.
    pub fn lex(mut self) -> LexResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            let (line, column) = (self.line, self.column);

            let Some(&c) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, "", line, column));
                break;
            };

            let token = match c {
                '"' | '\'' => self.lex_string(c)?,
                '0'..='9' => self.lex_number(),
                c if c.is_ascii_alphabetic() || c == '_' => self.lex_ident_or_keyword(),
                _ => self.lex_operator()?,
            };

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn peek(&mut self) -> Option<&char> {
        self.iterator.peek()
    }

    fn peek_second(&self) -> Option<char> {
        let mut clone = self.iterator.clone();
        clone.next();
        clone.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.iterator.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_ident_or_keyword(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();

        while let Some(&c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match text.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "let" => TokenKind::Let,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "return" => TokenKind::Return,
            "fn" => TokenKind::Fn,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "while" => TokenKind::While,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            _ => TokenKind::Ident(text.clone()),
        };

        Token::new(kind, text, line, column)
    }

    fn lex_number(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();

        while let Some(&c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if self.peek() == Some(&'.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.advance();
            while let Some(&c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let value: f64 = text.parse().unwrap_or(0.0);
        Token::new(TokenKind::Number(value), text, line, column)
    }

    fn lex_string(&mut self, quote: char) -> LexResult<Token> {
        let (line, column) = (self.line, self.column);
        self.advance(); // consume opening quote

        let mut value = String::new();
        let mut is_template = false;

        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        message: "unterminated string literal".into(),
                        line,
                        column,
                    });
                }
                Some(&c) if c == quote => {
                    self.advance();
                    break;
                }
                Some(&'\\') => {
                    self.advance();
                    let escaped = self.advance().ok_or_else(|| LexError {
                        message: "unterminated string literal".into(),
                        line,
                        column,
                    })?;
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '\\' => '\\',
                        '"' => '"',
                        '\'' => '\'',
                        '$' => '$',
                        other => other,
                    });
                }
                Some(&'$') if self.peek_second() == Some('{') => {
                    is_template = true;
                    value.push('$');
                    self.advance();
                }
                Some(&c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        let kind = if is_template {
            TokenKind::TemplatedString(value.clone())
        } else {
            TokenKind::String(value.clone())
        };

        Ok(Token::new(kind, value, line, column))
    }

    fn lex_operator(&mut self) -> LexResult<Token> {
        let (line, column) = (self.line, self.column);
        let c = self.advance().expect("caller checked peek is Some");

        macro_rules! two_char {
            ($second:expr, $two:expr, $one:expr) => {{
                if self.peek() == Some(&$second) {
                    self.advance();
                    $two
                } else {
                    $one
                }
            }};
        }

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => two_char!('=', TokenKind::EqEq, TokenKind::Assign),
            '!' => two_char!('=', TokenKind::NotEq, TokenKind::Not),
            '<' => two_char!('=', TokenKind::LtEq, TokenKind::Lt),
            '>' => two_char!('=', TokenKind::GtEq, TokenKind::Gt),
            '&' => {
                if self.peek() == Some(&'&') {
                    self.advance();
                    TokenKind::AmpAmp
                } else {
                    return Err(LexError {
                        message: "unexpected character '&'".into(),
                        line,
                        column,
                    });
                }
            }
            '|' => {
                if self.peek() == Some(&'|') {
                    self.advance();
                    TokenKind::PipePipe
                } else {
                    return Err(LexError {
                        message: "unexpected character '|'".into(),
                        line,
                        column,
                    });
                }
            }
            '?' => match self.peek() {
                Some(&'.') => {
                    self.advance();
                    TokenKind::SafeDot
                }
                Some(&':') => {
                    self.advance();
                    TokenKind::Elvis
                }
                _ => {
                    return Err(LexError {
                        message: "unexpected character '?'".into(),
                        line,
                        column,
                    });
                }
            },
            other => {
                return Err(LexError {
                    message: format!("unexpected character '{other}'"),
                    line,
                    column,
                });
            }
        };

        Ok(Token::new(kind, c.to_string(), line, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).lex().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_let_binding() {
        assert_eq!(
            kinds("let x = 10;"),
            vec![
                TokenKind::Let,
                TokenKind::Ident("x".into()),
                TokenKind::Assign,
                TokenKind::Number(10.0),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_float() {
        assert_eq!(
            kinds("3.14"),
            vec![TokenKind::Number(3.14), TokenKind::Eof]
        );
    }

    #[test]
    fn dot_after_integer_is_not_consumed_without_following_digit() {
        assert_eq!(
            kinds("5.len()"),
            vec![
                TokenKind::Number(5.0),
                TokenKind::Dot,
                TokenKind::Ident("len".into()),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_escapes_in_string() {
        assert_eq!(
            kinds(r#""a\nb\"c""#),
            vec![TokenKind::String("a\nb\"c".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn detects_template_string() {
        let tokens = Lexer::new(r#""hello ${name}""#).lex().unwrap();
        assert!(matches!(tokens[0].kind, TokenKind::TemplatedString(_)));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Lexer::new(r#""abc"#).lex().unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn lone_ampersand_is_an_error() {
        assert!(Lexer::new("a & b").lex().is_err());
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(
            kinds("== != <= >= && || ?. ?:"),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::SafeDot,
                TokenKind::Elvis,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn line_comment_extends_to_newline() {
        assert_eq!(
            kinds("1 // comment\n2"),
            vec![TokenKind::Number(1.0), TokenKind::Number(2.0), TokenKind::Eof]
        );
    }

    #[test]
    fn line_and_column_tracking() {
        let tokens = Lexer::new("let\nx").lex().unwrap();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[1].column, 1);
    }
}
