use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    And,
    Or,
    Not,
    True,
    False,
    Null,

    LeftParen,
    RightParen,
    Dot,

    Equals,
    NotEquals,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    String(String),
    Number(f64),
    Identifier(String),

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub line: usize,
    pub column: usize,
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let (line, column) = (self.line, self.column);
            let Some(&c) = self.chars.peek() else {
                tokens.push(Token {
                    token_type: TokenType::Eof,
                    line,
                    column,
                });
                break;
            };

            let token_type = match c {
                '(' => {
                    self.advance();
                    TokenType::LeftParen
                }
                ')' => {
                    self.advance();
                    TokenType::RightParen
                }
                '.' => {
                    self.advance();
                    TokenType::Dot
                }
                '=' => {
                    self.advance();
                    self.expect('=')?;
                    TokenType::Equals
                }
                '!' => {
                    self.advance();
                    self.expect('=')?;
                    TokenType::NotEquals
                }
                '<' => {
                    self.advance();
                    if self.peek_is('=') {
                        self.advance();
                        TokenType::LessEqual
                    } else {
                        TokenType::LessThan
                    }
                }
                '>' => {
                    self.advance();
                    if self.peek_is('=') {
                        self.advance();
                        TokenType::GreaterEqual
                    } else {
                        TokenType::GreaterThan
                    }
                }
                '\'' | '"' => self.read_string(c)?,
                c if c.is_ascii_digit() => self.read_number(),
                c if c.is_alphabetic() || c == '_' => self.read_identifier(),
                other => return Err(format!("unexpected character '{other}' at {line}:{column}")),
            };

            tokens.push(Token {
                token_type,
                line,
                column,
            });
        }
        Ok(tokens)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
            self.column = 1;
        } else if c.is_some() {
            self.column += 1;
        }
        c
    }

    fn peek_is(&mut self, expected: char) -> bool {
        self.chars.peek() == Some(&expected)
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        if self.peek_is(expected) {
            self.advance();
            Ok(())
        } else {
            Err(format!("expected '{expected}' at {}:{}", self.line, self.column))
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self, quote: char) -> Result<TokenType, String> {
        self.advance();
        let mut s = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => break,
                Some(c) => s.push(c),
                None => return Err("unterminated string literal".to_string()),
            }
        }
        Ok(TokenType::String(s))
    }

    fn read_number(&mut self) -> TokenType {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        TokenType::Number(s.parse().unwrap_or(0.0))
    }

    fn read_identifier(&mut self) -> TokenType {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        match s.as_str() {
            "and" | "AND" => TokenType::And,
            "or" | "OR" => TokenType::Or,
            "not" | "NOT" => TokenType::Not,
            "true" | "True" | "TRUE" => TokenType::True,
            "false" | "False" | "FALSE" => TokenType::False,
            "null" | "None" | "NULL" => TokenType::Null,
            _ => TokenType::Identifier(s),
        }
    }
}
