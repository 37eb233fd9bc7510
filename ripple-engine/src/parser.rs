use crate::ast::*;
use crate::error::Error;
use crate::lexer::{Lexer, Token, TokenType};

pub struct Parser;

impl Parser {
    pub fn parse(input: &str) -> Result<Expression, Error> {
        let tokens = Lexer::new(input)
            .tokenize()
            .map_err(Error::ConditionLex)?;
        let mut parser = TokenParser::new(tokens);
        let expr = parser.parse_or()?;
        parser.expect(&TokenType::Eof)?;
        Ok(expr)
    }
}

struct TokenParser {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenParser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, position: 0 }
    }

    fn peek(&self) -> &TokenType {
        &self.tokens[self.position].token_type
    }

    fn advance(&mut self) -> TokenType {
        let t = self.tokens[self.position].token_type.clone();
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
        t
    }

    fn check(&self, t: &TokenType) -> bool {
        self.peek() == t
    }

    fn match_token(&mut self, t: &TokenType) -> bool {
        if self.check(t) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, t: &TokenType) -> Result<(), Error> {
        if self.match_token(t) {
            Ok(())
        } else {
            Err(Error::ConditionParse(format!(
                "expected {:?}, found {:?}",
                t,
                self.peek()
            )))
        }
    }

    // or -> and ("or" and)*
    fn parse_or(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_and()?;
        while self.match_token(&TokenType::Or) {
            let right = self.parse_and()?;
            left = Expression::Binary(Box::new(BinaryExpression {
                left,
                operator: BinaryOperator::Or,
                right,
            }));
        }
        Ok(left)
    }

    // and -> not ("and" not)*
    fn parse_and(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_not()?;
        while self.match_token(&TokenType::And) {
            let right = self.parse_not()?;
            left = Expression::Binary(Box::new(BinaryExpression {
                left,
                operator: BinaryOperator::And,
                right,
            }));
        }
        Ok(left)
    }

    // not -> "not" not | comparison
    fn parse_not(&mut self) -> Result<Expression, Error> {
        if self.match_token(&TokenType::Not) {
            let operand = self.parse_not()?;
            return Ok(Expression::Unary(Box::new(UnaryExpression {
                operator: UnaryOperator::Not,
                operand,
            })));
        }
        self.parse_comparison()
    }

    // comparison -> primary (cmp_op primary)?
    fn parse_comparison(&mut self) -> Result<Expression, Error> {
        let left = self.parse_primary()?;
        let operator = match self.peek() {
            TokenType::Equals => BinaryOperator::Equals,
            TokenType::NotEquals => BinaryOperator::NotEquals,
            TokenType::LessThan => BinaryOperator::LessThan,
            TokenType::LessEqual => BinaryOperator::LessEqual,
            TokenType::GreaterThan => BinaryOperator::GreaterThan,
            TokenType::GreaterEqual => BinaryOperator::GreaterEqual,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_primary()?;
        Ok(Expression::Binary(Box::new(BinaryExpression {
            left,
            operator,
            right,
        })))
    }

    fn parse_primary(&mut self) -> Result<Expression, Error> {
        match self.advance() {
            TokenType::LeftParen => {
                let expr = self.parse_or()?;
                self.expect(&TokenType::RightParen)?;
                Ok(expr)
            }
            TokenType::True => Ok(Expression::Literal(Literal::Boolean(true))),
            TokenType::False => Ok(Expression::Literal(Literal::Boolean(false))),
            TokenType::Null => Ok(Expression::Literal(Literal::Null)),
            TokenType::Number(n) => Ok(Expression::Literal(Literal::Number(n))),
            TokenType::String(s) => Ok(Expression::Literal(Literal::String(s))),
            TokenType::Identifier(name) => {
                let scope = match name.as_str() {
                    "source" => Scope::Source,
                    "target" => Scope::Target,
                    other => {
                        return Err(Error::ConditionParse(format!(
                            "unknown identifier '{other}', expected 'source' or 'target'"
                        )))
                    }
                };
                self.expect(&TokenType::Dot)?;
                let property = match self.advance() {
                    TokenType::Identifier(p) => p,
                    other => {
                        return Err(Error::ConditionParse(format!(
                            "expected property name after '.', found {other:?}"
                        )))
                    }
                };
                Ok(Expression::Attribute { scope, property })
            }
            other => Err(Error::ConditionParse(format!("unexpected token {other:?}"))),
        }
    }
}
