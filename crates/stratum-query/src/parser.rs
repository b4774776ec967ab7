//! Statement parser.
//!
//! Grammar, keywords case-insensitive, one optional trailing `;`:
//! ```text
//! INSERT INTO ident '(' ident {',' ident} ')' VALUES '(' literal {',' literal} ')'
//! SELECT ('*' | ident {',' ident}) FROM ident [WHERE ident '=' literal]
//! ```

use crate::ast::{Condition, Literal, Projection, Statement};
use stratum_common::{Result, StratumError};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Comma,
    LParen,
    RParen,
    Star,
    Equals,
    Semicolon,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{}'", w),
            Token::Quoted(s) => format!("string '{}'", s),
            Token::Comma => "','".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Equals => "'='".to_string(),
            Token::Semicolon => "';'".to_string(),
        }
    }
}

fn parse_error(msg: impl Into<String>) -> StratumError {
    StratumError::ParseError(msg.into())
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '(' | ')' | '*' | '=' | ';' | '\'')
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '*' => Token::Star,
            '=' => Token::Equals,
            ';' => Token::Semicolon,
            '\'' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\'')) => break,
                        Some((_, ch)) => text.push(ch),
                        None => {
                            return Err(parse_error(format!(
                                "unterminated string starting at byte {}",
                                start
                            )))
                        }
                    }
                }
                tokens.push(Token::Quoted(text));
                continue;
            }
            _ => {
                let mut end = input.len();
                while let Some(&(i, ch)) = chars.peek() {
                    if is_delimiter(ch) {
                        end = i;
                        break;
                    }
                    chars.next();
                }
                tokens.push(Token::Word(input[start..end].to_string()));
                continue;
            }
        };
        chars.next();
        tokens.push(token);
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self> {
        let mut tokens = tokenize(input)?;
        if tokens.last() == Some(&Token::Semicolon) {
            tokens.pop();
        }
        Ok(Self { tokens, pos: 0 })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn unexpected(&self, expected: &str) -> StratumError {
        match self.peek() {
            Some(token) => parse_error(format!("expected {}, found {}", expected, token.describe())),
            None => parse_error(format!("expected {}, found end of input", expected)),
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(&token.describe()))
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::Word(w)) if w.chars().all(|c| c.is_alphanumeric() || c == '_') => {
                let name = w.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn identifier_list(&mut self) -> Result<Vec<String>> {
        let mut names = vec![self.identifier()?];
        while self.eat(&Token::Comma) {
            names.push(self.identifier()?);
        }
        Ok(names)
    }

    fn literal(&mut self) -> Result<Literal> {
        let literal = match self.peek() {
            Some(Token::Quoted(s)) => Literal::Text(s.clone()),
            Some(Token::Word(w)) => Literal::from_bare(w),
            _ => return Err(self.unexpected("literal")),
        };
        self.pos += 1;
        Ok(literal)
    }

    fn literal_list(&mut self) -> Result<Vec<Literal>> {
        let mut values = vec![self.literal()?];
        while self.eat(&Token::Comma) {
            values.push(self.literal()?);
        }
        Ok(values)
    }

    fn finish(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.unexpected("end of statement")),
        }
    }

    fn statement(&mut self) -> Result<Statement> {
        let statement = if self.peek_keyword("insert") {
            self.insert()?
        } else if self.peek_keyword("select") {
            self.select()?
        } else {
            return Err(parse_error("statement must start with SELECT or INSERT"));
        };
        self.finish()?;
        Ok(statement)
    }

    fn insert(&mut self) -> Result<Statement> {
        self.expect_keyword("insert")?;
        self.expect_keyword("into")?;
        let table = self.identifier()?;

        self.expect(Token::LParen)?;
        let fields = self.identifier_list()?;
        self.expect(Token::RParen)?;

        self.expect_keyword("values")?;
        self.expect(Token::LParen)?;
        let values = self.literal_list()?;
        self.expect(Token::RParen)?;

        if fields.len() != values.len() {
            return Err(parse_error(format!(
                "{} field(s) but {} value(s)",
                fields.len(),
                values.len()
            )));
        }
        if let Some((i, dup)) = fields
            .iter()
            .enumerate()
            .find(|(i, f)| fields[..*i].contains(*f))
        {
            return Err(parse_error(format!("field {} listed twice (position {})", dup, i + 1)));
        }

        Ok(Statement::Insert {
            table,
            fields,
            values,
        })
    }

    fn select(&mut self) -> Result<Statement> {
        self.expect_keyword("select")?;
        let projection = if self.eat(&Token::Star) {
            Projection::All
        } else {
            Projection::Fields(self.identifier_list()?)
        };

        self.expect_keyword("from")?;
        let table = self.identifier()?;

        let condition = if self.peek_keyword("where") {
            self.pos += 1;
            let field = self.identifier()?;
            self.expect(Token::Equals)?;
            let value = self.literal()?;
            Some(Condition { field, value })
        } else {
            None
        };

        Ok(Statement::Select {
            table,
            projection,
            condition,
        })
    }
}

/// Parses one statement.
pub fn parse(input: &str) -> Result<Statement> {
    Parser::new(input)?.statement()
}
