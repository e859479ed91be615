//! Formula tokens and the tokenizer that produces them

use crate::error::{FormulaError, FormulaResult};
use std::fmt;

/// Lexical category of a [`Token`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Arithmetic operator: `+ - * /`
    Operator,
    /// Function name (followed by an argument list)
    Function,
    /// Numeric literal text
    ConstantValue,
    /// Quoted string literal
    StringLiteral,
    /// `(`
    LeftParenthesis,
    /// `)`
    RightParenthesis,
    /// Single cell coordinate, e.g. "A1"
    GridCoordinate,
    /// Coordinate pair, e.g. "A1:A3"
    GridArray,
}

/// A typed lexical unit consumed by the expression builder
///
/// Tokens are immutable; the tokenizer is the only producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lexical category
    pub token_type: TokenType,
    /// Source text (quotes stripped for string literals)
    pub value: String,
}

impl Token {
    /// Create a token
    pub fn new(token_type: TokenType, value: impl Into<String>) -> Self {
        Self {
            token_type,
            value: value.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Split a formula string into tokens
///
/// A leading `=` (spreadsheet formula marker) is accepted and skipped.
/// Commas separate function arguments and are consumed here; the token
/// stream carries no separator tokens. Ranges like `A1:A3` lex as a single
/// [`TokenType::GridArray`] token.
///
/// # Example
/// ```
/// use gridcalc_formula::{tokenize, TokenType};
///
/// let tokens = tokenize("SUM(1,A2)").unwrap();
/// let types: Vec<_> = tokens.iter().map(|t| t.token_type).collect();
/// assert_eq!(
///     types,
///     vec![
///         TokenType::Function,
///         TokenType::LeftParenthesis,
///         TokenType::ConstantValue,
///         TokenType::GridCoordinate,
///         TokenType::RightParenthesis,
///     ]
/// );
/// ```
pub fn tokenize(input: &str) -> FormulaResult<Vec<Token>> {
    Tokenizer::new(input).run()
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        let trimmed = input.trim();
        let input = trimmed.strip_prefix('=').unwrap_or(trimmed);
        Self { input, pos: 0 }
    }

    fn run(mut self) -> FormulaResult<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek_char() {
            match c {
                c if c.is_whitespace() => self.advance(),
                // Argument separator, consumed here and never emitted
                ',' => self.advance(),
                '+' | '-' | '*' | '/' => {
                    self.advance();
                    tokens.push(Token::new(TokenType::Operator, c.to_string()));
                }
                '(' => {
                    self.advance();
                    tokens.push(Token::new(TokenType::LeftParenthesis, "("));
                }
                ')' => {
                    self.advance();
                    tokens.push(Token::new(TokenType::RightParenthesis, ")"));
                }
                '"' => tokens.push(self.scan_string()),
                c if c.is_ascii_digit() => tokens.push(self.scan_number()),
                '.' if self
                    .peek_char_at(1)
                    .map_or(false, |c| c.is_ascii_digit()) =>
                {
                    tokens.push(self.scan_number())
                }
                c if c.is_ascii_alphabetic() => tokens.push(self.scan_name()),
                other => return Err(FormulaError::UnexpectedCharacter(other)),
            }
        }

        Ok(tokens)
    }

    fn scan_string(&mut self) -> Token {
        self.advance(); // Skip opening quote

        let mut s = String::new();
        while let Some(c) = self.peek_char() {
            if c == '"' {
                // Check for escaped quote ("")
                if self.peek_char_at(1) == Some('"') {
                    s.push('"');
                    self.advance();
                    self.advance();
                } else {
                    break;
                }
            } else {
                s.push(c);
                self.advance();
            }
        }

        // Skip closing quote
        if self.peek_char() == Some('"') {
            self.advance();
        }

        Token::new(TokenType::StringLiteral, s)
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // The text is kept as-is; numeric parsing (and its error) belongs
        // to the expression builder
        Token::new(TokenType::ConstantValue, &self.input[start..self.pos])
    }

    fn scan_name(&mut self) -> Token {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| {
            c.is_ascii_alphanumeric() || c == '_'
        }) {
            self.advance();
        }

        let text = &self.input[start..self.pos];

        // A name directly followed by '(' is always a function call, even
        // when it has the letters-then-digits shape of a coordinate
        // (e.g. LOG10)
        if self.peek_char() == Some('(') {
            return Token::new(TokenType::Function, text);
        }

        if Self::is_coordinate(text) {
            // "A1:A3" becomes one GridArray token
            if self.peek_char() == Some(':') {
                self.advance();
                let end_start = self.pos;
                while self
                    .peek_char()
                    .map_or(false, |c| c.is_ascii_alphanumeric())
                {
                    self.advance();
                }
                let value = format!("{}:{}", text, &self.input[end_start..self.pos]);
                return Token::new(TokenType::GridArray, value);
            }

            return Token::new(TokenType::GridCoordinate, text);
        }

        Token::new(TokenType::Function, text)
    }

    /// Letters-then-digits coordinate shape, e.g. "A1", "xfd42"
    fn is_coordinate(text: &str) -> bool {
        let bytes = text.as_bytes();
        let mut i = 0;

        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        if i == 0 {
            return false;
        }

        let digit_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }

        i > digit_start && i == bytes.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn types(input: &str) -> Vec<TokenType> {
        tokenize(input)
            .unwrap()
            .iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_function_call() {
        let tokens = tokenize("SUM(1,2,3)").unwrap();
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[0], Token::new(TokenType::Function, "SUM"));
        assert_eq!(tokens[1], Token::new(TokenType::LeftParenthesis, "("));
        assert_eq!(tokens[2], Token::new(TokenType::ConstantValue, "1"));
        assert_eq!(tokens[5], Token::new(TokenType::RightParenthesis, ")"));
    }

    #[test]
    fn test_commas_are_not_emitted() {
        assert!(tokenize("SUM(1,2)")
            .unwrap()
            .iter()
            .all(|t| t.value != ","));
    }

    #[test]
    fn test_grid_tokens() {
        let tokens = tokenize("MIN(A1:A3)").unwrap();
        assert_eq!(tokens[2], Token::new(TokenType::GridArray, "A1:A3"));

        let tokens = tokenize("SUM(A1,B2)").unwrap();
        assert_eq!(tokens[2], Token::new(TokenType::GridCoordinate, "A1"));
        assert_eq!(tokens[3], Token::new(TokenType::GridCoordinate, "B2"));
    }

    #[test]
    fn test_coordinate_shaped_function_name() {
        let tokens = tokenize("LOG10(100)").unwrap();
        assert_eq!(tokens[0], Token::new(TokenType::Function, "LOG10"));
    }

    #[test]
    fn test_operators_and_parens() {
        assert_eq!(
            types("(1+2)*3"),
            vec![
                TokenType::LeftParenthesis,
                TokenType::ConstantValue,
                TokenType::Operator,
                TokenType::ConstantValue,
                TokenType::RightParenthesis,
                TokenType::Operator,
                TokenType::ConstantValue,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("1.5 .25 2e10").unwrap();
        assert_eq!(tokens[0].value, "1.5");
        assert_eq!(tokens[1].value, ".25");
        assert_eq!(tokens[2].value, "2e10");
        assert!(tokens
            .iter()
            .all(|t| t.token_type == TokenType::ConstantValue));
    }

    #[test]
    fn test_string_literal() {
        let tokens = tokenize("\"hello \"\"world\"\"\"").unwrap();
        assert_eq!(
            tokens[0],
            Token::new(TokenType::StringLiteral, "hello \"world\"")
        );
    }

    #[test]
    fn test_leading_equals_is_skipped() {
        assert_eq!(types("=SUM(1)"), types("SUM(1)"));
    }

    #[test]
    fn test_unexpected_character() {
        assert!(matches!(
            tokenize("1 ; 2"),
            Err(FormulaError::UnexpectedCharacter(';'))
        ));
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        assert_eq!(types(" SUM( 1 , 2 ) "), types("SUM(1,2)"));
    }
}
