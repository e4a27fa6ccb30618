use log::trace;
use crate::language::token::{self, Position, Token, TokenType};
use crate::language::error::{Result, Error, ErrorKind};
use crate::scan_error;

const PUNCTUATORS_3: &[&str] = &[">>>", "!!!", "..."];

const PUNCTUATORS_2: &[&str] = &[
    "++", "--",
    "**", "//", "%%",
    "==", "!=",
    "<=", ">=",
    "&&", "||",
    "<<", ">>",
    "|>", "::",
];

const PUNCTUATORS_1: &[char] = &[
    '+', '-', '*', '/', '%',
    '<', '>',
    '.', ',', '!', '?', ';', ':',
    '@', '&', '|', '~', '^',
    '=', '$',
];

pub fn is_identifier_start(ch: char) -> bool {
    ch == '$' || ch == '_' || ch.is_ascii_alphabetic() || (!ch.is_ascii() && ch.is_alphabetic())
}

pub fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit() || (!ch.is_ascii() && ch.is_alphanumeric())
}

fn is_quote(ch: char) -> bool {
    matches!(ch, '"' | '\'' | '`')
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub struct Lexer {
    pub(crate) input: Vec<char>,
    pub(crate) position: usize,
    pub(crate) line: usize,
    pub(crate) column: usize,
    pub(crate) offset: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    pub fn peek_next(&self) -> Option<char> {
        self.peek_at(1)
    }

    fn peek_at(&self, distance: usize) -> Option<char> {
        self.input.get(self.position + distance).copied()
    }

    pub fn consume(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        self.offset += ch.len_utf8();

        // "\r\n" counts as a single line break, taken at the '\n'
        if ch == '\n' || (is_line_terminator(ch) && !(ch == '\r' && self.peek() == Some('\n'))) {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn mark(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.offset,
            end: self.offset,
        }
    }

    fn error_here(&self, message: impl Into<String>) -> Error {
        Error::new(ErrorKind::Scan, message).at(self.line, self.column, self.offset)
    }

    /// Skips whitespace, line comments and (nested) block comments.
    pub fn skip_trivia(&mut self) -> Result<()> {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.consume();
            } else if ch == '#' {
                let start = self.mark();
                self.consume();
                match self.peek() {
                    Some(open) if token::is_group_open(open) => self.skip_block_comment(start)?,
                    _ => self.skip_line_comment(),
                }
            } else {
                break;
            }
        }

        Ok(())
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if is_line_terminator(ch) {
                break;
            }
            self.consume();
        }
    }

    /// Called with the opening bracket of `#(` as the next character.
    fn skip_block_comment(&mut self, start: Position) -> Result<()> {
        let mut closers = Vec::new();
        if let Some(close) = self.consume().and_then(token::group_close) {
            closers.push(close);
        }

        while let Some(&expected) = closers.last() {
            match self.consume() {
                None => {
                    return scan_error!(
                        format!("Unterminated block comment, expected '{}#'", expected),
                        start.line, start.column, start.offset
                    );
                }
                Some('#') => {
                    if let Some(close) = self.peek().and_then(token::group_close) {
                        self.consume();
                        closers.push(close);
                    }
                }
                Some(ch) if ch == expected && self.peek() == Some('#') => {
                    self.consume();
                    closers.pop();
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// The next two characters after any trivia, leaving the lexer untouched.
    pub(crate) fn peek_significant(&mut self) -> (Option<char>, Option<char>) {
        let saved = (self.position, self.line, self.column, self.offset);

        let ahead = match self.skip_trivia() {
            Ok(()) => (self.peek(), self.peek_next()),
            Err(_) => (None, None),
        };

        (self.position, self.line, self.column, self.offset) = saved;
        ahead
    }

    pub fn read_identifier(&mut self) -> String {
        let mut identifier = String::new();

        while let Some(ch) = self.peek() {
            if is_identifier_part(ch) {
                identifier.push(ch);
                self.consume();
            } else {
                break;
            }
        }

        identifier
    }

    fn classify_word(word: String) -> TokenType {
        match word.as_str() {
            "nil" => TokenType::Nil,
            "true" => TokenType::Boolean(true),
            "false" => TokenType::Boolean(false),
            _ if token::is_keyword(&word) => TokenType::Keyword(word),
            _ => TokenType::Identifier(word),
        }
    }

    fn read_radix_number(&mut self, radix: u32) -> Result<f64> {
        self.consume();
        let marker = self.consume().unwrap_or('?');

        let mut value = 0f64;
        let mut digits = 0usize;
        while let Some(digit) = self.peek().and_then(|ch| ch.to_digit(radix)) {
            value = value * radix as f64 + digit as f64;
            digits += 1;
            self.consume();
        }

        if digits == 0 {
            return Err(self.error_here(format!("No number follows 0{}", marker)));
        }

        if let Some(ch) = self.peek() {
            if is_identifier_part(ch) {
                return Err(self.error_here(format!("Invalid digit '{}' in base {} literal", ch, radix)));
            }
        }

        Ok(value)
    }

    fn read_number(&mut self) -> Result<f64> {
        if self.peek() == Some('0') {
            let radix = match self.peek_next() {
                Some('x') | Some('X') => Some(16),
                Some('o') | Some('O') => Some(8),
                Some('b') | Some('B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                return self.read_radix_number(radix);
            }
        }

        let mut number = String::new();
        self.read_digits(&mut number);

        if self.peek() == Some('.') && self.peek_next().is_some_and(|ch| ch.is_ascii_digit()) {
            number.push('.');
            self.consume();
            self.read_digits(&mut number);
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let signed = matches!(self.peek_next(), Some('+') | Some('-'));
            let first_digit = if signed { self.peek_at(2) } else { self.peek_next() };
            if first_digit.is_some_and(|ch| ch.is_ascii_digit()) {
                number.push('e');
                self.consume();
                if signed {
                    number.extend(self.consume());
                }
                self.read_digits(&mut number);
            }
        }

        if let Some(ch) = self.peek() {
            if is_identifier_start(ch) {
                return Err(self.error_here(format!("Unexpected '{}' directly after numeric literal {}", ch, number)));
            }
        }

        number.parse::<f64>().map_err(|_| {
            self.error_here(format!("Could not convert '{}' to a number", number))
        })
    }

    fn read_digits(&mut self, into: &mut String) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                into.push(ch);
                self.consume();
            } else {
                break;
            }
        }
    }

    pub fn read_string(&mut self) -> Result<String> {
        let quote = match self.consume() {
            Some(q) => q,
            None => return Err(self.error_here("Expected a string literal")),
        };

        let mut string = String::new();

        loop {
            let ch = match self.consume() {
                Some(ch) => ch,
                None => return Err(self.error_here("EOF while parsing string")),
            };

            if ch == quote {
                return Ok(string);
            }

            if ch != '\\' {
                string.push(ch);
                continue;
            }

            match self.consume() {
                None => return Err(self.error_here("EOF while parsing string escape")),
                Some('a') => string.push('\x07'),
                Some('b') => string.push('\x08'),
                Some('f') => string.push('\x0c'),
                Some('n') => string.push('\n'),
                Some('r') => string.push('\r'),
                Some('t') => string.push('\t'),
                Some('v') => string.push('\x0b'),
                Some('0') => string.push('\0'),
                Some('x') => string.push(self.read_hex_escape()?),
                Some('\r') => {
                    if self.peek() == Some('\n') {
                        self.consume();
                    }
                }
                Some(ch) if is_line_terminator(ch) => {}
                Some(ch) => string.push(ch),
            }
        }
    }

    fn read_hex_escape(&mut self) -> Result<char> {
        let mut code = 0u32;
        for _ in 0..2 {
            match self.peek().and_then(|ch| ch.to_digit(16)) {
                Some(digit) => {
                    code = code * 16 + digit;
                    self.consume();
                }
                None => return Err(self.error_here("Invalid \\x escape, expected two hex digits")),
            }
        }

        char::from_u32(code).ok_or_else(|| self.error_here("Invalid \\x escape"))
    }

    fn read_punctuator(&mut self) -> Option<String> {
        let ahead: String = self.input[self.position..].iter().take(3).collect();

        let punctuator = PUNCTUATORS_3.iter()
            .chain(PUNCTUATORS_2.iter())
            .find(|p| ahead.starts_with(**p))
            .map(|p| p.to_string())
            .or_else(|| {
                ahead.chars().next()
                    .filter(|ch| PUNCTUATORS_1.contains(ch))
                    .map(String::from)
            })?;

        for _ in 0..punctuator.chars().count() {
            self.consume();
        }

        Some(punctuator)
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia()?;

        let mut position = self.mark();

        let token_type = match self.peek() {
            None => TokenType::EOF,
            Some(ch) if is_identifier_start(ch) => Self::classify_word(self.read_identifier()),
            Some(ch) if ch.is_ascii_digit() => TokenType::Number(self.read_number()?),
            Some(ch) if is_quote(ch) => TokenType::String(self.read_string()?),
            Some(ch) if token::is_group_open(ch) => {
                self.consume();
                TokenType::GroupOpen(ch)
            }
            Some(ch) if token::is_group_close(ch) => {
                self.consume();
                TokenType::GroupClose(ch)
            }
            Some(ch) => match self.read_punctuator() {
                Some(p) => TokenType::Punctuator(p),
                None => {
                    return scan_error!(
                        format!("Unknown character '{}'", ch),
                        self.line, self.column, self.offset
                    );
                }
            },
        };

        position.end = self.offset;
        let token = Token::new(token_type, position);
        trace!("Scanned {} at {}:{}", token.summary(), position.line, position.column);

        Ok(token)
    }

    /// Scans the whole input. The trailing EOF token is not included.
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;

            if token.token_type == TokenType::EOF {
                break;
            }

            tokens.push(token);
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenType> {
        Lexer::new(source)
            .tokenize()
            .expect("source should scan")
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    fn scan_error(source: &str) -> Error {
        Lexer::new(source).tokenize().expect_err("source should not scan")
    }

    #[test]
    fn radix_literals() {
        assert_eq!(kinds("0x1F 0b101 0o17 0XfF"), vec![
            TokenType::Number(31.0),
            TokenType::Number(5.0),
            TokenType::Number(15.0),
            TokenType::Number(255.0),
        ]);
    }

    #[test]
    fn decimal_literals() {
        assert_eq!(kinds("3.14 42 1e3 2.5E-1"), vec![
            TokenType::Number(3.14),
            TokenType::Number(42.0),
            TokenType::Number(1000.0),
            TokenType::Number(0.25),
        ]);
    }

    #[test]
    fn dot_without_fraction_is_punctuation() {
        assert_eq!(kinds("1.x"), vec![
            TokenType::Number(1.0),
            TokenType::Punctuator(".".into()),
            TokenType::Identifier("x".into()),
        ]);
    }

    #[test]
    fn radix_literal_needs_digits() {
        let err = scan_error("0x");
        assert_eq!(err.kind, ErrorKind::Scan);
        assert!(err.message.contains("0x"));
        assert_eq!(scan_error("0b102").kind, ErrorKind::Scan);
    }

    #[test]
    fn number_followed_by_identifier_is_rejected() {
        let err = scan_error("12abc");
        assert_eq!(err.kind, ErrorKind::Scan);
        assert_eq!(err.line, Some(1));
        assert_eq!(err.column, Some(3));
    }

    #[test]
    fn words_are_classified() {
        assert_eq!(kinds("if foo nil true false not $x"), vec![
            TokenType::Keyword("if".into()),
            TokenType::Identifier("foo".into()),
            TokenType::Nil,
            TokenType::Boolean(true),
            TokenType::Boolean(false),
            TokenType::Keyword("not".into()),
            TokenType::Identifier("$x".into()),
        ]);
    }

    #[test]
    fn strings_with_each_quote_and_escapes() {
        assert_eq!(kinds(r#""a\tb" 'it''s' `x\x41\q`"#), vec![
            TokenType::String("a\tb".into()),
            TokenType::String("it".into()),
            TokenType::String("s".into()),
            TokenType::String("xAq".into()),
        ]);
    }

    #[test]
    fn escaped_line_break_is_swallowed() {
        assert_eq!(kinds("\"one\\\ntwo\""), vec![TokenType::String("onetwo".into())]);
        assert_eq!(kinds("\"one\\\r\ntwo\""), vec![TokenType::String("onetwo".into())]);
    }

    #[test]
    fn unterminated_string() {
        let err = scan_error("\"abc");
        assert_eq!(err.kind, ErrorKind::Scan);
        assert!(err.message.contains("EOF"));
    }

    #[test]
    fn nested_block_comments() {
        assert_eq!(kinds("#( outer #[ inner ]# still-outer )# after"), vec![
            TokenType::Identifier("after".into()),
        ]);
        assert_eq!(kinds("#{ ) ]# }# 1"), vec![TokenType::Number(1.0)]);
    }

    #[test]
    fn unterminated_block_comment() {
        let err = scan_error("#( never closed ]#");
        assert_eq!(err.kind, ErrorKind::Scan);
        assert_eq!(err.column, Some(1));
    }

    #[test]
    fn line_comments() {
        assert_eq!(kinds("1 # the rest\n2"), vec![
            TokenType::Number(1.0),
            TokenType::Number(2.0),
        ]);
    }

    #[test]
    fn punctuators_use_longest_match() {
        assert_eq!(kinds("a >>>= b ** c |> d"), vec![
            TokenType::Identifier("a".into()),
            TokenType::Punctuator(">>>".into()),
            TokenType::Punctuator("=".into()),
            TokenType::Identifier("b".into()),
            TokenType::Punctuator("**".into()),
            TokenType::Identifier("c".into()),
            TokenType::Punctuator("|>".into()),
            TokenType::Identifier("d".into()),
        ]);
    }

    #[test]
    fn groups() {
        assert_eq!(kinds("([{}])"), vec![
            TokenType::GroupOpen('('),
            TokenType::GroupOpen('['),
            TokenType::GroupOpen('{'),
            TokenType::GroupClose('}'),
            TokenType::GroupClose(']'),
            TokenType::GroupClose(')'),
        ]);
    }

    #[test]
    fn positions_track_lines_and_offsets() {
        let tokens = Lexer::new("a\n  bb").tokenize().unwrap();
        assert_eq!(tokens[1].position, Position { line: 2, column: 3, offset: 4, end: 6 });
    }

    #[test]
    fn unknown_character() {
        let err = scan_error("a ¤");
        assert_eq!(err.kind, ErrorKind::Scan);
        assert_eq!(err.column, Some(3));
    }

    #[test]
    fn end_of_input_repeats() {
        let mut lexer = Lexer::new("  ");
        assert_eq!(lexer.next_token().unwrap().token_type, TokenType::EOF);
        assert_eq!(lexer.next_token().unwrap().token_type, TokenType::EOF);
    }
}
