use std::fmt;
use serde::Serialize;

pub const KEYWORDS: &[&str] = &[
    "if", "else",
    "try", "fail",
    "for", "while",
    "do", "with",
    "new", "del",
    "import", "export",
    "proto", "enum",
    "var", "def",
    "let", "use",
    "and", "or", "not",
    "is", "in",
    "as",
    "case", "when",
    "break", "continue", "redo",
    "return", "yield",
    "this", "super",
    "true", "false", "nil",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum TokenType {
    Keyword(String),        // if, while, let ...
    Identifier(String),     // foo, $bar, _baz
    Number(f64),            // 12, 0x1F, 3.14e2
    String(String),         // "...", '...', `...`
    Boolean(bool),          // true, false
    Nil,                    // nil
    Punctuator(String),     // + == >>> ...
    GroupOpen(char),        // ( [ {
    GroupClose(char),       // ) ] }
    EOF,
}

impl TokenType {
    /// Short category name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::Keyword(_) => "Keyword",
            TokenType::Identifier(_) => "Identifier",
            TokenType::Number(_) => "Numeric",
            TokenType::String(_) => "String",
            TokenType::Boolean(_) => "Boolean",
            TokenType::Nil => "Nil",
            TokenType::Punctuator(_) => "Punctuator",
            TokenType::GroupOpen(_) => "GroupOpen",
            TokenType::GroupClose(_) => "GroupClose",
            TokenType::EOF => "<end>",
        }
    }

    pub fn is_punctuator(&self, value: &str) -> bool {
        matches!(self, TokenType::Punctuator(p) if p == value)
    }

    pub fn is_keyword(&self, value: &str) -> bool {
        matches!(self, TokenType::Keyword(k) if k == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub token_type: TokenType,
    pub position: Position,
}

impl Token {
    pub fn new(token_type: TokenType, position: Position) -> Self {
        Token { token_type, position }
    }

    pub fn summary(&self) -> String {
        format!("{}{{{}}}", self.token_type.name(), self)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.token_type {
            TokenType::Keyword(k) => write!(f, "{}", k),
            TokenType::Identifier(id) => write!(f, "{}", id),
            TokenType::Number(n) => write!(f, "{}", n),
            TokenType::String(s) => write!(f, "\"{}\"", s.escape_default()),
            TokenType::Boolean(b) => write!(f, "{}", b),
            TokenType::Nil => write!(f, "nil"),
            TokenType::Punctuator(p) => write!(f, "{}", p),
            TokenType::GroupOpen(c) | TokenType::GroupClose(c) => write!(f, "{}", c),
            TokenType::EOF => write!(f, ""),
        }
    }
}

pub fn group_close(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

pub fn is_group_open(ch: char) -> bool {
    group_close(ch).is_some()
}

pub fn is_group_close(ch: char) -> bool {
    matches!(ch, ')' | ']' | '}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tags() {
        let token = Token::new(TokenType::Number(31.0), Position { line: 1, column: 1, offset: 0, end: 4 });
        let json = serde_json::to_value(&token).unwrap();

        assert_eq!(json["token_type"]["type"], "Number");
        assert_eq!(json["token_type"]["value"], 31.0);
        assert_eq!(json["position"]["end"], 4);
    }

    #[test]
    fn keyword_table() {
        assert!(is_keyword("proto"));
        assert!(is_keyword("nil"));
        assert!(!is_keyword("print"));
    }

    #[test]
    fn summaries_name_the_category() {
        let token = Token::new(TokenType::Punctuator(">>>".into()), Position::default());
        assert_eq!(token.summary(), "Punctuator{>>>}");
        assert_eq!(group_close('['), Some(']'));
        assert!(is_group_close('}'));
    }
}
