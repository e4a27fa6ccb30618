use log::{debug, trace};
use crate::language::token::{self, Position, Token, TokenType};
use crate::language::ast::{
    Binding, Case, CallKind, Entry, Expr, IfClause, Literal, Parameter, Pattern, PatternField, PatternKey,
};
use crate::language::lexer::Lexer;
use crate::language::operators::{self, STATEMENT};
use crate::language::error::Result;
use crate::syntax_error;

fn closing(open: char) -> char {
    token::group_close(open).unwrap_or(open)
}

fn unexpected<T>(token: &Token) -> Result<T> {
    syntax_error!(format!("Unexpected {}", token.summary()), token.position)
}

pub struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    /// Parses a whole script. The root is always a `Group`.
    pub fn parse_script(&mut self) -> Result<Expr> {
        let mut elements = Vec::new();

        while !self.is_at_end() {
            if self.match_punctuator(";")? {
                continue;
            }
            elements.push(self.parse_statement()?);
        }

        Ok(Expr::Group(elements))
    }

    fn is_at_end(&self) -> bool {
        self.current.token_type == TokenType::EOF
    }

    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn check_punctuator(&self, punctuator: &str) -> bool {
        self.current.token_type.is_punctuator(punctuator)
    }

    fn check_close(&self, close: char) -> bool {
        matches!(self.current.token_type, TokenType::GroupClose(c) if c == close)
    }

    fn match_punctuator(&mut self, punctuator: &str) -> Result<bool> {
        if self.check_punctuator(punctuator) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn match_keyword(&mut self, keyword: &str) -> Result<bool> {
        if self.current.token_type.is_keyword(keyword) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn match_close(&mut self, close: char) -> Result<bool> {
        if self.check_close(close) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn fail_expected<T>(&self, what: &str) -> Result<T> {
        syntax_error!(
            format!("Expected {}, got {}", what, self.current.summary()),
            self.current.position
        )
    }

    fn expect_punctuator(&mut self, punctuator: &str) -> Result<Token> {
        if self.check_punctuator(punctuator) {
            return self.advance();
        }
        self.fail_expected(&format!("'{}'", punctuator))
    }

    fn expect_identifier(&mut self) -> Result<String> {
        if let TokenType::Identifier(name) = &self.current.token_type {
            let name = name.clone();
            self.advance()?;
            return Ok(name);
        }
        self.fail_expected("an identifier")
    }

    fn at_expression_end(&self) -> bool {
        match &self.current.token_type {
            TokenType::EOF | TokenType::GroupClose(_) => true,
            TokenType::Punctuator(p) => matches!(p.as_str(), ";" | "," | ":"),
            TokenType::Keyword(k) => matches!(k.as_str(), "else" | "when"),
            _ => false,
        }
    }

    pub fn parse_statement(&mut self) -> Result<Expr> {
        self.parse_expression(STATEMENT)
    }

    /// Consumes the next token when it is a binary operator binding at least
    /// as tightly as `min`.
    fn next_binary_operator(&mut self, min: u8) -> Result<Option<(String, u8, Position)>> {
        let spelling = match &self.current.token_type {
            TokenType::Punctuator(p) => p.clone(),
            TokenType::Keyword(k) if matches!(k.as_str(), "and" | "or" | "is" | "in") => k.clone(),
            TokenType::GroupOpen(open) => open.to_string(),
            _ => return Ok(None),
        };

        match operators::binary_precedence(&spelling) {
            Some(precedence) if precedence >= min => {
                let position = self.advance()?.position;
                Ok(Some((spelling, precedence, position)))
            }
            _ => Ok(None),
        }
    }

    pub fn parse_expression(&mut self, min: u8) -> Result<Expr> {
        let mut lhs = self.parse_atom()?;

        while let Some((op, precedence, position)) = self.next_binary_operator(min)? {
            trace!("Folding '{}' at {}:{}", op, position.line, position.column);

            if let Some(kind) = op.chars().next().and_then(CallKind::from_open) {
                let args = self.parse_entry_list(kind.close(), None)?;
                lhs = match lhs {
                    Expr::Access { object, key } if kind == CallKind::Paren => {
                        Expr::MethodCall { receiver: object, key, args }
                    }
                    callee => Expr::Call { kind, callee: Box::new(callee), args },
                };
                continue;
            }

            lhs = match op.as_str() {
                "." => Expr::Access {
                    object: Box::new(lhs),
                    key: Box::new(self.parse_member_key(precedence)?),
                },
                "=" => {
                    let value = self.parse_expression(operators::operand_precedence(&op, precedence))?;
                    Self::assignment(lhs, value, position)?
                }
                _ => {
                    let rhs = self.parse_expression(operators::operand_precedence(&op, precedence))?;
                    Expr::binary(op, lhs, rhs)
                }
            };
        }

        Ok(lhs)
    }

    fn assignment(target: Expr, value: Expr, position: Position) -> Result<Expr> {
        let value = Box::new(value);
        match target {
            Expr::Identifier(name) => Ok(Expr::IdentAssign { name, value }),
            Expr::Access { object, key } => Ok(Expr::AccessAssign { object, key, value }),
            Expr::Call { kind: CallKind::Bracket, callee, args } => Ok(Expr::CallAssign {
                kind: CallKind::Bracket,
                callee,
                args,
                value,
            }),
            Expr::Call { kind, .. } => syntax_error!(
                format!("Assignment to a '{}' call is not implemented", kind.open()),
                position
            ),
            other => syntax_error!(format!("Assignment to '{}' is not implemented", other), position),
        }
    }

    /// A bare name after `.` is the property name itself, keywords included.
    fn parse_member_key(&mut self, precedence: u8) -> Result<Expr> {
        match &self.current.token_type {
            TokenType::Identifier(name) | TokenType::Keyword(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(Expr::Identifier(name))
            }
            _ => self.parse_expression(operators::operand_precedence(".", precedence)),
        }
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        let token = self.advance()?;

        match &token.token_type {
            TokenType::Nil => Ok(Expr::nil()),
            TokenType::Boolean(b) => Ok(Expr::Literal(Literal::Bool(*b))),
            TokenType::Number(n) => Ok(Expr::number(*n)),
            TokenType::String(s) => Ok(Expr::string(s.clone())),
            TokenType::Identifier(name) => Ok(Expr::Identifier(name.clone())),
            TokenType::GroupOpen(open) => self.parse_group(*open),
            TokenType::Punctuator(op) if op == "::" => {
                let name = self.expect_identifier()?;
                Ok(Expr::Unary { op: op.clone(), operand: Box::new(Expr::Identifier(name)) })
            }
            TokenType::Punctuator(op) => match operators::unary_precedence(op) {
                Some(precedence) => self.parse_unary(op, precedence),
                None => unexpected(&token),
            },
            TokenType::Keyword(keyword) => match keyword.as_str() {
                "if" => self.parse_if(),
                "var" | "def" => self.parse_declaration(keyword),
                "for" => self.parse_for(),
                "while" => self.parse_while(),
                "do" => self.parse_do(),
                "let" => self.parse_function(),
                "new" => self.parse_new(),
                "proto" => self.parse_proto(),
                "import" => Ok(Expr::Import(Box::new(self.parse_statement()?))),
                "export" => self.parse_export(),
                "return" => Ok(Expr::Return(self.parse_optional_argument()?)),
                "yield" => {
                    let delegate = self.match_punctuator("*")?;
                    let argument = self.parse_optional_argument()?;
                    Ok(Expr::Yield { argument, delegate })
                }
                "fail" => Ok(Expr::Fail(Box::new(self.parse_statement()?))),
                "with" => self.parse_with(),
                "case" => self.parse_case(),
                "this" => Ok(Expr::This),
                "break" => Ok(Expr::Break(self.parse_label()?)),
                "continue" => Ok(Expr::Continue(self.parse_label()?)),
                "try" => {
                    let body = Box::new(self.parse_statement()?);
                    let otherwise = self.parse_else()?;
                    Ok(Expr::Try { body, otherwise })
                }
                "not" => self.parse_unary("not", operators::unary_precedence("not").unwrap_or(0x41)),
                _ => unexpected(&token),
            },
            _ => unexpected(&token),
        }
    }

    fn parse_unary(&mut self, op: &str, precedence: u8) -> Result<Expr> {
        let operand = self.parse_expression(precedence)?;
        Ok(Expr::Unary { op: op.to_string(), operand: Box::new(operand) })
    }

    fn parse_optional_argument(&mut self) -> Result<Option<Box<Expr>>> {
        if self.at_expression_end() {
            return Ok(None);
        }
        Ok(Some(Box::new(self.parse_statement()?)))
    }

    fn parse_label(&mut self) -> Result<Option<String>> {
        if let TokenType::Identifier(_) = self.current.token_type {
            return self.expect_identifier().map(Some);
        }
        Ok(None)
    }

    fn parse_loop_label(&mut self) -> Result<Option<String>> {
        if self.match_keyword("as")? {
            return self.expect_identifier().map(Some);
        }
        Ok(None)
    }

    fn parse_else(&mut self) -> Result<Option<Box<Expr>>> {
        if self.match_keyword("else")? {
            return Ok(Some(Box::new(self.parse_statement()?)));
        }
        Ok(None)
    }

    /// A bracketed head such as the test of `if` or `while`.
    fn parse_head(&mut self) -> Result<Expr> {
        match self.current.token_type {
            TokenType::GroupOpen(open) => {
                self.advance()?;
                self.parse_group(open)
            }
            _ => self.fail_expected("'('"),
        }
    }

    /// Called after the opening bracket. Reads either a `;`-separated
    /// sequence or, when the first element is followed by `,` or `:`,
    /// a collection.
    fn parse_group(&mut self, open: char) -> Result<Expr> {
        let close = closing(open);
        let mut elements = Vec::new();
        let mut after_separator = true;

        loop {
            if self.match_close(close)? {
                break;
            }
            if matches!(self.current.token_type, TokenType::EOF | TokenType::GroupClose(_)) {
                return self.fail_expected(&format!("'{}'", close));
            }
            if self.match_punctuator(";")? {
                if after_separator {
                    elements.push(Expr::nil());
                }
                after_separator = true;
                continue;
            }

            let element = self.parse_entry_head()?;
            if elements.is_empty() && (self.check_punctuator(",") || self.check_punctuator(":")) {
                return self.parse_collection(open, element);
            }
            elements.push(element);
            after_separator = false;
        }

        Ok(Expr::group(elements))
    }

    fn parse_collection(&mut self, open: char, first: Expr) -> Result<Expr> {
        let entries = self.parse_entry_list(closing(open), Some(first))?;

        if open == '[' && entries.iter().all(|entry| entry.positional) {
            return Ok(Expr::Array(entries.into_iter().map(|entry| entry.value).collect()));
        }

        Ok(Expr::Object(entries))
    }

    /// Comma-separated entries up to `close`, which is consumed. A trailing
    /// comma is allowed.
    fn parse_entry_list(&mut self, close: char, first: Option<Expr>) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        let mut next_index = 0;

        if let Some(head) = first {
            entries.push(self.finish_entry(head, &mut next_index)?);
        }

        while !self.match_close(close)? {
            if !entries.is_empty() {
                if !self.match_punctuator(",")? {
                    return self.fail_expected(&format!("',' or '{}'", close));
                }
                if self.match_close(close)? {
                    break;
                }
            }
            let head = self.parse_entry_head()?;
            entries.push(self.finish_entry(head, &mut next_index)?);
        }

        Ok(entries)
    }

    /// Reads what may become an entry key. A keyword directly followed by
    /// `:` is taken as a name, so `{new: ...}` works.
    fn parse_entry_head(&mut self) -> Result<Expr> {
        let keyword = match &self.current.token_type {
            TokenType::Keyword(k) => Some(k.clone()),
            _ => None,
        };

        if let Some(keyword) = keyword {
            if matches!(self.lexer.peek_significant(), (Some(':'), next) if next != Some(':')) {
                self.advance()?;
                return Ok(Expr::Identifier(keyword));
            }
        }

        self.parse_statement()
    }

    fn finish_entry(&mut self, head: Expr, next_index: &mut usize) -> Result<Entry> {
        if self.match_punctuator(":")? {
            let key = match head {
                Expr::Identifier(name) => Expr::string(name),
                other => other,
            };
            let value = self.parse_statement()?;
            return Ok(Entry { positional: false, key, value });
        }

        let key = Expr::number(*next_index as f64);
        *next_index += 1;
        Ok(Entry { positional: true, key, value: head })
    }

    fn parse_pattern(&mut self) -> Result<Pattern> {
        let token = self.advance()?;

        match &token.token_type {
            TokenType::Identifier(name) => Ok(Pattern::Name(name.clone())),
            TokenType::GroupOpen('(') => {
                let mut names = Vec::new();
                while !self.match_close(')')? {
                    if !names.is_empty() {
                        self.expect_punctuator(",")?;
                        if self.match_close(')')? {
                            break;
                        }
                    }
                    names.push(self.expect_identifier()?);
                }
                Ok(Pattern::Tuple(names))
            }
            TokenType::GroupOpen(open) => {
                let fields = self.parse_pattern_fields(*open)?;
                if *open == '[' {
                    Ok(Pattern::Array(fields))
                } else {
                    Ok(Pattern::Object(fields))
                }
            }
            _ => unexpected(&token),
        }
    }

    fn parse_pattern_fields(&mut self, open: char) -> Result<Vec<PatternField>> {
        let close = closing(open);
        let mut fields = Vec::new();

        while !self.match_close(close)? {
            if !fields.is_empty() {
                self.expect_punctuator(",")?;
                if self.match_close(close)? {
                    break;
                }
            }
            let index = fields.len();
            fields.push(self.parse_pattern_field(open, index)?);
        }

        Ok(fields)
    }

    fn parse_pattern_field(&mut self, open: char, index: usize) -> Result<PatternField> {
        let position = self.current.position;
        let explicit = match &self.current.token_type {
            TokenType::Number(n) if *n >= 0.0 => Some(PatternKey::Index(*n as usize)),
            TokenType::String(s) => Some(PatternKey::Name(s.clone())),
            _ => None,
        };

        let (key, target) = match explicit {
            Some(key) => {
                self.advance()?;
                self.expect_punctuator(":")?;
                (key, self.parse_pattern()?)
            }
            None => {
                let target = self.parse_pattern()?;
                if self.match_punctuator(":")? {
                    match target {
                        Pattern::Name(name) => (PatternKey::Name(name), self.parse_pattern()?),
                        _ => return syntax_error!("Property name in a pattern must be a plain name", position),
                    }
                } else if open == '[' {
                    (PatternKey::Index(index), target)
                } else {
                    match &target {
                        Pattern::Name(name) => (PatternKey::Name(name.clone()), target),
                        _ => return syntax_error!("Nested object pattern needs a property name", position),
                    }
                }
            }
        };

        let default = if self.match_punctuator("=")? {
            Some(self.parse_statement()?)
        } else {
            None
        };

        Ok(PatternField { key, target, default })
    }

    fn parse_declaration(&mut self, kind: &str) -> Result<Expr> {
        let mut bindings = Vec::new();

        loop {
            let pattern = self.parse_pattern()?;
            let init = if self.match_punctuator("=")? {
                Some(self.parse_statement()?)
            } else {
                None
            };
            bindings.push(Binding { pattern, init });

            if !self.match_punctuator(",")? {
                break;
            }
        }

        Ok(Expr::VariableDeclaration { bindings, kind: kind.to_string() })
    }

    /// `let [name] (params) body`. The name may be an identifier, an operator
    /// or one of the bracket overloads `[]` and `{}`.
    fn parse_function(&mut self) -> Result<Expr> {
        let (name, params) = match self.current.token_type.clone() {
            TokenType::Identifier(name) | TokenType::Punctuator(name) => {
                self.advance()?;
                (Some(name), self.parse_parameter_group()?)
            }
            TokenType::GroupOpen(open) if open != '(' => {
                self.advance()?;
                let close = closing(open);
                if self.match_close(close)? {
                    (Some(format!("{}{}", open, close)), self.parse_parameter_group()?)
                } else {
                    (None, self.parse_parameter_list(close)?)
                }
            }
            TokenType::GroupOpen(_) => (None, self.parse_parameter_group()?),
            _ => return unexpected(&self.current),
        };

        let body = self.parse_statement()?;
        Ok(Expr::function(name, params, body))
    }

    fn parse_parameter_group(&mut self) -> Result<Vec<Parameter>> {
        match self.current.token_type {
            TokenType::GroupOpen(open) => {
                self.advance()?;
                self.parse_parameter_list(closing(open))
            }
            _ => self.fail_expected("a parameter list"),
        }
    }

    fn parse_parameter_list(&mut self, close: char) -> Result<Vec<Parameter>> {
        let mut params = Vec::new();

        while !self.match_close(close)? {
            if !params.is_empty() {
                self.expect_punctuator(",")?;
                if self.match_close(close)? {
                    break;
                }
            }
            let pattern = self.parse_pattern()?;
            let default = if self.match_punctuator("=")? {
                Some(self.parse_statement()?)
            } else {
                None
            };
            params.push(Parameter { pattern, default });
        }

        Ok(params)
    }

    fn parse_if(&mut self) -> Result<Expr> {
        let mut clauses = Vec::new();

        loop {
            let test = self.parse_head()?;
            let body = self.parse_statement()?;
            clauses.push(IfClause { test, body });

            if !self.match_keyword("else")? {
                return Ok(Expr::If { clauses, otherwise: None });
            }
            if !self.match_keyword("if")? {
                let otherwise = Some(Box::new(self.parse_statement()?));
                return Ok(Expr::If { clauses, otherwise });
            }
        }
    }

    fn parse_while(&mut self) -> Result<Expr> {
        let label = self.parse_loop_label()?;
        let test = Box::new(self.parse_head()?);
        let body = Box::new(self.parse_statement()?);
        let otherwise = self.parse_else()?;
        Ok(Expr::While { label, test, body, otherwise })
    }

    fn parse_for(&mut self) -> Result<Expr> {
        let label = self.parse_loop_label()?;
        let head = Box::new(self.parse_head()?);
        let body = Box::new(self.parse_statement()?);
        let otherwise = self.parse_else()?;
        Ok(Expr::For { label, head, body, otherwise })
    }

    fn parse_do(&mut self) -> Result<Expr> {
        let body = self.parse_statement()?;

        let while_loop = if self.match_keyword("while")? {
            let test = Box::new(self.parse_head()?);
            let otherwise = self.parse_else()?;
            Some(Box::new(Expr::While {
                label: None,
                test,
                body: Box::new(body.clone()),
                otherwise,
            }))
        } else {
            None
        };

        Ok(Expr::Do { body: Box::new(body), while_loop })
    }

    fn parse_case(&mut self) -> Result<Expr> {
        let value = Box::new(self.parse_head()?);
        let mut cases = Vec::new();

        while self.match_keyword("when")? {
            let test = self.parse_head()?;
            let body = self.parse_statement()?;
            cases.push(Case { test: Some(test), body });
        }
        if self.match_keyword("else")? {
            let body = self.parse_statement()?;
            cases.push(Case { test: None, body });
        }

        Ok(Expr::Switch { value, cases })
    }

    fn parse_with(&mut self) -> Result<Expr> {
        let subject = Box::new(self.parse_head()?);
        let body = Box::new(self.parse_statement()?);
        let otherwise = self.parse_else()?;
        Ok(Expr::With { subject, body, otherwise })
    }

    fn parse_new(&mut self) -> Result<Expr> {
        let prototype = Box::new(self.parse_atom()?);

        let args = match self.current.token_type {
            TokenType::GroupOpen(open) => {
                self.advance()?;
                self.parse_entry_list(closing(open), None)?
            }
            _ => Vec::new(),
        };

        Ok(Expr::New { prototype, args })
    }

    fn parse_proto(&mut self) -> Result<Expr> {
        let name = match self.current.token_type {
            TokenType::Identifier(_) => Some(self.expect_identifier()?),
            _ => None,
        };
        let body = Box::new(self.parse_statement()?);
        Ok(Expr::Prototype { name, body })
    }

    fn parse_export(&mut self) -> Result<Expr> {
        let value = self.parse_statement()?;

        let name = match &value {
            Expr::IdentAssign { name, .. } => Some(name.clone()),
            Expr::Function(def) => def.name.clone(),
            Expr::Prototype { name, .. } => name.clone(),
            Expr::VariableDeclaration { bindings, .. } => match bindings.as_slice() {
                [Binding { pattern: Pattern::Name(name), .. }] => Some(name.clone()),
                _ => None,
            },
            _ => None,
        };

        Ok(Expr::Export { name, value: Box::new(value) })
    }
}

pub fn parse(input: &str) -> Result<Expr> {
    debug!("Parsing {} bytes of source", input.len());

    let result = Parser::new(input).and_then(|mut parser| parser.parse_script());

    match result {
        Ok(ast) => {
            if let Expr::Group(elements) = &ast {
                debug!("Parsed {} top-level expressions", elements.len());
            }
            Ok(ast)
        }
        Err(e) => {
            debug!("Parse failed: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::error::ErrorKind;

    fn parse_one(source: &str) -> Expr {
        match parse(source).expect("source should parse") {
            Expr::Group(mut elements) => {
                assert_eq!(elements.len(), 1, "expected one top-level expression in {:?}", source);
                elements.remove(0)
            }
            other => panic!("root is not a group: {:?}", other),
        }
    }

    fn syntax_error(source: &str) -> crate::language::error::Error {
        parse(source).expect_err("source should not parse")
    }

    fn ident(name: &str) -> Expr {
        Expr::ident(name)
    }

    fn positional(values: Vec<Expr>) -> Vec<Entry> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Entry { positional: true, key: Expr::number(i as f64), value })
            .collect()
    }

    #[test]
    fn multiplication_before_addition() {
        assert_eq!(
            parse_one("1 + 2 * 3"),
            Expr::binary("+", Expr::number(1.0), Expr::binary("*", Expr::number(2.0), Expr::number(3.0)))
        );
    }

    #[test]
    fn associativity() {
        assert_eq!(
            parse_one("a - b - c"),
            Expr::binary("-", Expr::binary("-", ident("a"), ident("b")), ident("c"))
        );
        assert_eq!(
            parse_one("a ** b ** c"),
            Expr::binary("**", ident("a"), Expr::binary("**", ident("b"), ident("c")))
        );
    }

    #[test]
    fn chained_calls() {
        let inner = Expr::Call {
            kind: CallKind::Paren,
            callee: Box::new(ident("a")),
            args: positional(vec![ident("b")]),
        };
        assert_eq!(
            parse_one("a(b)(c)"),
            Expr::Call { kind: CallKind::Paren, callee: Box::new(inner), args: positional(vec![ident("c")]) }
        );
    }

    #[test]
    fn method_call_and_named_arguments() {
        match parse_one("o.f(1, b: 2)") {
            Expr::MethodCall { receiver, key, args } => {
                assert_eq!(*receiver, ident("o"));
                assert_eq!(*key, ident("f"));
                assert_eq!(args.len(), 2);
                assert!(args[0].positional);
                assert_eq!(args[1].key, Expr::string("b"));
                assert!(!args[1].positional);
            }
            other => panic!("not a method call: {:?}", other),
        }
    }

    #[test]
    fn keyword_after_dot_is_a_name() {
        assert_eq!(
            parse_one("p.new"),
            Expr::Access { object: Box::new(ident("p")), key: Box::new(ident("new")) }
        );
    }

    #[test]
    fn assignment_targets() {
        assert!(matches!(parse_one("x = y = 3"), Expr::IdentAssign { .. }));
        assert!(matches!(parse_one("o.x = 5"), Expr::AccessAssign { .. }));
        assert!(matches!(parse_one("a[0] = 9"), Expr::CallAssign { kind: CallKind::Bracket, .. }));

        assert_eq!(syntax_error("f(1) = 2").kind, ErrorKind::Syntax);
        assert_eq!(syntax_error("1 = 2").kind, ErrorKind::Syntax);
    }

    #[test]
    fn groups_collapse() {
        assert_eq!(parse_one("()"), Expr::nil());
        assert_eq!(parse_one("(1)"), Expr::number(1.0));
        assert_eq!(parse_one("(1;)"), Expr::number(1.0));
        assert_eq!(
            parse_one("(1;;2)"),
            Expr::Group(vec![Expr::number(1.0), Expr::nil(), Expr::number(2.0)])
        );
        assert_eq!(parse_one("{1; 2}"), Expr::Group(vec![Expr::number(1.0), Expr::number(2.0)]));
    }

    #[test]
    fn script_root_stays_a_group() {
        assert_eq!(parse("42").unwrap(), Expr::Group(vec![Expr::number(42.0)]));
        assert_eq!(parse("").unwrap(), Expr::Group(vec![]));
    }

    #[test]
    fn collections() {
        assert_eq!(
            parse_one("{1, 2, 3}"),
            Expr::Object(positional(vec![Expr::number(1.0), Expr::number(2.0), Expr::number(3.0)]))
        );

        match parse_one("{a: 1, b: 2}") {
            Expr::Object(entries) => {
                let keys: Vec<_> = entries.iter().map(|e| e.key.clone()).collect();
                assert_eq!(keys, vec![Expr::string("a"), Expr::string("b")]);
            }
            other => panic!("not an object: {:?}", other),
        }

        assert_eq!(parse_one("[1, 2]"), Expr::Array(vec![Expr::number(1.0), Expr::number(2.0)]));
        assert_eq!(parse_one("[1,]"), Expr::Array(vec![Expr::number(1.0)]));
        assert!(matches!(parse_one("[1, a: 2]"), Expr::Object(_)));
    }

    #[test]
    fn positional_keys_skip_named_entries() {
        match parse_one("{x: 0, 10, y: 1, 20}") {
            Expr::Object(entries) => {
                assert_eq!(entries[1].key, Expr::number(0.0));
                assert_eq!(entries[3].key, Expr::number(1.0));
            }
            other => panic!("not an object: {:?}", other),
        }
    }

    #[test]
    fn keyword_keys() {
        match parse_one("{new: 1, if: 2}") {
            Expr::Object(entries) => {
                assert_eq!(entries[0].key, Expr::string("new"));
                assert_eq!(entries[1].key, Expr::string("if"));
            }
            other => panic!("not an object: {:?}", other),
        }
    }

    #[test]
    fn mismatched_closer() {
        let err = syntax_error("(1]");
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.column, Some(3));
    }

    #[test]
    fn scan_errors_pass_through() {
        assert_eq!(syntax_error("\"open").kind, ErrorKind::Scan);
    }

    #[test]
    fn unexpected_end() {
        let err = syntax_error("1 +");
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert!(err.message.starts_with("Unexpected"));
    }

    #[test]
    fn if_else_chain() {
        match parse_one("if (a) 1 else if (b) 2 else 3") {
            Expr::If { clauses, otherwise } => {
                assert_eq!(clauses.len(), 2);
                assert_eq!(clauses[1].test, ident("b"));
                assert_eq!(otherwise.as_deref(), Some(&Expr::number(3.0)));
            }
            other => panic!("not an if: {:?}", other),
        }
    }

    #[test]
    fn do_while_shares_its_body() {
        match parse_one("do x while (y)") {
            Expr::Do { body, while_loop: Some(while_loop) } => {
                assert_eq!(*body, ident("x"));
                match *while_loop {
                    Expr::While { test, body, .. } => {
                        assert_eq!(*test, ident("y"));
                        assert_eq!(*body, ident("x"));
                    }
                    other => panic!("not a while: {:?}", other),
                }
            }
            other => panic!("not a do: {:?}", other),
        }
    }

    #[test]
    fn labelled_loops() {
        match parse_one("while as outer (true) break outer") {
            Expr::While { label, body, .. } => {
                assert_eq!(label.as_deref(), Some("outer"));
                assert_eq!(*body, Expr::Break(Some("outer".into())));
            }
            other => panic!("not a while: {:?}", other),
        }
    }

    #[test]
    fn for_heads() {
        match parse_one("for (var x in xs) x") {
            Expr::For { head, .. } => {
                assert!(matches!(*head, Expr::Binary { ref op, ref left, .. }
                    if op == "in" && matches!(**left, Expr::VariableDeclaration { .. })));
            }
            other => panic!("not a for: {:?}", other),
        }
        match parse_one("for (var i = 0; i < 3; i = i + 1) i") {
            Expr::For { head, .. } => assert!(matches!(*head, Expr::Group(ref parts) if parts.len() == 3)),
            other => panic!("not a for: {:?}", other),
        }
    }

    #[test]
    fn switch_cases() {
        match parse_one("case (v) when (1) a when (2) b else c") {
            Expr::Switch { cases, .. } => {
                assert_eq!(cases.len(), 3);
                assert!(cases[2].test.is_none());
            }
            other => panic!("not a switch: {:?}", other),
        }
    }

    #[test]
    fn functions() {
        match parse_one("let add(a, b = 2) a + b") {
            Expr::Function(def) => {
                assert_eq!(def.name.as_deref(), Some("add"));
                assert_eq!(def.params.len(), 2);
                assert_eq!(def.params[1].default, Some(Expr::number(2.0)));
                assert!(matches!(def.body, Expr::Return(Some(_))));
                assert_eq!(*def.written_body(), Expr::binary("+", ident("a"), ident("b")));
            }
            other => panic!("not a function: {:?}", other),
        }
        match parse_one("let +(a, b) a") {
            Expr::Function(def) => assert_eq!(def.name.as_deref(), Some("+")),
            other => panic!("not a function: {:?}", other),
        }
        match parse_one("let [](i) i") {
            Expr::Function(def) => assert_eq!(def.name.as_deref(), Some("[]")),
            other => panic!("not a function: {:?}", other),
        }
        match parse_one("let [x, y] x") {
            Expr::Function(def) => {
                assert_eq!(def.name, None);
                assert_eq!(def.params.len(), 2);
            }
            other => panic!("not a function: {:?}", other),
        }
    }

    #[test]
    fn destructuring_patterns() {
        match parse_one("var [a, b = 1] = xs, {x, y: [z]} = o") {
            Expr::VariableDeclaration { bindings, kind } => {
                assert_eq!(kind, "var");
                assert_eq!(bindings.len(), 2);
                match &bindings[0].pattern {
                    Pattern::Array(fields) => {
                        assert_eq!(fields[1].key, PatternKey::Index(1));
                        assert_eq!(fields[1].default, Some(Expr::number(1.0)));
                    }
                    other => panic!("not an array pattern: {:?}", other),
                }
                match &bindings[1].pattern {
                    Pattern::Object(fields) => {
                        assert_eq!(fields[0].key, PatternKey::Name("x".into()));
                        assert_eq!(fields[1].key, PatternKey::Name("y".into()));
                        assert!(matches!(fields[1].target, Pattern::Array(_)));
                    }
                    other => panic!("not an object pattern: {:?}", other),
                }
            }
            other => panic!("not a declaration: {:?}", other),
        }
        assert!(matches!(
            parse_one("def (a, b) = t"),
            Expr::VariableDeclaration { ref bindings, .. } if bindings[0].pattern == Pattern::Tuple(vec!["a".into(), "b".into()])
        ));
    }

    #[test]
    fn global_lookup_binds_to_a_name() {
        let call = parse_one("::print(1)");
        match call {
            Expr::Call { callee, .. } => assert!(matches!(*callee, Expr::Unary { ref op, .. } if op == "::")),
            other => panic!("not a call: {:?}", other),
        }
    }

    #[test]
    fn jumps() {
        assert_eq!(parse_one("return"), Expr::Return(None));
        assert_eq!(parse_one("(return)"), Expr::Return(None));
        assert!(matches!(parse_one("yield* xs"), Expr::Yield { delegate: true, argument: Some(_) }));
        assert!(matches!(parse_one("fail 1"), Expr::Fail(_)));
        assert_eq!(parse_one("continue"), Expr::Continue(None));
    }

    #[test]
    fn export_names() {
        assert!(matches!(parse_one("export x = 1"), Expr::Export { name: Some(ref n), .. } if n == "x"));
        assert!(matches!(parse_one("export let f() 1"), Expr::Export { name: Some(ref n), .. } if n == "f"));
        assert!(matches!(parse_one("export 1"), Expr::Export { name: None, .. }));
    }

    #[test]
    fn new_and_proto() {
        assert!(matches!(parse_one("new Point(1, 2)"), Expr::New { ref args, .. } if args.len() == 2));
        assert!(matches!(parse_one("new Point"), Expr::New { ref args, .. } if args.is_empty()));
        assert!(matches!(parse_one("proto Point {x: 0}"), Expr::Prototype { name: Some(_), .. }));
    }

    #[test]
    fn juxtaposed_statements() {
        assert_eq!(
            parse("a; b c").unwrap(),
            Expr::Group(vec![ident("a"), ident("b"), ident("c")])
        );
    }
}
