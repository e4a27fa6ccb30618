use std::collections::HashMap;
use lazy_static::lazy_static;

/// Precedence statements are parsed at; keeps `;` from binding inside one.
pub const STATEMENT: u8 = 0x01;

/// Precedence shared by the call brackets and the `::` prefix.
pub const CALL: u8 = 0xa0;

const RIGHT_ASSOCIATIVE: &[&str] = &[";", "=", "**", "(", "[", "{"];

lazy_static! {
    static ref BINARY_OPERATORS: HashMap<&'static str, u8> = {
        let mut table = HashMap::new();
        table.insert(";", 0x00);
        table.insert("=", 0x01);
        table.insert("|>", 0x08);
        for op in ["or", "||"] {
            table.insert(op, 0x10);
        }
        for op in ["and", "&&"] {
            table.insert(op, 0x11);
        }
        for op in ["<", "<=", ">", ">=", "==", "!=", "is", "in"] {
            table.insert(op, 0x20);
        }
        table.insert("|", 0x24);
        table.insert("^", 0x25);
        table.insert("&", 0x26);
        for op in ["<<", ">>", ">>>"] {
            table.insert(op, 0x28);
        }
        for op in ["+", "-"] {
            table.insert(op, 0x30);
        }
        for op in ["*", "/", "%", "//"] {
            table.insert(op, 0x31);
        }
        table.insert("**", 0x32);
        for op in ["(", "[", "{"] {
            table.insert(op, CALL);
        }
        table.insert(".", 0xb1);
        table
    };

    static ref UNARY_OPERATORS: HashMap<&'static str, u8> = {
        let mut table = HashMap::new();
        table.insert("+", 0x40);
        table.insert("-", 0x40);
        table.insert("!", 0x41);
        table.insert("not", 0x41);
        table.insert("~", 0x41);
        table.insert("::", CALL);
        table
    };
}

pub fn binary_precedence(op: &str) -> Option<u8> {
    BINARY_OPERATORS.get(op).copied()
}

pub fn unary_precedence(op: &str) -> Option<u8> {
    UNARY_OPERATORS.get(op).copied()
}

pub fn is_right_associative(op: &str) -> bool {
    RIGHT_ASSOCIATIVE.contains(&op)
}

/// Precedence for the right operand of `op`.
pub fn operand_precedence(op: &str, precedence: u8) -> u8 {
    if is_right_associative(op) {
        precedence
    } else {
        precedence + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert!(binary_precedence("*") > binary_precedence("+"));
        assert!(binary_precedence("+") > binary_precedence("=="));
        assert!(binary_precedence("and") > binary_precedence("or"));
    }

    #[test]
    fn statements_exclude_semicolon() {
        assert!(binary_precedence(";").is_some_and(|p| p < STATEMENT));
        assert_eq!(binary_precedence("="), Some(STATEMENT));
    }

    #[test]
    fn associativity() {
        assert_eq!(operand_precedence("**", 0x32), 0x32);
        assert_eq!(operand_precedence("-", 0x30), 0x31);
        assert!(is_right_associative("="));
        assert!(!is_right_associative("."));
    }

    #[test]
    fn unary_table() {
        assert_eq!(unary_precedence("not"), Some(0x41));
        assert_eq!(unary_precedence("::"), Some(CALL));
        assert_eq!(unary_precedence("*"), None);
    }
}
