//! Program text parser
//!
//! Programs are written as comma-separated signed decimal integers:
//!
//! ```text
//! 1002,4,3,4,33
//! ```
//!
//! Whitespace around each literal is ignored, as is a single trailing comma or
//! newline. Literals may have any number of digits.

use crate::interpreter::errors::MachineError;
use crate::memory::Cell;

/// Parse program text into an initial tape
pub fn parse_program(text: &str) -> Result<Vec<Cell>, MachineError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let body = trimmed.strip_suffix(',').unwrap_or(trimmed);

    body.split(',')
        .enumerate()
        .map(|(index, token)| parse_literal(token.trim(), index))
        .collect()
}

/// Parse one integer literal; `index` is its position for error reporting
pub fn parse_literal(token: &str, index: usize) -> Result<Cell, MachineError> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MachineError::MalformedLiteral {
            token: token.to_string(),
            index,
        });
    }
    token.parse().map_err(|_| MachineError::MalformedLiteral {
        token: token.to_string(),
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::cells;

    #[test]
    fn test_parse_simple() {
        let program = parse_program("1,9,10,3,2,3,11,0,99,30,40,50").expect("parse failed");
        assert_eq!(program, cells([1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50]));
    }

    #[test]
    fn test_parse_whitespace_and_trailing_newline() {
        let program = parse_program(" 1002, 4 ,3,\n4,33\n").expect("parse failed");
        assert_eq!(program, cells([1002, 4, 3, 4, 33]));

        let program = parse_program("104,-7,99,\n").expect("parse failed");
        assert_eq!(program, cells([104, -7, 99]));
    }

    #[test]
    fn test_parse_big_literal() {
        let program = parse_program("104,1125899906842624000000,99").expect("parse failed");
        assert_eq!(
            program[1],
            "1125899906842624000000".parse::<Cell>().unwrap()
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_program("").unwrap().is_empty());
        assert!(parse_program("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_literal() {
        assert_eq!(
            parse_program("1,2,x3,4"),
            Err(MachineError::MalformedLiteral {
                token: "x3".to_string(),
                index: 2,
            })
        );
        assert!(matches!(
            parse_program("1,,2"),
            Err(MachineError::MalformedLiteral { index: 1, .. })
        ));
        assert!(matches!(
            parse_program("+5"),
            Err(MachineError::MalformedLiteral { index: 0, .. })
        ));
        assert!(matches!(
            parse_program("-"),
            Err(MachineError::MalformedLiteral { index: 0, .. })
        ));
    }
}
