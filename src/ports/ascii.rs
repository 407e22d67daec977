//! ASCII conversions
//!
//! Many programs talk in text: each output cell is a character code and each
//! input line is sent one character at a time, terminated by a newline (10).
//! Values outside the ASCII range are not characters; programs use them to
//! report a final numeric answer, so they are rendered in decimal.

use crate::memory::value::as_ascii;
use crate::memory::Cell;

/// Encode `line` as input cells, appending the terminating newline
pub fn encode_line(line: &str) -> Vec<Cell> {
    line.trim_end_matches(['\r', '\n'])
        .bytes()
        .chain(std::iter::once(b'\n'))
        .map(Cell::from)
        .collect()
}

/// Render a single output cell
pub fn render(value: &Cell) -> String {
    match as_ascii(value) {
        Some(c) => c.to_string(),
        None => format!("{}\n", value),
    }
}

/// Render a run of output cells
pub fn render_all<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a Cell>,
{
    values.into_iter().map(render).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::{cell, cells};

    #[test]
    fn test_encode_line() {
        assert_eq!(encode_line("NOT A J"), cells([78, 79, 84, 32, 65, 32, 74, 10]));
        assert_eq!(encode_line("go\r\n"), cells([103, 111, 10]));
        assert_eq!(encode_line(""), cells([10]));
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&cell(35)), "#");
        assert_eq!(render(&cell(10)), "\n");
        assert_eq!(render(&cell(19357180)), "19357180\n");
        assert_eq!(render(&cell(-5)), "-5\n");
        assert_eq!(render_all(&cells([72, 105, 10])), "Hi\n");
    }
}
