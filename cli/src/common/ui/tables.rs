//! Aligned, boxed text tables.
//!
//! ```text
//! +-----------+-------+
//! | Field     | Value |
//! +-----------+-------+
//! | Type      | native|
//! ...
//! ```

/// Render `rows` under `headers` as a boxed ASCII table. Column widths are
/// measured in characters; short rows are padded with empty cells.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return String::new();
    }

    let mut widths = vec![0usize; columns];
    for (i, header) in headers.iter().enumerate() {
        widths[i] = widths[i].max(header.chars().count());
    }
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let separator = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };

    let mut out = String::new();
    out.push_str(&separator);
    out.push('\n');
    if !headers.is_empty() {
        out.push_str(&render_row(headers.iter().copied(), &widths));
        out.push('\n');
        out.push_str(&separator);
        out.push('\n');
    }
    for row in rows {
        out.push_str(&render_row(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out.push_str(&separator);
    out
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut cells = cells;
    let mut line = String::from("|");
    for width in widths {
        let cell = cells.next().unwrap_or("");
        let pad = width - cell.chars().count();
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(pad + 1));
        line.push('|');
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_table() {
        let table = render_table(
            &["Field", "Value"],
            &[
                vec!["Type".to_string(), "native".to_string()],
                vec!["Result".to_string(), "4950".to_string()],
            ],
        );
        let expected = "\
+--------+--------+
| Field  | Value  |
+--------+--------+
| Type   | native |
| Result | 4950   |
+--------+--------+";
        assert_eq!(table, expected);
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let table = render_table(&["A"], &[vec!["x".to_string(), "yy".to_string()]]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[1], "| A |    |");
        assert_eq!(lines[3], "| x | yy |");
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(render_table(&[], &[]), "");
    }
}
