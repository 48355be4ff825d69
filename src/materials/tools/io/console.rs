use crate::materials::tools::matrix::ComparisonMatrix;

/// Narrowest width of a value column.
pub const MIN_COLUMN_WIDTH: usize = 20;

/// Draws the matrix as a box-drawn table. The first column is left-justified
/// and as wide as its longest entry; every other column is centered.
pub fn render_console(matrix: &ComparisonMatrix) -> String {
    let header = matrix.header();
    if header.is_empty() {
        return String::new();
    }

    let widths = column_widths(matrix);
    let mut out = String::new();

    out.push_str(&border(&widths, '┌', '┬', '┐'));
    out.push_str(&row_line(header, &widths));
    out.push_str(&border(&widths, '├', '┼', '┤'));

    let rows = matrix.rows();
    for (index, row) in rows.iter().enumerate() {
        out.push_str(&row_line(row, &widths));
        if index + 1 < rows.len() {
            out.push_str(&border(&widths, '├', '┼', '┤'));
        }
    }

    out.push_str(&border(&widths, '└', '┴', '┘'));
    out
}

/// Label column: longest entry. Value columns: at least
/// [`MIN_COLUMN_WIDTH`], two wider than the caption, never narrower than a cell.
pub fn column_widths(matrix: &ComparisonMatrix) -> Vec<usize> {
    let header = matrix.header();
    let rows = matrix.rows();

    header
        .iter()
        .enumerate()
        .map(|(column, caption)| {
            let longest_cell = rows
                .iter()
                .filter_map(|row| row.get(column))
                .map(|cell| display_width(cell))
                .max()
                .unwrap_or(0);
            if column == 0 {
                display_width(caption).max(longest_cell)
            } else {
                MIN_COLUMN_WIDTH
                    .max(display_width(caption) + 2)
                    .max(longest_cell)
            }
        })
        .collect()
}

fn border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|width| "─".repeat(*width)).collect();
    format!("{left}{}{right}\n", segments.join(&middle.to_string()))
}

fn row_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("│");
    for (column, width) in widths.iter().enumerate() {
        let cell = cells.get(column).map(String::as_str).unwrap_or("");
        if column == 0 {
            line.push_str(&left_justify(cell, *width));
        } else {
            line.push_str(&center(cell, *width));
        }
        line.push('│');
    }
    line.push('\n');
    line
}

fn display_width(text: &str) -> usize {
    text.chars().count()
}

fn left_justify(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(pad))
}

/// An odd margin puts the extra space on the left only when `width` is odd.
fn center(text: &str, width: usize) -> String {
    let margin = width.saturating_sub(display_width(text));
    let left = margin / 2 + (margin & width & 1);
    let right = margin - left;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}
