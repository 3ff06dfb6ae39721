use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::error::LibraryError;

/// Pad or cut `text` to exactly `width` characters so table columns line up.
pub(crate) fn fit(text: &str, width: usize) -> String {
    let mut cell: String = text.chars().take(width).collect();
    let len = cell.chars().count();
    if len < width {
        cell.push_str(&" ".repeat(width - len));
    }
    cell
}

/// Lay out one table row from `(text, width)` pairs separated by a space.
pub(crate) fn columns(cells: &[(&str, usize)]) -> String {
    let row: Vec<String> = cells.iter().map(|(text, width)| fit(text, *width)).collect();
    row.join(" ").trim_end().to_string()
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Human-readable message for an operation failure. Storage errors show their
/// whole context chain so the offending file and row stay visible.
pub(crate) fn surface_error(err: &LibraryError) -> String {
    match err {
        LibraryError::Storage(inner) => format!("{inner:#}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_pads_and_truncates_by_characters() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("Füße und Hände", 4), "Füße");
        assert_eq!(fit("", 0), "");
    }

    #[test]
    fn columns_trim_trailing_padding() {
        assert_eq!(columns(&[("1", 5), ("Dune", 6)]), "1     Dune");
    }

    #[test]
    fn storage_errors_keep_their_context() {
        let err = LibraryError::Storage(
            anyhow::anyhow!("entry '4:x' has an invalid borrow date")
                .context("member '2' has a malformed borrowed_books list"),
        );
        assert_eq!(
            surface_error(&err),
            "member '2' has a malformed borrowed_books list: entry '4:x' has an invalid borrow date"
        );
    }
}
