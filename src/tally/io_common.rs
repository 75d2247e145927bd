use std::path::Path;

use round_tally::Cell;

/// The file name of a path, used as the default display name of a table.
pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Removes the byte order mark that spreadsheet exports put in front of the
/// first header.
pub fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{feff}').unwrap_or(s)
}

pub fn text_cell(s: &str) -> Cell {
    if s.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("data/x/votes_2023_season.csv"), "votes_2023_season.csv");
        assert_eq!(simplify_file_name("votes.csv"), "votes.csv");
    }

    #[test]
    fn bom() {
        assert_eq!(strip_bom("\u{feff}序号"), "序号");
        assert_eq!(strip_bom("序号"), "序号");
    }
}
