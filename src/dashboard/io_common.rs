use std::path::Path;

use feedback_tally::mapper::RawRow;

/// The file name of a path, used to label the records and the reports.
pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Builds a row from the header and the cells of one line.
///
/// Extra cells without a header are ignored, missing cells are absent from the row. When a
/// header is repeated, the first column with that name is kept.
pub fn assemble_row<'a, H, C>(header: H, cells: C) -> RawRow
where
    H: IntoIterator<Item = &'a Option<String>>,
    C: IntoIterator<Item = String>,
{
    let mut row = RawRow::new();
    for (h, c) in header.into_iter().zip(cells) {
        if let Some(h) = h {
            row.entry(h.clone()).or_insert(c);
        }
    }
    row
}

/// Progress of a batch, as a percentage.
pub fn progress_percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        (completed as f64 / total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(
            simplify_file_name(Path::new("/tmp/uploads/march.csv")),
            "march.csv"
        );
        assert_eq!(simplify_file_name(Path::new("march.csv")), "march.csv");
    }

    #[test]
    fn rows_skip_unnamed_columns() {
        let header = vec![Some("a".to_string()), None, Some("c".to_string())];
        let row = assemble_row(
            header.iter(),
            vec!["1".to_string(), "2".to_string()],
        );
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("a").map(|s| s.as_str()), Some("1"));
        assert!(row.get("c").is_none());
    }

    #[test]
    fn repeated_header_keeps_the_first_column() {
        let header = vec![
            Some("Name and Employee ID".to_string()),
            Some("Note".to_string()),
            Some("Name and Employee ID".to_string()),
        ];
        let row = assemble_row(
            header.iter(),
            vec!["Asha".to_string(), "ok".to_string(), "".to_string()],
        );
        assert_eq!(row.len(), 2);
        assert_eq!(
            row.get("Name and Employee ID").map(|s| s.as_str()),
            Some("Asha")
        );
    }

    #[test]
    fn progress() {
        assert_eq!(progress_percent(1, 4), 25.0);
        assert_eq!(progress_percent(0, 0), 100.0);
    }
}
