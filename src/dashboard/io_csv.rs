// Primitives for reading CSV survey exports.

use feedback_tally::mapper::RawRow;

use crate::dashboard::{io_common::assemble_row, *};

/// The 1-based line on which the record starting at `byte` begins.
///
/// The reader reports the offset before the line breaks it skipped, so these are jumped over
/// first. Counting `\n` gives the same line for LF and CRLF exports.
fn physical_line(text: &str, byte: usize) -> usize {
    let bytes = text.as_bytes();
    let mut start = byte.min(bytes.len());
    while start < bytes.len() && (bytes[start] == b'\n' || bytes[start] == b'\r') {
        start += 1;
    }
    bytes[..start].iter().filter(|b| **b == b'\n').count() + 1
}

/// Reads a CSV export held in memory.
///
/// The first line is the header. Returns the rows along with their line number in the
/// source (the header is line 1). Empty lines are skipped.
pub fn read_csv_text(text: &str, label: &str) -> DashboardResult<Vec<(usize, RawRow)>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let header: Vec<Option<String>> = rdr
        .headers()
        .context(CsvParseSnafu { path: label })?
        .iter()
        .map(|h| Some(h.to_string()))
        .collect();
    debug!("read_csv_text: {}: header: {:?}", label, header);

    let mut res: Vec<(usize, RawRow)> = Vec::new();
    for (idx, record_r) in rdr.records().enumerate() {
        let record = record_r.context(CsvParseSnafu { path: label })?;
        let lineno = record
            .position()
            .map(|p| physical_line(text, p.byte() as usize))
            .unwrap_or(idx + 2);
        let row = assemble_row(header.iter(), record.iter().map(|s| s.to_string()));
        debug!("read_csv_text: {}: lineno: {:?} row: {:?}", label, lineno, row);
        res.push((lineno, row));
    }
    info!("Parsed {} with {} rows", label, res.len());
    Ok(res)
}

pub fn read_csv_file(path: &Path) -> DashboardResult<Vec<(usize, RawRow)>> {
    let label = path.display().to_string();
    info!("Attempting to read CSV file {:?}", label);
    let text = fs::read_to_string(path).context(OpeningFileSnafu { path: label.clone() })?;
    read_csv_text(&text, &label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_quoted_headers_and_skips_blank_lines() {
        let text = "Name and Employee ID,\"Help, quickly?\",Are you comfortable with the current clinic timings? \n\
                    Asha,Yes,No\n\
                    \n\
                    \"Doe, Jane\",\"Sometimes\",\n";
        let rows = read_csv_text(text, "t.csv").unwrap();
        assert_eq!(rows.len(), 2);
        let (line, first) = &rows[0];
        assert_eq!(*line, 2);
        assert_eq!(first.get("Help, quickly?").map(|s| s.as_str()), Some("Yes"));
        assert_eq!(
            first
                .get("Are you comfortable with the current clinic timings? ")
                .map(|s| s.as_str()),
            Some("No")
        );
        let (line, second) = &rows[1];
        assert_eq!(*line, 4);
        assert_eq!(
            second.get("Name and Employee ID").map(|s| s.as_str()),
            Some("Doe, Jane")
        );
    }

    #[test]
    fn line_numbers_do_not_depend_on_line_endings() {
        let lf = "Name and Employee ID\nAsha\n\nRavi\n";
        let crlf = "Name and Employee ID\r\nAsha\r\n\r\nRavi\r\n";
        let lines = |text: &str| -> Vec<usize> {
            read_csv_text(text, "t.csv")
                .unwrap()
                .iter()
                .map(|(l, _)| *l)
                .collect()
        };
        assert_eq!(lines(lf), vec![2, 4]);
        assert_eq!(lines(crlf), vec![2, 4]);
        assert_eq!(lines("\u{feff}Name and Employee ID\r\nAsha\r\n"), vec![2]);
    }

    #[test]
    fn quoted_line_breaks_count_as_lines() {
        let text = "Name and Employee ID,Note\nAsha,\"two\nlines\"\nRavi,x\n";
        let rows = read_csv_text(text, "t.csv").unwrap();
        assert_eq!(rows[0].0, 2);
        assert_eq!(rows[1].0, 4);
    }

    #[test]
    fn short_lines_leave_columns_absent() {
        let text = "a,b,c\n1\n";
        let rows = read_csv_text(text, "t.csv").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1.len(), 1);
    }

    #[test]
    fn strips_byte_order_mark() {
        let text = "\u{feff}Name and Employee ID\nAsha\n";
        let rows = read_csv_text(text, "t.csv").unwrap();
        assert!(rows[0].1.contains_key("Name and Employee ID"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let res = read_csv_file(Path::new("/nonexistent/feedback.csv"));
        assert!(matches!(res, Err(DashboardError::OpeningFile { .. })));
    }
}
