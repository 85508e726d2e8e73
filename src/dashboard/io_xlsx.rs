// Primitives for reading the spreadsheet export of the survey.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use feedback_tally::mapper::RawRow;

use crate::dashboard::{io_common::assemble_row, *};

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => "".to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(true) => "Yes".to_string(),
        DataType::Bool(false) => "No".to_string(),
        DataType::DateTime(f) => f.to_string(),
        x => {
            warn!("cell_to_string: unexpected cell content {:?}", x);
            "".to_string()
        }
    }
}

fn get_range(path: &str, worksheet_name_o: &Option<String>) -> DashboardResult<Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name.clone(),
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        // The form export has a single worksheet, take the first one.
        let all_worksheets = workbook.worksheets();
        match all_worksheets.into_iter().next() {
            None => EmptyExcelSnafu { path }.fail(),
            Some((worksheet_name, wrange)) => {
                debug!(
                    "get_range: path: {:?} using worksheet: {:?}",
                    path, worksheet_name
                );
                Ok(wrange)
            }
        }
    }
}

/// Turns a worksheet into rows, numbered as in the spreadsheet (the header is row 1).
fn read_range(wrange: &Range<DataType>, path: &str) -> DashboardResult<Vec<(usize, RawRow)>> {
    let mut iter = wrange.rows();
    let header: Vec<Option<String>> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(|c| match cell_to_string(c) {
            s if s.is_empty() => None,
            s => Some(s),
        })
        .collect();
    debug!("read_range: header: {:?}", header);

    let mut res: Vec<(usize, RawRow)> = Vec::new();
    for (idx, row) in iter.enumerate() {
        if row.iter().all(|c| matches!(c, DataType::Empty)) {
            continue;
        }
        let lineno = idx + 2;
        let r = assemble_row(header.iter(), row.iter().map(cell_to_string));
        debug!("read_range: lineno: {:?} row: {:?}", lineno, r);
        res.push((lineno, r));
    }
    Ok(res)
}

pub fn read_xlsx_file(
    path: &Path,
    worksheet_name_o: &Option<String>,
) -> DashboardResult<Vec<(usize, RawRow)>> {
    let p = path.display().to_string();
    info!("Attempting to read spreadsheet {:?}", p);
    let wrange = get_range(&p, worksheet_name_o)?;
    let res = read_range(&wrange, &p)?;
    info!("Parsed {} with {} rows", p, res.len());
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedback_tally::mapper::TABLET_WORKING;

    #[test]
    fn cells_as_text() {
        assert_eq!(cell_to_string(&DataType::Float(3.0)), "3");
        assert_eq!(cell_to_string(&DataType::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&DataType::Int(7)), "7");
        assert_eq!(cell_to_string(&DataType::Bool(true)), "Yes");
        assert_eq!(cell_to_string(&DataType::Empty), "");
        assert_eq!(
            cell_to_string(&DataType::String("Maybe later".to_string())),
            "Maybe later"
        );
    }

    #[test]
    fn rows_of_a_worksheet() {
        let mut range: Range<DataType> = Range::new((0, 0), (3, 1));
        range.set_value((0, 0), DataType::String("Name and Employee ID".to_string()));
        range.set_value((0, 1), DataType::String(TABLET_WORKING.to_string()));
        range.set_value((1, 0), DataType::String("Asha".to_string()));
        range.set_value((1, 1), DataType::String("Yes".to_string()));
        // Row 3 is left empty.
        range.set_value((3, 0), DataType::String("Bina".to_string()));
        let rows = read_range(&range, "t.xlsx").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, 2);
        assert_eq!(
            rows[0].1.get(TABLET_WORKING).map(|s| s.as_str()),
            Some("Yes")
        );
        assert_eq!(rows[1].0, 4);
        assert_eq!(
            rows[1].1.get("Name and Employee ID").map(|s| s.as_str()),
            Some("Bina")
        );
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let res = read_xlsx_file(Path::new("/nonexistent/feedback.xlsx"), &None);
        assert!(matches!(res, Err(DashboardError::OpeningExcel { .. })));
    }
}
