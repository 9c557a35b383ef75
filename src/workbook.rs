use crate::html_tables::HtmlTable;
use crate::mcp::errors;
use rust_xlsxwriter::{ColNum, Format, FormatAlign, FormatBorder, RowNum, Workbook, Worksheet};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Numbers (optionally with `,` thousands separators) become numeric
    /// cells, blanks stay blank, everything else is text.
    pub fn infer(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        match parse_number(trimmed) {
            Some(number) => CellValue::Number(number),
            None => CellValue::Text(trimmed.to_string()),
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    if !text.chars().any(|ch| ch.is_ascii_digit())
        || !text
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | ',' | '-' | '+' | 'e' | 'E'))
    {
        return None;
    }

    let plain = if text.contains(',') {
        strip_thousands(text)?
    } else {
        text.to_string()
    };
    plain.parse::<f64>().ok().filter(|number| number.is_finite())
}

fn strip_thousands(text: &str) -> Option<String> {
    let unsigned = text.trim_start_matches(['-', '+']);
    let integer = unsigned.split(['.', 'e', 'E']).next()?;
    let mut groups = integer.split(',');
    let first = groups.next()?;
    if first.is_empty() || first.len() > 3 || groups.clone().any(|group| group.len() != 3) {
        return None;
    }
    if text[text.len() - unsigned.len() + integer.len()..].contains(',') {
        return None;
    }
    Some(text.replace(',', ""))
}

#[derive(Debug, Clone)]
pub struct WorkbookError {
    pub kind: &'static str,
    pub message: String,
}

impl WorkbookError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: errors::INTERNAL_ERROR,
            message: message.into(),
        }
    }
}

impl fmt::Display for WorkbookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for WorkbookError {}

impl From<rust_xlsxwriter::XlsxError> for WorkbookError {
    fn from(error: rust_xlsxwriter::XlsxError) -> Self {
        Self::internal(format!("xlsx write failed: {error}"))
    }
}

pub fn sheet_name(index: usize) -> String {
    format!("Table_{}", index + 1)
}

/// One worksheet per table, named `Table_1`, `Table_2`, ...
pub fn build_workbook(tables: &[HtmlTable]) -> Result<Vec<u8>, WorkbookError> {
    if tables.is_empty() {
        return Err(WorkbookError {
            kind: errors::INVALID_INPUT,
            message: "no tables found in html content".to_string(),
        });
    }

    let header_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);

    let mut workbook = Workbook::new();
    for (index, table) in tables.iter().enumerate() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(index))?;
        write_table(worksheet, table, &header_format)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_table(
    worksheet: &mut Worksheet,
    table: &HtmlTable,
    header_format: &Format,
) -> Result<(), WorkbookError> {
    let mut row_index: RowNum = 0;

    if table.header.is_empty() {
        for col in 0..table.width {
            worksheet.write_number_with_format(0, col_num(col)?, col as f64, header_format)?;
        }
        row_index = 1;
    } else {
        for header_row in &table.header {
            for (col, label) in header_row.iter().enumerate() {
                worksheet.write_string_with_format(
                    row_index,
                    col_num(col)?,
                    label.as_str(),
                    header_format,
                )?;
            }
            row_index = next_row(row_index)?;
        }
    }

    for row in &table.rows {
        for (col, text) in row.iter().enumerate() {
            match CellValue::infer(text) {
                CellValue::Empty => {}
                CellValue::Number(number) => {
                    worksheet.write_number(row_index, col_num(col)?, number)?;
                }
                CellValue::Text(text) => {
                    worksheet.write_string(row_index, col_num(col)?, text)?;
                }
            }
        }
        row_index = next_row(row_index)?;
    }

    Ok(())
}

fn col_num(col: usize) -> Result<ColNum, WorkbookError> {
    ColNum::try_from(col)
        .map_err(|_| WorkbookError::internal(format!("column {col} exceeds worksheet limits")))
}

fn next_row(row: RowNum) -> Result<RowNum, WorkbookError> {
    row.checked_add(1)
        .ok_or_else(|| WorkbookError::internal("row count exceeds worksheet limits"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Range, Reader, Xlsx, open_workbook_from_rs};
    use std::io::Cursor;

    fn read_sheets(bytes: Vec<u8>) -> Vec<(String, Range<Data>)> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).expect("xlsx");
        workbook
            .sheet_names()
            .into_iter()
            .map(|name| {
                let range = workbook.worksheet_range(&name).expect("range");
                (name, range)
            })
            .collect()
    }

    fn cell(range: &Range<Data>, position: (u32, u32)) -> Data {
        range.get_value(position).cloned().unwrap_or(Data::Empty)
    }

    fn string(value: &str) -> Data {
        Data::String(value.to_string())
    }

    fn table(header: &[&[&str]], rows: &[&[&str]]) -> HtmlTable {
        let to_rows = |rows: &[&[&str]]| -> Vec<Vec<String>> {
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect()
        };
        let header = to_rows(header);
        let rows = to_rows(rows);
        let width = header
            .iter()
            .chain(rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0);
        HtmlTable {
            header,
            rows,
            width,
        }
    }

    #[test]
    fn infer_numbers_and_text() {
        assert_eq!(CellValue::infer("42"), CellValue::Number(42.0));
        assert_eq!(CellValue::infer(" -3.5 "), CellValue::Number(-3.5));
        assert_eq!(CellValue::infer("150,000"), CellValue::Number(150_000.0));
        assert_eq!(CellValue::infer("1,234.5"), CellValue::Number(1_234.5));
        assert_eq!(CellValue::infer("1e3"), CellValue::Number(1000.0));
        assert_eq!(CellValue::infer(""), CellValue::Empty);
        assert_eq!(CellValue::infer("   "), CellValue::Empty);
        assert_eq!(
            CellValue::infer("$150,000"),
            CellValue::Text("$150,000".to_string())
        );
        assert_eq!(CellValue::infer("Q1"), CellValue::Text("Q1".to_string()));
        assert_eq!(CellValue::infer("1,23"), CellValue::Text("1,23".to_string()));
        assert_eq!(CellValue::infer("1.5,000"), CellValue::Text("1.5,000".to_string()));
        assert_eq!(CellValue::infer("inf"), CellValue::Text("inf".to_string()));
        assert_eq!(CellValue::infer("-"), CellValue::Text("-".to_string()));
    }

    #[test]
    fn sheet_names_are_one_based() {
        assert_eq!(sheet_name(0), "Table_1");
        assert_eq!(sheet_name(9), "Table_10");
    }

    #[test]
    fn workbook_bytes_are_a_zip_container() {
        let tables = vec![table(&[&["Quarter"]], &[&["Q1"]])];
        let bytes = build_workbook(&tables).expect("workbook");
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn cells_keep_header_numbers_text_and_blanks() {
        let tables = vec![table(
            &[&["Quarter", "Total"]],
            &[&["Q1", "$150,000"], &["Q2", "150,000"], &["", "7"]],
        )];
        let sheets = read_sheets(build_workbook(&tables).expect("workbook"));
        assert_eq!(sheets.len(), 1);
        let (name, range) = &sheets[0];
        assert_eq!(name, "Table_1");
        assert_eq!(range.start(), Some((0, 0)));
        assert_eq!(range.width(), 2);
        assert_eq!(range.height(), 4);

        assert_eq!(cell(range, (0, 0)), string("Quarter"));
        assert_eq!(cell(range, (0, 1)), string("Total"));
        assert_eq!(cell(range, (1, 0)), string("Q1"));
        assert_eq!(cell(range, (1, 1)), string("$150,000"));
        assert_eq!(cell(range, (2, 1)), Data::Float(150_000.0));
        assert_eq!(cell(range, (3, 0)), Data::Empty);
        assert_eq!(cell(range, (3, 1)), Data::Float(7.0));
    }

    #[test]
    fn headerless_table_gets_numeric_column_labels() {
        let tables = vec![
            table(&[&["a"]], &[&["1"]]),
            table(&[], &[&["x", "1"], &["y", ""]]),
        ];
        let sheets = read_sheets(build_workbook(&tables).expect("workbook"));
        let names: Vec<&str> = sheets.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["Table_1", "Table_2"]);

        let range = &sheets[1].1;
        assert_eq!(cell(range, (0, 0)), Data::Float(0.0));
        assert_eq!(cell(range, (0, 1)), Data::Float(1.0));
        assert_eq!(cell(range, (1, 0)), string("x"));
        assert_eq!(cell(range, (1, 1)), Data::Float(1.0));
        assert_eq!(cell(range, (2, 0)), string("y"));
        assert_eq!(range.height(), 3);
    }

    #[test]
    fn multi_row_header_occupies_leading_rows() {
        let tables = vec![table(
            &[&["Sales", "Sales"], &["Bicycle", "Helmet"]],
            &[&["150000", "75000"]],
        )];
        let sheets = read_sheets(build_workbook(&tables).expect("workbook"));
        let range = &sheets[0].1;
        assert_eq!(cell(range, (0, 1)), string("Sales"));
        assert_eq!(cell(range, (1, 0)), string("Bicycle"));
        assert_eq!(cell(range, (2, 0)), Data::Float(150_000.0));
        assert_eq!(cell(range, (2, 1)), Data::Float(75_000.0));
        assert_eq!(range.width(), 2);
    }

    #[test]
    fn empty_table_list_is_rejected() {
        let err = build_workbook(&[]).expect_err("error");
        assert_eq!(err.kind, errors::INVALID_INPUT);
    }
}
