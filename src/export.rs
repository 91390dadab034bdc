use crate::error::Result;
use crate::roster::{CellValue, Roster};
use rand::Rng;
use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::{Path, PathBuf};

/// Display options for the written sheet.
#[derive(Debug, Clone)]
pub struct ExportLayout {
    pub sheet_name: String,
    pub comment_column_width: f64,
}

/// The roster with the comment column merged in: replaced in place when a
/// column of that name already exists, appended otherwise.
#[derive(Debug, Clone)]
pub struct AnnotatedRoster {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub comment_idx: usize,
}

impl AnnotatedRoster {
    pub fn new(roster: &Roster, comment_column: &str, comments: &[String]) -> Self {
        let mut headers = roster.headers.clone();
        let comment_idx = match headers.iter().position(|h| h == comment_column) {
            Some(idx) => idx,
            None => {
                headers.push(comment_column.to_string());
                headers.len() - 1
            }
        };

        let rows = roster
            .rows
            .iter()
            .zip(comments)
            .map(|(row, comment)| {
                let mut row = row.clone();
                row.resize(headers.len(), CellValue::Empty);
                row[comment_idx] = CellValue::Text(comment.clone());
                row
            })
            .collect();

        Self {
            headers,
            rows,
            comment_idx,
        }
    }

    pub fn comment(&self, row: usize) -> &str {
        match self.rows.get(row).and_then(|r| r.get(self.comment_idx)) {
            Some(CellValue::Text(s)) => s,
            _ => "",
        }
    }
}

pub fn workbook_bytes(annotated: &AnnotatedRoster, layout: &ExportLayout) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let datetime_format = Format::new().set_num_format("dd/mm/yyyy hh:mm");
    let sheet = workbook.add_worksheet();
    sheet.set_name(&layout.sheet_name)?;

    for (col, header) in annotated.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (idx, row) in annotated.rows.iter().enumerate() {
        let r = idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Number(n) => {
                    sheet.write_number(r, c, *n)?;
                }
                CellValue::Text(s) => {
                    sheet.write_string(r, c, s)?;
                }
                CellValue::Bool(b) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                CellValue::DateTime(serial) => {
                    let format = if serial.fract() == 0.0 {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    sheet.write_number_with_format(r, c, *serial, format)?;
                }
            }
        }
    }

    sheet.set_column_width(annotated.comment_idx as u16, layout.comment_column_width)?;

    Ok(workbook.save_to_buffer()?)
}

/// Serializes the whole workbook before touching the file, so a failure never
/// leaves a half-written output behind.
pub fn write_workbook(path: &Path, annotated: &AnnotatedRoster, layout: &ExportLayout) -> Result<()> {
    let bytes = workbook_bytes(annotated, layout)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn default_output_path(prefix: &str, subject: &str) -> PathBuf {
    let safe: String = subject
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    PathBuf::from(format!("{prefix}_{safe}.xlsx"))
}

/// Row indices for the spot-check table, in roster order.
pub fn sample_rows<R: Rng + ?Sized>(len: usize, amount: usize, rng: &mut R) -> Vec<usize> {
    let mut picked = rand::seq::index::sample(rng, len, amount.min(len)).into_vec();
    picked.sort_unstable();
    picked
}
