use crate::error::{AssistantError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Spreadsheet date serial: days since 1899-12-30, time as the fraction.
    DateTime(f64),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) if dt.is_duration() => CellValue::Number(dt.as_f64()),
            Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
            Data::String(s) if s.is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(serial) => match serial_to_datetime(*serial) {
                Some(dt) if serial.fract() == 0.0 => write!(f, "{}", dt.format("%d/%m/%Y")),
                Some(dt) => write!(f, "{}", dt.format("%d/%m/%Y %H:%M")),
                None => write!(f, "{serial}"),
            },
        }
    }
}

fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let offset = TimeDelta::try_milliseconds((serial * 86_400_000.0).round() as i64)?;
    epoch.checked_add_signed(offset)
}

/// A student list: one header row followed by one row per student.
#[derive(Debug, Clone)]
pub struct Roster {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    /// 1-based sheet row holding the header; students follow it directly.
    pub header_row: usize,
}

impl Roster {
    pub fn load(path: &Path, sheet: Option<&str>) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;

        let sheet_name = match sheet {
            Some(name) => name.to_string(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or(AssistantError::EmptyRoster)?,
        };

        let range = workbook.worksheet_range(&sheet_name)?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(CellValue::from).collect())
            .collect();

        let mut roster = Self::from_rows(rows)?;
        if let Some((first_row, _)) = range.start() {
            roster.header_row = first_row as usize + 1;
        }
        Ok(roster)
    }

    /// Builds a roster whose first row is the header. Unnamed header cells get
    /// positional names and short rows are padded. Blank rows between students
    /// are kept so row positions match the sheet; trailing blank rows are not.
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut rows = rows.into_iter();
        let header_row = rows.next().ok_or(AssistantError::EmptyRoster)?;
        if header_row.iter().all(CellValue::is_empty) {
            return Err(AssistantError::EmptyRoster);
        }

        let headers: Vec<String> = header_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| match cell {
                CellValue::Empty => format!("Unnamed: {idx}"),
                other => other.to_string().trim().to_string(),
            })
            .collect();

        let width = headers.len();
        let mut rows: Vec<Vec<CellValue>> = rows
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        while rows
            .last()
            .is_some_and(|row| row.iter().all(CellValue::is_empty))
        {
            rows.pop();
        }

        Ok(Self {
            headers,
            rows,
            header_row: 1,
        })
    }

    /// Sheet row number of the student at `idx`.
    pub fn sheet_row(&self, idx: usize) -> usize {
        self.header_row + 1 + idx
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact header match first, then a trimmed case-insensitive match.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        if let Some(idx) = self.headers.iter().position(|h| h == name) {
            return Ok(idx);
        }
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == wanted)
            .ok_or_else(|| AssistantError::UnknownColumn(name.to_string()))
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(idx).unwrap_or(&CellValue::Empty))
    }
}
