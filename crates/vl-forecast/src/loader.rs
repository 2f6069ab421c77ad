//! History CSV loader.
//!
//! # CSV format
//!
//! One row per aggregation window; one column per lane holding that lane's
//! hourly flow.  The lane id is the digits of the column name.
//!
//! ```csv
//! start,end,lane16,lane17,lane19
//! 1717200000,1717201800,412,388,97
//! 1717201800,1717203600,450,401,120
//! ```
//!
//! Empty cells are sensor gaps and are skipped.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use vl_core::LaneId;

use crate::{ForecastError, ForecastResult};

/// One aggregation window of historical per-lane flow.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryRow {
    /// Window start, Unix seconds.
    pub start: i64,
    /// Window end, Unix seconds.
    pub end:   i64,
    pub flows: BTreeMap<LaneId, f64>,
}

enum Column {
    Start,
    End,
    Lane(LaneId),
}

/// Load every row of a history CSV file.
pub fn load_history_csv(path: &Path) -> ForecastResult<Vec<HistoryRow>> {
    let file = std::fs::File::open(path)?;
    load_history_reader(file)
}

/// Like [`load_history_csv`] but accepts any `Read` source.
pub fn load_history_reader<R: Read>(reader: R) -> ForecastResult<Vec<HistoryRow>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let columns = csv_reader
        .headers()
        .map_err(|e| ForecastError::Parse(e.to_string()))?
        .iter()
        .map(parse_header)
        .collect::<ForecastResult<Vec<Column>>>()?;

    if !columns.iter().any(|c| matches!(c, Column::Start)) {
        return Err(ForecastError::Parse("missing `start` column".into()));
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| ForecastError::Parse(e.to_string()))?;
        let mut row = HistoryRow { start: 0, end: 0, flows: BTreeMap::new() };
        for (column, cell) in columns.iter().zip(record.iter()) {
            let cell = cell.trim();
            match column {
                Column::Start => row.start = parse_cell(cell)?,
                Column::End => row.end = parse_cell(cell)?,
                Column::Lane(_) if cell.is_empty() => {}
                Column::Lane(lane) => {
                    row.flows.insert(*lane, parse_cell(cell)?);
                }
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

fn parse_header(name: &str) -> ForecastResult<Column> {
    match name.trim() {
        "start" => Ok(Column::Start),
        "end" => Ok(Column::End),
        other => {
            let digits: String = other.chars().filter(char::is_ascii_digit).collect();
            digits
                .parse::<u32>()
                .map(|id| Column::Lane(LaneId(id)))
                .map_err(|_| ForecastError::Parse(format!("column {other:?} names no lane")))
        }
    }
}

fn parse_cell<T: std::str::FromStr>(cell: &str) -> ForecastResult<T> {
    cell.parse::<T>()
        .map_err(|_| ForecastError::Parse(format!("bad value {cell:?}")))
}
