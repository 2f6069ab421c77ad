//! Telemetry → history corpus.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use vl_control::TrafficFlowRecord;
use vl_core::{LaneId, hourly_rate};
use vl_forecast::HistoryRow;

use crate::{OutputError, OutputResult};

/// Accumulates detector cycles into fixed-interval rows of mean hourly
/// flow per lane.
///
/// Windows are aligned to multiples of `interval_secs` since the Unix epoch.
/// Records are expected in time order; a record outside the open window
/// closes it.
#[derive(Clone, Debug)]
pub struct HistoryRecorder {
    interval_secs: i64,
    open:          Option<i64>,
    sums:          BTreeMap<LaneId, (f64, u32)>,
    rows:          Vec<HistoryRow>,
}

impl HistoryRecorder {
    pub fn new(interval_secs: i64) -> OutputResult<Self> {
        if interval_secs <= 0 {
            return Err(OutputError::InvalidInterval(interval_secs));
        }
        Ok(Self { interval_secs, open: None, sums: BTreeMap::new(), rows: Vec::new() })
    }

    pub fn record(&mut self, record: &TrafficFlowRecord) {
        let Some(scale) = hourly_rate(1.0, record.cycle_time) else {
            debug!(timestamp = record.cycle_start_time, "record without a cycle length not recorded");
            return;
        };
        let start = record.cycle_start_time - record.cycle_start_time.rem_euclid(self.interval_secs);
        if self.open != Some(start) {
            self.close();
            self.open = Some(start);
        }
        for sample in &record.lanes {
            let (sum, n) = self.sums.entry(LaneId(sample.lane_no)).or_default();
            *sum += f64::from(sample.volume) * scale;
            *n += 1;
        }
    }

    /// Rows closed so far.
    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }

    /// Close the open window and return every row.
    pub fn finish(mut self) -> Vec<HistoryRow> {
        self.close();
        self.rows
    }

    fn close(&mut self) {
        let Some(start) = self.open.take() else { return };
        if self.sums.is_empty() {
            return;
        }
        let flows = std::mem::take(&mut self.sums)
            .into_iter()
            .map(|(lane, (sum, n))| (lane, sum / f64::from(n)))
            .collect();
        self.rows.push(HistoryRow { start, end: start + self.interval_secs, flows });
    }
}

/// Write `rows` as a history CSV at `path`.
pub fn write_history_csv(rows: &[HistoryRow], path: &Path) -> OutputResult<()> {
    let file = std::fs::File::create(path)?;
    write_history_writer(rows, file)
}

/// Like [`write_history_csv`] but accepts any `Write` sink.
///
/// One column per lane seen in any row, in lane order; a lane missing from
/// a row leaves an empty cell.
pub fn write_history_writer<W: Write>(rows: &[HistoryRow], writer: W) -> OutputResult<()> {
    let lanes: BTreeSet<LaneId> = rows.iter().flat_map(|r| r.flows.keys().copied()).collect();

    let mut out = csv::Writer::from_writer(writer);
    let mut header = vec!["start".to_owned(), "end".to_owned()];
    header.extend(lanes.iter().map(|l| format!("lane{}", l.get())));
    out.write_record(&header)?;

    for row in rows {
        let mut cells = vec![row.start.to_string(), row.end.to_string()];
        cells.extend(
            lanes
                .iter()
                .map(|l| row.flows.get(l).map_or_else(String::new, |f| f.to_string())),
        );
        out.write_record(&cells)?;
    }
    out.flush()?;
    Ok(())
}
