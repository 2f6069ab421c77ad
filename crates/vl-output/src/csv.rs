//! CSV publish sink.
//!
//! Creates two files in the output directory:
//! - `lane_flows.csv`: one row per lane per closed window
//! - `sign_changes.csv`: one row per rendered sign record per switch

use std::fs::File;
use std::path::Path;

use csv::Writer;
use serde_json::Value;

use vl_control::{FlowSnapshot, PublishError, PublishSink, SignSnapshot};

use crate::OutputResult;

const FLOW_HEADER: [&str; 6] = ["timestamp", "duration", "lane_id", "flow", "queue_length", "queue_num"];
const SIGN_HEADER: [&str; 5] = ["timestamp", "vms_id", "lane_id", "direction", "movement"];

/// Writes published snapshots to two CSV files.
///
/// Sign records are expected to carry `vmsId`, `laneId`, `direction` and
/// `movement` keys (as `LaneTurnRenderer` produces); a missing key leaves
/// its cell empty.
pub struct CsvSink {
    flows:    Writer<File>,
    signs:    Writer<File>,
    finished: bool,
}

impl CsvSink {
    /// Create the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut flows = Writer::from_path(dir.join("lane_flows.csv"))?;
        flows.write_record(FLOW_HEADER)?;

        let mut signs = Writer::from_path(dir.join("sign_changes.csv"))?;
        signs.write_record(SIGN_HEADER)?;

        Ok(Self { flows, signs, finished: false })
    }

    /// Flush both files.  Idempotent.
    pub fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.flows.flush()?;
        self.signs.flush()?;
        Ok(())
    }
}

impl PublishSink for CsvSink {
    fn publish_flow(&mut self, snapshot: &FlowSnapshot) -> Result<(), PublishError> {
        for lane in &snapshot.lane_data {
            self.flows
                .write_record(&[
                    snapshot.timestamp.to_string(),
                    snapshot.duration.to_string(),
                    lane.lane_id.to_string(),
                    lane.flow.to_string(),
                    lane.queue_length.to_string(),
                    lane.queue_num.to_string(),
                ])
                .map_err(encode_err)?;
        }
        Ok(())
    }

    fn publish_signs(&mut self, snapshot: &SignSnapshot) -> Result<(), PublishError> {
        for record in &snapshot.lane_allocations {
            self.signs
                .write_record(&[
                    snapshot.timestamp.to_string(),
                    cell(record, "vmsId"),
                    cell(record, "laneId"),
                    cell(record, "direction"),
                    cell(record, "movement"),
                ])
                .map_err(encode_err)?;
        }
        self.signs.flush()?;
        Ok(())
    }
}

fn cell(record: &Value, key: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
    }
}

fn encode_err(e: csv::Error) -> PublishError {
    PublishError::Encode(e.to_string())
}
