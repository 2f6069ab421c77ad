//! Outbound publishing.

use std::io::Write;

use serde::Serialize;

use crate::{FlowSnapshot, PublishError, SignSnapshot};

/// Best-effort outbound transport.
///
/// Both methods have no-op defaults.  The controller logs any error and
/// continues; a failing sink never changes decision state.
pub trait PublishSink {
    fn publish_flow(&mut self, _snapshot: &FlowSnapshot) -> Result<(), PublishError> {
        Ok(())
    }

    fn publish_signs(&mut self, _snapshot: &SignSnapshot) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Discards everything.
pub struct NoopSink;

impl PublishSink for NoopSink {}

/// Keeps every snapshot in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub flows: Vec<FlowSnapshot>,
    pub signs: Vec<SignSnapshot>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PublishSink for RecordingSink {
    fn publish_flow(&mut self, snapshot: &FlowSnapshot) -> Result<(), PublishError> {
        self.flows.push(snapshot.clone());
        Ok(())
    }

    fn publish_signs(&mut self, snapshot: &SignSnapshot) -> Result<(), PublishError> {
        self.signs.push(snapshot.clone());
        Ok(())
    }
}

/// Writes one JSON object per line, tagged with its topic:
///
/// ```text
/// {"topic":"lane_flow","timestamp":…,"duration":1800,"laneData":[…]}
/// {"topic":"lane_allocation","timestamp":…,"duration":1800,"laneAllocations":[…]}
/// ```
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

#[derive(Serialize)]
struct Tagged<'a, T> {
    topic: &'static str,
    #[serde(flatten)]
    body:  &'a T,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line<T: Serialize>(&mut self, topic: &'static str, body: &T) -> Result<(), PublishError> {
        serde_json::to_writer(&mut self.writer, &Tagged { topic, body })
            .map_err(|e| PublishError::Encode(e.to_string()))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> PublishSink for JsonLinesSink<W> {
    fn publish_flow(&mut self, snapshot: &FlowSnapshot) -> Result<(), PublishError> {
        self.write_line("lane_flow", snapshot)
    }

    fn publish_signs(&mut self, snapshot: &SignSnapshot) -> Result<(), PublishError> {
        self.write_line("lane_allocation", snapshot)?;
        self.writer.flush()?;
        Ok(())
    }
}
