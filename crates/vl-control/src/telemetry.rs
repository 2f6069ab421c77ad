//! Wire types.
//!
//! Inbound field names follow the roadside detector feed (`snake_case`);
//! outbound snapshots follow the signal platform (`camelCase`).

use serde::{Deserialize, Serialize};

use vl_lane::SignRecord;

// ── Inbound ───────────────────────────────────────────────────────────────────

/// Per-lane vehicle counts for one detector cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficFlowRecord {
    /// Cycle start, Unix seconds.
    pub cycle_start_time: i64,
    /// Cycle length in seconds.
    pub cycle_time: f64,
    pub lanes: Vec<LaneVolume>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneVolume {
    pub lane_no: u32,
    pub volume:  u32,
}

/// Per-lane queue observations, published on a separate topic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueueRecord {
    pub lanes: Vec<LaneQueue>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneQueue {
    pub lane_no: u32,
    pub queue:   QueueSample,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueSample {
    pub queue_num:    u32,
    pub queue_length: f64,
}

// ── Outbound ──────────────────────────────────────────────────────────────────

/// Lane-level flow and queue for the last closed window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    pub timestamp: i64,
    pub duration:  i64,
    pub lane_data: Vec<LaneFlowData>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneFlowData {
    pub lane_id:      u32,
    /// Hourly flow, rounded to whole vehicles.
    pub flow:         i64,
    pub queue_length: f64,
    pub queue_num:    u32,
}

/// Every sign's rendered display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignSnapshot {
    pub timestamp:        i64,
    pub duration:         i64,
    pub lane_allocations: Vec<SignRecord>,
}
