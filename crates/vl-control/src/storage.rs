//! Per-lane sample buffers.

use std::collections::BTreeMap;

use vl_core::LaneId;

use crate::QueueSample;

/// Aggregate of one lane over one closed window.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LaneWindow {
    /// Mean hourly flow of the buffered samples; zero if there were none.
    pub flow:          f64,
    /// The lane's `flow` in the window before, if there was one.
    pub previous_flow: Option<f64>,
    pub queue_length:  f64,
    pub queue_num:     f64,
}

/// Buffers the current window's samples and remembers the last closed
/// window for forecasting and snapshots.
#[derive(Clone, Debug, Default)]
pub struct LaneFlowStorage {
    flow:        BTreeMap<LaneId, Vec<f64>>,
    queue:       BTreeMap<LaneId, Vec<QueueSample>>,
    last_window: BTreeMap<LaneId, LaneWindow>,
}

impl LaneFlowStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_flow(&mut self, lane: LaneId, flow_hour: f64) {
        self.flow.entry(lane).or_default().push(flow_hour);
    }

    pub fn push_queue(&mut self, lane: LaneId, sample: QueueSample) {
        self.queue.entry(lane).or_default().push(sample);
    }

    /// Samples buffered for `lane` in the open window.
    pub fn buffered(&self, lane: LaneId) -> usize {
        self.flow.get(&lane).map_or(0, Vec::len)
    }

    /// Aggregate `lanes` over the open window, remember the result, and
    /// clear every buffer.
    pub fn close_window<'a>(
        &mut self,
        lanes: impl IntoIterator<Item = &'a LaneId>,
    ) -> &BTreeMap<LaneId, LaneWindow> {
        let closed = self.aggregate(lanes);
        self.commit(closed)
    }

    /// What closing the open window over `lanes` would produce, without
    /// closing it.
    pub fn aggregate<'a>(&self, lanes: impl IntoIterator<Item = &'a LaneId>) -> BTreeMap<LaneId, LaneWindow> {
        let mut closed = BTreeMap::new();
        for &lane in lanes {
            let flow = self.flow.get(&lane).map_or(0.0, |s| mean(s.iter().copied()));
            let (queue_length, queue_num) = match self.queue.get(&lane) {
                Some(q) => (
                    mean(q.iter().map(|s| s.queue_length)),
                    mean(q.iter().map(|s| f64::from(s.queue_num))),
                ),
                None => (0.0, 0.0),
            };
            let previous_flow = self.last_window.get(&lane).map(|w| w.flow);
            closed.insert(lane, LaneWindow { flow, previous_flow, queue_length, queue_num });
        }
        closed
    }

    /// Record `closed` as the last window and clear every buffer.
    pub fn commit(&mut self, closed: BTreeMap<LaneId, LaneWindow>) -> &BTreeMap<LaneId, LaneWindow> {
        self.flow.clear();
        self.queue.clear();
        self.last_window = closed;
        &self.last_window
    }

    /// Aggregates of the most recently closed window.
    pub fn last_window(&self) -> &BTreeMap<LaneId, LaneWindow> {
        &self.last_window
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}
