//! replay — one synthetic day through the pilot intersection.
//!
//! 1. Load or synthesize a month of half-hourly lane history.
//! 2. Train per-lane time-of-day profiles.
//! 3. Segment the weekday profile into schedule intervals.
//! 4. Replay a Monday of five-minute detector cycles through the controller.
//!
//! ```text
//! replay [config.json] [history.csv]
//! ```
//!
//! Output lands in `output/replay/`.  Set `RUST_LOG=debug` for per-window
//! saturation figures.

mod intersection;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vl_control::{
    ControllerBuilder, ControllerConfig, DynamicSchedule, FlowSnapshot, JsonLinesSink, LaneQueue,
    LaneVolume, PublishError, PublishSink, QueueRecord, QueueSample, SignSnapshot,
    TrafficFlowRecord,
};
use vl_core::LaneId;
use vl_forecast::{DateCalendar, DateType, HistoryProfiles, HistoryRow, load_history_csv};
use vl_output::{CsvSink, HistoryRecorder, write_history_csv};
use vl_schedule::DaySchedule;
use vl_segment::{FlowMatrix, breakpoints_to_hours, partition_acceleration};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:             u64   = 42;
const REPLAY_START:     i64   = 1_717_372_800; // Monday 2024-06-03 00:00 UTC
const HISTORY_DAYS:     i64   = 28;
const HISTORY_INTERVAL: i64   = 1_800;
const BUCKET_HOURS:     f64   = 0.5;
const CYCLE_SECS:       i64   = 300;
const MAX_SEGMENTS:     usize = 8;
const OUTPUT_DIR:       &str  = "output/replay";

// ── Synthetic demand ──────────────────────────────────────────────────────────

/// Expected hourly flow of one lane: a base level plus morning and evening
/// peaks centred on 08:00 and 18:00.
struct LaneDemand {
    lane:    u32,
    base:    f64,
    am_peak: f64,
    pm_peak: f64,
}

const DEMAND: [LaneDemand; 8] = [
    LaneDemand { lane: 16, base: 260.0, am_peak: 1.6, pm_peak: 1.0 },
    LaneDemand { lane: 17, base: 260.0, am_peak: 1.6, pm_peak: 1.0 },
    LaneDemand { lane: 18, base: 240.0, am_peak: 1.4, pm_peak: 0.6 },
    LaneDemand { lane: 19, base: 140.0, am_peak: 0.6, pm_peak: 1.8 },
    LaneDemand { lane: 30, base: 120.0, am_peak: 0.5, pm_peak: 2.5 },
    LaneDemand { lane: 31, base: 160.0, am_peak: 2.0, pm_peak: 0.8 },
    LaneDemand { lane: 32, base: 160.0, am_peak: 2.0, pm_peak: 0.8 },
    LaneDemand { lane: 33, base: 160.0, am_peak: 2.0, pm_peak: 0.8 },
];

impl LaneDemand {
    fn expected(&self, hour: f64) -> f64 {
        let bump = |centre: f64| (-((hour - centre) / 1.5).powi(2)).exp();
        self.base * (0.35 + self.am_peak * bump(8.0) + self.pm_peak * bump(18.0))
    }
}

fn hour_of(unix_secs: i64) -> f64 {
    unix_secs.rem_euclid(86_400) as f64 / 3_600.0
}

/// Half-hourly history for the `HISTORY_DAYS` before the replay day.
/// Weekend traffic runs at 60 %.
fn synthetic_history(rng: &mut SmallRng) -> Vec<HistoryRow> {
    let first = REPLAY_START - HISTORY_DAYS * 86_400;
    (first..REPLAY_START)
        .step_by(HISTORY_INTERVAL as usize)
        .map(|start| {
            let weekday = (start - first).div_euclid(86_400) % 7 < 5;
            let scale = if weekday { 1.0 } else { 0.6 };
            let mid = hour_of(start + HISTORY_INTERVAL / 2);
            let flows = DEMAND
                .iter()
                .map(|d| (LaneId(d.lane), (d.expected(mid) * scale * rng.gen_range(0.9..1.1)).round()))
                .collect();
            HistoryRow { start, end: start + HISTORY_INTERVAL, flows }
        })
        .collect()
}

fn detector_cycle(rng: &mut SmallRng, ts: i64) -> (TrafficFlowRecord, QueueRecord) {
    let hour = hour_of(ts);
    let cycle_share = CYCLE_SECS as f64 / 3_600.0;
    let volumes: Vec<LaneVolume> = DEMAND
        .iter()
        .map(|d| LaneVolume {
            lane_no: d.lane,
            volume:  (d.expected(hour) * cycle_share * rng.gen_range(0.85..1.15)).round() as u32,
        })
        .collect();
    let queues = volumes
        .iter()
        .map(|v| {
            let queue_num = v.volume / 3;
            LaneQueue {
                lane_no: v.lane_no,
                queue:   QueueSample { queue_num, queue_length: f64::from(queue_num) * 6.5 },
            }
        })
        .collect();
    (
        TrafficFlowRecord { cycle_start_time: ts, cycle_time: CYCLE_SECS as f64, lanes: volumes },
        QueueRecord { lanes: queues },
    )
}

// ── Sink wrapper to count and fan out ─────────────────────────────────────────

struct TeeSink<A: PublishSink, B: PublishSink> {
    first:  A,
    second: B,
    flows:  usize,
    signs:  usize,
}

impl<A: PublishSink, B: PublishSink> TeeSink<A, B> {
    fn new(first: A, second: B) -> Self {
        Self { first, second, flows: 0, signs: 0 }
    }
}

impl<A: PublishSink, B: PublishSink> PublishSink for TeeSink<A, B> {
    fn publish_flow(&mut self, snapshot: &FlowSnapshot) -> Result<(), PublishError> {
        self.flows += 1;
        let a = self.first.publish_flow(snapshot);
        let b = self.second.publish_flow(snapshot);
        a.and(b)
    }

    fn publish_signs(&mut self, snapshot: &SignSnapshot) -> Result<(), PublishError> {
        self.signs += 1;
        let a = self.first.publish_signs(snapshot);
        let b = self.second.publish_signs(snapshot);
        a.and(b)
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1) {
        Some(path) => ControllerConfig::load_json(Path::new(path))?,
        None => ControllerConfig::default(),
    };
    let clock = config.clock()?;
    let mut rng = SmallRng::seed_from_u64(SEED);

    println!("=== replay — adaptive variable lanes ===");
    println!(
        "Window: {} s  |  Clock: {}  |  Seed: {SEED}",
        config.update_interval_secs, clock
    );
    println!();

    // 1. History.
    let history = match args.get(2) {
        Some(path) => load_history_csv(Path::new(path))?,
        None => synthetic_history(&mut rng),
    };
    println!("History: {} rows", history.len());

    // 2. Profiles.
    let calendar = DateCalendar::new();
    let t0 = Instant::now();
    let profiles = HistoryProfiles::train(&history, &calendar, &clock, BUCKET_HOURS)?;
    println!(
        "Profiles: {} lanes × {} buckets, trained in {:.3} s",
        profiles.len(),
        (24.0 / BUCKET_HOURS) as usize,
        t0.elapsed().as_secs_f64()
    );

    // 3. Schedule from segmentation.
    let (_, rows) = profiles.flow_matrix(DateType::Weekday);
    let matrix = FlowMatrix::new(&rows)?;
    let (segments, partition) = partition_acceleration(&matrix, MAX_SEGMENTS)?;
    let intervals = breakpoints_to_hours(&partition.breakpoints, matrix.columns(), BUCKET_HOURS);
    info!(segments, cost = partition.cost, "weekday profile segmented");
    let schedule = DaySchedule::from_intervals(&intervals, intersection::mapping_for)?;
    println!("Schedule: {segments} intervals");
    for (start, end) in &intervals {
        let peak = intersection::mapping_for(*start, *end) == intersection::peak_mapping();
        println!("  {start:>5.1} – {end:>5.1} h  {}", if peak { "peak" } else { "base" });
    }
    println!();

    // 4. Controller.
    let strategy = DynamicSchedule::new(schedule, Arc::new(profiles), calendar);
    let mut controller = ControllerBuilder::new(config.clone(), strategy)
        .variance_lane(intersection::east_lane()?)
        .variance_lane(intersection::west_lane()?)
        .build()?;

    // 5. Replay.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let dir = Path::new(OUTPUT_DIR);
    let messages = JsonLinesSink::new(BufWriter::new(File::create(dir.join("messages.jsonl"))?));
    let mut sink = TeeSink::new(CsvSink::new(dir)?, messages);
    let mut recorder = HistoryRecorder::new(config.update_interval_secs)?;

    let mut switches: Vec<(f64, BTreeMap<String, String>)> = Vec::new();
    let t0 = Instant::now();
    for ts in (REPLAY_START..REPLAY_START + 86_400).step_by(CYCLE_SECS as usize) {
        let (flow, queue) = detector_cycle(&mut rng, ts);
        recorder.record(&flow);
        controller.ingest_queue(&queue);
        if let Some(report) = controller.ingest(&flow, &mut sink)? {
            if report.changed {
                let states = controller
                    .variance_lanes()
                    .flat_map(|v| v.signs().iter().map(move |s| (v.direction().to_string(), s.current_turn().to_string())))
                    .collect();
                switches.push((report.hour, states));
            }
        }
    }
    sink.first.finish()?;
    let rows = recorder.finish();
    write_history_csv(&rows, &dir.join("history.csv"))?;

    // 6. Summary.
    println!("Replay complete in {:.3} s", t0.elapsed().as_secs_f64());
    println!("  lane_flows.csv   : {} windows", sink.flows);
    println!("  sign_changes.csv : {} switches", sink.signs);
    println!("  history.csv      : {} rows", rows.len());
    println!();

    println!("{:<8} {:<10} {:<10}", "Hour", "East", "West");
    println!("{}", "-".repeat(28));
    for (hour, states) in &switches {
        let show = |d: &str| states.get(d).map_or("-", String::as_str).to_owned();
        println!("{:<8.1} {:<10} {:<10}", hour, show("east"), show("west"));
    }

    Ok(())
}
