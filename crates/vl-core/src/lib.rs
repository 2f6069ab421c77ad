//! `vl-core` — foundational types for the variable-lane control engine.
//!
//! This crate is a dependency of every other `vl-*` crate.  It has no `vl-*`
//! dependencies and minimal external ones (`chrono` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`ids`]        | `LaneId`, `SignId`                                        |
//! | [`movement`]   | `Direction`, `Turn`, `Decomposition`, `Movement`          |
//! | [`demand`]     | `TurnDemand`, `GreenSplit`, design saturation flows       |
//! | [`route`]      | `accumulate_movement_flow` (route-demand synthesis)       |
//! | [`time`]       | `LocalClock`, `hourly_rate`                               |
//! | [`error`]      | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod demand;
pub mod error;
pub mod ids;
pub mod movement;
pub mod route;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use demand::{GreenSplit, TurnDemand, design_saturation_flow, vehicle_mix_factor};
pub use error::{CoreError, CoreResult};
pub use ids::{LaneId, SignId};
pub use movement::{Decomposition, Direction, Movement, Turn};
pub use route::accumulate_movement_flow;
pub use time::{LocalClock, hourly_rate};
