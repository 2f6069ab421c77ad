//! `vl-lane` — the variable-lane decision engine.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`allocation`] | `LaneAllocation` (candidate search), `PriorityWindow`        |
//! | [`sign`]       | `Vms`, `SignRenderer`, `LaneTurnRenderer`                    |
//! | [`thresholds`] | `SwitchThresholds` — the hysteresis band                     |
//! | [`variance`]   | `VarianceLane`, its builder, `SwitchDecision`, `DemandUpdate` |
//! | [`error`]      | `LaneError`, `LaneResult<T>`                                 |
//!
//! # Decision cycle
//!
//! Once per update window the controller hands fresh per-turn demand to
//! each [`VarianceLane`] through [`VarianceLane::plan`], then applies every
//! plan with [`VarianceLane::commit`].  For every sign
//! on the approach the engine projects saturations under the current lane
//! allocation and under the allocation the *other* sign state would produce,
//! and flips the sign only when the projection clears the hysteresis band.

pub mod allocation;
pub mod error;
pub mod sign;
pub mod thresholds;
pub mod variance;

#[cfg(test)]
mod tests;

pub use allocation::{LaneAllocation, PriorityWindow, TurnAllocation};
pub use error::{LaneError, LaneResult};
pub use sign::{LaneTurnRenderer, SignRecord, SignRenderer, Vms};
pub use thresholds::SwitchThresholds;
pub use variance::{DemandUpdate, SwitchDecision, VarianceLane, VarianceLaneBuilder};
