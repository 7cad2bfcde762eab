//! Price validation and repair for the pricewatch system.
//!
//! This crate handles:
//! - OHLC consistency checks
//! - Day-over-day, trailing-average and absolute-bound checks
//! - Anchor-based interpolation of rejected bars
//! - Batch validation against a persisted context window
//! - Live-price trade gating

pub mod structural;
pub mod statistical;
pub mod interpolator;
pub mod anchors;
pub mod validator;
pub mod pipeline;
pub mod gate;

pub use structural::check_structure;
pub use statistical::StatisticalValidator;
pub use interpolator::interpolate;
pub use validator::PriceValidator;
pub use pipeline::{RepairFailure, RepairOutcome, RepairReport};
pub use gate::{GateDecision, TradeGate};
