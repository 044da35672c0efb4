//! Synthetic fallback data for MarketWatch Lite.
//!
//! Used whenever a live provider errors or is not configured. The shape of
//! every point is fixed (base value looked up by symbol); only the values
//! move, within per-category bands.

pub mod generator;
pub mod profile;

pub use generator::{MockBands, MockGenerator};
pub use profile::{lookup, MockProfile};
