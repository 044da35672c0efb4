//! Mock point generation.

use crate::profile::{default_base, lookup};
use mwlite_core::{Category, Period, PricePoint, SymbolRequest};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Jitter applied to the base value to produce the mock current value (%).
const CURRENT_JITTER_PCT: f64 = 0.5;

/// Bond yields are clamped to this range (percentage points).
const BOND_RANGE: (f64, f64) = (0.0, 15.0);

/// Maximum move between previous and current value for one category.
///
/// Relative (%) for prices, absolute percentage points for bond yields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockBands {
    pub recent: f64,
    pub year_to_date: f64,
}

impl MockBands {
    /// Bands used for `category`.
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Crypto | Category::EquityIndex | Category::Forex => Self {
                recent: 5.0,
                year_to_date: 25.0,
            },
            Category::Bond => Self {
                recent: 0.25,
                year_to_date: 1.0,
            },
        }
    }

    pub fn for_period(&self, period: Period) -> f64 {
        match period {
            Period::Recent => self.recent,
            Period::YearToDate => self.year_to_date,
        }
    }
}

/// Generates structurally complete mock points.
///
/// The RNG sits behind a mutex so one generator can be shared by every
/// concurrent fetch.
pub struct MockGenerator {
    rng: Mutex<StdRng>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerator {
    /// Create a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a reproducible generator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Produce a mock point for `request` over `period`.
    pub fn generate(&self, request: &SymbolRequest, period: Period) -> PricePoint {
        let category = request.category();
        let (label, base) = match lookup(request.identifier(), category) {
            Some(profile) => (profile.label.to_string(), profile.base),
            None => (request.identifier().to_string(), default_base(category)),
        };
        let band = MockBands::for_category(category).for_period(period);

        let (current, drift) = {
            let mut rng = self.rng.lock();
            let current = base * (1.0 + rng.gen_range(-1.0_f64..=1.0) * CURRENT_JITTER_PCT / 100.0);
            let drift: f64 = rng.gen_range(-1.0_f64..=1.0) * band;
            (current, drift)
        };

        let (current, previous) = match category {
            Category::Bond => {
                let current = current.clamp(BOND_RANGE.0, BOND_RANGE.1);
                let previous = (current + drift).clamp(BOND_RANGE.0, BOND_RANGE.1);
                (current, previous)
            }
            _ => (current, current * (1.0 + drift / 100.0)),
        };

        let decimals = decimals_for(category);
        let point = PricePoint::new(
            label,
            round_to(current, decimals),
            round_to(previous, decimals),
        );

        debug!(
            symbol = %request.identifier(),
            category = %category,
            period = %period,
            current = point.current_value,
            previous = point.previous_value,
            "Generated mock point"
        );

        point
    }
}

/// Display precision of mock values.
fn decimals_for(category: Category) -> i32 {
    match category {
        Category::Crypto | Category::EquityIndex => 2,
        Category::Forex => 4,
        Category::Bond => 3,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
