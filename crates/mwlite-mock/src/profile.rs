//! Base values for mock data, keyed by symbol.

use mwlite_core::Category;

/// Static description of one mockable symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockProfile {
    /// Canonical symbol.
    pub symbol: &'static str,
    /// Display label.
    pub label: &'static str,
    pub category: Category,
    /// Centre value the mock current value moves around.
    pub base: f64,
    /// Other spellings callers use for the same symbol.
    pub aliases: &'static [&'static str],
}

const fn profile(
    symbol: &'static str,
    label: &'static str,
    category: Category,
    base: f64,
    aliases: &'static [&'static str],
) -> MockProfile {
    MockProfile {
        symbol,
        label,
        category,
        base,
        aliases,
    }
}

static PROFILES: &[MockProfile] = &[
    // Crypto (USD)
    profile("BTC", "Bitcoin", Category::Crypto, 65_000.00, &["BITCOIN"]),
    profile("ETH", "Ethereum", Category::Crypto, 3_500.00, &["ETHEREUM"]),
    profile("SOL", "Solana", Category::Crypto, 150.00, &["SOLANA"]),
    profile("XRP", "XRP", Category::Crypto, 0.52, &["RIPPLE"]),
    profile("ADA", "Cardano", Category::Crypto, 0.45, &["CARDANO"]),
    profile("DOGE", "Dogecoin", Category::Crypto, 0.15, &["DOGECOIN"]),
    // Equity indices
    profile("^GSPC", "S&P 500", Category::EquityIndex, 5_400.50, &["S&P 500", "SP500"]),
    profile("^IXIC", "NASDAQ Composite", Category::EquityIndex, 17_500.20, &["NASDAQ"]),
    profile("^FTSE", "FTSE 100", Category::EquityIndex, 8_200.00, &["FTSE 100"]),
    profile("^GDAXI", "DAX Performance Index", Category::EquityIndex, 18_300.75, &["DAX"]),
    profile("^FCHI", "CAC 40", Category::EquityIndex, 7_600.00, &["CAC 40"]),
    profile("^N225", "Nikkei 225", Category::EquityIndex, 38_500.00, &["NIKKEI 225", "NIKKEI"]),
    profile("^HSI", "Hang Seng Index", Category::EquityIndex, 18_000.50, &["HANG SENG"]),
    profile("000001.SS", "Shanghai Composite", Category::EquityIndex, 3_000.00, &["SHANGHAI COMPOSITE"]),
    profile("^NSEI", "Nifty 50", Category::EquityIndex, 23_500.00, &["NIFTY 50", "NIFTY"]),
    profile("^STI", "Straits Times Index", Category::EquityIndex, 3_300.00, &["STI"]),
    // Forex
    profile("EURUSD", "EUR/USD", Category::Forex, 1.0850, &["EUR/USD"]),
    profile("USDJPY", "USD/JPY", Category::Forex, 157.20, &["USD/JPY"]),
    profile("GBPUSD", "GBP/USD", Category::Forex, 1.2730, &["GBP/USD"]),
    profile("AUDUSD", "AUD/USD", Category::Forex, 0.6650, &["AUD/USD"]),
    profile("USDCAD", "USD/CAD", Category::Forex, 1.3720, &["USD/CAD"]),
    // Treasury yields (percent)
    profile("US3M", "US 3-Month Treasury", Category::Bond, 5.25, &["US 3-MONTH TREASURY"]),
    profile("US2Y", "US 2-Year Treasury", Category::Bond, 4.70, &["US 2-YEAR TREASURY"]),
    profile("US5Y", "US 5-Year Treasury", Category::Bond, 4.30, &["US 5-YEAR TREASURY"]),
    profile("US10Y", "US 10-Year Treasury", Category::Bond, 4.25, &["US 10-YEAR TREASURY"]),
    profile("US30Y", "US 30-Year Treasury", Category::Bond, 4.40, &["US 30-YEAR TREASURY"]),
];

/// Find the profile for `identifier` within `category`.
///
/// Matching is case-insensitive over the symbol and its aliases.
pub fn lookup(identifier: &str, category: Category) -> Option<&'static MockProfile> {
    let wanted = identifier.trim().to_ascii_uppercase();
    PROFILES.iter().find(|p| {
        p.category == category
            && (p.symbol == wanted || p.aliases.iter().any(|alias| *alias == wanted))
    })
}

/// Base value for symbols missing from the table.
pub fn default_base(category: Category) -> f64 {
    match category {
        Category::Crypto => 1_000.0,
        Category::EquityIndex => 10_000.0,
        Category::Forex => 1.0,
        Category::Bond => 4.0,
    }
}
