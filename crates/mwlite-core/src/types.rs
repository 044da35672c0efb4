//! Request-side types: market category, comparison period, symbol request.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Market category of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Crypto,
    EquityIndex,
    Forex,
    Bond,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 4] = [
        Category::Crypto,
        Category::EquityIndex,
        Category::Forex,
        Category::Bond,
    ];

    /// Stable lowercase tag (used in logs and metric labels).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::EquityIndex => "equity-index",
            Self::Forex => "forex",
            Self::Bond => "bond",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crypto" => Ok(Self::Crypto),
            "equity-index" | "index" | "market" => Ok(Self::EquityIndex),
            "forex" | "fx" => Ok(Self::Forex),
            "bond" => Ok(Self::Bond),
            other => Err(CoreError::InvalidCategory(other.to_string())),
        }
    }
}

/// Comparison window for the previous value.
///
/// `Recent` compares against the prior-day close, `YearToDate` against the
/// first close of the calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    #[default]
    #[serde(alias = "24h")]
    Recent,
    #[serde(alias = "ytd")]
    YearToDate,
}

impl Period {
    /// Short label shown next to changes.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Recent => "24h",
            Self::YearToDate => "YTD",
        }
    }

    /// Stable tag matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::YearToDate => "year-to-date",
        }
    }

    /// The other period (the dashboard toggle).
    pub fn toggled(&self) -> Self {
        match self {
            Self::Recent => Self::YearToDate,
            Self::YearToDate => Self::Recent,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recent" | "24h" | "daily" => Ok(Self::Recent),
            "year-to-date" | "ytd" => Ok(Self::YearToDate),
            other => Err(CoreError::InvalidPeriod(other.to_string())),
        }
    }
}

/// A symbol to fetch and the category that decides which source serves it.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolRequest {
    identifier: String,
    category: Category,
}

impl SymbolRequest {
    pub fn new(identifier: impl Into<String>, category: Category) -> Self {
        Self {
            identifier: identifier.into(),
            category,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

impl std::fmt::Display for SymbolRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.category, self.identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parse_accepts_short_forms() {
        assert_eq!("24h".parse::<Period>().unwrap(), Period::Recent);
        assert_eq!("YTD".parse::<Period>().unwrap(), Period::YearToDate);
        assert_eq!("year-to-date".parse::<Period>().unwrap(), Period::YearToDate);
        assert!("weekly".parse::<Period>().is_err());
    }

    #[test]
    fn test_period_serde() {
        assert_eq!(
            serde_json::to_string(&Period::YearToDate).unwrap(),
            r#""year-to-date""#
        );
        let parsed: Period = serde_json::from_str(r#""ytd""#).unwrap();
        assert_eq!(parsed, Period::YearToDate);
    }

    #[test]
    fn test_period_toggle() {
        assert_eq!(Period::Recent.toggled(), Period::YearToDate);
        assert_eq!(Period::YearToDate.toggled(), Period::Recent);
    }

    #[test]
    fn test_category_serde_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Category::EquityIndex).unwrap(),
            r#""equity-index""#
        );
        assert_eq!("market".parse::<Category>().unwrap(), Category::EquityIndex);
    }

    #[test]
    fn test_symbol_request_display() {
        let req = SymbolRequest::new("BTC", Category::Crypto);
        assert_eq!(req.to_string(), "crypto:BTC");
        assert_eq!(req.identifier(), "BTC");
    }
}
