//! Change arithmetic shared by points and the presenter.
//!
//! Percent change from a zero previous value is defined rather than left as
//! NaN: a move away from zero is +/-infinity by the sign of the current
//! value, and zero to zero is no change.

use serde::{Deserialize, Serialize};

/// Average percent change beyond which a feed is not neutral.
pub const SENTIMENT_THRESHOLD_PCT: f64 = 0.1;

/// `current - previous`.
pub fn absolute_change(current: f64, previous: f64) -> f64 {
    current - previous
}

/// `(current - previous) / previous * 100`, with the zero-previous cases
/// mapped to +/-infinity or 0.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous != 0.0 {
        absolute_change(current, previous) / previous * 100.0
    } else if current > 0.0 {
        f64::INFINITY
    } else if current < 0.0 {
        f64::NEG_INFINITY
    } else {
        0.0
    }
}

/// Coarse direction of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    /// Bucket an average percent change.
    ///
    /// NaN (opposite infinities averaged together) buckets as neutral.
    pub fn from_average(average_pct: f64) -> Self {
        if average_pct > SENTIMENT_THRESHOLD_PCT {
            Self::Positive
        } else if average_pct < -SENTIMENT_THRESHOLD_PCT {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    /// Average the given percent changes and bucket the result.
    ///
    /// Empty input is neutral.
    pub fn from_changes<I>(changes: I) -> (Self, Option<f64>)
    where
        I: IntoIterator<Item = f64>,
    {
        let (sum, count) = changes
            .into_iter()
            .fold((0.0_f64, 0usize), |(sum, count), pct| (sum + pct, count + 1));

        if count == 0 {
            return (Self::Neutral, None);
        }

        let average = sum / count as f64;
        (Self::from_average(average), Some(average))
    }

    /// Numeric value for the sentiment gauge.
    pub fn as_gauge(&self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Neutral => 0.0,
            Self::Negative => -1.0,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Neutral => write!(f, "neutral"),
            Self::Negative => write!(f, "negative"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change_basic() {
        let pct = percent_change(110.0, 100.0);
        assert!((pct - 10.0).abs() < 1e-9);
        assert_eq!(format!("{pct:.2}"), "10.00");
    }

    #[test]
    fn test_percent_change_negative() {
        let pct = percent_change(95.0, 100.0);
        assert!((pct + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_percent_change_from_zero() {
        assert_eq!(percent_change(5.0, 0.0), f64::INFINITY);
        assert_eq!(percent_change(-5.0, 0.0), f64::NEG_INFINITY);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_absolute_change() {
        assert_eq!(absolute_change(110.0, 100.0), 10.0);
        assert_eq!(absolute_change(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_sentiment_buckets() {
        assert_eq!(Sentiment::from_average(0.5), Sentiment::Positive);
        assert_eq!(Sentiment::from_average(0.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_average(0.1), Sentiment::Neutral);
        assert_eq!(Sentiment::from_average(-0.1), Sentiment::Neutral);
        assert_eq!(Sentiment::from_average(-0.11), Sentiment::Negative);
        assert_eq!(Sentiment::from_average(f64::NAN), Sentiment::Neutral);
    }

    #[test]
    fn test_sentiment_from_changes() {
        let (sentiment, avg) = Sentiment::from_changes([0.4, 0.6]);
        assert_eq!(sentiment, Sentiment::Positive);
        assert!((avg.unwrap() - 0.5).abs() < 1e-9);

        let (sentiment, avg) = Sentiment::from_changes(Vec::<f64>::new());
        assert_eq!(sentiment, Sentiment::Neutral);
        assert!(avg.is_none());
    }

    #[test]
    fn test_sentiment_with_infinity() {
        let (sentiment, _) = Sentiment::from_changes([f64::INFINITY, -3.0]);
        assert_eq!(sentiment, Sentiment::Positive);

        let (sentiment, avg) = Sentiment::from_changes([f64::INFINITY, f64::NEG_INFINITY]);
        assert_eq!(sentiment, Sentiment::Neutral);
        assert!(avg.unwrap().is_nan());
    }
}
