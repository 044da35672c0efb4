//! Price source trait.
//!
//! One source serves one category. The fetcher owns the fallback logic, so
//! a source only has to report the live value or an error.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mwlite_core::{Period, PricePoint};

use crate::error::{FetchError, FetchResult};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Upstream provider of live values.
pub trait PriceSource: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// False when credentials are missing; the fetcher then skips the live
    /// attempt entirely.
    fn is_configured(&self) -> bool;

    /// Fetch the current value and the period's comparison value.
    fn fetch<'a>(&'a self, symbol: &'a str, period: Period) -> BoxFuture<'a, FetchResult<PricePoint>>;
}

/// Arc wrapper for PriceSource trait objects.
pub type DynPriceSource = Arc<dyn PriceSource>;

/// Scripted source for tests and offline runs.
///
/// Answers from a per-symbol table; symbols without an entry fail with a
/// transport error. Records every call.
#[derive(Debug)]
pub struct ScriptedPriceSource {
    /// (current, previous) or an error message, keyed by uppercase symbol.
    responses: parking_lot::Mutex<HashMap<String, Result<(f64, f64), String>>>,
    calls: parking_lot::Mutex<Vec<(String, Period)>>,
    configured: AtomicBool,
}

impl Default for ScriptedPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedPriceSource {
    pub fn new() -> Self {
        Self {
            responses: parking_lot::Mutex::new(HashMap::new()),
            calls: parking_lot::Mutex::new(Vec::new()),
            configured: AtomicBool::new(true),
        }
    }

    /// Answer `symbol` with the given values.
    pub fn set_values(&self, symbol: &str, current: f64, previous: f64) {
        self.responses
            .lock()
            .insert(symbol.to_ascii_uppercase(), Ok((current, previous)));
    }

    /// Fail `symbol` with `message`.
    pub fn set_error(&self, symbol: &str, message: impl Into<String>) {
        self.responses
            .lock()
            .insert(symbol.to_ascii_uppercase(), Err(message.into()));
    }

    pub fn set_configured(&self, configured: bool) {
        self.configured.store(configured, Ordering::SeqCst);
    }

    /// Recorded calls, oldest first.
    pub fn calls(&self) -> Vec<(String, Period)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

impl PriceSource for ScriptedPriceSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        self.configured.load(Ordering::SeqCst)
    }

    fn fetch<'a>(&'a self, symbol: &'a str, period: Period) -> BoxFuture<'a, FetchResult<PricePoint>> {
        Box::pin(async move {
            self.calls.lock().push((symbol.to_string(), period));
            let response = self.responses.lock().get(&symbol.to_ascii_uppercase()).cloned();
            match response {
                Some(Ok((current, previous))) => Ok(PricePoint::new(symbol, current, previous)),
                Some(Err(message)) => Err(FetchError::Transport(message)),
                None => Err(FetchError::Transport(format!("no scripted value for {symbol}"))),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_source_answers_and_records() {
        let source = ScriptedPriceSource::new();
        source.set_values("btc", 110.0, 100.0);
        source.set_error("ETH", "boom");

        let point = source.fetch("BTC", Period::Recent).await.unwrap();
        assert_eq!(point.current_value, 110.0);
        assert!(matches!(
            source.fetch("ETH", Period::YearToDate).await,
            Err(FetchError::Transport(_))
        ));
        assert!(source.fetch("SOL", Period::Recent).await.is_err());

        assert_eq!(source.call_count(), 3);
        assert_eq!(source.calls()[1], ("ETH".to_string(), Period::YearToDate));
    }
}
