//! Series for the consolidated percent-change chart.

use mwlite_core::{Category, Period};
use serde::Serialize;

use crate::aggregate::{ItemState, ItemView};
use crate::format::format_number;

/// One bar/point of the overview chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub category: Category,
    /// Finite percent change only; infinite changes are left off the axis.
    pub percent_change: Option<f64>,
    pub current_value: Option<f64>,
    /// Yield in percent, plotted on its own axis (bonds only).
    pub rate: Option<f64>,
    pub tooltip: String,
    pub mock: bool,
}

/// Build the chart series, one point per item, in item order.
pub fn chart_series<'a, I>(items: I, period: Period) -> Vec<ChartPoint>
where
    I: IntoIterator<Item = &'a ItemView>,
{
    items
        .into_iter()
        .map(|item| chart_point(item, period))
        .collect()
}

fn chart_point(item: &ItemView, period: Period) -> ChartPoint {
    match &item.state {
        ItemState::Ready {
            current_value,
            percent_change,
            display_value,
            mock,
            ..
        } => {
            let finite_pct = Some(*percent_change).filter(|pct| pct.is_finite());
            let change_note = finite_pct
                .map(|pct| format!(" ({}% {})", format_number(pct, 2), period.label()))
                .unwrap_or_default();
            let (rate, tooltip) = match item.category {
                Category::Bond => (
                    Some(*current_value),
                    format!("{}% Rate{}", format_number(*current_value, 2), change_note),
                ),
                _ => (None, format!("{display_value}{change_note}")),
            };
            ChartPoint {
                name: item.label.clone(),
                category: item.category,
                percent_change: finite_pct,
                current_value: Some(*current_value),
                rate,
                tooltip,
                mock: *mock,
            }
        }
        ItemState::Error { .. } | ItemState::NoData => ChartPoint {
            name: item.label.clone(),
            category: item.category,
            percent_change: None,
            current_value: None,
            rate: None,
            tooltip: match item.state {
                ItemState::Error { .. } => "Error".to_string(),
                _ => "N/A".to_string(),
            },
            mock: false,
        },
    }
}
