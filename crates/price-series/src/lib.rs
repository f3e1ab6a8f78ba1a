use analysis_core::{PricePoint, StockChartData, StockChartPoint};
use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use std::collections::BTreeMap;

/// Epoch milliseconds of UTC midnight on `date`.
pub fn epoch_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Sunday closing the Monday-starting week that contains `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    let remaining = 6 - u64::from(date.weekday().num_days_from_monday());
    date.checked_add_days(Days::new(remaining)).unwrap_or(date)
}

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// Deduplicate by date (the last entry for a date wins) and sort ascending.
pub fn dedupe_by_date(points: Vec<PricePoint>) -> Vec<PricePoint> {
    let mut by_date = BTreeMap::new();
    for p in points {
        by_date.insert(p.date, p.close_value);
    }

    by_date
        .into_iter()
        .map(|(date, close_value)| PricePoint { date, close_value })
        .collect()
}

/// Keep the last point of every run sharing the same period key.
/// `daily` must be sorted ascending, so runs never interleave.
fn last_per_period<F>(daily: &[PricePoint], period_key: F) -> Vec<StockChartPoint>
where
    F: Fn(NaiveDate) -> NaiveDate,
{
    let mut out: Vec<StockChartPoint> = Vec::new();
    let mut current: Option<NaiveDate> = None;

    for point in daily {
        let key = period_key(point.date);
        let chart_point = StockChartPoint {
            x: epoch_millis(point.date),
            y: point.close_value,
        };

        if current == Some(key) {
            if let Some(last) = out.last_mut() {
                *last = chart_point;
                continue;
            }
        }
        current = Some(key);
        out.push(chart_point);
    }

    out
}

/// Build the daily, weekly and monthly close series.
///
/// Weekly and monthly points are the last trading day of each period,
/// positioned at that day.
pub fn build_chart_data(points: Vec<PricePoint>) -> StockChartData {
    if points.is_empty() {
        return StockChartData::default();
    }

    let raw_len = points.len();
    let daily = dedupe_by_date(points);
    if daily.len() < raw_len {
        tracing::debug!("Dropped {} duplicate price dates", raw_len - daily.len());
    }

    StockChartData {
        daily: daily
            .iter()
            .map(|p| StockChartPoint { x: epoch_millis(p.date), y: p.close_value })
            .collect(),
        weekly: last_per_period(&daily, week_end),
        monthly: last_per_period(&daily, month_end),
    }
}
