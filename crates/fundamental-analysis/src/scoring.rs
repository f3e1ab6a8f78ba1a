//! Five-step composite rating.

use analysis_core::{AnalysisResult, AnalysisStep, Evaluation, GrowthSeries, InvestmentMetric};

use crate::metrics::{NET_INCOME_LABEL, OPERATING_INCOME_LABEL, REVENUE_LABEL};

/// Growth in percent: >20 → 5, >10 → 4, >5 → 3, >0 → 2, otherwise 1.
pub fn score_growth(growth: Option<f64>) -> u32 {
    match growth {
        Some(g) if g > 20.0 => 5,
        Some(g) if g > 10.0 => 4,
        Some(g) if g > 5.0 => 3,
        Some(g) if g > 0.0 => 2,
        _ => 1,
    }
}

/// Return on equity in percent: >20 → 5, >15 → 4, >10 → 3, >5 → 2, otherwise 1.
pub fn score_roe(roe: Option<f64>) -> u32 {
    match roe {
        Some(r) if r > 20.0 => 5,
        Some(r) if r > 15.0 => 4,
        Some(r) if r > 10.0 => 3,
        Some(r) if r > 5.0 => 2,
        _ => 1,
    }
}

/// Debt-to-equity in percent, lower is better: <50 → 5, <100 → 4, <150 → 3, <200 → 2.
pub fn score_debt_to_equity(ratio: Option<f64>) -> u32 {
    match ratio {
        Some(d) if d < 50.0 => 5,
        Some(d) if d < 100.0 => 4,
        Some(d) if d < 150.0 => 3,
        Some(d) if d < 200.0 => 2,
        _ => 1,
    }
}

fn step(label: &str, value: Option<f64>, score: u32, description: &str) -> AnalysisStep {
    AnalysisStep {
        label: label.to_string(),
        value,
        score,
        description: description.to_string(),
    }
}

/// Score the most recent metrics. `latest` is the newest investment metric
/// (if any); growth values come from the last entry of each dataset.
pub fn score(latest: Option<&InvestmentMetric>, growth: &GrowthSeries) -> AnalysisResult {
    let latest_growth = |label: &str| growth.dataset(label).and_then(|d| d.latest());

    let revenue = latest_growth(REVENUE_LABEL);
    let operating = latest_growth(OPERATING_INCOME_LABEL);
    let net = latest_growth(NET_INCOME_LABEL);
    let roe = latest.and_then(|m| m.roe);
    let debt = latest.and_then(|m| m.debt_to_equity);

    let steps = vec![
        step(
            "Revenue growth",
            revenue,
            score_growth(revenue),
            "Year-over-year change in revenue (%)",
        ),
        step(
            "Operating income growth",
            operating,
            score_growth(operating),
            "Year-over-year change in operating income (%)",
        ),
        step(
            "Net income growth",
            net,
            score_growth(net),
            "Year-over-year change in net income (%)",
        ),
        step(
            "Return on equity",
            roe,
            score_roe(roe),
            "Net income relative to stockholders' equity (%)",
        ),
        step(
            "Debt to equity",
            debt,
            score_debt_to_equity(debt),
            "Total liabilities relative to stockholders' equity (%), lower is better",
        ),
    ];

    let total_score: u32 = steps.iter().map(|s| s.score).sum();
    let evaluation = Evaluation::from_score(total_score);

    AnalysisResult {
        total_score,
        evaluation,
        evaluation_label: evaluation.to_label().to_string(),
        evaluation_color: evaluation.color().to_string(),
        steps,
    }
}
