//! Per-year investment ratios and year-over-year growth series.

use analysis_core::{AnnualAggregate, GrowthDataset, GrowthSeries, InvestmentMetric};

use crate::ConceptTable;

pub const REVENUE_LABEL: &str = "Revenue";
pub const OPERATING_INCOME_LABEL: &str = "Operating Income";
pub const NET_INCOME_LABEL: &str = "Net Income";

pub fn calculate_roe(net_income: f64, equity: f64) -> Option<f64> {
    if equity > 0.0 {
        Some((net_income / equity) * 100.0)
    } else {
        None
    }
}

pub fn calculate_roa(net_income: f64, assets: f64) -> Option<f64> {
    if assets > 0.0 {
        Some((net_income / assets) * 100.0)
    } else {
        None
    }
}

/// Liabilities over equity, in percent.
pub fn calculate_debt_to_equity(liabilities: f64, equity: f64) -> Option<f64> {
    if equity > 0.0 {
        Some((liabilities / equity) * 100.0)
    } else {
        None
    }
}

/// Change from `previous` to `current` relative to |previous|, in percent.
pub fn calculate_growth(current: f64, previous: f64) -> Option<f64> {
    if previous != 0.0 {
        Some((current - previous) / previous.abs() * 100.0)
    } else {
        None
    }
}

fn display_years(annual: &AnnualAggregate, from_year: i32) -> Vec<i32> {
    annual.years().filter(|y| *y >= from_year).collect()
}

/// Investment ratios for every aggregate year `>= from_year`, most recent first.
pub fn investment_metrics(
    annual: &AnnualAggregate,
    from_year: i32,
    table: &ConceptTable,
) -> Vec<InvestmentMetric> {
    let mut metrics: Vec<InvestmentMetric> = display_years(annual, from_year)
        .into_iter()
        .map(|year| {
            let net_income = annual.value(year, &table.net_income);
            let equity = annual.value(year, &table.stockholders_equity);
            let assets = annual.value(year, &table.total_assets);
            let liabilities = annual.value(year, &table.total_liabilities);

            InvestmentMetric {
                year,
                roe: net_income.zip(equity).and_then(|(n, e)| calculate_roe(n, e)),
                roa: net_income.zip(assets).and_then(|(n, a)| calculate_roa(n, a)),
                debt_to_equity: liabilities
                    .zip(equity)
                    .and_then(|(l, e)| calculate_debt_to_equity(l, e)),
            }
        })
        .collect();

    metrics.reverse();
    metrics
}

fn growth_dataset<F>(label: &str, years: &[i32], lookup: F) -> GrowthDataset
where
    F: Fn(i32) -> Option<f64>,
{
    let (data, defined) = years
        .iter()
        .map(|&year| {
            match lookup(year)
                .zip(lookup(year - 1))
                .and_then(|(current, previous)| calculate_growth(current, previous))
            {
                Some(growth) => (growth, true),
                None => (0.0, false),
            }
        })
        .unzip();

    GrowthDataset {
        label: label.to_string(),
        data,
        defined,
    }
}

/// Revenue, operating income and net income growth aligned to ascending
/// year labels. The year before `from_year` is only used as a base.
pub fn growth_series(annual: &AnnualAggregate, from_year: i32, table: &ConceptTable) -> GrowthSeries {
    let years = display_years(annual, from_year);

    let datasets = vec![
        growth_dataset(REVENUE_LABEL, &years, |y| {
            annual.first_of(y, &table.revenue).map(|v| v.value)
        }),
        growth_dataset(OPERATING_INCOME_LABEL, &years, |y| {
            annual.value(y, &table.operating_income)
        }),
        growth_dataset(NET_INCOME_LABEL, &years, |y| annual.value(y, &table.net_income)),
    ];

    GrowthSeries {
        labels: years.iter().map(|y| y.to_string()).collect(),
        datasets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn filed() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    fn aggregate(rows: &[(i32, &str, f64)]) -> AnnualAggregate {
        let mut annual = AnnualAggregate::new();
        for (year, concept, value) in rows {
            annual.record(*year, concept, *value, filed());
        }
        annual
    }

    #[test]
    fn test_roe_example() {
        let annual = aggregate(&[
            (2022, "NetIncomeLoss", 100.0),
            (2022, "StockholdersEquity", 1000.0),
            (2023, "NetIncomeLoss", 150.0),
            (2023, "StockholdersEquity", 1000.0),
        ]);
        let table = ConceptTable::default();

        let metrics = investment_metrics(&annual, 2022, &table);
        assert_eq!(metrics.iter().map(|m| m.year).collect::<Vec<_>>(), vec![2023, 2022]);
        assert_relative_eq!(metrics[0].roe.unwrap(), 15.0);
        assert!(metrics[0].roa.is_none());

        let growth = growth_series(&annual, 2022, &table);
        let revenue = growth.dataset(REVENUE_LABEL).unwrap();
        assert_eq!(revenue.data, vec![0.0, 0.0]);
        assert_eq!(revenue.defined, vec![false, false]);

        let net = growth.dataset(NET_INCOME_LABEL).unwrap();
        assert_relative_eq!(net.data[1], 50.0);
        assert_eq!(net.defined, vec![false, true]);
    }

    #[test]
    fn test_non_positive_equity_leaves_ratios_undefined() {
        for equity in [0.0, -250.0] {
            let annual = aggregate(&[
                (2023, "NetIncomeLoss", 150.0),
                (2023, "StockholdersEquity", equity),
                (2023, "Liabilities", 900.0),
                (2023, "Assets", 3000.0),
            ]);
            let metrics = investment_metrics(&annual, 2023, &ConceptTable::default());
            assert!(metrics[0].roe.is_none());
            assert!(metrics[0].debt_to_equity.is_none());
            assert_relative_eq!(metrics[0].roa.unwrap(), 5.0);
        }
    }

    #[test]
    fn test_growth_uses_year_before_window_and_absolute_base() {
        let annual = aggregate(&[
            (2021, "OperatingIncomeLoss", -200.0),
            (2022, "OperatingIncomeLoss", -100.0),
            (2023, "OperatingIncomeLoss", 0.0),
            (2024, "OperatingIncomeLoss", 50.0),
        ]);
        let growth = growth_series(&annual, 2022, &ConceptTable::default());
        assert_eq!(growth.labels, vec!["2022", "2023", "2024"]);

        let op = growth.dataset(OPERATING_INCOME_LABEL).unwrap();
        assert_relative_eq!(op.data[0], 50.0);
        assert_relative_eq!(op.data[1], 100.0);
        // Zero base: not computable
        assert_eq!(op.data[2], 0.0);
        assert_eq!(op.defined, vec![true, true, false]);
    }

    #[test]
    fn test_revenue_falls_back_through_chain() {
        let annual = aggregate(&[
            (2022, "SalesRevenueNet", 200.0),
            (2023, "RevenueFromContractWithCustomerExcludingAssessedTax", 250.0),
        ]);
        let growth = growth_series(&annual, 2023, &ConceptTable::default());
        let revenue = growth.dataset(REVENUE_LABEL).unwrap();
        assert_relative_eq!(revenue.latest().unwrap(), 25.0);
    }

    #[test]
    fn test_debt_to_equity_in_percent() {
        assert_relative_eq!(calculate_debt_to_equity(500.0, 1000.0).unwrap(), 50.0);
        assert!(calculate_roa(10.0, 0.0).is_none());
        assert!(calculate_growth(10.0, 0.0).is_none());
    }
}
