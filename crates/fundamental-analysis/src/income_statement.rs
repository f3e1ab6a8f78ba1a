use analysis_core::{
    AggregateValue, AnnualAggregate, IncomeStatementData, IncomeStatementRecord, QuarterlyAggregate,
};
use std::cmp::Reverse;

use crate::ConceptTable;

fn period_rank(period: Option<&str>) -> u8 {
    match period {
        Some("Q4") => 4,
        Some("Q3") => 3,
        Some("Q2") => 2,
        Some("Q1") => 1,
        _ => 0,
    }
}

fn row(
    year: i32,
    quarter: Option<&str>,
    revenue: Option<&AggregateValue>,
    operating_income: Option<&AggregateValue>,
    net_income: Option<&AggregateValue>,
) -> Option<IncomeStatementRecord> {
    let parts = [revenue, operating_income, net_income];
    let filed = parts.iter().flatten().map(|v| v.filed).max()?;

    Some(IncomeStatementRecord {
        year,
        quarter: quarter.map(str::to_string),
        revenue: revenue.map(|v| v.value),
        operating_income: operating_income.map(|v| v.value),
        net_income: net_income.map(|v| v.value),
        filed: Some(filed),
    })
}

/// Annual and quarterly revenue / operating income / net income for years
/// `>= from_year`, most recent first. Periods with none of the three are skipped.
pub fn build_income_statement(
    annual: &AnnualAggregate,
    quarterly: &QuarterlyAggregate,
    from_year: i32,
    table: &ConceptTable,
) -> IncomeStatementData {
    let mut annual_rows: Vec<IncomeStatementRecord> = annual
        .years()
        .filter(|year| *year >= from_year)
        .filter_map(|year| {
            row(
                year,
                None,
                annual.first_of(year, &table.revenue),
                annual.get(year, &table.operating_income),
                annual.get(year, &table.net_income),
            )
        })
        .collect();
    annual_rows.sort_by_key(|r| Reverse(r.year));

    let mut quarterly_rows: Vec<IncomeStatementRecord> = quarterly
        .periods()
        .filter(|(year, _)| *year >= from_year)
        .filter_map(|(year, period)| {
            row(
                year,
                Some(period),
                quarterly.first_of(year, period, &table.revenue),
                quarterly.get(year, period, &table.operating_income),
                quarterly.get(year, period, &table.net_income),
            )
        })
        .collect();
    quarterly_rows.sort_by_key(|r| Reverse((r.year, period_rank(r.quarter.as_deref()))));

    IncomeStatementData {
        annual: annual_rows,
        quarterly: quarterly_rows,
    }
}
