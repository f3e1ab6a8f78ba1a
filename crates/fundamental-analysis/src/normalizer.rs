//! Flattens a company-facts document into dated records and the
//! year-indexed aggregate tables.

use analysis_core::{AnalysisError, AnnualAggregate, CompanyFacts, FlatRecord, QuarterlyAggregate};

use crate::ConceptTable;

/// Output of one normalization pass.
#[derive(Debug, Clone, Default)]
pub struct NormalizedFacts {
    /// Records inside the display window, newest filing first
    pub records: Vec<FlatRecord>,
    pub annual: AnnualAggregate,
    pub quarterly: QuarterlyAggregate,
    /// First fiscal year of the display window
    pub display_from: i32,
}

/// Normalize `facts` for a lookback of `years` ending at `current_year`.
///
/// Records cover fiscal years `>= current_year - years`. The aggregates reach
/// one year further back so the first displayed year still has a prior year
/// to grow from.
pub fn normalize(
    facts: &CompanyFacts,
    cik: &str,
    company_name: &str,
    years: u32,
    current_year: i32,
    table: &ConceptTable,
) -> Result<NormalizedFacts, AnalysisError> {
    if years == 0 {
        return Err(AnalysisError::InvalidInput(
            "Lookback must be at least one year".to_string(),
        ));
    }
    let lookback = i32::try_from(years)
        .map_err(|_| AnalysisError::InvalidInput(format!("Lookback too large: {}", years)))?;

    let display_from = current_year - lookback;
    let calc_from = display_from - 1;

    let mut records = Vec::new();
    let mut annual = AnnualAggregate::new();
    let mut quarterly = QuarterlyAggregate::new();

    for (concept, concept_facts) in facts.us_gaap() {
        let description = concept_facts
            .description
            .clone()
            .or_else(|| concept_facts.label.clone())
            .unwrap_or_default();

        for (unit, observations) in &concept_facts.units {
            let aggregates_unit = *unit == table.base_unit;

            for obs in observations {
                let Some(fiscal_year) = obs.fiscal_year else {
                    continue;
                };
                if fiscal_year < calc_from {
                    continue;
                }

                if fiscal_year >= display_from {
                    records.push(FlatRecord {
                        company_name: company_name.to_string(),
                        cik: cik.to_string(),
                        concept: concept.clone(),
                        description: description.clone(),
                        unit: unit.clone(),
                        value: obs.value,
                        start: obs.start,
                        end: obs.end,
                        fiscal_year,
                        fiscal_period: obs.fiscal_period.clone(),
                        form: obs.form.clone(),
                        filed: obs.filed,
                    });
                }

                if !aggregates_unit {
                    continue;
                }
                if obs.form == table.annual_form {
                    annual.record(fiscal_year, concept, obs.value, obs.filed);
                } else if obs.form == table.quarterly_form {
                    if let Some(period) = obs.fiscal_period.as_deref() {
                        quarterly.record(fiscal_year, period, concept, obs.value, obs.filed);
                    }
                }
            }
        }
    }

    // Stable: equal filing dates keep document order
    records.sort_by(|a, b| b.filed.cmp(&a.filed));

    tracing::debug!(
        "Normalized {} records for CIK {} (fiscal years {}..={})",
        records.len(),
        cik,
        display_from,
        current_year
    );

    Ok(NormalizedFacts {
        records,
        annual,
        quarterly,
        display_from,
    })
}
