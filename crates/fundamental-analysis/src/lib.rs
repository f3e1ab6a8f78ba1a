use analysis_core::{AnalysisError, CompanyAnalysis, CompanyFacts};
use chrono::{Datelike, Utc};

pub mod concepts;
pub mod income_statement;
pub mod metrics;
pub mod normalizer;
pub mod scoring;

pub use concepts::ConceptTable;
pub use income_statement::build_income_statement;
pub use metrics::{growth_series, investment_metrics};
pub use normalizer::{normalize, NormalizedFacts};
pub use scoring::score;

/// Turns a company-facts document into the full analysis bundle.
#[derive(Debug, Clone, Default)]
pub struct FundamentalAnalysisEngine {
    table: ConceptTable,
}

impl FundamentalAnalysisEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concepts(table: ConceptTable) -> Self {
        Self { table }
    }

    /// Analyze relative to the current calendar year.
    pub fn analyze_now(
        &self,
        facts: &CompanyFacts,
        cik: &str,
        company_name: &str,
        years: u32,
    ) -> Result<CompanyAnalysis, AnalysisError> {
        self.analyze(facts, cik, company_name, years, Utc::now().year())
    }

    /// Normalize, compute metrics, score and summarize in one pass.
    ///
    /// Fails with `InsufficientData` when nothing falls inside the display
    /// window, so callers can tell "no filings" apart from an all-worst score.
    pub fn analyze(
        &self,
        facts: &CompanyFacts,
        cik: &str,
        company_name: &str,
        years: u32,
        current_year: i32,
    ) -> Result<CompanyAnalysis, AnalysisError> {
        let normalized = normalize(facts, cik, company_name, years, current_year, &self.table)?;

        if normalized.records.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "No financial facts for CIK {} since fiscal year {}",
                cik, normalized.display_from
            )));
        }

        let investment_metrics = investment_metrics(&normalized.annual, normalized.display_from, &self.table);
        let growth = growth_series(&normalized.annual, normalized.display_from, &self.table);
        let analysis_result = score(investment_metrics.first(), &growth);
        let income_statement = build_income_statement(
            &normalized.annual,
            &normalized.quarterly,
            normalized.display_from,
            &self.table,
        );

        tracing::info!(
            "Analyzed CIK {}: {} records, {} metric years, score {}/25 ({})",
            cik,
            normalized.records.len(),
            investment_metrics.len(),
            analysis_result.total_score,
            analysis_result.evaluation_label
        );

        Ok(CompanyAnalysis {
            company_name: company_name.to_string(),
            cik: cik.to_string(),
            years,
            records: normalized.records,
            investment_metrics,
            growth,
            analysis_result,
            income_statement,
        })
    }
}
