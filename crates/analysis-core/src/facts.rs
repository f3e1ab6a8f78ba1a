//! Company-facts document as published by the regulator, plus the year-indexed
//! aggregate tables built from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Taxonomy holding the standard accounting concepts.
pub const US_GAAP: &str = "us-gaap";

/// Full company-facts document: taxonomy -> concept -> facts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyFacts {
    #[serde(default)]
    pub cik: Option<u64>,
    #[serde(default, rename = "entityName")]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub facts: BTreeMap<String, BTreeMap<String, ConceptFacts>>,
}

impl CompanyFacts {
    /// Concepts of the `us-gaap` taxonomy, empty when the taxonomy is absent.
    pub fn us_gaap(&self) -> impl Iterator<Item = (&String, &ConceptFacts)> {
        self.facts.get(US_GAAP).into_iter().flat_map(|concepts| concepts.iter())
    }
}

/// One accounting concept (e.g. `Revenues`) with its observations per unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConceptFacts {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub units: BTreeMap<String, Vec<Observation>>,
}

/// A single reported value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default, rename = "fy")]
    pub fiscal_year: Option<i32>,
    #[serde(rename = "val")]
    pub value: f64,
    #[serde(default)]
    pub form: String,
    pub filed: NaiveDate,
    #[serde(default, rename = "fp")]
    pub fiscal_period: Option<String>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    pub end: NaiveDate,
}

/// Aggregated value together with the filing date it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateValue {
    pub value: f64,
    pub filed: NaiveDate,
}

type ConceptValues = BTreeMap<String, AggregateValue>;

/// Insert `value` unless the slot already holds a later filing.
fn record_latest(slot: &mut ConceptValues, concept: &str, value: f64, filed: NaiveDate) {
    match slot.get_mut(concept) {
        Some(existing) if existing.filed > filed => {}
        Some(existing) => *existing = AggregateValue { value, filed },
        None => {
            slot.insert(concept.to_string(), AggregateValue { value, filed });
        }
    }
}

/// Fiscal year -> concept -> most recently filed annual value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnualAggregate {
    years: BTreeMap<i32, ConceptValues>,
}

impl AnnualAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an annual value. Ties on filing date go to the later call.
    pub fn record(&mut self, year: i32, concept: &str, value: f64, filed: NaiveDate) {
        record_latest(self.years.entry(year).or_default(), concept, value, filed);
    }

    pub fn get(&self, year: i32, concept: &str) -> Option<&AggregateValue> {
        self.years.get(&year).and_then(|c| c.get(concept))
    }

    pub fn value(&self, year: i32, concept: &str) -> Option<f64> {
        self.get(year, concept).map(|v| v.value)
    }

    /// First concept of `chain` that has a value for `year`.
    pub fn first_of(&self, year: i32, chain: &[String]) -> Option<&AggregateValue> {
        chain.iter().find_map(|concept| self.get(year, concept))
    }

    /// Years present, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// (fiscal year, fiscal period) -> concept -> most recently filed quarterly value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuarterlyAggregate {
    periods: BTreeMap<(i32, String), ConceptValues>,
}

impl QuarterlyAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, year: i32, period: &str, concept: &str, value: f64, filed: NaiveDate) {
        let slot = self.periods.entry((year, period.to_string())).or_default();
        record_latest(slot, concept, value, filed);
    }

    pub fn get(&self, year: i32, period: &str, concept: &str) -> Option<&AggregateValue> {
        self.periods
            .get(&(year, period.to_string()))
            .and_then(|c| c.get(concept))
    }

    pub fn value(&self, year: i32, period: &str, concept: &str) -> Option<f64> {
        self.get(year, period, concept).map(|v| v.value)
    }

    pub fn first_of(&self, year: i32, period: &str, chain: &[String]) -> Option<&AggregateValue> {
        chain.iter().find_map(|concept| self.get(year, period, concept))
    }

    /// (year, period) keys, ascending.
    pub fn periods(&self) -> impl Iterator<Item = (i32, &str)> + '_ {
        self.periods.keys().map(|(y, p)| (*y, p.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_company_facts_document() {
        let json = r#"{
            "cik": 320193,
            "entityName": "Apple Inc.",
            "facts": {
                "us-gaap": {
                    "NetIncomeLoss": {
                        "label": "Net Income (Loss)",
                        "description": "Profit or loss.",
                        "units": {
                            "USD": [
                                {"start": "2022-09-25", "end": "2023-09-30", "val": 96995000000,
                                 "accn": "0000320193-23-000106", "fy": 2023, "fp": "FY",
                                 "form": "10-K", "filed": "2023-11-03", "frame": "CY2023"}
                            ]
                        }
                    }
                }
            }
        }"#;

        let facts: CompanyFacts = serde_json::from_str(json).unwrap();
        assert_eq!(facts.entity_name.as_deref(), Some("Apple Inc."));
        let (name, concept) = facts.us_gaap().next().unwrap();
        assert_eq!(name, "NetIncomeLoss");
        let obs = &concept.units["USD"][0];
        assert_eq!(obs.fiscal_year, Some(2023));
        assert_eq!(obs.fiscal_period.as_deref(), Some("FY"));
        assert_eq!(obs.filed, date("2023-11-03"));
        assert_eq!(obs.start, Some(date("2022-09-25")));
    }

    #[test]
    fn test_missing_fiscal_year_and_taxonomy() {
        let json = r#"{"facts": {"dei": {}}}"#;
        let facts: CompanyFacts = serde_json::from_str(json).unwrap();
        assert_eq!(facts.us_gaap().count(), 0);

        let obs: Observation = serde_json::from_str(
            r#"{"end": "2020-12-31", "val": 1.5, "form": "8-K", "filed": "2021-01-10", "fy": null, "fp": null}"#,
        )
        .unwrap();
        assert_eq!(obs.fiscal_year, None);
        assert_eq!(obs.fiscal_period, None);
    }

    #[test]
    fn test_annual_keeps_latest_filing() {
        let mut annual = AnnualAggregate::new();
        annual.record(2023, "Revenues", 100.0, date("2024-02-01"));
        annual.record(2023, "Revenues", 90.0, date("2023-02-01"));
        assert_eq!(annual.value(2023, "Revenues"), Some(100.0));

        annual.record(2023, "Revenues", 110.0, date("2024-02-01"));
        assert_eq!(annual.value(2023, "Revenues"), Some(110.0));

        annual.record(2023, "Revenues", 120.0, date("2025-02-01"));
        assert_eq!(annual.value(2023, "Revenues"), Some(120.0));
    }

    #[test]
    fn test_first_of_respects_chain_order() {
        let mut annual = AnnualAggregate::new();
        annual.record(2022, "SalesRevenueNet", 5.0, date("2023-01-01"));
        annual.record(2022, "Revenues", 7.0, date("2023-01-01"));
        let chain = vec!["Revenues".to_string(), "SalesRevenueNet".to_string()];
        assert_eq!(annual.first_of(2022, &chain).map(|v| v.value), Some(7.0));
        let chain = vec!["Missing".to_string(), "SalesRevenueNet".to_string()];
        assert_eq!(annual.first_of(2022, &chain).map(|v| v.value), Some(5.0));
        assert!(annual.first_of(2021, &chain).is_none());
    }

    #[test]
    fn test_quarterly_keyed_by_period() {
        let mut quarterly = QuarterlyAggregate::new();
        quarterly.record(2024, "Q1", "NetIncomeLoss", 1.0, date("2024-05-01"));
        quarterly.record(2024, "Q2", "NetIncomeLoss", 2.0, date("2024-08-01"));
        assert_eq!(quarterly.value(2024, "Q1", "NetIncomeLoss"), Some(1.0));
        assert_eq!(quarterly.value(2024, "Q2", "NetIncomeLoss"), Some(2.0));
        assert_eq!(quarterly.periods().count(), 2);
    }
}
