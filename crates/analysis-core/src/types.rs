use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One normalized row of the detailed financial-facts table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub company_name: String,
    pub cik: String,
    pub concept: String,
    pub description: String,
    pub unit: String,
    pub value: f64,
    pub start: Option<NaiveDate>,
    pub end: NaiveDate,
    pub fiscal_year: i32,
    pub fiscal_period: Option<String>,
    pub form: String,
    pub filed: NaiveDate,
}

/// Per-year investment ratios, all in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentMetric {
    pub year: i32,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub debt_to_equity: Option<f64>,
}

/// One labeled YoY series aligned with `GrowthSeries::labels`.
///
/// `data` holds 0.0 where no growth could be computed; `defined` tells those
/// entries apart from a genuine 0% change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub defined: Vec<bool>,
}

impl GrowthDataset {
    /// Most recent growth value, `None` when it was not computable.
    pub fn latest(&self) -> Option<f64> {
        match (self.data.last(), self.defined.last()) {
            (Some(v), Some(true)) => Some(*v),
            _ => None,
        }
    }
}

/// YoY growth bundle (revenue, operating income, net income)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<GrowthDataset>,
}

impl GrowthSeries {
    pub fn dataset(&self, label: &str) -> Option<&GrowthDataset> {
        self.datasets.iter().find(|d| d.label == label)
    }
}

/// Qualitative band of the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    VeryPositive,
    Positive,
    Neutral,
    Caution,
    Negative,
}

impl Evaluation {
    /// Band for a composite score. Total over all integers.
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 21 => Evaluation::VeryPositive,
            s if s >= 16 => Evaluation::Positive,
            s if s >= 11 => Evaluation::Neutral,
            s if s >= 6 => Evaluation::Caution,
            _ => Evaluation::Negative,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Evaluation::VeryPositive => "very positive",
            Evaluation::Positive => "positive",
            Evaluation::Neutral => "neutral",
            Evaluation::Caution => "caution",
            Evaluation::Negative => "negative",
        }
    }

    /// Display color used by the presentation layer
    pub fn color(&self) -> &'static str {
        match self {
            Evaluation::VeryPositive => "#1b5e20",
            Evaluation::Positive => "#4caf50",
            Evaluation::Neutral => "#ff9800",
            Evaluation::Caution => "#f4511e",
            Evaluation::Negative => "#d32f2f",
        }
    }
}

/// One scored dimension of the five-step analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStep {
    pub label: String,
    pub value: Option<f64>,
    pub score: u32,
    pub description: String,
}

/// Composite five-step rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_score: u32,
    pub evaluation: Evaluation,
    pub evaluation_label: String,
    pub evaluation_color: String,
    pub steps: Vec<AnalysisStep>,
}

/// Row of the income statement summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatementRecord {
    pub year: i32,
    pub quarter: Option<String>,
    pub revenue: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub filed: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatementData {
    pub annual: Vec<IncomeStatementRecord>,
    pub quarterly: Vec<IncomeStatementRecord>,
}

/// Everything derived from one company-facts document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyAnalysis {
    pub company_name: String,
    pub cik: String,
    pub years: u32,
    pub records: Vec<FlatRecord>,
    pub investment_metrics: Vec<InvestmentMetric>,
    pub growth: GrowthSeries,
    pub analysis_result: AnalysisResult,
    pub income_statement: IncomeStatementData,
}

/// Company directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub sec_code: String,
    pub ticker_code: String,
    pub title: String,
}

/// Daily close as returned by the stock-price service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close_value: f64,
}

/// Chart point: `x` is epoch milliseconds (UTC midnight), `y` the close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockChartPoint {
    pub x: i64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockChartData {
    pub daily: Vec<StockChartPoint>,
    pub weekly: Vec<StockChartPoint>,
    pub monthly: Vec<StockChartPoint>,
}

impl StockChartData {
    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }
}

/// News article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Publish date as sent by the news service
    #[serde(default)]
    pub publish: String,
    pub url: String,
    #[serde(default)]
    pub source: String,
}

/// One page of the news feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsPage {
    pub page: u32,
    pub articles: Vec<Article>,
    /// `None` once the feed is exhausted
    pub next_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_bands_are_total() {
        for score in 0..=30 {
            let band = Evaluation::from_score(score);
            assert!(!band.to_label().is_empty());
        }
        assert_eq!(Evaluation::from_score(25), Evaluation::VeryPositive);
        assert_eq!(Evaluation::from_score(21), Evaluation::VeryPositive);
        assert_eq!(Evaluation::from_score(20), Evaluation::Positive);
        assert_eq!(Evaluation::from_score(16), Evaluation::Positive);
        assert_eq!(Evaluation::from_score(15), Evaluation::Neutral);
        assert_eq!(Evaluation::from_score(11), Evaluation::Neutral);
        assert_eq!(Evaluation::from_score(10), Evaluation::Caution);
        assert_eq!(Evaluation::from_score(6), Evaluation::Caution);
        assert_eq!(Evaluation::from_score(5), Evaluation::Negative);
    }

    #[test]
    fn test_growth_dataset_latest() {
        let ds = GrowthDataset {
            label: "Revenue".into(),
            data: vec![10.0, 0.0],
            defined: vec![true, false],
        };
        assert_eq!(ds.latest(), None);

        let ds = GrowthDataset {
            label: "Revenue".into(),
            data: vec![0.0, 12.5],
            defined: vec![false, true],
        };
        assert_eq!(ds.latest(), Some(12.5));
    }

    #[test]
    fn test_article_tolerates_missing_optional_fields() {
        let article: Article =
            serde_json::from_str(r#"{"title": "Headline", "url": "https://example.com/a"}"#).unwrap();
        assert_eq!(article.title, "Headline");
        assert!(article.image.is_none());
        assert!(article.content.is_empty());
    }
}
