use serde::{Deserialize, Serialize};

/// Which reported concepts, units and forms feed the derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptTable {
    /// Only values in this unit reach the aggregate tables
    pub base_unit: String,
    pub annual_form: String,
    pub quarterly_form: String,
    /// Revenue lookup order; the first concept with a value wins
    pub revenue: Vec<String>,
    pub operating_income: String,
    pub net_income: String,
    pub stockholders_equity: String,
    pub total_assets: String,
    pub total_liabilities: String,
}

impl Default for ConceptTable {
    fn default() -> Self {
        Self {
            base_unit: "USD".to_string(),
            annual_form: "10-K".to_string(),
            quarterly_form: "10-Q".to_string(),
            revenue: vec![
                "Revenues".to_string(),
                "SalesRevenueNet".to_string(),
                "RevenueFromContractWithCustomerExcludingAssessedTax".to_string(),
            ],
            operating_income: "OperatingIncomeLoss".to_string(),
            net_income: "NetIncomeLoss".to_string(),
            stockholders_equity: "StockholdersEquity".to_string(),
            total_assets: "Assets".to_string(),
            total_liabilities: "Liabilities".to_string(),
        }
    }
}
