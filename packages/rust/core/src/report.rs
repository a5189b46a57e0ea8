//! Lead report for the `analyze` command.

use std::collections::HashMap;

use leadforge_shared::Result;

use crate::store::LeadStore;

/// Header of the column the breakdown groups by.
const INDUSTRY_HEADER: &str = "Industry";

/// Label for rows with a blank industry cell.
const UNKNOWN_INDUSTRY: &str = "Unknown";

/// Summary of logged leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadReport {
    /// Only a header row, or nothing at all.
    NoData,
    /// Rows exist but the sheet has no `Industry` column.
    MissingIndustryColumn { total: usize },
    /// Lead count plus per-industry counts, largest first, ties by name.
    Breakdown {
        total: usize,
        industries: Vec<(String, usize)>,
    },
}

/// Build the report from raw sheet rows (header first).
pub fn build_report(rows: &[Vec<String>]) -> LeadReport {
    let Some((header, data)) = rows.split_first() else {
        return LeadReport::NoData;
    };
    if data.is_empty() {
        return LeadReport::NoData;
    }

    let total = data.len();
    let Some(column) = header.iter().position(|h| h.trim() == INDUSTRY_HEADER) else {
        return LeadReport::MissingIndustryColumn { total };
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in data {
        let industry = row
            .get(column)
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .unwrap_or(UNKNOWN_INDUSTRY);
        *counts.entry(industry.to_string()).or_default() += 1;
    }

    let mut industries: Vec<(String, usize)> = counts.into_iter().collect();
    industries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    LeadReport::Breakdown { total, industries }
}

/// Read every row from the store and summarize it.
pub async fn lead_report(store: &dyn LeadStore) -> Result<LeadReport> {
    let rows = store.all_rows().await?;
    Ok(build_report(&rows))
}
