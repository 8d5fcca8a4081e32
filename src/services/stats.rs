//! Receipt statistics
//!
//! Derived, read-only aggregation views over notes: a currency amount
//! is extracted from each note's text by an injected parser, then
//! grouped by day, month, year, and category. Nothing here is
//! persisted.

use crate::store::{Folder, Note};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

const UNCATEGORIZED: &str = "Uncategorized";

/// One parsed receipt amount
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptStat {
    pub note_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    /// Name of the containing folder, or "Uncategorized"
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReceiptSummary {
    pub date: NaiveDate,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReceiptSummary {
    pub year: i32,
    pub month: u32,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyReceiptSummary {
    pub year: i32,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub total: f64,
    pub count: usize,
}

/// Extract one stat per note that yields an amount. Notes the extractor
/// cannot parse are skipped.
pub fn receipt_stats(
    notes: &[Note],
    folders: &[Folder],
    extract_amount: impl Fn(&str) -> Option<f64>,
) -> Vec<ReceiptStat> {
    notes
        .iter()
        .filter_map(|note| {
            let amount = extract_amount(&note.content)?;
            let category = note
                .folder_id
                .as_deref()
                .and_then(|id| folders.iter().find(|f| f.id == id))
                .map(|f| f.name.clone())
                .unwrap_or_else(|| UNCATEGORIZED.to_string());

            Some(ReceiptStat {
                note_id: note.id.clone(),
                amount,
                date: note.created_at.date_naive(),
                category,
            })
        })
        .collect()
}

/// Group stats per calendar day, sorted ascending.
pub fn daily_summaries(stats: &[ReceiptStat]) -> Vec<DailyReceiptSummary> {
    let mut groups: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for stat in stats {
        let entry = groups.entry(stat.date).or_default();
        entry.0 += stat.amount;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(date, (total, count))| DailyReceiptSummary { date, total, count })
        .collect()
}

/// Group stats per calendar month, sorted ascending.
pub fn monthly_summaries(stats: &[ReceiptStat]) -> Vec<MonthlyReceiptSummary> {
    let mut groups: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for stat in stats {
        let entry = groups.entry((stat.date.year(), stat.date.month())).or_default();
        entry.0 += stat.amount;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((year, month), (total, count))| MonthlyReceiptSummary {
            year,
            month,
            total,
            count,
        })
        .collect()
}

/// Group stats per calendar year, sorted ascending.
pub fn yearly_summaries(stats: &[ReceiptStat]) -> Vec<YearlyReceiptSummary> {
    let mut groups: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for stat in stats {
        let entry = groups.entry(stat.date.year()).or_default();
        entry.0 += stat.amount;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(year, (total, count))| YearlyReceiptSummary { year, total, count })
        .collect()
}

/// Group stats per category, sorted by category name.
pub fn category_stats(stats: &[ReceiptStat]) -> Vec<CategoryStat> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for stat in stats {
        let entry = groups.entry(stat.category.as_str()).or_default();
        entry.0 += stat.amount;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(category, (total, count))| CategoryStat {
            category: category.to_string(),
            total,
            count,
        })
        .collect()
}
