//! Competitor analysis over normalized rows
//!
//! Domain frequency, price statistics, per-target-domain placement and a
//! heuristic title-quality score. Rows without a domain are left out of the
//! domain counts; rows without a price are left out of the price statistics.

use crate::normalize::ProductRow;
use serde::{Deserialize, Serialize};

/// Lowest and highest observed price
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lowest price, if any row has one
    pub min: Option<f64>,
    /// Highest price, if any row has one
    pub max: Option<f64>,
}

/// How one tracked domain placed in the results
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetDomainReport {
    /// The domain as the caller spelled it
    pub domain: String,
    /// Number of listings from this domain
    pub appearances: usize,
    /// Mean position over ranked listings
    pub avg_position: Option<f64>,
    /// Best (lowest) position
    pub best_position: Option<i64>,
    /// The listings themselves
    pub products: Vec<ProductRow>,
}

/// Summary of one result set
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompetitorAnalysis {
    /// Number of rows
    pub total_products: usize,
    /// Number of distinct domains
    pub unique_domains: usize,
    /// Listings per domain, most frequent first
    pub domain_frequency: Vec<(String, usize)>,
    /// Mean price over priced rows
    pub avg_price: Option<f64>,
    /// Price extremes over priced rows
    pub price_range: PriceRange,
    /// Reports for requested domains, in request order
    pub target_domains: Vec<TargetDomainReport>,
}

/// Per-domain aggregate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainStats {
    /// Seller domain
    pub domain: String,
    /// Number of listings
    pub appearances: usize,
    /// Mean position over ranked listings
    pub avg_position: Option<f64>,
    /// Best (lowest) position
    pub best_position: Option<i64>,
    /// Mean price over priced listings
    pub avg_price: Option<f64>,
    /// Mean rating over rated listings
    pub avg_rating: Option<f64>,
}

/// Summarize a result set
///
/// Returns `None` for an empty row set. Target domains match
/// case-insensitively.
pub fn analyze_competitors(
    rows: &[ProductRow],
    target_domains: &[String],
) -> Option<CompetitorAnalysis> {
    if rows.is_empty() {
        return None;
    }

    let domain_frequency = domain_frequency(rows);
    let prices: Vec<f64> = rows.iter().filter_map(|r| r.price).collect();

    let target_domains = target_domains
        .iter()
        .map(|target| {
            let products: Vec<ProductRow> = rows
                .iter()
                .filter(|r| {
                    r.domain
                        .as_deref()
                        .is_some_and(|d| d.eq_ignore_ascii_case(target))
                })
                .cloned()
                .collect();
            let positions: Vec<i64> = products.iter().filter_map(|r| r.position).collect();
            TargetDomainReport {
                domain: target.clone(),
                appearances: products.len(),
                avg_position: mean(positions.iter().map(|&p| p as f64)),
                best_position: positions.iter().copied().min(),
                products,
            }
        })
        .collect();

    Some(CompetitorAnalysis {
        total_products: rows.len(),
        unique_domains: domain_frequency.len(),
        domain_frequency,
        avg_price: mean(prices.iter().copied()),
        price_range: PriceRange {
            min: prices.iter().copied().reduce(f64::min),
            max: prices.iter().copied().reduce(f64::max),
        },
        target_domains,
    })
}

/// Listings per domain, most frequent first; ties keep first-seen order
pub fn domain_frequency(rows: &[ProductRow]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for domain in rows.iter().filter_map(|r| r.domain.as_deref()) {
        match counts.iter_mut().find(|(d, _)| d == domain) {
            Some((_, n)) => *n += 1,
            None => counts.push((domain.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Aggregate rows per domain, most listings first
pub fn domain_stats(rows: &[ProductRow]) -> Vec<DomainStats> {
    domain_frequency(rows)
        .into_iter()
        .map(|(domain, appearances)| {
            let group: Vec<&ProductRow> = rows
                .iter()
                .filter(|r| r.domain.as_deref() == Some(domain.as_str()))
                .collect();
            let positions: Vec<i64> = group.iter().filter_map(|r| r.position).collect();
            DomainStats {
                appearances,
                avg_position: mean(positions.iter().map(|&p| p as f64)),
                best_position: positions.iter().copied().min(),
                avg_price: mean(group.iter().filter_map(|r| r.price)),
                avg_rating: mean(group.iter().filter_map(|r| r.rating)),
                domain,
            }
        })
        .collect()
}

/// Substrings that suggest a title names a concrete attribute
const ATTRIBUTE_HINTS: &[&str] = &[
    "size", "color", "colour", "cm", "mm", "inch", "ml", "l ", "kg", " g",
];

/// Heuristic title quality, 0..=100
///
/// Rewards a descriptive length, enough words, a concrete attribute (size,
/// colour, unit), restrained capitalisation and a capitalised first word.
pub fn title_quality_score(title: &str) -> u8 {
    if title.is_empty() {
        return 0;
    }

    let mut score: u32 = 0;

    let len = title.chars().count();
    if (70..=150).contains(&len) {
        score += 30;
    } else if len >= 50 {
        score += 15;
    }

    let words: Vec<&str> = title.split_whitespace().collect();
    if words.len() >= 8 {
        score += 25;
    } else if words.len() >= 5 {
        score += 15;
    }

    let lower = title.to_lowercase();
    if ATTRIBUTE_HINTS.iter().any(|hint| lower.contains(hint)) {
        score += 20;
    }

    let upper = title.chars().filter(|c| c.is_uppercase()).count();
    if (upper as f64) / (len.max(1) as f64) < 0.5 {
        score += 15;
    }

    if words
        .first()
        .and_then(|w| w.chars().next())
        .is_some_and(char::is_uppercase)
    {
        score += 10;
    }

    score.min(100) as u8
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}
