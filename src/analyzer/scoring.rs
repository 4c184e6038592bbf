use crate::analyzer::needs::NeedsProfile;
use crate::model::Product;
use crate::normalizer::NormalizedSpecs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Score assigned to a product that failed a hard filter.
pub const EXCLUDED_SCORE: f64 = -1.0;

/// Tuning constants for the price and balance terms.
///
/// Only the shape matters: the price term falls strictly as price rises and the
/// balance term falls strictly as the weighted sub-scores spread apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConstants {
    #[serde(default = "default_price_scale")]
    pub price_scale: f64,
    #[serde(default = "default_balance_scale")]
    pub balance_scale: f64,
}

fn default_price_scale() -> f64 {
    5e8
}

fn default_balance_scale() -> f64 {
    20.0
}

impl Default for ScoringConstants {
    fn default() -> Self {
        Self {
            price_scale: default_price_scale(),
            balance_scale: default_balance_scale(),
        }
    }
}

/// Unweighted-by-criterion sub-scores of a qualifying product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub performance: f64,
    pub mobility: f64,
    pub price: f64,
    pub storage: f64,
    pub screen: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredProduct {
    pub product: Product,
    pub specs: NormalizedSpecs,
    /// Non-negative, or [`EXCLUDED_SCORE`] when a filter failed.
    pub final_score: f64,
    pub breakdown: Option<ScoreBreakdown>,
    pub excluded_by: Option<String>,
}

impl ScoredProduct {
    pub fn is_excluded(&self) -> bool {
        self.excluded_by.is_some()
    }

    pub fn is_qualified(&self) -> bool {
        self.final_score > 0.0
    }
}

/// Trait defining the interface for a product scorer.
pub trait Analyzer {
    fn score(&self, product: &Product, needs: &NeedsProfile) -> ScoredProduct;

    /// Scores every product, keeping the input order.
    fn score_all(&self, products: &[Product], needs: &NeedsProfile) -> Vec<ScoredProduct> {
        products.iter().map(|p| self.score(p, needs)).collect()
    }
}

/// Implementation of the weighted scorer.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerImpl {
    constants: ScoringConstants,
}

impl AnalyzerImpl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constants(constants: ScoringConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &ScoringConstants {
        &self.constants
    }

    pub fn price_score(&self, price: u64) -> f64 {
        self.constants.price_scale / (price as f64 + 1.0)
    }

    /// Rewards evenly matched weighted sub-scores; zero with fewer than two of them.
    pub fn balance_score(&self, weighted: &[f64]) -> f64 {
        match population_stats(weighted) {
            Some((_, stddev)) if weighted.len() >= 2 => self.constants.balance_scale / (stddev + 1.0),
            _ => 0.0,
        }
    }
}

impl Analyzer for AnalyzerImpl {
    /// Filters first (short-circuit on the first failure), then the weighted composite.
    fn score(&self, product: &Product, needs: &NeedsProfile) -> ScoredProduct {
        let specs = NormalizedSpecs::from_product(product);

        if let Some(failed) = needs.filters.iter().find(|f| !f.keeps(&specs, product)) {
            info!("Excluded {}: {}", product.id, failed.reason);
            return ScoredProduct {
                product: product.clone(),
                specs,
                final_score: EXCLUDED_SCORE,
                breakdown: None,
                excluded_by: Some(failed.reason.clone()),
            };
        }

        let w = &needs.weights;
        let performance = specs.cpu * w.cpu + specs.gpu * w.gpu + specs.ram * w.ram;
        let mobility = specs.battery * 1.5 + specs.weight * 1.5;
        // unpriced listings earn no price credit and stay out of the spread
        let price = specs.price.map_or(0.0, |amount| self.price_score(amount));
        let storage = specs.storage * w.storage;
        let screen = specs.screen * w.screen;

        let weighted: Vec<f64> = [
            (performance, w.performance, true),
            (mobility, w.mobility, true),
            (price, w.price, specs.price.is_some()),
            (storage, w.storage, true),
            (screen, w.screen, true),
        ]
        .iter()
        .filter(|(_, weight, known)| *known && *weight > 0.0)
        .map(|(score, weight, _)| score * weight)
        .collect();
        let balance = self.balance_score(&weighted);

        let final_score = performance * w.performance
            + mobility * w.mobility
            + price * w.price
            + storage * w.storage
            + screen * w.screen
            + balance * w.balance;
        let final_score = if final_score.is_finite() { final_score.max(0.0) } else { 0.0 };

        debug!(
            "Scored {}: perf={:.2} mob={:.2} price={:.2} storage={:.2} screen={:.2} balance={:.2} -> {:.2}",
            product.id, performance, mobility, price, storage, screen, balance, final_score
        );

        ScoredProduct {
            product: product.clone(),
            specs,
            final_score,
            breakdown: Some(ScoreBreakdown {
                performance,
                mobility,
                price,
                storage,
                screen,
                balance,
            }),
            excluded_by: None,
        }
    }
}

/// Population mean and standard deviation; `None` for an empty slice.
pub fn population_stats(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let stddev = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count).sqrt();
    Some((mean, stddev))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::needs::{build_profile, Constraint, Filter};
    use crate::model::Priorities;
    use crate::normalizer::SpecKind;

    fn laptop(id: &str, price: u64, ram: &str, gpu: &str) -> Product {
        Product {
            id: id.into(),
            name: format!("Laptop {}", id),
            price: Some(price),
            image: None,
            cpu: "Intel i5-1335U".into(),
            gpu: gpu.into(),
            ram: ram.into(),
            storage: "512GB SSD".into(),
            battery: "60Wh".into(),
            weight: "1.5 kg".into(),
            screen: "14\" FHD".into(),
            placeholder: false,
        }
    }

    fn sliders() -> NeedsProfile {
        build_profile("", &Priorities::default())
    }

    #[test]
    fn test_failing_filter_excludes_with_first_reason() {
        let mut needs = sliders();
        needs.filters.push(Filter::new(Constraint::MaxPrice { max: 10_000_000 }, "quá đắt"));
        needs.filters.push(Filter::new(Constraint::MinScore { kind: SpecKind::Ram, min: 9.0 }, "ít RAM"));

        let scored = AnalyzerImpl::new().score(&laptop("a", 20_000_000, "8GB", "Iris Xe"), &needs);
        assert_eq!(scored.final_score, EXCLUDED_SCORE);
        assert_eq!(scored.excluded_by.as_deref(), Some("quá đắt"));
        assert!(scored.breakdown.is_none());
        assert!(scored.is_excluded());
    }

    #[test]
    fn test_passing_product_scores_positive() {
        let scored = AnalyzerImpl::new().score(&laptop("a", 20_000_000, "16GB", "Iris Xe"), &sliders());
        assert!(scored.final_score > 0.0);
        assert!(scored.excluded_by.is_none());
        assert!(scored.is_qualified());
        let breakdown = scored.breakdown.unwrap();
        assert_eq!(breakdown.mobility, 6.0 * 1.5 + 7.0 * 1.5);
    }

    #[test]
    fn test_placeholder_is_excluded() {
        let scored = AnalyzerImpl::new().score(&Product::placeholder("ghost"), &sliders());
        assert_eq!(scored.final_score, EXCLUDED_SCORE);
        assert!(scored.excluded_by.is_some());
    }

    #[test]
    fn test_unpriced_listing_gets_no_price_credit() {
        let needs = build_profile("", &Priorities::new(100.0, 0.0, 0.0));
        let analyzer = AnalyzerImpl::new();
        let contact = Product {
            price: None,
            cpu: "Intel Celeron N4500".into(),
            ram: "4GB".into(),
            ..laptop("contact", 0, "", "Intel UHD Graphics")
        };
        let strong = Product {
            cpu: "Intel Core i7-13700H".into(),
            storage: "1TB SSD".into(),
            ..laptop("strong", 20_000_000, "32GB", "NVIDIA GeForce RTX 4060")
        };

        let contact_scored = analyzer.score(&contact, &needs);
        let strong_scored = analyzer.score(&strong, &needs);
        assert_eq!(contact_scored.breakdown.unwrap().price, 0.0);
        assert!(contact_scored.final_score < strong_scored.final_score);
        assert!(contact_scored.final_score < 1_000.0);
    }

    #[test]
    fn test_price_score_strictly_decreasing() {
        let analyzer = AnalyzerImpl::new();
        assert!(analyzer.price_score(0).is_finite());
        assert!(analyzer.price_score(10_000_000) > analyzer.price_score(10_000_001));
        assert!(analyzer.price_score(15_000_000) > analyzer.price_score(40_000_000));
    }

    #[test]
    fn test_balance_score_rewards_even_subscores() {
        let analyzer = AnalyzerImpl::new();
        assert_eq!(analyzer.balance_score(&[]), 0.0);
        assert_eq!(analyzer.balance_score(&[12.0]), 0.0);
        assert!(analyzer.balance_score(&[10.0, 10.0]) > analyzer.balance_score(&[5.0, 15.0]));
        assert_eq!(analyzer.balance_score(&[3.0, 3.0, 3.0]), analyzer.constants().balance_scale);
    }

    #[test]
    fn test_more_ram_scores_higher_with_performance_priority() {
        let needs = build_profile("", &Priorities::new(80.0, 20.0, 20.0));
        let analyzer = AnalyzerImpl::new();
        let low = analyzer.score(&laptop("low", 20_000_000, "8GB", "Iris Xe"), &needs);
        let high = analyzer.score(&laptop("high", 20_000_000, "32GB", "Iris Xe"), &needs);
        assert!(high.final_score > low.final_score);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let needs = build_profile("laptop văn phòng mỏng nhẹ", &Priorities::default());
        let analyzer = AnalyzerImpl::new();
        let product = laptop("a", 18_000_000, "16GB", "Iris Xe");
        assert_eq!(analyzer.score(&product, &needs), analyzer.score(&product, &needs));
    }

    #[test]
    fn test_score_all_keeps_order() {
        let products = vec![laptop("b", 1, "8GB", ""), laptop("a", 2, "8GB", "")];
        let scored = AnalyzerImpl::new().score_all(&products, &sliders());
        let ids: Vec<&str> = scored.iter().map(|s| s.product.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_population_stats() {
        assert_eq!(population_stats(&[]), None);
        assert_eq!(population_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), Some((5.0, 2.0)));
    }
}
