//! Comparison entry point: resolves the selected ids, builds the needs profile,
//! scores, narrates, and lays out the comparison table in request order.

use crate::analyzer::needs::{build_profile, NeedsProfile};
use crate::analyzer::scoring::{Analyzer, AnalyzerImpl, ScoredProduct, ScoringConstants};
use crate::analyzer::summary::{generate_summary, Markup};
use crate::model::{Catalog, ComparisonRequest, ComparisonResult, FeatureRow, Product, UNAVAILABLE};
use crate::utils::{display_or_unavailable, format_vnd};
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

/// Rows of the comparison table, in display order.
pub const FEATURES: [Feature; 8] = [
    Feature::Cpu,
    Feature::Ram,
    Feature::Gpu,
    Feature::Storage,
    Feature::Price,
    Feature::Weight,
    Feature::Battery,
    Feature::Screen,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Cpu,
    Ram,
    Gpu,
    Storage,
    Price,
    Weight,
    Battery,
    Screen,
}

impl Feature {
    pub fn label(self) -> &'static str {
        match self {
            Feature::Cpu => "CPU",
            Feature::Ram => "RAM",
            Feature::Gpu => "GPU",
            Feature::Storage => "Lưu trữ",
            Feature::Price => "Giá",
            Feature::Weight => "Cân nặng",
            Feature::Battery => "Pin",
            Feature::Screen => "Màn hình",
        }
    }

    /// Raw attribute in display form.
    pub fn display(self, product: &Product) -> String {
        if product.is_placeholder() {
            return UNAVAILABLE.to_string();
        }
        match self {
            Feature::Cpu => display_or_unavailable(&product.cpu),
            Feature::Ram => display_or_unavailable(&product.ram),
            Feature::Gpu => display_or_unavailable(&product.gpu),
            Feature::Storage => display_or_unavailable(&product.storage),
            Feature::Price => product.price.map(format_vnd).unwrap_or_else(|| UNAVAILABLE.to_string()),
            Feature::Weight => display_or_unavailable(&product.weight),
            Feature::Battery => display_or_unavailable(&product.battery),
            Feature::Screen => display_or_unavailable(&product.screen),
        }
    }
}

/// Everything one comparison produced; `result` is what callers display.
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    pub result: ComparisonResult,
    pub needs: NeedsProfile,
    /// Scored products in request order.
    pub scored: Vec<ScoredProduct>,
}

#[derive(Debug, Clone)]
pub struct Comparator {
    analyzer: AnalyzerImpl,
    markup: Markup,
    delay: Duration,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(ScoringConstants::default(), Markup::Html, Duration::ZERO)
    }
}

impl Comparator {
    pub fn new(constants: ScoringConstants, markup: Markup, delay: Duration) -> Self {
        Self {
            analyzer: AnalyzerImpl::with_constants(constants),
            markup,
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs a comparison after the configured simulated latency.
    pub async fn compare(&self, request: &ComparisonRequest, catalog: &Catalog) -> ComparisonResult {
        self.compare_detailed(request, catalog).await.result
    }

    pub async fn compare_detailed(&self, request: &ComparisonRequest, catalog: &Catalog) -> ComparisonOutcome {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.evaluate(request, catalog)
    }

    /// Synchronous core of [`Comparator::compare`]. Never fails: unknown ids become placeholders.
    pub fn evaluate(&self, request: &ComparisonRequest, catalog: &Catalog) -> ComparisonOutcome {
        info!(
            "Comparing {} products ({} in catalog), prompt: {:?}",
            request.ids.len(),
            catalog.len(),
            request.prompt
        );

        let products: Vec<Product> = request.ids.iter().map(|id| catalog.resolve(id)).collect();
        let needs = build_profile(&request.prompt, &request.priorities);
        let scored = self.analyzer.score_all(&products, &needs);
        let summary = generate_summary(&scored, &needs, &request.prompt).render(self.markup);

        let result = ComparisonResult {
            summary,
            laptop_names: products.iter().map(|p| p.name.clone()).collect(),
            comparison_details: comparison_details(&products),
        };

        info!(
            "Comparison done: {} qualified, {} excluded",
            scored.iter().filter(|s| s.is_qualified()).count(),
            scored.iter().filter(|s| s.is_excluded()).count()
        );

        ComparisonOutcome { result, needs, scored }
    }
}

/// One row per feature, one cell per product, both in the given order.
pub fn comparison_details(products: &[Product]) -> Vec<FeatureRow> {
    FEATURES
        .iter()
        .map(|feature| {
            let mut row = FeatureRow::new(feature.label());
            for product in products {
                row.push(&product.id, feature.display(product));
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priorities;

    fn laptop(id: &str, price: u64) -> Product {
        Product {
            id: id.into(),
            name: format!("Laptop {}", id.to_uppercase()),
            price: Some(price),
            image: None,
            cpu: "AMD Ryzen 7 7840HS".into(),
            gpu: "".into(),
            ram: "16GB".into(),
            storage: "1TB SSD".into(),
            battery: "Upto 12 hrs".into(),
            weight: "1.6 kg".into(),
            screen: "16\" QHD".into(),
            placeholder: false,
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![laptop("a", 20_000_000), laptop("b", 25_000_000), laptop("c", 30_000_000)])
    }

    #[test]
    fn test_details_follow_request_order() {
        let request = ComparisonRequest::new(vec!["c".into(), "a".into()], Priorities::default(), "");
        let outcome = Comparator::default().evaluate(&request, &catalog());
        assert_eq!(outcome.result.laptop_names, vec!["Laptop C", "Laptop A"]);
        assert_eq!(outcome.result.comparison_details.len(), FEATURES.len());
        for row in &outcome.result.comparison_details {
            let ids: Vec<&str> = row.values.iter().map(|(id, _)| id.as_str()).collect();
            assert_eq!(ids, vec!["c", "a"]);
        }
        let price_row = &outcome.result.comparison_details[4];
        assert_eq!(price_row.feature, "Giá");
        assert_eq!(price_row.get("a"), Some("20.000.000 ₫"));
        let gpu_row = &outcome.result.comparison_details[2];
        assert_eq!(gpu_row.get("c"), Some(UNAVAILABLE));
    }

    #[test]
    fn test_unknown_id_is_placeholder_row() {
        let request = ComparisonRequest::new(vec!["a".into(), "nope".into()], Priorities::default(), "");
        let outcome = Comparator::default().evaluate(&request, &catalog());
        assert!(outcome.result.laptop_names[1].contains("nope"));
        for row in &outcome.result.comparison_details {
            assert_eq!(row.get("nope"), Some(UNAVAILABLE));
        }
        assert!(outcome.scored[1].is_excluded());
    }

    #[test]
    fn test_plain_markup_has_no_tags() {
        let comparator = Comparator::new(ScoringConstants::default(), Markup::Plain, Duration::ZERO);
        let request = ComparisonRequest::new(vec!["a".into(), "b".into()], Priorities::default(), "");
        let result = comparator.evaluate(&request, &catalog()).result;
        assert!(!result.summary.contains("<strong>"));
        assert!(!result.summary.contains("<br>"));
    }

    #[tokio::test]
    async fn test_async_compare_matches_evaluate() {
        let comparator = Comparator::new(ScoringConstants::default(), Markup::Html, Duration::from_millis(5));
        let request = ComparisonRequest::new(vec!["a".into(), "b".into()], Priorities::default(), "");
        let cat = catalog();
        let async_result = comparator.compare(&request, &cat).await;
        assert_eq!(async_result, comparator.evaluate(&request, &cat).result);
        assert!(async_result.summary.contains("<strong>"));
    }
}
