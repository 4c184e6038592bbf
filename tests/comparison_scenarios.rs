use laptop_advisor::analyzer::scoring::{ScoringConstants, EXCLUDED_SCORE};
use laptop_advisor::analyzer::summary::{main_reason, MainReason, Markup};
use laptop_advisor::comparator::{Comparator, FEATURES};
use laptop_advisor::model::{Catalog, ComparisonRequest, Priorities, Product, UNAVAILABLE};
use laptop_advisor::session::{ComparisonSession, DEFAULT_MAX_COMPARE};
use std::sync::Arc;
use std::time::Duration;

fn laptop(id: &str, name: &str) -> Product {
    Product {
        id: id.into(),
        name: name.into(),
        price: Some(22_000_000),
        image: None,
        cpu: "Intel Core i5-1340P".into(),
        gpu: "Intel Iris Xe Graphics".into(),
        ram: "16GB".into(),
        storage: "512GB SSD".into(),
        battery: "60Wh".into(),
        weight: "1.5 kg".into(),
        screen: "14\" FHD IPS".into(),
        placeholder: false,
    }
}

fn comparator() -> Comparator {
    Comparator::new(ScoringConstants::default(), Markup::Plain, Duration::ZERO)
}

fn request(ids: &[&str], priorities: Priorities, prompt: &str) -> ComparisonRequest {
    ComparisonRequest::new(ids.iter().map(|s| s.to_string()).collect(), priorities, prompt)
}

#[test]
fn scenario_a_more_ram_wins_with_performance_priority() {
    let catalog = Catalog::new(vec![
        Product { ram: "8GB".into(), ..laptop("small", "Laptop 8GB") },
        Product { ram: "32GB".into(), ..laptop("big", "Laptop 32GB") },
    ]);
    let req = request(&["small", "big"], Priorities::new(80.0, 20.0, 20.0), "");
    let outcome = comparator().evaluate(&req, &catalog);

    assert!(outcome.scored[1].final_score > outcome.scored[0].final_score);
    assert_eq!(main_reason(&outcome.needs), MainReason::Performance);

    let summary = &outcome.result.summary;
    assert!(summary.contains("Laptop 32GB là lựa chọn phù hợp nhất"));
    assert!(summary.contains("Laptop 8GB"));
}

#[test]
fn scenario_b_budget_student_prefers_cheaper() {
    let catalog = Catalog::new(vec![
        Product { price: Some(40_000_000), ..laptop("pricey", "Laptop Cao Cấp") },
        Product { price: Some(15_000_000), ..laptop("cheap", "Laptop Sinh Viên") },
    ]);
    let req = request(&["pricey", "cheap"], Priorities::default(), "laptop giá rẻ cho sinh viên");
    let outcome = comparator().evaluate(&req, &catalog);

    assert_eq!(main_reason(&outcome.needs), MainReason::Price);
    assert!(outcome.scored[1].final_score > outcome.scored[0].final_score);

    let summary = &outcome.result.summary;
    assert!(summary.contains("Laptop Sinh Viên là lựa chọn phù hợp nhất"));
    assert!(summary.contains("15.000.000 ₫"));
}

#[test]
fn scenario_c_no_gaming_excludes_discrete_gpu() {
    let catalog = Catalog::new(vec![
        Product { gpu: "NVIDIA GeForce RTX 4060 8GB".into(), ..laptop("gamer", "Laptop Gaming") },
        laptop("office", "Laptop Văn Phòng"),
    ]);
    let req = request(&["gamer", "office"], Priorities::default(), "không game");
    let outcome = comparator().evaluate(&req, &catalog);

    assert_eq!(outcome.scored[0].final_score, EXCLUDED_SCORE);
    assert!(outcome.scored[1].final_score > 0.0);

    let summary = &outcome.result.summary;
    assert!(summary.contains("Laptop Gaming đã bị loại vì"));
    assert!(summary.contains("GPU rời mạnh"));
}

#[test]
fn scenario_d_unknown_id_becomes_placeholder() {
    let catalog = Catalog::new(vec![laptop("a", "Laptop A")]);
    let req = request(&["a", "ghost-42"], Priorities::default(), "");
    let result = comparator().evaluate(&req, &catalog).result;

    assert_eq!(result.laptop_names.len(), 2);
    assert!(result.laptop_names[1].contains("ghost-42"));
    assert_ne!(result.laptop_names[0], result.laptop_names[1]);
    for row in &result.comparison_details {
        assert_eq!(row.get("ghost-42"), Some(UNAVAILABLE));
    }
}

#[test]
fn scenario_e_sole_qualifier_has_no_runner_up() {
    let catalog = Catalog::new(vec![
        Product { weight: "2.4 kg".into(), ..laptop("heavy", "Laptop Nặng") },
        Product { weight: "1.2 kg".into(), ..laptop("light", "Laptop Nhẹ") },
        Product { weight: "2.1 kg".into(), ..laptop("bulky", "Laptop Cồng Kềnh") },
    ]);
    let req = request(&["heavy", "light", "bulky"], Priorities::default(), "cần laptop mỏng nhẹ");
    let outcome = comparator().evaluate(&req, &catalog);

    assert_eq!(outcome.scored.iter().filter(|s| s.is_qualified()).count(), 1);
    let summary = &outcome.result.summary;
    assert!(summary.contains("Laptop Nhẹ là lựa chọn duy nhất"));
    assert!(!summary.contains(", trong khi "));
    assert!(summary.contains("cùng 1 sản phẩm khác"));
}

#[test]
fn unpriced_listing_does_not_win_on_price() {
    let catalog = Catalog::new(vec![
        Product {
            price: None,
            cpu: "Intel Celeron N4500".into(),
            gpu: "Intel UHD Graphics".into(),
            ram: "4GB".into(),
            ..laptop("contact", "Laptop Liên Hệ")
        },
        Product {
            price: Some(20_000_000),
            cpu: "Intel Core i7-13700H".into(),
            gpu: "NVIDIA GeForce RTX 4060".into(),
            ram: "32GB".into(),
            storage: "1TB SSD".into(),
            ..laptop("strong", "Laptop Mạnh")
        },
    ]);
    let req = request(&["contact", "strong"], Priorities::new(100.0, 0.0, 0.0), "");
    let outcome = comparator().evaluate(&req, &catalog);

    assert!(outcome.scored[1].final_score > outcome.scored[0].final_score);
    let price_row = outcome
        .result
        .comparison_details
        .iter()
        .find(|row| row.feature == "Giá")
        .unwrap();
    assert_eq!(price_row.get("contact"), Some(UNAVAILABLE));
    assert_eq!(price_row.get("strong"), Some("20.000.000 ₫"));

    let summary = &outcome.result.summary;
    assert!(summary.contains("Laptop Mạnh là lựa chọn phù hợp nhất"));
    assert!(!summary.contains(" 0 ₫"));
}

#[test]
fn nothing_qualifies_reports_it() {
    let catalog = Catalog::new(vec![laptop("a", "Laptop A"), laptop("b", "Laptop B")]);
    let req = request(&["a", "b"], Priorities::default(), "laptop chơi game");
    let summary = comparator().evaluate(&req, &catalog).result.summary;

    assert!(summary.contains("không có sản phẩm nào đáp ứng"));
    assert!(summary.contains("Laptop A"));
}

#[test]
fn table_shape_follows_request() {
    let catalog = Catalog::new(vec![laptop("a", "A"), laptop("b", "B"), laptop("c", "C")]);
    let req = request(&["c", "a", "b"], Priorities::default(), "");
    let result = comparator().evaluate(&req, &catalog).result;

    assert_eq!(result.laptop_names, vec!["C", "A", "B"]);
    let labels: Vec<&str> = result.comparison_details.iter().map(|r| r.feature.as_str()).collect();
    let expected: Vec<&str> = FEATURES.iter().map(|f| f.label()).collect();
    assert_eq!(labels, expected);
    for row in &result.comparison_details {
        let ids: Vec<&str> = row.values.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert!(row.values.iter().all(|(_, v)| !v.is_empty()));
    }
}

#[test]
fn equal_scores_keep_request_order() {
    let catalog = Catalog::new(vec![laptop("x", "Twin X"), laptop("y", "Twin Y")]);

    let forward = comparator().evaluate(&request(&["x", "y"], Priorities::default(), ""), &catalog);
    assert!(forward.result.summary.contains("Twin X là lựa chọn phù hợp nhất"));

    let backward = comparator().evaluate(&request(&["y", "x"], Priorities::default(), ""), &catalog);
    assert!(backward.result.summary.contains("Twin Y là lựa chọn phù hợp nhất"));
}

#[test]
fn html_summary_escapes_names() {
    let catalog = Catalog::new(vec![laptop("a", "Laptop <A&B>"), laptop("b", "Laptop B")]);
    let html = Comparator::default();
    let summary = html.evaluate(&request(&["a", "b"], Priorities::default(), ""), &catalog).result.summary;

    assert!(summary.contains("&lt;A&amp;B&gt;"));
    assert!(summary.contains("<br><br>"));
}

#[tokio::test]
async fn comparing_twice_is_identical() {
    let catalog = Arc::new(Catalog::new(vec![
        laptop("a", "Laptop A"),
        Product { price: Some(30_000_000), ram: "32GB".into(), ..laptop("b", "Laptop B") },
    ]));
    let session = ComparisonSession::new(catalog, comparator(), DEFAULT_MAX_COMPARE);
    let req = request(&["a", "b"], Priorities::new(70.0, 30.0, 60.0), "lập trình, 16gb ram");

    let first = session.submit(&req).await.unwrap();
    let second = session.submit(&req).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
