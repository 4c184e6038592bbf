//! Recommendation narrative.
//!
//! The summary is assembled as paragraphs of spans first and rendered second, so
//! the facts it states do not depend on whether the target is HTML or plain text.

use crate::analyzer::needs::{Criterion, NeedsProfile, ProfileMode};
use crate::analyzer::scoring::{ScoreBreakdown, ScoredProduct};
use crate::model::Product;
use crate::utils::{display_or_unavailable, escape_html, format_vnd};
use serde::{Deserialize, Serialize};

/// Relative margin a secondary advantage must exceed to be mentioned.
pub const ADVANTAGE_MARGIN: f64 = 0.10;

pub const HTML_BREAK: &str = "<br><br>";
pub const PLAIN_BREAK: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Markup {
    #[default]
    Html,
    Plain,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    Text(String),
    Strong(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    spans: Vec<Span>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.spans.push(Span::Text(text.into()));
        self
    }

    pub fn strong(mut self, text: impl Into<String>) -> Self {
        self.spans.push(Span::Strong(text.into()));
        self
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    fn render(&self, markup: Markup) -> String {
        self.spans
            .iter()
            .map(|span| match (span, markup) {
                (Span::Text(t), Markup::Html) => escape_html(t),
                (Span::Strong(t), Markup::Html) => format!("<strong>{}</strong>", escape_html(t)),
                (Span::Text(t), Markup::Plain) | (Span::Strong(t), Markup::Plain) => t.clone(),
            })
            .collect()
    }
}

/// Ordered paragraphs of the recommendation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Narrative {
    paragraphs: Vec<Paragraph>,
}

impl Narrative {
    pub fn push(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn render(&self, markup: Markup) -> String {
        let separator = match markup {
            Markup::Html => HTML_BREAK,
            Markup::Plain => PLAIN_BREAK,
        };
        self.paragraphs
            .iter()
            .map(|p| p.render(markup))
            .collect::<Vec<_>>()
            .join(separator)
    }

    pub fn plain_text(&self) -> String {
        self.render(Markup::Plain)
    }
}

/// The criterion the narrative leads with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MainReason {
    Performance,
    Mobility,
    Price,
    Ram,
    Storage,
    Screen,
    Balance,
}

impl MainReason {
    fn criterion(self) -> Criterion {
        match self {
            MainReason::Performance => Criterion::Performance,
            MainReason::Mobility => Criterion::Mobility,
            MainReason::Price => Criterion::Price,
            MainReason::Ram => Criterion::Ram,
            MainReason::Storage => Criterion::Storage,
            MainReason::Screen => Criterion::Screen,
            MainReason::Balance => Criterion::Balance,
        }
    }

    fn from_criterion(criterion: Criterion) -> Self {
        match criterion {
            Criterion::Performance | Criterion::Cpu | Criterion::Gpu => MainReason::Performance,
            Criterion::Mobility => MainReason::Mobility,
            Criterion::Price => MainReason::Price,
            Criterion::Ram => MainReason::Ram,
            Criterion::Storage => MainReason::Storage,
            Criterion::Screen => MainReason::Screen,
            Criterion::Balance => MainReason::Balance,
        }
    }
}

/// Picks the heaviest top-level weight. A tie at the top reads as "balanced";
/// ram/storage/screen only take over when the prompt asked for them and they outweigh it.
pub fn main_reason(needs: &NeedsProfile) -> MainReason {
    let w = &needs.weights;
    let candidates = [
        (Criterion::Performance, w.performance),
        (Criterion::Mobility, w.mobility),
        (Criterion::Price, w.price),
        (Criterion::Balance, w.balance),
    ];

    let mut best = Criterion::Balance;
    let mut best_value = f64::MIN;
    let mut tied = false;
    for (criterion, value) in candidates {
        if value > best_value {
            best = criterion;
            best_value = value;
            tied = false;
        } else if value == best_value {
            tied = true;
        }
    }
    if tied {
        best = Criterion::Balance;
    }

    for &criterion in &needs.emphasized {
        let value = w.get(criterion);
        if value > best_value {
            best = criterion;
            best_value = value;
        }
    }

    MainReason::from_criterion(best)
}

/// Builds the recommendation narrative from the scored products (in catalog/request order).
pub fn generate_summary(scored: &[ScoredProduct], needs: &NeedsProfile, prompt: &str) -> Narrative {
    let mut narrative = Narrative::default();

    if scored.is_empty() {
        narrative.push(Paragraph::new().text("Chưa có sản phẩm nào được chọn để so sánh."));
        return narrative;
    }

    narrative.push(intro(needs, prompt));

    let filtered_out: Vec<&ScoredProduct> = scored.iter().filter(|s| s.is_excluded()).collect();
    let mut qualified: Vec<&ScoredProduct> = scored.iter().filter(|s| s.is_qualified()).collect();

    if qualified.is_empty() {
        let mut p = Paragraph::new().text(format!(
            "Trong {} sản phẩm được đánh giá, không có sản phẩm nào đáp ứng tiêu chí của bạn.",
            scored.len()
        ));
        if let Some(first) = filtered_out.first() {
            p = p
                .text(" Ví dụ: ")
                .strong(&first.product.name)
                .text(format!(" bị loại vì {}.", exclusion_reason(first)));
        }
        narrative.push(p);
        narrative.push(
            Paragraph::new().text("Hãy thử điều chỉnh yêu cầu hoặc chọn thêm sản phẩm khác để so sánh."),
        );
        return narrative;
    }

    // stable: equal scores keep input order
    qualified.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    let winner = qualified[0];
    let runner_up = qualified.get(1).copied();
    let reason = main_reason(needs);

    narrative.push(
        Paragraph::new()
            .strong(&winner.product.name)
            .text(format!(
                " là lựa chọn phù hợp nhất với nhu cầu của bạn (điểm {:.1}).",
                winner.final_score
            )),
    );

    match runner_up {
        Some(runner) => {
            narrative.push(compare_sentence(reason, winner, runner));
            if let Some(extra) = secondary_advantages(reason, winner, runner) {
                narrative.push(extra);
            }
        }
        None => {
            narrative.push(solo_sentence(reason, &winner.product));
            narrative.push(
                Paragraph::new()
                    .strong(&winner.product.name)
                    .text(" là lựa chọn duy nhất đáp ứng các tiêu chí của bạn."),
            );
        }
    }

    if let Some(first) = filtered_out.first() {
        let mut p = Paragraph::new()
            .text("Lưu ý: ")
            .strong(&first.product.name)
            .text(format!(" đã bị loại vì {}", exclusion_reason(first)));
        if filtered_out.len() > 1 {
            p = p.text(format!(" (cùng {} sản phẩm khác)", filtered_out.len() - 1));
        }
        narrative.push(p.text("."));
    }

    narrative.push(Paragraph::new().text("Xem bảng so sánh chi tiết bên dưới để biết thêm thông tin."));
    narrative
}

fn intro(needs: &NeedsProfile, prompt: &str) -> Paragraph {
    match needs.mode {
        ProfileMode::Prompt => {
            let mut p = Paragraph::new()
                .text(format!("Phân tích dựa trên nhu cầu của bạn: \"{}\". ", prompt.trim()))
                .text(needs.reason.clone());
            if needs.has_keywords() {
                p = p.text(format!(" (Từ khóa: {}.)", needs.user_keywords.join(", ")));
            }
            p
        }
        ProfileMode::Sliders => Paragraph::new().text(needs.reason.clone()),
    }
}

fn exclusion_reason(scored: &ScoredProduct) -> &str {
    scored.excluded_by.as_deref().unwrap_or("không đáp ứng tiêu chí")
}

fn price(product: &Product) -> String {
    match product.price {
        Some(amount) if !product.is_placeholder() => format_vnd(amount),
        _ => display_or_unavailable(""),
    }
}

fn breakdown(scored: &ScoredProduct) -> ScoreBreakdown {
    scored.breakdown.unwrap_or(ScoreBreakdown {
        performance: 0.0,
        mobility: 0.0,
        price: 0.0,
        storage: 0.0,
        screen: 0.0,
        balance: 0.0,
    })
}

fn compare_sentence(reason: MainReason, winner: &ScoredProduct, runner: &ScoredProduct) -> Paragraph {
    let (w, r) = (&winner.product, &runner.product);
    let d = display_or_unavailable;
    match reason {
        MainReason::Performance => Paragraph::new()
            .text("Về hiệu năng, ")
            .strong(&w.name)
            .text(format!(
                " sở hữu CPU {} và GPU {} (điểm hiệu năng {:.1}), so với CPU {} và GPU {} ({:.1}) của ",
                d(&w.cpu),
                d(&w.gpu),
                breakdown(winner).performance,
                d(&r.cpu),
                d(&r.gpu),
                breakdown(runner).performance,
            ))
            .strong(&r.name)
            .text("."),
        MainReason::Mobility => Paragraph::new()
            .text("Về tính di động, ")
            .strong(&w.name)
            .text(format!(" nặng {} với pin {}, trong khi ", d(&w.weight), d(&w.battery)))
            .strong(&r.name)
            .text(format!(" nặng {} với pin {}.", d(&r.weight), d(&r.battery))),
        MainReason::Price => Paragraph::new()
            .text("Về giá cả, ")
            .strong(&w.name)
            .text(format!(" có giá {}, so với {} của ", price(w), price(r)))
            .strong(&r.name)
            .text(", mang lại giá trị tốt hơn cho số tiền bỏ ra."),
        MainReason::Ram => Paragraph::new()
            .text("Về RAM, ")
            .strong(&w.name)
            .text(format!(" được trang bị {}, so với {} của ", d(&w.ram), d(&r.ram)))
            .strong(&r.name)
            .text(", giúp đa nhiệm mượt mà hơn."),
        MainReason::Storage => Paragraph::new()
            .text("Về lưu trữ, ")
            .strong(&w.name)
            .text(format!(" có {}, so với {} của ", d(&w.storage), d(&r.storage)))
            .strong(&r.name)
            .text("."),
        MainReason::Screen => Paragraph::new()
            .text("Về màn hình, ")
            .strong(&w.name)
            .text(format!(" dùng {}, so với {} của ", d(&w.screen), d(&r.screen)))
            .strong(&r.name)
            .text("."),
        MainReason::Balance => Paragraph::new()
            .strong(&w.name)
            .text(format!(
                " cân bằng tốt nhất giữa các tiêu chí (tổng điểm {:.1} so với {:.1} của ",
                winner.final_score, runner.final_score
            ))
            .strong(&r.name)
            .text(format!(
                "), với CPU {}, nặng {} và giá {}.",
                d(&w.cpu),
                d(&w.weight),
                price(w)
            )),
    }
}

fn solo_sentence(reason: MainReason, w: &Product) -> Paragraph {
    let d = display_or_unavailable;
    let p = Paragraph::new().strong(&w.name);
    match reason {
        MainReason::Performance => p.text(format!(" sở hữu CPU {} và GPU {}.", d(&w.cpu), d(&w.gpu))),
        MainReason::Mobility => p.text(format!(" nặng {} với pin {}.", d(&w.weight), d(&w.battery))),
        MainReason::Price => p.text(format!(" có giá {}.", price(w))),
        MainReason::Ram => p.text(format!(" được trang bị RAM {}.", d(&w.ram))),
        MainReason::Storage => p.text(format!(" có ổ lưu trữ {}.", d(&w.storage))),
        MainReason::Screen => p.text(format!(" dùng màn hình {}.", d(&w.screen))),
        MainReason::Balance => p.text(format!(
            " kết hợp CPU {}, nặng {} và giá {}.",
            d(&w.cpu),
            d(&w.weight),
            price(w)
        )),
    }
}

fn secondary_advantages(reason: MainReason, winner: &ScoredProduct, runner: &ScoredProduct) -> Option<Paragraph> {
    let (w, r) = (breakdown(winner), breakdown(runner));
    let advantages: Vec<&str> = [
        (Criterion::Performance, w.performance, r.performance),
        (Criterion::Mobility, w.mobility, r.mobility),
        (Criterion::Price, w.price, r.price),
    ]
    .iter()
    .filter(|(criterion, _, _)| *criterion != reason.criterion())
    .filter(|(criterion, _, _)| {
        *criterion != Criterion::Price || (winner.product.price.is_some() && runner.product.price.is_some())
    })
    .filter(|(_, ours, theirs)| *ours > *theirs * (1.0 + ADVANTAGE_MARGIN))
    .map(|(criterion, _, _)| criterion.label())
    .collect();

    if advantages.is_empty() {
        return None;
    }
    Some(
        Paragraph::new()
            .text("Ngoài ra, ")
            .strong(&winner.product.name)
            .text(format!(" còn có lợi thế về {}.", advantages.join(" và "))),
    )
}
