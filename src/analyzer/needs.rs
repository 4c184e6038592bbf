//! Needs profile: turns a free-text prompt or the three priority sliders into
//! criterion weights plus an ordered list of hard filters.

use crate::model::{Priorities, Product};
use crate::normalizer::{NormalizedSpecs, SpecKind};
use crate::utils::format_vnd;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Prompts at or below this many characters (after trimming) fall back to the sliders.
pub const MIN_PROMPT_CHARS: usize = 3;
/// Balance weight carried by every free-text profile.
pub const PROMPT_BALANCE_WEIGHT: f64 = 0.5;
/// Weight of a slider sitting in the low half.
pub const LOW_SLIDER_WEIGHT: f64 = 0.5;
const SLIDER_DIVISOR: f64 = 33.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Performance,
    Mobility,
    Price,
    Storage,
    Screen,
    Ram,
    Balance,
    Cpu,
    Gpu,
}

impl Criterion {
    /// Vietnamese label used in narratives.
    pub fn label(self) -> &'static str {
        match self {
            Criterion::Performance => "hiệu năng",
            Criterion::Mobility => "tính di động",
            Criterion::Price => "giá cả",
            Criterion::Storage => "lưu trữ",
            Criterion::Screen => "màn hình",
            Criterion::Ram => "RAM",
            Criterion::Balance => "sự cân bằng",
            Criterion::Cpu => "CPU",
            Criterion::Gpu => "GPU",
        }
    }
}

/// Non-negative multiplier per criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weights {
    pub performance: f64,
    pub mobility: f64,
    pub price: f64,
    pub storage: f64,
    pub screen: f64,
    pub ram: f64,
    pub balance: f64,
    pub cpu: f64,
    pub gpu: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            performance: 1.0,
            mobility: 1.0,
            price: 1.0,
            storage: 1.0,
            screen: 1.0,
            ram: 1.0,
            balance: PROMPT_BALANCE_WEIGHT,
            cpu: 1.5,
            gpu: 1.0,
        }
    }
}

impl Weights {
    pub fn get(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::Performance => self.performance,
            Criterion::Mobility => self.mobility,
            Criterion::Price => self.price,
            Criterion::Storage => self.storage,
            Criterion::Screen => self.screen,
            Criterion::Ram => self.ram,
            Criterion::Balance => self.balance,
            Criterion::Cpu => self.cpu,
            Criterion::Gpu => self.gpu,
        }
    }

    fn slot(&mut self, criterion: Criterion) -> &mut f64 {
        match criterion {
            Criterion::Performance => &mut self.performance,
            Criterion::Mobility => &mut self.mobility,
            Criterion::Price => &mut self.price,
            Criterion::Storage => &mut self.storage,
            Criterion::Screen => &mut self.screen,
            Criterion::Ram => &mut self.ram,
            Criterion::Balance => &mut self.balance,
            Criterion::Cpu => &mut self.cpu,
            Criterion::Gpu => &mut self.gpu,
        }
    }

    /// Adds to a weight, never letting it drop below zero.
    pub fn add(&mut self, criterion: Criterion, amount: f64) {
        let slot = self.slot(criterion);
        *slot = (*slot + amount).max(0.0);
    }

    pub fn set(&mut self, criterion: Criterion, value: f64) {
        *self.slot(criterion) = value.max(0.0);
    }
}

/// Hard constraint evaluated against a product before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// The product must be a real catalog entry.
    ListedInCatalog,
    /// Price must not exceed the ceiling.
    MaxPrice { max: u64 },
    /// Normalized score must be at least `min`.
    MinScore { kind: SpecKind, min: f64 },
    /// Normalized score must stay strictly below `max`.
    BelowScore { kind: SpecKind, max: f64 },
}

impl Constraint {
    pub fn keeps(&self, specs: &NormalizedSpecs, product: &Product) -> bool {
        match *self {
            Constraint::ListedInCatalog => !product.is_placeholder(),
            // an unknown price cannot be shown to exceed the budget
            Constraint::MaxPrice { max } => product.price.is_none_or(|price| price <= max),
            Constraint::MinScore { kind, min } => specs.get(kind) >= min,
            Constraint::BelowScore { kind, max } => specs.get(kind) < max,
        }
    }
}

/// A constraint with the exclusion reason shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub constraint: Constraint,
    pub reason: String,
}

impl Filter {
    pub fn new(constraint: Constraint, reason: impl Into<String>) -> Self {
        Self {
            constraint,
            reason: reason.into(),
        }
    }

    /// True keeps the product.
    pub fn keeps(&self, specs: &NormalizedSpecs, product: &Product) -> bool {
        self.constraint.keeps(specs, product)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileMode {
    Prompt,
    Sliders,
}

impl fmt::Display for ProfileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileMode::Prompt => write!(f, "prompt"),
            ProfileMode::Sliders => write!(f, "sliders"),
        }
    }
}

/// Weighting and filtering intent for one comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeedsProfile {
    pub mode: ProfileMode,
    pub weights: Weights,
    /// Evaluated in order; the first failing filter names the exclusion.
    pub filters: Vec<Filter>,
    pub reason: String,
    /// Recognized trigger phrases, in match order.
    pub user_keywords: Vec<String>,
    /// Ram/storage/screen criteria the prompt asked for explicitly.
    pub emphasized: Vec<Criterion>,
}

impl NeedsProfile {
    /// True when at least one prompt keyword matched.
    pub fn has_keywords(&self) -> bool {
        !self.user_keywords.is_empty()
    }
}

/// How a rule recognizes itself in the lowercased prompt.
enum Trigger {
    Phrases(&'static [&'static str]),
    Pattern(fn() -> &'static Regex),
}

impl Trigger {
    /// The matched text, quoted back to the user as a keyword.
    fn find(&self, text: &str) -> Option<String> {
        match self {
            Trigger::Phrases(phrases) => phrases.iter().find(|p| text.contains(*p)).map(|p| p.to_string()),
            Trigger::Pattern(regex) => regex().find(text).map(|m| m.as_str().to_string()),
        }
    }
}

struct KeywordRule {
    trigger: Trigger,
    /// Cancels this rule when it matches (negations).
    unless: Option<Trigger>,
    concept: &'static str,
    boosts: &'static [(Criterion, f64)],
    filter: Option<(Constraint, &'static str)>,
    emphasis: Option<Criterion>,
}

/// A negator followed, within a few filler words, by a gaming term:
/// "không game", "ko chơi game", "chẳng cần laptop gaming".
static NO_GAMING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:không|ko|k|chẳng|chả)\s+(?:(?:cần|chơi|dùng|để|hay|laptop|máy)\s+){0,3}(?:game|gaming)\b")
        .expect("Invalid gaming negation regex pattern")
});

fn no_gaming() -> &'static Regex {
    &NO_GAMING_RE
}

static KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        trigger: Trigger::Pattern(no_gaming),
        unless: None,
        concept: "không chơi game",
        boosts: &[(Criterion::Mobility, 1.0), (Criterion::Price, 0.5)],
        filter: Some((
            Constraint::BelowScore { kind: SpecKind::Gpu, max: 6.0 },
            "có GPU rời mạnh, không cần thiết khi bạn không chơi game",
        )),
        emphasis: None,
    },
    KeywordRule {
        trigger: Trigger::Phrases(&["chơi game", "gaming", "game"]),
        unless: Some(Trigger::Pattern(no_gaming)),
        concept: "chơi game",
        boosts: &[(Criterion::Performance, 2.0), (Criterion::Gpu, 1.5)],
        filter: Some((
            Constraint::MinScore { kind: SpecKind::Gpu, min: 6.0 },
            "card đồ họa không đủ mạnh để chơi game",
        )),
        emphasis: None,
    },
    KeywordRule {
        trigger: Trigger::Phrases(&["đồ họa", "thiết kế", "dựng phim", "render", "edit video"]),
        unless: None,
        concept: "đồ họa và thiết kế",
        boosts: &[(Criterion::Performance, 1.5), (Criterion::Gpu, 1.0), (Criterion::Screen, 1.5)],
        filter: None,
        emphasis: Some(Criterion::Screen),
    },
    KeywordRule {
        trigger: Trigger::Phrases(&["lập trình", "code", "developer"]),
        unless: None,
        concept: "lập trình",
        boosts: &[(Criterion::Performance, 1.0), (Criterion::Cpu, 0.5), (Criterion::Ram, 1.5)],
        filter: None,
        emphasis: None,
    },
    KeywordRule {
        trigger: Trigger::Phrases(&["văn phòng", "office", "word", "excel"]),
        unless: None,
        concept: "công việc văn phòng",
        boosts: &[(Criterion::Mobility, 1.0), (Criterion::Price, 1.0), (Criterion::Balance, 0.5)],
        filter: None,
        emphasis: None,
    },
    KeywordRule {
        trigger: Trigger::Phrases(&["sinh viên", "học sinh", "học tập"]),
        unless: None,
        concept: "học tập (sinh viên)",
        boosts: &[(Criterion::Price, 1.5), (Criterion::Mobility, 1.0)],
        filter: None,
        emphasis: None,
    },
    KeywordRule {
        trigger: Trigger::Phrases(&["giá rẻ", "tiết kiệm", "rẻ", "giá tốt"]),
        unless: None,
        concept: "giá rẻ",
        boosts: &[(Criterion::Price, 2.0)],
        filter: None,
        emphasis: None,
    },
    KeywordRule {
        trigger: Trigger::Phrases(&["mỏng nhẹ", "siêu nhẹ", "nhẹ"]),
        unless: None,
        concept: "mỏng nhẹ",
        boosts: &[(Criterion::Mobility, 2.0)],
        filter: Some((
            Constraint::MinScore { kind: SpecKind::Weight, min: 7.0 },
            "nặng hơn 1,6 kg, không đủ mỏng nhẹ",
        )),
        emphasis: None,
    },
    KeywordRule {
        trigger: Trigger::Phrases(&["di chuyển", "pin trâu", "pin lâu", "pin khỏe"]),
        unless: None,
        concept: "di chuyển nhiều, pin lâu",
        boosts: &[(Criterion::Mobility, 1.5)],
        filter: None,
        emphasis: None,
    },
    KeywordRule {
        trigger: Trigger::Phrases(&["32gb ram", "ram 32gb", "32 gb ram"]),
        unless: None,
        concept: "RAM 32GB",
        boosts: &[(Criterion::Ram, 2.0), (Criterion::Performance, 0.5)],
        filter: Some((
            Constraint::MinScore { kind: SpecKind::Ram, min: 9.0 },
            "RAM dưới 32GB",
        )),
        emphasis: Some(Criterion::Ram),
    },
    KeywordRule {
        trigger: Trigger::Phrases(&["16gb ram", "ram 16gb", "16 gb ram"]),
        unless: None,
        concept: "RAM 16GB",
        boosts: &[(Criterion::Ram, 1.5)],
        filter: Some((
            Constraint::MinScore { kind: SpecKind::Ram, min: 7.0 },
            "RAM dưới 16GB",
        )),
        emphasis: Some(Criterion::Ram),
    },
    KeywordRule {
        trigger: Trigger::Phrases(&["ssd 1tb", "1tb ssd", "lưu trữ lớn", "nhiều dung lượng"]),
        unless: None,
        concept: "lưu trữ lớn",
        boosts: &[(Criterion::Storage, 1.5)],
        filter: Some((
            Constraint::MinScore { kind: SpecKind::Storage, min: 9.0 },
            "ổ SSD dưới 1TB",
        )),
        emphasis: Some(Criterion::Storage),
    },
    KeywordRule {
        trigger: Trigger::Phrases(&["màn hình đẹp", "oled", "màn hình"]),
        unless: None,
        concept: "màn hình đẹp",
        boosts: &[(Criterion::Screen, 2.0)],
        filter: None,
        emphasis: Some(Criterion::Screen),
    },
    KeywordRule {
        trigger: Trigger::Phrases(&["cân bằng", "đa năng", "mọi thứ"]),
        unless: None,
        concept: "sử dụng đa năng",
        boosts: &[(Criterion::Balance, 1.5)],
        filter: None,
        emphasis: None,
    },
];

static BUDGET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:dưới|không quá|tối đa)\s*(\d+(?:[.,]\d+)?)\s*(?:triệu|tr)\b")
        .expect("Invalid budget regex pattern")
});

/// Builds the needs profile for one request.
///
/// A prompt longer than [`MIN_PROMPT_CHARS`] (after trimming) takes over entirely;
/// otherwise the sliders decide the weights.
pub fn build_profile(prompt: &str, priorities: &Priorities) -> NeedsProfile {
    let trimmed = prompt.trim();
    let profile = if trimmed.chars().count() > MIN_PROMPT_CHARS {
        profile_from_prompt(trimmed)
    } else {
        profile_from_sliders(priorities)
    };
    debug!(
        "Needs profile [{}]: {:?}, {} filters, keywords {:?}",
        profile.mode,
        profile.weights,
        profile.filters.len(),
        profile.user_keywords
    );
    profile
}

fn catalog_filter() -> Filter {
    Filter::new(Constraint::ListedInCatalog, "không có trong danh mục sản phẩm")
}

fn profile_from_prompt(prompt: &str) -> NeedsProfile {
    let lower = prompt.to_lowercase();
    let mut weights = Weights::default();
    let mut filters = vec![catalog_filter()];
    let mut user_keywords = Vec::new();
    let mut emphasized = Vec::new();
    let mut concepts: Vec<String> = Vec::new();

    for rule in KEYWORD_RULES {
        if rule.unless.as_ref().is_some_and(|neg| neg.find(&lower).is_some()) {
            continue;
        }
        let Some(trigger) = rule.trigger.find(&lower) else {
            continue;
        };

        user_keywords.push(trigger);
        concepts.push(rule.concept.to_string());
        for &(criterion, amount) in rule.boosts {
            weights.add(criterion, amount);
        }
        if let Some((constraint, reason)) = rule.filter {
            filters.push(Filter::new(constraint, reason));
        }
        if let Some(criterion) = rule.emphasis {
            if !emphasized.contains(&criterion) {
                emphasized.push(criterion);
            }
        }
    }

    if let Some(caps) = BUDGET_RE.captures(&lower) {
        let millions = caps
            .get(1)
            .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0);
        if let (Some(phrase), Some(millions)) = (caps.get(0), millions) {
            let ceiling = (millions * 1_000_000.0).round() as u64;
            user_keywords.push(phrase.as_str().to_string());
            concepts.push(format!("ngân sách dưới {}", format_vnd(ceiling)));
            weights.add(Criterion::Price, 1.0);
            filters.push(Filter::new(
                Constraint::MaxPrice { max: ceiling },
                format!("giá vượt ngân sách {}", format_vnd(ceiling)),
            ));
        }
    }

    let reason = if concepts.is_empty() {
        "Không nhận diện được nhu cầu cụ thể trong mô tả, nên các tiêu chí được đánh giá cân bằng."
            .to_string()
    } else {
        let mut text = format!("Nhu cầu được nhận diện: {}.", concepts.join(", "));
        if filters.len() > 1 {
            text.push_str(" Sản phẩm không đáp ứng yêu cầu bắt buộc sẽ bị loại.");
        }
        text
    };

    NeedsProfile {
        mode: ProfileMode::Prompt,
        weights,
        filters,
        reason,
        user_keywords,
        emphasized,
    }
}

/// Slider value at or above 50 scales proportionally; below that it is a flat low weight.
pub fn slider_weight(value: f64) -> f64 {
    if value >= 50.0 {
        value / SLIDER_DIVISOR
    } else {
        LOW_SLIDER_WEIGHT
    }
}

fn profile_from_sliders(priorities: &Priorities) -> NeedsProfile {
    let performance = slider_weight(priorities.performance);
    let mobility = slider_weight(priorities.mobility);
    let price = slider_weight(priorities.price);

    let mut weights = Weights::default();
    weights.set(Criterion::Performance, performance);
    weights.set(Criterion::Mobility, mobility);
    weights.set(Criterion::Price, price);
    weights.set(Criterion::Ram, performance * 0.5);
    weights.set(Criterion::Storage, (performance + price) * 0.2);
    weights.set(Criterion::Screen, (performance + mobility) * 0.2);
    weights.set(Criterion::Balance, 0.0);

    let reason = format!(
        "Dựa trên mức ưu tiên của bạn: hiệu năng {} ({:.0}), tính di động {} ({:.0}), giá cả {} ({:.0}).",
        Priorities::level_label(priorities.performance),
        priorities.performance,
        Priorities::level_label(priorities.mobility),
        priorities.mobility,
        Priorities::level_label(priorities.price),
        priorities.price,
    );

    NeedsProfile {
        mode: ProfileMode::Sliders,
        weights,
        filters: vec![catalog_filter()],
        reason,
        user_keywords: Vec::new(),
        emphasized: Vec::new(),
    }
}
