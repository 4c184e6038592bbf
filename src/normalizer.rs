// Hardware label normalization onto a common 0-10 scale
use crate::model::Product;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Attribute kinds that can be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecKind {
    Cpu,
    Gpu,
    Ram,
    Battery,
    Weight,
    Storage,
    Screen,
}

impl SpecKind {
    pub const ALL: [SpecKind; 7] = [
        SpecKind::Cpu,
        SpecKind::Gpu,
        SpecKind::Ram,
        SpecKind::Battery,
        SpecKind::Weight,
        SpecKind::Storage,
        SpecKind::Screen,
    ];
}

/// A tier in an ordered keyword table. The first tier with a matching keyword wins.
pub struct TierRule {
    pub keywords: &'static [&'static str],
    pub score: f64,
}

pub const CPU_ENTRY_SCORE: f64 = 3.0;
pub const GPU_ENTRY_SCORE: f64 = 3.0;
pub const BATTERY_DEFAULT: f64 = 4.0;
pub const WEIGHT_DEFAULT: f64 = 5.0;
pub const SCREEN_DEFAULT: f64 = 4.0;

pub static CPU_TIERS: &[TierRule] = &[
    // Intel Core m low-power parts, ahead of the bare Apple "m3"/"m4" keywords
    TierRule {
        keywords: &["core m3", "core m5", "core m7", "m3-", "m5-", "m7-"],
        score: 3.0,
    },
    TierRule {
        keywords: &["i9", "ryzen 9", "ryzen ai 9", "ultra 9", "m3 max", "m2 max", "m4 max", "m3 pro", "m4 pro"],
        score: 10.0,
    },
    TierRule {
        keywords: &["i7", "ryzen 7", "ultra 7", "m2 pro", "m1 max", "m1 pro", "m4", "m3", "snapdragon x elite"],
        score: 8.0,
    },
    TierRule {
        keywords: &["i5", "ryzen 5", "ultra 5", "m2", "m1", "snapdragon x plus"],
        score: 6.0,
    },
    TierRule {
        keywords: &["i3", "ryzen 3"],
        score: 4.0,
    },
    TierRule {
        keywords: &["celeron", "pentium", "athlon", "mediatek"],
        score: 2.0,
    },
];

pub static GPU_TIERS: &[TierRule] = &[
    TierRule {
        keywords: &["rtx 5090", "rtx 5080", "rtx 4090", "rtx 4080", "rtx 3080 ti"],
        score: 10.0,
    },
    TierRule {
        keywords: &["rtx 5070", "rtx 4070", "rtx 3080", "rtx 3070", "rx 7900"],
        score: 9.0,
    },
    TierRule {
        keywords: &["rtx 5060", "rtx 4060", "rtx 3060", "rx 7600", "rx 6700"],
        score: 8.0,
    },
    TierRule {
        keywords: &["rtx 4050", "rtx 3050", "rtx 2060", "rtx 2050", "rx 6500"],
        score: 7.0,
    },
    TierRule {
        keywords: &["gtx", "mx5", "mx 5", "arc a", "radeon rx"],
        score: 6.0,
    },
    TierRule {
        keywords: &["iris xe", "radeon 780m", "radeon 680m", "arc graphics", "apple", "m1", "m2", "m3", "m4"],
        score: 4.0,
    },
    TierRule {
        keywords: &["uhd", "intel hd", "integrated", "tích hợp", "radeon graphics", "vega"],
        score: 2.0,
    },
];

pub static SCREEN_TIERS: &[TierRule] = &[
    TierRule { keywords: &["oled", "xdr"], score: 10.0 },
    TierRule { keywords: &["4k", "uhd"], score: 9.0 },
    TierRule { keywords: &["qhd", "wqxga", "2.8k", "3k"], score: 8.0 },
    TierRule { keywords: &["fhd+", "retina", "wuxga"], score: 7.0 },
    TierRule { keywords: &["fhd"], score: 6.0 },
];

static LEADING_INT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)").expect("Invalid integer regex pattern")
});

static GB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*gb").expect("Invalid RAM regex pattern")
});

static HOURS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:hrs?|hours?|giờ|h)\b").expect("Invalid battery hours regex pattern")
});

static WATT_HOURS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*wh").expect("Invalid battery Wh regex pattern")
});

static KG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*kg").expect("Invalid weight regex pattern")
});

static GRAMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{3,4})\s*g\b").expect("Invalid grams regex pattern")
});

static CAPACITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(tb|gb)").expect("Invalid storage regex pattern")
});

/// Normalized view of one product: every attribute on [0, 10] except the raw price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedSpecs {
    pub cpu: f64,
    pub gpu: f64,
    pub ram: f64,
    pub battery: f64,
    pub weight: f64,
    pub storage: f64,
    pub screen: f64,
    pub price: Option<u64>,
}

impl NormalizedSpecs {
    pub fn from_product(product: &Product) -> Self {
        Self {
            cpu: normalize(&product.cpu, SpecKind::Cpu),
            gpu: normalize(&product.gpu, SpecKind::Gpu),
            ram: normalize(&product.ram, SpecKind::Ram),
            battery: normalize(&product.battery, SpecKind::Battery),
            weight: normalize(&product.weight, SpecKind::Weight),
            storage: normalize(&product.storage, SpecKind::Storage),
            screen: normalize(&product.screen, SpecKind::Screen),
            price: product.price,
        }
    }

    pub fn get(&self, kind: SpecKind) -> f64 {
        match kind {
            SpecKind::Cpu => self.cpu,
            SpecKind::Gpu => self.gpu,
            SpecKind::Ram => self.ram,
            SpecKind::Battery => self.battery,
            SpecKind::Weight => self.weight,
            SpecKind::Storage => self.storage,
            SpecKind::Screen => self.screen,
        }
    }
}

/// Maps a free-text hardware label to a score in [0, 10].
///
/// Never fails: empty labels score 0 (battery, weight and screen use their
/// defaults instead) and anything unrecognized degrades to the kind's default.
pub fn normalize(value: &str, kind: SpecKind) -> f64 {
    let text = value.trim().to_lowercase();
    let score = match kind {
        SpecKind::Cpu if text.is_empty() => 0.0,
        SpecKind::Gpu if text.is_empty() => 0.0,
        SpecKind::Cpu => match_tier(&text, CPU_TIERS).unwrap_or(CPU_ENTRY_SCORE),
        SpecKind::Gpu => match_tier(&text, GPU_TIERS).unwrap_or(GPU_ENTRY_SCORE),
        SpecKind::Ram => normalize_ram(&text),
        SpecKind::Battery => normalize_battery(&text),
        SpecKind::Weight => normalize_weight(&text),
        SpecKind::Storage => normalize_storage(&text),
        SpecKind::Screen => match_tier(&text, SCREEN_TIERS).unwrap_or(SCREEN_DEFAULT),
    };
    if score.is_finite() { score.clamp(0.0, 10.0) } else { 0.0 }
}

/// Walks an ordered tier table top to bottom; the first keyword hit decides the score.
pub fn match_tier(text: &str, tiers: &[TierRule]) -> Option<f64> {
    tiers
        .iter()
        .find(|tier| tier.keywords.iter().any(|kw| text.contains(kw)))
        .map(|tier| tier.score)
}

fn normalize_ram(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let gb = GB_RE
        .captures(text)
        .or_else(|| LEADING_INT_RE.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0);

    match gb {
        g if g >= 64 => 10.0,
        g if g >= 32 => 9.0,
        g if g >= 16 => 7.0,
        g if g >= 8 => 5.0,
        g if g >= 4 => 3.0,
        _ => 2.0,
    }
}

fn normalize_battery(text: &str) -> f64 {
    if let Some(hours) = capture_number(&HOURS_RE, text) {
        return hours / 2.0;
    }
    if let Some(watt_hours) = capture_number(&WATT_HOURS_RE, text) {
        return watt_hours / 10.0;
    }
    BATTERY_DEFAULT
}

fn normalize_weight(text: &str) -> f64 {
    let kg = capture_number(&KG_RE, text)
        .or_else(|| capture_number(&GRAMS_RE, text).map(|g| g / 1000.0));

    match kg {
        Some(kg) if kg <= 1.0 => 10.0,
        Some(kg) if kg <= 1.3 => 9.0,
        Some(kg) if kg <= 1.6 => 7.0,
        Some(kg) if kg <= 2.0 => 5.0,
        Some(kg) if kg <= 2.5 => 3.0,
        Some(_) => 1.0,
        None => WEIGHT_DEFAULT,
    }
}

fn normalize_storage(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let gb = CAPACITY_RE
        .captures(text)
        .and_then(|caps| {
            let amount = parse_decimal(caps.get(1)?.as_str())?;
            let unit = caps.get(2)?.as_str().to_lowercase();
            Some(if unit == "tb" { amount * 1000.0 } else { amount })
        })
        .unwrap_or(0.0);

    let ssd = text.contains("ssd");
    match gb {
        g if ssd && g >= 2000.0 => 10.0,
        g if ssd && g >= 1000.0 => 9.0,
        g if ssd && g >= 512.0 => 7.0,
        g if ssd && g >= 256.0 => 5.0,
        g if text.contains("hdd") && g >= 1000.0 => 3.0,
        _ => 2.0,
    }
}

fn capture_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_decimal(m.as_str()))
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}
