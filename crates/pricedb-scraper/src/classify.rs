//! Ordered-rule asset category classification.
//!
//! Rules are evaluated top to bottom against the lowercased symbol (and, for
//! a few rules, the English name); the first match wins. Order matters:
//! `crypto-tether-irr` must be caught by the rial-quoted crypto rule before
//! the generic `-irr` currency rule sees it.

use pricedb_core::AssetCategory;

const CRYPTO_TICKERS: &[&str] = &[
    "btc", "bitcoin", "eth", "ethereum", "usdt", "tether", "bnb", "xrp", "ripple", "ada",
    "cardano", "doge", "dogecoin", "sol", "solana", "trx", "tron", "dot", "ltc", "litecoin",
    "shib", "avax", "ton", "link", "xlm", "bch", "matic", "etc", "xmr", "usdc", "dai",
];

const COIN_PREFIXES: &[&str] = &["sekee", "sekeb", "seke", "nim", "rob", "gerami", "coin"];

const GOLD_MARKERS: &[&str] = &["gold", "geram18", "geram24", "mesghal", "abshodeh"];

const METAL_MARKERS: &[&str] = &[
    "silver", "platinum", "palladium", "copper", "aluminum", "aluminium", "zinc", "nickel",
    "lead", "tin",
];

const COMMODITY_MARKERS: &[&str] = &[
    "oil", "brent", "wti", "gas", "gasoline", "wheat", "corn", "sugar", "coffee", "cotton",
    "soybean", "cocoa",
];

const FIAT_CODES: &[&str] = &[
    "usd", "eur", "gbp", "jpy", "chf", "cad", "aud", "nzd", "cny", "try", "aed", "rub", "inr",
    "sek", "nok", "dkk", "sar", "qar", "kwd", "iqd", "afn", "amd", "azn",
];

const FIAT_WORDS: &[&str] = &[
    "dollar", "euro", "eur", "pound", "dirham", "lira", "yuan", "yen", "rupee", "ruble", "dinar",
    "franc", "riyal",
];

struct Subject<'a> {
    symbol: &'a str,
    name: &'a str,
    segments: Vec<&'a str>,
}

impl Subject<'_> {
    fn first_segment(&self) -> &str {
        self.segments.first().copied().unwrap_or("")
    }

    fn has_segment(&self, candidates: &[&str]) -> bool {
        self.segments.iter().any(|s| candidates.contains(s))
    }

    fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.symbol.contains(n))
    }
}

struct Rule {
    category: AssetCategory,
    matches: fn(&Subject<'_>) -> bool,
}

const RULES: &[Rule] = &[
    Rule {
        category: AssetCategory::CryptoIrr,
        matches: |s| s.symbol.starts_with("crypto-") && s.symbol.ends_with("-irr"),
    },
    Rule {
        category: AssetCategory::CryptoUsd,
        matches: |s| s.symbol.starts_with("crypto-"),
    },
    Rule {
        category: AssetCategory::CryptoIrr,
        matches: |s| {
            CRYPTO_TICKERS.contains(&s.first_segment())
                && (s.symbol.ends_with("-irr") || s.symbol.ends_with("_irr"))
        },
    },
    Rule {
        category: AssetCategory::CryptoUsd,
        matches: |s| CRYPTO_TICKERS.contains(&s.first_segment()),
    },
    Rule {
        category: AssetCategory::Coin,
        matches: |s| COIN_PREFIXES.iter().any(|p| s.symbol.starts_with(p)),
    },
    Rule {
        category: AssetCategory::Gold,
        matches: |s| s.contains_any(GOLD_MARKERS) || s.symbol == "ons",
    },
    Rule {
        category: AssetCategory::Metal,
        matches: |s| s.has_segment(METAL_MARKERS) || s.contains_any(&["silver", "platinum", "palladium"]),
    },
    Rule {
        category: AssetCategory::Commodity,
        matches: |s| s.has_segment(COMMODITY_MARKERS),
    },
    Rule {
        category: AssetCategory::Index,
        matches: |s| {
            s.symbol.contains("index") || s.has_segment(&["tse", "bourse", "shakhes"])
        },
    },
    Rule {
        category: AssetCategory::Derivatives,
        matches: |s| s.contains_any(&["future", "option"]),
    },
    Rule {
        category: AssetCategory::CurrencyIrr,
        matches: |s| {
            s.symbol.ends_with("-irr")
                || s.symbol.ends_with("_irr")
                || s.symbol.ends_with("_rl")
                || s.symbol.starts_with("price_")
        },
    },
    Rule {
        category: AssetCategory::CurrencyFx,
        matches: |s| s.segments.len() == 2 && s.segments.iter().all(|seg| FIAT_CODES.contains(seg)),
    },
    Rule {
        category: AssetCategory::CurrencyIrr,
        matches: |s| {
            s.contains_any(FIAT_WORDS) || FIAT_WORDS.iter().any(|w| s.name.contains(w))
        },
    },
];

/// Category for an asset symbol, with `name_en` as a secondary signal.
/// Falls back to [`AssetCategory::Other`].
#[must_use]
pub fn classify_asset(symbol: &str, name_en: &str) -> AssetCategory {
    let symbol = symbol.trim().to_lowercase();
    let name = name_en.trim().to_lowercase();
    let subject = Subject {
        symbol: &symbol,
        name: &name,
        segments: symbol
            .split(['-', '_'])
            .filter(|s| !s.is_empty())
            .collect(),
    };

    RULES
        .iter()
        .find(|rule| (rule.matches)(&subject))
        .map_or(AssetCategory::Other, |rule| rule.category)
}
