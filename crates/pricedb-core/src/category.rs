use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Closed set of financial asset categories. Stored as the upper-case
/// string returned by [`AssetCategory::as_str`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetCategory {
    Coin,
    CurrencyIrr,
    CurrencyFx,
    CryptoIrr,
    CryptoUsd,
    Gold,
    Metal,
    Commodity,
    Index,
    Derivatives,
    #[default]
    Other,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 11] = [
        AssetCategory::Coin,
        AssetCategory::CurrencyIrr,
        AssetCategory::CurrencyFx,
        AssetCategory::CryptoIrr,
        AssetCategory::CryptoUsd,
        AssetCategory::Gold,
        AssetCategory::Metal,
        AssetCategory::Commodity,
        AssetCategory::Index,
        AssetCategory::Derivatives,
        AssetCategory::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AssetCategory::Coin => "COIN",
            AssetCategory::CurrencyIrr => "CURRENCY_IRR",
            AssetCategory::CurrencyFx => "CURRENCY_FX",
            AssetCategory::CryptoIrr => "CRYPTO_IRR",
            AssetCategory::CryptoUsd => "CRYPTO_USD",
            AssetCategory::Gold => "GOLD",
            AssetCategory::Metal => "METAL",
            AssetCategory::Commodity => "COMMODITY",
            AssetCategory::Index => "INDEX",
            AssetCategory::Derivatives => "DERIVATIVES",
            AssetCategory::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_form_round_trips() {
        for category in AssetCategory::ALL {
            assert_eq!(category.as_str().parse::<AssetCategory>().unwrap(), category);
        }
    }

    #[test]
    fn serde_uses_stored_form() {
        let json = serde_json_like(AssetCategory::CryptoIrr);
        assert_eq!(json, "CRYPTO_IRR");
    }

    #[test]
    fn default_is_other() {
        assert_eq!(AssetCategory::default(), AssetCategory::Other);
    }

    fn serde_json_like(category: AssetCategory) -> String {
        serde_yaml::to_string(&category).unwrap().trim().to_string()
    }
}
