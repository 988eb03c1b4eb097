//! Static display-name overrides for asset symbols.
//!
//! The table is loaded once at startup and shared read-only with every
//! worker. Entries here take precedence over titles reported by the source.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisplayNames {
    pub name_fa: String,
    pub name_en: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameTable {
    #[serde(default)]
    assets: HashMap<String, DisplayNames>,
}

impl NameTable {
    /// Case-insensitive lookup by asset symbol.
    #[must_use]
    pub fn asset(&self, symbol: &str) -> Option<&DisplayNames> {
        self.assets.get(&symbol.to_lowercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Parse and validate a name table from YAML text.
///
/// # Errors
///
/// Returns `ConfigError::NameTableParse` on malformed YAML and
/// `ConfigError::Validation` on empty symbols or duplicate symbols
/// that differ only by case.
pub fn parse_name_table(content: &str) -> Result<NameTable, ConfigError> {
    let raw: NameTable = serde_yaml::from_str(content)?;

    let mut assets = HashMap::with_capacity(raw.assets.len());
    for (symbol, names) in raw.assets {
        let key = symbol.trim().to_lowercase();
        if key.is_empty() {
            return Err(ConfigError::Validation(
                "asset symbol must be non-empty".to_string(),
            ));
        }
        if assets.insert(key, names).is_some() {
            return Err(ConfigError::Validation(format!(
                "duplicate asset symbol: '{symbol}'"
            )));
        }
    }

    Ok(NameTable { assets })
}

/// Load the name table from `path`.
///
/// Returns `Ok(None)` when the file does not exist so the caller can decide
/// whether an empty table is acceptable.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed or
/// validated.
pub fn load_name_table(path: &Path) -> Result<Option<NameTable>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::NameTableIo {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    parse_name_table(&content).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
assets:
  sekee:
    name_fa: سکه امامی
    name_en: Emami Coin
  Price_Dollar_RL:
    name_fa: دلار
    name_en: US Dollar
";

    #[test]
    fn lookup_is_case_insensitive() {
        let table = parse_name_table(SAMPLE).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.asset("SEKEE").unwrap().name_en, "Emami Coin");
        assert_eq!(table.asset("price_dollar_rl").unwrap().name_fa, "دلار");
        assert!(table.asset("crypto-bitcoin").is_none());
    }

    #[test]
    fn empty_document_section_is_allowed() {
        let table = parse_name_table("assets: {}\n").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn rejects_case_colliding_symbols() {
        let yaml = "assets:\n  gold:\n    name_fa: a\n    name_en: b\n  GOLD:\n    name_fa: c\n    name_en: d\n";
        let err = parse_name_table(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate asset symbol"));
    }

    #[test]
    fn rejects_blank_symbol() {
        let yaml = "assets:\n  '  ':\n    name_fa: a\n    name_en: b\n";
        let err = parse_name_table(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_name_table("assets: [not, a, map]").unwrap_err();
        assert!(matches!(err, ConfigError::NameTableParse(_)));
    }

    #[test]
    fn missing_file_is_none() {
        let path = Path::new("/nonexistent/pricedb/asset_names.yaml");
        assert!(load_name_table(path).unwrap().is_none());
    }

    #[test]
    fn bundled_table_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/asset_names.yaml");
        let table = load_name_table(&path).unwrap().expect("bundled table present");
        assert!(!table.is_empty());
    }
}
