//! Domain tags: one per scraped asset class.
//!
//! Every pipeline entry point is dispatched on a [`Domain`]. Catalog product
//! kinds share one schema and one reconciliation path; they differ only in
//! the upstream list/detail endpoints they are scraped from.

use std::str::FromStr;

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CatalogKind {
    Mobile,
    Pc,
    Console,
    Headphone,
    Gadget,
    Personal,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 6] = [
        CatalogKind::Mobile,
        CatalogKind::Pc,
        CatalogKind::Console,
        CatalogKind::Headphone,
        CatalogKind::Gadget,
        CatalogKind::Personal,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogKind::Mobile => "mobile",
            CatalogKind::Pc => "pc",
            CatalogKind::Console => "console",
            CatalogKind::Headphone => "headphone",
            CatalogKind::Gadget => "gadget",
            CatalogKind::Personal => "personal",
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Domain {
    Assets,
    Cars,
    Motorcycles,
    Catalog(CatalogKind),
}

impl Domain {
    pub const ALL: [Domain; 9] = [
        Domain::Assets,
        Domain::Cars,
        Domain::Motorcycles,
        Domain::Catalog(CatalogKind::Mobile),
        Domain::Catalog(CatalogKind::Pc),
        Domain::Catalog(CatalogKind::Console),
        Domain::Catalog(CatalogKind::Headphone),
        Domain::Catalog(CatalogKind::Gadget),
        Domain::Catalog(CatalogKind::Personal),
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Assets => "assets",
            Domain::Cars => "cars",
            Domain::Motorcycles => "motorcycles",
            Domain::Catalog(kind) => kind.as_str(),
        }
    }

    /// Upper-case form used in environment variable names,
    /// e.g. `PRICEDB_SCHEDULE_MOTORCYCLES`.
    #[must_use]
    pub fn env_suffix(self) -> String {
        self.as_str().to_ascii_uppercase()
    }

    /// `true` when items are discovered by id on list pages and need a
    /// separate detail fetch before they can be reconciled.
    #[must_use]
    pub fn has_detail_phase(self) -> bool {
        matches!(self, Domain::Catalog(_))
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| CoreError::UnknownDomain(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_domain_tag() {
        for domain in Domain::ALL {
            assert_eq!(domain.as_str().parse::<Domain>().unwrap(), domain);
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(" Mobile ".parse::<Domain>().unwrap(), Domain::Catalog(CatalogKind::Mobile));
        assert_eq!("CARS".parse::<Domain>().unwrap(), Domain::Cars);
    }

    #[test]
    fn unknown_domain_is_rejected() {
        let err = "boats".parse::<Domain>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownDomain(ref s) if s == "boats"));
    }

    #[test]
    fn only_catalog_kinds_have_a_detail_phase() {
        assert!(!Domain::Assets.has_detail_phase());
        assert!(!Domain::Cars.has_detail_phase());
        assert!(!Domain::Motorcycles.has_detail_phase());
        assert!(Domain::Catalog(CatalogKind::Pc).has_detail_phase());
    }

    #[test]
    fn env_suffix_is_upper_case() {
        assert_eq!(Domain::Catalog(CatalogKind::Headphone).env_suffix(), "HEADPHONE");
    }
}
