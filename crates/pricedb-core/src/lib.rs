pub mod app_config;
pub mod category;
pub mod config;
pub mod domain;
pub mod names;
pub mod records;

use thiserror::Error;

pub use app_config::{AppConfig, CatalogEndpoints, Environment, SourceConfig};
pub use category::AssetCategory;
pub use config::{load_app_config, load_app_config_from_env};
pub use domain::{CatalogKind, Domain};
pub use names::{load_name_table, DisplayNames, NameTable};
pub use records::{
    AssetObservation, BrandRef, CategoryRef, ColorRef, ImageRecord, MotorcycleObservation,
    ProductDetail, ReviewAttributeRecord, ScrapedRecord, SellerRef, SpecRecord, VariantRecord,
    VehicleObservation, WarrantyRef,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read name table {path}: {source}")]
    NameTableIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse name table: {0}")]
    NameTableParse(#[from] serde_yaml::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown domain: {0}")]
    UnknownDomain(String),

    #[error("unknown asset category: {0}")]
    UnknownCategory(String),
}
