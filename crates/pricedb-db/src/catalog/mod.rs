//! Database operations for catalog products and everything hanging off them.

mod collections;
mod lookups;
mod products;
mod variants;

pub use collections::{
    list_product_images, list_product_review_attributes, list_product_specifications,
    replace_images, replace_review_attributes, replace_specifications, ProductImageRow,
    ProductSpecificationRow, ReviewAttributeRow,
};
pub use lookups::{
    get_or_create_color, get_or_create_seller, get_or_create_spec_attribute,
    get_or_create_warranty, upsert_catalog_brand, upsert_catalog_category,
};
pub use products::{get_product_by_api_id, upsert_product, ProductRow};
pub use variants::{
    insert_price_history_if_changed, list_price_history, list_variants, prune_variants,
    upsert_variant, PriceHistoryRow, VariantLinks, VariantRow,
};
