//! The built-in Olist dataset descriptors and their namespace scripts.
//!
//! Spec order is load order: independent tables first, then tables that
//! reference them.

use clap::ValueEnum;
use stageload_core::descriptor::{DatasetDescriptor, TableLoadSpec};
use stageload_core::error::CoreError;
use stageload_core::strategy::RemediationStrategy;

/// DDL for the `ecommerce` namespace.
pub const ECOMMERCE_SCHEMA: &str = include_str!("../schemas/ecommerce.sql");

/// DDL for the `marketing` namespace.
pub const MARKETING_SCHEMA: &str = include_str!("../schemas/marketing.sql");

/// Subdirectory of the data root holding the e-commerce files.
pub const ECOMMERCE_DIR: &str = "olist-ecommerce";

/// Subdirectory of the data root holding the marketing funnel files.
pub const MARKETING_DIR: &str = "olist-marketing-funnel";

/// A dataset selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatasetChoice {
    Ecommerce,
    Marketing,
}

impl DatasetChoice {
    /// All datasets, in the order they must be loaded.
    pub const ALL: [Self; 2] = [Self::Ecommerce, Self::Marketing];

    pub fn descriptor(&self) -> Result<DatasetDescriptor, CoreError> {
        match self {
            Self::Ecommerce => ecommerce(),
            Self::Marketing => marketing(),
        }
    }

    pub fn schema_script(&self) -> &'static str {
        match self {
            Self::Ecommerce => ECOMMERCE_SCHEMA,
            Self::Marketing => MARKETING_SCHEMA,
        }
    }
}

/// The e-commerce dataset.
///
/// `order_reviews` ships 827 rows that reuse a `review_id` for a different
/// order; the first occurrence is kept.
pub fn ecommerce() -> Result<DatasetDescriptor, CoreError> {
    DatasetDescriptor::new(
        "ecommerce",
        "ecommerce",
        ECOMMERCE_DIR,
        vec![
            TableLoadSpec::new("olist_customers_dataset.csv", "ecommerce.customers")?,
            TableLoadSpec::new("olist_geolocation_dataset.csv", "ecommerce.geolocation")?
                .with_columns(&[
                    "geolocation_zip_code_prefix",
                    "geolocation_lat",
                    "geolocation_lng",
                    "geolocation_city",
                    "geolocation_state",
                ])?,
            TableLoadSpec::new("olist_products_dataset.csv", "ecommerce.products")?,
            TableLoadSpec::new("olist_sellers_dataset.csv", "ecommerce.sellers")?,
            TableLoadSpec::new(
                "product_category_name_translation.csv",
                "ecommerce.product_category_name_translations",
            )?,
            TableLoadSpec::new("olist_orders_dataset.csv", "ecommerce.orders")?,
            TableLoadSpec::new("olist_order_items_dataset.csv", "ecommerce.order_items")?,
            TableLoadSpec::new("olist_order_payments_dataset.csv", "ecommerce.order_payments")?,
            TableLoadSpec::new("olist_order_reviews_dataset.csv", "ecommerce.order_reviews")?
                .with_strategy(RemediationStrategy::deduplicate_by_key("review_id")?),
        ],
    )
}

/// The marketing funnel dataset. Depends on `ecommerce.sellers`.
///
/// 462 closed deals name a seller absent from the e-commerce export; those
/// deals are dropped.
pub fn marketing() -> Result<DatasetDescriptor, CoreError> {
    DatasetDescriptor::new(
        "marketing",
        "marketing",
        MARKETING_DIR,
        vec![
            TableLoadSpec::new(
                "olist_marketing_qualified_leads_dataset.csv",
                "marketing.marketing_qualified_leads",
            )?,
            TableLoadSpec::new("olist_closed_deals_dataset.csv", "marketing.closed_deals")?
                .with_strategy(RemediationStrategy::filter_by_foreign_key(
                    "seller_id",
                    "ecommerce.sellers",
                )?),
        ],
    )
}
