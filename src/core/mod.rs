//! Core module - Configuration, error handling, and common types

mod config;
mod error;
mod types;

pub use config::{AdminConfig, Config, DocumentConfig, GeneralConfig, StorageConfig};
pub use error::{Error, Result};
pub(crate) use types::check_rate;
pub use types::{
    EdgeDeviceRates, EdgeDeviceSelection, MeterRate, PaymentMode, PricingCatalog,
    QuotationState, ServiceRate, ServiceSelection,
};
