//! Common types used across the application
//!
//! The price catalog holds prices only. Quantities and selection flags live
//! in [`QuotationState`], which is created fresh for every session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::core::{Error, Result};

/// Monthly rates for one energy meter SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterRate {
    pub id: String,
    pub name: String,
    /// Monthly rate per unit without TerraAI
    #[serde(rename = "rateNoAI")]
    pub rate_no_ai: f64,
    /// Monthly rate per unit with TerraAI
    #[serde(rename = "rateWithAI")]
    pub rate_with_ai: f64,
}

impl MeterRate {
    pub fn new(id: &str, name: &str, rate_no_ai: f64, rate_with_ai: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            rate_no_ai,
            rate_with_ai,
        }
    }

    /// Rate applicable for the given TerraAI opt-in
    pub fn rate(&self, ai_opt_in: bool) -> f64 {
        if ai_opt_in {
            self.rate_with_ai
        } else {
            self.rate_no_ai
        }
    }
}

/// One-time professional service rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRate {
    pub id: String,
    pub name: String,
    /// Rate per unit
    pub rate: f64,
    /// Unit label, e.g. "per page"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Minimum charge floor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
}

impl ServiceRate {
    pub fn new(id: &str, name: &str, rate: f64, unit: Option<&str>, minimum: Option<f64>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            rate,
            unit: unit.map(String::from),
            minimum,
        }
    }
}

/// TerraEdge gateway rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDeviceRates {
    pub monthly_rate: f64,
    pub one_time_rate: f64,
}

impl EdgeDeviceRates {
    /// Rate for the given payment mode
    pub fn rate(&self, mode: PaymentMode) -> f64 {
        match mode {
            PaymentMode::Monthly => self.monthly_rate,
            PaymentMode::OneTime => self.one_time_rate,
        }
    }
}

impl Default for EdgeDeviceRates {
    fn default() -> Self {
        Self {
            monthly_rate: 100.0,
            one_time_rate: 3000.0,
        }
    }
}

/// The price list, persisted as a single JSON record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingCatalog {
    pub meters: Vec<MeterRate>,
    pub services: Vec<ServiceRate>,
    pub edge_device: EdgeDeviceRates,
    pub last_updated: DateTime<Utc>,
}

impl Default for PricingCatalog {
    fn default() -> Self {
        Self {
            meters: default_meters(),
            services: default_services(),
            edge_device: EdgeDeviceRates::default(),
            last_updated: Utc::now(),
        }
    }
}

fn default_meters() -> Vec<MeterRate> {
    vec![
        MeterRate::new("m1", "Single phase energy meter KWH only", 10.0, 20.0),
        MeterRate::new("m2", "Single phase energy meter kwh, KW, V, I, pf", 20.0, 40.0),
        MeterRate::new("m3", "3 phase energy meter KWH, KW, V, I, Ph", 30.0, 60.0),
        MeterRate::new(
            "m4",
            "3 phase energy meter KWH, KW, V, I, KVAr, harmonics",
            60.0,
            120.0,
        ),
    ]
}

fn default_services() -> Vec<ServiceRate> {
    vec![
        ServiceRate::new(
            "s1",
            "Mimics pages - SLD, electrical component, energy flows etc",
            2000.0,
            Some("per page"),
            None,
        ),
        ServiceRate::new(
            "s2",
            "AI Philosophy for TerraAI",
            2000.0,
            Some("per component"),
            Some(150_000.0),
        ),
        ServiceRate::new(
            "s3",
            "Initialization, Dashboards, Installation, alarms & commissioning",
            1000.0,
            Some("per component"),
            Some(100_000.0),
        ),
    ]
}

impl PricingCatalog {
    /// Look up a meter by identity
    pub fn meter(&self, id: &str) -> Option<&MeterRate> {
        self.meters.iter().find(|m| m.id == id)
    }

    /// Look up a service by identity
    pub fn service(&self, id: &str) -> Option<&ServiceRate> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Check identities are unique and every price is finite and non-negative
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for meter in &self.meters {
            if !seen.insert(meter.id.as_str()) {
                return Err(Error::Config(format!("duplicate meter id: {}", meter.id)));
            }
            check_rate(&format!("{}.rateNoAI", meter.id), meter.rate_no_ai)?;
            check_rate(&format!("{}.rateWithAI", meter.id), meter.rate_with_ai)?;
        }

        let mut seen = HashSet::new();
        for service in &self.services {
            if !seen.insert(service.id.as_str()) {
                return Err(Error::Config(format!("duplicate service id: {}", service.id)));
            }
            check_rate(&format!("{}.rate", service.id), service.rate)?;
            if let Some(minimum) = service.minimum {
                check_rate(&format!("{}.minimum", service.id), minimum)?;
            }
        }

        check_rate("edgeDevice.monthlyRate", self.edge_device.monthly_rate)?;
        check_rate("edgeDevice.oneTimeRate", self.edge_device.one_time_rate)?;
        Ok(())
    }
}

/// Reject negative, NaN and infinite prices
pub(crate) fn check_rate(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidRate {
            field: field.to_string(),
            value,
        })
    }
}

/// How the TerraEdge device is paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMode {
    #[default]
    Monthly,
    OneTime,
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMode::Monthly => write!(f, "Monthly"),
            PaymentMode::OneTime => write!(f, "One-Time"),
        }
    }
}

impl FromStr for PaymentMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(PaymentMode::Monthly),
            "one-time" | "onetime" | "one_time" => Ok(PaymentMode::OneTime),
            other => Err(Error::Config(format!(
                "unknown payment mode {other:?} (expected \"monthly\" or \"one-time\")"
            ))),
        }
    }
}

/// TerraEdge device part of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDeviceSelection {
    pub required: bool,
    /// Raw quantity as entered; clamped to 1 when priced
    pub quantity: u32,
    pub payment: PaymentMode,
}

impl Default for EdgeDeviceSelection {
    fn default() -> Self {
        Self {
            required: false,
            quantity: 1,
            payment: PaymentMode::Monthly,
        }
    }
}

/// Selection state of one service line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub selected: bool,
    pub quantity: u32,
}

impl Default for ServiceSelection {
    fn default() -> Self {
        Self {
            selected: false,
            quantity: 1,
        }
    }
}

/// The user's current selections (never persisted)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotationState {
    pub ai_opt_in: bool,
    pub meter_quantities: BTreeMap<String, u32>,
    pub edge: EdgeDeviceSelection,
    pub services: BTreeMap<String, ServiceSelection>,
}

impl QuotationState {
    /// Fresh state with an entry for every catalog line
    pub fn for_catalog(catalog: &PricingCatalog) -> Self {
        Self {
            ai_opt_in: false,
            meter_quantities: catalog.meters.iter().map(|m| (m.id.clone(), 0)).collect(),
            edge: EdgeDeviceSelection::default(),
            services: catalog
                .services
                .iter()
                .map(|s| (s.id.clone(), ServiceSelection::default()))
                .collect(),
        }
    }

    pub fn meter_quantity(&self, id: &str) -> u32 {
        self.meter_quantities.get(id).copied().unwrap_or(0)
    }

    pub fn service(&self, id: &str) -> ServiceSelection {
        self.services.get(id).copied().unwrap_or_default()
    }

    pub fn any_service_selected(&self) -> bool {
        self.services.values().any(|s| s.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = PricingCatalog::default();
        assert_eq!(catalog.meters.len(), 4);
        assert_eq!(catalog.services.len(), 3);
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.service("s2").unwrap().minimum, Some(150_000.0));
        assert_eq!(catalog.service("s1").unwrap().minimum, None);
    }

    #[test]
    fn test_catalog_json_field_names() {
        let catalog = PricingCatalog::default();
        let json = serde_json::to_value(&catalog).unwrap();

        assert_eq!(json["meters"][0]["rateNoAI"], 10.0);
        assert_eq!(json["meters"][0]["rateWithAI"], 20.0);
        assert_eq!(json["edgeDevice"]["monthlyRate"], 100.0);
        assert_eq!(json["edgeDevice"]["oneTimeRate"], 3000.0);
        assert!(json["lastUpdated"].is_string());
        assert!(json["services"][0].get("minimum").is_none());
    }

    #[test]
    fn test_validate_rejects_duplicates_and_negative_rates() {
        let mut catalog = PricingCatalog::default();
        catalog.meters.push(catalog.meters[0].clone());
        assert!(catalog.validate().is_err());

        let mut catalog = PricingCatalog::default();
        catalog.edge_device.one_time_rate = -1.0;
        assert!(matches!(catalog.validate(), Err(Error::InvalidRate { .. })));

        let mut catalog = PricingCatalog::default();
        catalog.services[1].minimum = Some(f64::NAN);
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_payment_mode_parsing() {
        assert_eq!("monthly".parse::<PaymentMode>().unwrap(), PaymentMode::Monthly);
        assert_eq!("One-Time".parse::<PaymentMode>().unwrap(), PaymentMode::OneTime);
        assert!("yearly".parse::<PaymentMode>().is_err());
        assert_eq!(
            serde_json::to_string(&PaymentMode::OneTime).unwrap(),
            "\"one-time\""
        );
    }

    #[test]
    fn test_fresh_state_for_catalog() {
        let catalog = PricingCatalog::default();
        let state = QuotationState::for_catalog(&catalog);

        assert!(!state.ai_opt_in);
        assert_eq!(state.meter_quantities.len(), 4);
        assert!(state.meter_quantities.values().all(|q| *q == 0));
        assert!(!state.any_service_selected());
        assert_eq!(state.service("s3").quantity, 1);
        assert_eq!(state.edge, EdgeDeviceSelection::default());
    }
}
