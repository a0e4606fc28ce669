//! Price catalog loading, saving and admin editing
//!
//! The catalog is read once at session start and passed explicitly to the
//! pricing engine. Read failures never surface: a missing, corrupt or invalid
//! record falls back to the default catalog. Write failures are reported to
//! the caller as `false` and are not retried.

use crate::core::{check_rate, Error, PricingCatalog, Result};
use crate::db::KeyValueStore;
use crate::pricing::ServiceRule;

/// Store key of the persisted catalog record
pub const PRICING_STORAGE_KEY: &str = "terraems_pricing_config";

/// Load the persisted catalog, or the defaults if there is none usable
pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> PricingCatalog {
    match try_load(store) {
        Ok(Some(catalog)) => {
            log::debug!("Loaded pricing catalog (last updated {})", catalog.last_updated);
            catalog
        }
        Ok(None) => {
            log::debug!("No stored pricing catalog, using defaults");
            PricingCatalog::default()
        }
        Err(e) => {
            log::warn!("Error loading pricing data, using defaults: {}", e);
            PricingCatalog::default()
        }
    }
}

fn try_load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<PricingCatalog>> {
    let Some(raw) = store.get(PRICING_STORAGE_KEY)? else {
        return Ok(None);
    };

    let catalog: PricingCatalog = serde_json::from_str(&raw)?;
    catalog.validate()?;

    for service in &catalog.services {
        if ServiceRule::for_id(&service.id).is_none() {
            log::warn!(
                "Service {} ({}) has no pricing rule and will be quoted at zero",
                service.id,
                service.name
            );
        }
    }

    Ok(Some(catalog))
}

/// Persist `catalog`, stamping a fresh last-updated time.
///
/// Returns `false` on any storage failure, leaving `catalog` untouched.
pub fn save<S: KeyValueStore + ?Sized>(store: &mut S, catalog: &mut PricingCatalog) -> bool {
    let stamped = PricingCatalog {
        last_updated: chrono::Utc::now(),
        ..catalog.clone()
    };

    let result = serde_json::to_string(&stamped)
        .map_err(Error::from)
        .and_then(|json| store.set(PRICING_STORAGE_KEY, &json));

    match result {
        Ok(()) => {
            catalog.last_updated = stamped.last_updated;
            log::info!("Pricing configuration saved");
            true
        }
        Err(e) => {
            log::error!("Error saving pricing data: {}", e);
            false
        }
    }
}

/// Drop the persisted catalog so the next load returns the defaults
pub fn reset<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<()> {
    store.remove(PRICING_STORAGE_KEY)?;
    log::info!("Pricing configuration reset to defaults");
    Ok(())
}

impl PricingCatalog {
    /// Update a meter's rates. `None` leaves that rate unchanged.
    pub fn set_meter_rates(
        &mut self,
        id: &str,
        rate_no_ai: Option<f64>,
        rate_with_ai: Option<f64>,
    ) -> Result<()> {
        if let Some(rate) = rate_no_ai {
            check_rate(&format!("{id}.rateNoAI"), rate)?;
        }
        if let Some(rate) = rate_with_ai {
            check_rate(&format!("{id}.rateWithAI"), rate)?;
        }

        let meter = self
            .meters
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::UnknownMeter(id.to_string()))?;

        if let Some(rate) = rate_no_ai {
            meter.rate_no_ai = rate;
        }
        if let Some(rate) = rate_with_ai {
            meter.rate_with_ai = rate;
        }
        Ok(())
    }

    /// Update a service's unit rate
    pub fn set_service_rate(&mut self, id: &str, rate: f64) -> Result<()> {
        check_rate(&format!("{id}.rate"), rate)?;
        let service = self
            .services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::UnknownService(id.to_string()))?;
        service.rate = rate;
        Ok(())
    }

    /// Update a service's minimum charge.
    ///
    /// Only lines that already carry a minimum can be edited.
    pub fn set_service_minimum(&mut self, id: &str, minimum: f64) -> Result<()> {
        check_rate(&format!("{id}.minimum"), minimum)?;
        let service = self
            .services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::UnknownService(id.to_string()))?;

        match service.minimum.as_mut() {
            Some(current) => {
                *current = minimum;
                Ok(())
            }
            None => Err(Error::Config(format!("service {id} has no minimum charge"))),
        }
    }

    /// Update the TerraEdge rates. `None` leaves that rate unchanged.
    pub fn set_edge_rates(&mut self, monthly: Option<f64>, one_time: Option<f64>) -> Result<()> {
        if let Some(rate) = monthly {
            check_rate("edgeDevice.monthlyRate", rate)?;
        }
        if let Some(rate) = one_time {
            check_rate("edgeDevice.oneTimeRate", rate)?;
        }

        if let Some(rate) = monthly {
            self.edge_device.monthly_rate = rate;
        }
        if let Some(rate) = one_time {
            self.edge_device.one_time_rate = rate;
        }
        Ok(())
    }
}
