//! Quotation state controller
//!
//! Owns the session's catalog and selections. Every edit is validated,
//! applied, and followed by a full synchronous recalculation, so
//! [`Configurator::quotation`] always reflects the current state.
//!
//! Quantity input policy:
//! - meters: any non-numeric, negative or empty entry becomes 0
//! - services and TerraEdge: entries must be >= 1, empty becomes 0, anything
//!   else is rejected and the previous value kept

use crate::core::{Error, PaymentMode, PricingCatalog, QuotationState, Result, ServiceSelection};
use crate::pricing::{PricingEngine, Quotation, ServiceRule};

/// Parse a meter quantity entry
pub fn parse_meter_quantity(input: &str) -> u32 {
    input.trim().parse::<u32>().unwrap_or(0)
}

/// Parse a service or TerraEdge quantity entry.
///
/// Returns `None` when the entry must be rejected.
pub fn parse_unit_quantity(input: &str) -> Option<u32> {
    let input = input.trim();
    if input.is_empty() {
        return Some(0);
    }
    match input.parse::<u32>() {
        Ok(quantity) if quantity >= 1 => Some(quantity),
        _ => None,
    }
}

/// Interactive quotation session
pub struct Configurator {
    engine: PricingEngine,
    state: QuotationState,
    quotation: Quotation,
}

impl Configurator {
    /// Start a fresh session against `catalog`
    pub fn new(catalog: &PricingCatalog) -> Self {
        let engine = PricingEngine::new(catalog);
        let state = QuotationState::for_catalog(catalog);
        let quotation = engine.calculate(&state);
        Self {
            engine,
            state,
            quotation,
        }
    }

    pub fn catalog(&self) -> &PricingCatalog {
        self.engine.catalog()
    }

    pub fn state(&self) -> &QuotationState {
        &self.state
    }

    /// Result of the last recalculation
    pub fn quotation(&self) -> &Quotation {
        &self.quotation
    }

    /// Swap in an edited catalog, keeping the current selections
    pub fn replace_catalog(&mut self, catalog: &PricingCatalog) {
        self.engine.update_catalog(catalog);
        for meter in &catalog.meters {
            self.state.meter_quantities.entry(meter.id.clone()).or_insert(0);
        }
        for service in &catalog.services {
            self.state.services.entry(service.id.clone()).or_default();
        }
        self.recompute();
    }

    pub fn set_meter_quantity(&mut self, id: &str, input: &str) -> Result<()> {
        if self.catalog().meter(id).is_none() {
            return Err(Error::UnknownMeter(id.to_string()));
        }
        let quantity = parse_meter_quantity(input);
        self.state.meter_quantities.insert(id.to_string(), quantity);
        self.recompute();
        Ok(())
    }

    pub fn set_ai_opt_in(&mut self, opt_in: bool) {
        self.state.ai_opt_in = opt_in;
        self.recompute();
    }

    pub fn set_edge_required(&mut self, required: bool) {
        self.state.edge.required = required;
        self.recompute();
    }

    pub fn set_edge_quantity(&mut self, input: &str) -> Result<()> {
        let quantity = parse_unit_quantity(input).ok_or_else(|| Error::InvalidQuantity {
            input: input.to_string(),
        })?;
        self.state.edge.quantity = quantity;
        self.recompute();
        Ok(())
    }

    pub fn set_edge_payment(&mut self, payment: PaymentMode) {
        self.state.edge.payment = payment;
        self.recompute();
    }

    /// Select or deselect a service.
    ///
    /// Selecting a TerraAI-only service without the TerraAI opt-in is refused.
    pub fn select_service(&mut self, id: &str, selected: bool) -> Result<()> {
        if self.catalog().service(id).is_none() {
            return Err(Error::UnknownService(id.to_string()));
        }
        if selected && !self.state.ai_opt_in {
            if let Some(rule) = ServiceRule::for_id(id) {
                if rule.requires_ai() {
                    return Err(Error::ServiceRequiresAi(id.to_string()));
                }
            }
        }

        self.state
            .services
            .entry(id.to_string())
            .or_insert_with(ServiceSelection::default)
            .selected = selected;
        self.recompute();
        Ok(())
    }

    pub fn set_service_quantity(&mut self, id: &str, input: &str) -> Result<()> {
        if self.catalog().service(id).is_none() {
            return Err(Error::UnknownService(id.to_string()));
        }
        let quantity = parse_unit_quantity(input).ok_or_else(|| Error::InvalidQuantity {
            input: input.to_string(),
        })?;

        self.state
            .services
            .entry(id.to_string())
            .or_insert_with(ServiceSelection::default)
            .quantity = quantity;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.quotation = self.engine.calculate(&self.state);
        for warning in &self.quotation.warnings {
            log::warn!("{}", warning);
        }
    }
}
