//! Pricing engine for quotation cost calculation
//!
//! Combines a [`PricingCatalog`] with a [`QuotationState`] into monthly and
//! one-time totals plus an itemized breakdown:
//! - Meters: monthly, rate chosen by the TerraAI opt-in
//! - TerraEdge: monthly or one-time, never both
//! - Services: one-time, some with a minimum charge and/or a TerraAI gate
//!
//! Calculation is pure; the same inputs always yield the same quotation.

use crate::core::{EdgeDeviceSelection, PaymentMode, PricingCatalog, QuotationState, ServiceRate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pricing rule of a service line, keyed by service identity.
///
/// The set is closed: a service identity without a rule is never priced,
/// and is reported through [`PricingWarning::UnknownService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRule {
    /// rate x quantity (mimics pages)
    FlatPerUnit,
    /// max(rate x quantity, minimum), only with TerraAI (AI philosophy)
    FlooredAiGated,
    /// max(rate x quantity, minimum) (initialization & commissioning)
    Floored,
}

impl ServiceRule {
    pub fn for_id(id: &str) -> Option<Self> {
        match id {
            "s1" => Some(ServiceRule::FlatPerUnit),
            "s2" => Some(ServiceRule::FlooredAiGated),
            "s3" => Some(ServiceRule::Floored),
            _ => None,
        }
    }

    /// Whether the line may be selected without TerraAI
    pub fn requires_ai(self) -> bool {
        matches!(self, ServiceRule::FlooredAiGated)
    }

    /// Charge for `quantity` units, or `None` when the TerraAI gate is closed
    pub fn charge(self, service: &ServiceRate, quantity: u32, ai_opt_in: bool) -> Option<ServiceCharge> {
        let base = service.rate * f64::from(quantity);
        match self {
            ServiceRule::FlatPerUnit => Some(ServiceCharge {
                amount: base,
                minimum_applied: false,
            }),
            ServiceRule::FlooredAiGated if !ai_opt_in => None,
            ServiceRule::FlooredAiGated | ServiceRule::Floored => {
                let minimum = service.minimum.unwrap_or(0.0);
                Some(ServiceCharge {
                    amount: base.max(minimum),
                    minimum_applied: base < minimum,
                })
            }
        }
    }
}

/// Result of pricing one service line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceCharge {
    pub amount: f64,
    /// The floor raised the charge (rate x quantity < minimum)
    pub minimum_applied: bool,
}

/// Priced meter line (quantity > 0 only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterLineItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub rate: f64,
    pub total: f64,
}

/// Priced TerraEdge line (present only when the device is required)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLineItem {
    /// Quantity after clamping to at least 1
    pub quantity: u32,
    pub payment: PaymentMode,
    pub rate: f64,
    pub total: f64,
}

/// Priced service line (non-zero cost only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLineItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub rate: f64,
    pub unit: Option<String>,
    pub total: f64,
    pub minimum_applied: bool,
}

/// Selections that could not be priced as entered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PricingWarning {
    /// Selected, but TerraAI is not opted in; quoted at zero
    ServiceRequiresAi(String),
    /// Selected service has no catalog entry or no pricing rule; quoted at zero
    UnknownService(String),
    /// Meter quantity for an identity missing from the catalog; ignored
    UnknownMeter(String),
}

impl fmt::Display for PricingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingWarning::ServiceRequiresAi(id) => {
                write!(f, "service {id} requires TerraAI and is not charged")
            }
            PricingWarning::UnknownService(id) => {
                write!(f, "service {id} has no pricing rule and is not charged")
            }
            PricingWarning::UnknownMeter(id) => write!(f, "meter {id} is not in the price list"),
        }
    }
}

/// Cost totals, recomputed on every change and never stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotationTotals {
    pub meter_monthly: f64,
    pub edge_monthly: f64,
    pub edge_one_time: f64,
    pub service_one_time: f64,
    pub total_monthly: f64,
    pub total_one_time: f64,
}

/// Full calculation result used for display and export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub totals: QuotationTotals,
    pub meters: Vec<MeterLineItem>,
    pub edge: Option<EdgeLineItem>,
    pub services: Vec<ServiceLineItem>,
    pub warnings: Vec<PricingWarning>,
}

/// Pricing engine that calculates quotation costs
pub struct PricingEngine {
    catalog: PricingCatalog,
}

impl PricingEngine {
    /// Create a new pricing engine with the given catalog
    pub fn new(catalog: &PricingCatalog) -> Self {
        Self {
            catalog: catalog.clone(),
        }
    }

    /// Replace the catalog (e.g. after an admin edit)
    pub fn update_catalog(&mut self, catalog: &PricingCatalog) {
        self.catalog = catalog.clone();
    }

    pub fn catalog(&self) -> &PricingCatalog {
        &self.catalog
    }

    /// Price the given selections
    pub fn calculate(&self, state: &QuotationState) -> Quotation {
        let mut warnings = Vec::new();

        let meters = self.meter_lines(state, &mut warnings);
        let meter_monthly = meters.iter().fold(0.0, |acc, m| acc + m.total);

        let edge = edge_line(&self.catalog, &state.edge);
        let (edge_monthly, edge_one_time) = match &edge {
            Some(line) if line.payment == PaymentMode::Monthly => (line.total, 0.0),
            Some(line) => (0.0, line.total),
            None => (0.0, 0.0),
        };

        let services = self.service_lines(state, &mut warnings);
        let service_one_time = services.iter().fold(0.0, |acc, s| acc + s.total);

        let totals = QuotationTotals {
            meter_monthly,
            edge_monthly,
            edge_one_time,
            service_one_time,
            total_monthly: meter_monthly + edge_monthly,
            total_one_time: edge_one_time + service_one_time,
        };

        log::debug!(
            "Recomputed quotation: monthly {:.2}, one-time {:.2}, {} warning(s)",
            totals.total_monthly,
            totals.total_one_time,
            warnings.len()
        );

        Quotation {
            totals,
            meters,
            edge,
            services,
            warnings,
        }
    }

    fn meter_lines(&self, state: &QuotationState, warnings: &mut Vec<PricingWarning>) -> Vec<MeterLineItem> {
        for (id, quantity) in &state.meter_quantities {
            if *quantity > 0 && self.catalog.meter(id).is_none() {
                warnings.push(PricingWarning::UnknownMeter(id.clone()));
            }
        }

        self.catalog
            .meters
            .iter()
            .filter_map(|meter| {
                let quantity = state.meter_quantity(&meter.id);
                if quantity == 0 {
                    return None;
                }
                let rate = meter.rate(state.ai_opt_in);
                Some(MeterLineItem {
                    id: meter.id.clone(),
                    name: meter.name.clone(),
                    quantity,
                    rate,
                    total: rate * f64::from(quantity),
                })
            })
            .collect()
    }

    fn service_lines(&self, state: &QuotationState, warnings: &mut Vec<PricingWarning>) -> Vec<ServiceLineItem> {
        for (id, selection) in &state.services {
            if selection.selected && self.catalog.service(id).is_none() {
                warnings.push(PricingWarning::UnknownService(id.clone()));
            }
        }

        let mut lines = Vec::new();
        for service in &self.catalog.services {
            let selection = state.service(&service.id);
            if !selection.selected {
                continue;
            }

            let Some(rule) = ServiceRule::for_id(&service.id) else {
                warnings.push(PricingWarning::UnknownService(service.id.clone()));
                continue;
            };

            let Some(charge) = rule.charge(service, selection.quantity, state.ai_opt_in) else {
                warnings.push(PricingWarning::ServiceRequiresAi(service.id.clone()));
                continue;
            };

            if charge.amount == 0.0 {
                continue;
            }

            lines.push(ServiceLineItem {
                id: service.id.clone(),
                name: service.name.clone(),
                quantity: selection.quantity,
                rate: service.rate,
                unit: service.unit.clone(),
                total: charge.amount,
                minimum_applied: charge.minimum_applied,
            });
        }
        lines
    }
}

fn edge_line(catalog: &PricingCatalog, edge: &EdgeDeviceSelection) -> Option<EdgeLineItem> {
    if !edge.required {
        return None;
    }
    let quantity = edge.quantity.max(1);
    let rate = catalog.edge_device.rate(edge.payment);
    Some(EdgeLineItem {
        quantity,
        payment: edge.payment,
        rate,
        total: rate * f64::from(quantity),
    })
}
