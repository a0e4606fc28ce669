//! Quotation document export
//!
//! Renders the priced quotation as a Markdown document with the same
//! sections as the on-screen summary: configuration tables, the cost
//! summary, terms and conditions, and a contact block.

use crate::core::{DocumentConfig, GeneralConfig, PaymentMode, QuotationState, Result};
use crate::pricing::Quotation;
use chrono::NaiveDate;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const EDGE_ITEM_NAME: &str = "TerraEdge - Modbus RTU/TCP";

/// A quotation ready to be rendered
pub struct QuotationDocument<'a> {
    pub quotation: &'a Quotation,
    pub state: &'a QuotationState,
    pub general: &'a GeneralConfig,
    pub document: &'a DocumentConfig,
    /// Issue date printed under the title
    pub date: NaiveDate,
}

impl<'a> QuotationDocument<'a> {
    pub fn new(
        quotation: &'a Quotation,
        state: &'a QuotationState,
        general: &'a GeneralConfig,
        document: &'a DocumentConfig,
    ) -> Self {
        Self {
            quotation,
            state,
            general,
            document,
            date: chrono::Local::now().date_naive(),
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Write the document into `dir` under the configured file name
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.document.file_name);
        fs::write(&path, self.render())?;
        log::info!("Quotation exported to {}", path.display());
        Ok(path)
    }

    fn money(&self, amount: f64) -> String {
        format!("{}{:.2}", self.general.currency_symbol, amount)
    }

    fn write_meters(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = &self.general.currency_symbol;
        writeln!(f, "### Energy Meters")?;
        writeln!(f)?;
        writeln!(f, "| Meter Type | Quantity | Rate ({symbol}) | Total ({symbol}) |")?;
        writeln!(f, "|---|---:|---:|---:|")?;
        for line in &self.quotation.meters {
            writeln!(
                f,
                "| {} | {} | {} | {:.2} |",
                cell(&line.name),
                line.quantity,
                plain_number(line.rate),
                line.total
            )?;
        }
        writeln!(
            f,
            "| **Total Monthly Meter Cost** | | | **{}** |",
            self.money(self.quotation.totals.meter_monthly)
        )?;
        writeln!(f)
    }

    fn write_ai(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (selected, scan_rate) = if self.state.ai_opt_in {
            ("Yes", "Rates per month for above 1 min scan rates if opted for TerraAI")
        } else {
            ("No", "Rates per month for above 1 min scan rates if not opted for TerraAI")
        };
        writeln!(f, "### TerraAI")?;
        writeln!(f)?;
        writeln!(f, "| Option | Selected |")?;
        writeln!(f, "|---|---|")?;
        writeln!(f, "| TerraAI | {selected} |")?;
        writeln!(f)?;
        writeln!(f, "Scan Rate: {scan_rate}")?;
        writeln!(f)
    }

    fn write_edge(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(edge) = &self.quotation.edge else {
            return Ok(());
        };
        let cost = match edge.payment {
            PaymentMode::Monthly => format!("{}/month", self.money(edge.total)),
            PaymentMode::OneTime => format!("{} (one-time)", self.money(edge.total)),
        };
        writeln!(f, "### TerraEdge Device")?;
        writeln!(f)?;
        writeln!(
            f,
            "| Item | Quantity | Payment Type | Total Cost ({}) |",
            self.general.currency_symbol
        )?;
        writeln!(f, "|---|---:|---|---:|")?;
        writeln!(f, "| {EDGE_ITEM_NAME} | {} | {} | {cost} |", edge.quantity, edge.payment)?;
        writeln!(f)
    }

    fn write_services(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.state.any_service_selected() {
            return Ok(());
        }
        let symbol = &self.general.currency_symbol;
        writeln!(f, "### Services")?;
        writeln!(f)?;
        writeln!(f, "| Service | Quantity | Rate ({symbol}) | Total Cost ({symbol}) |")?;
        writeln!(f, "|---|---:|---:|---:|")?;
        for line in &self.quotation.services {
            let rate = match &line.unit {
                Some(unit) => format!("{} {}", plain_number(line.rate), unit),
                None => plain_number(line.rate),
            };
            let marker = if line.minimum_applied { " (Min. applied)" } else { "" };
            writeln!(
                f,
                "| {} | {} | {} | {}{} |",
                cell(&line.name),
                line.quantity,
                cell(&rate),
                self.money(line.total),
                marker
            )?;
        }
        writeln!(
            f,
            "| **Total Service Cost (One-Time)** | | | **{}** |",
            self.money(self.quotation.totals.service_one_time)
        )?;
        writeln!(f)
    }

    fn write_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let totals = &self.quotation.totals;
        writeln!(f, "## Cost Summary")?;
        writeln!(f)?;
        writeln!(f, "| Cost Category | Amount ({}) |", self.general.currency_symbol)?;
        writeln!(f, "|---|---:|")?;
        writeln!(
            f,
            "| Monthly Energy Meter Cost | {}/month |",
            self.money(totals.meter_monthly)
        )?;
        if let Some(edge) = self.quotation.edge.as_ref().filter(|e| e.payment == PaymentMode::Monthly) {
            writeln!(
                f,
                "| {} | {}/month |",
                edge_units_label(edge.quantity),
                self.money(totals.edge_monthly)
            )?;
        }
        writeln!(
            f,
            "| **Total Monthly Cost** | **{}/month** |",
            self.money(totals.total_monthly)
        )?;
        writeln!(f, "| **One-Time Costs** | |")?;
        if let Some(edge) = self.quotation.edge.as_ref().filter(|e| e.payment == PaymentMode::OneTime) {
            writeln!(
                f,
                "| {} | {} |",
                edge_units_label(edge.quantity),
                self.money(totals.edge_one_time)
            )?;
        }
        if totals.service_one_time > 0.0 {
            writeln!(f, "| Service Charges | {} |", self.money(totals.service_one_time))?;
        }
        writeln!(
            f,
            "| **Total One-Time Cost** | **{}** |",
            self.money(totals.total_one_time)
        )?;
        writeln!(f)
    }
}

impl fmt::Display for QuotationDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {} Quotation", self.document.company)?;
        writeln!(f)?;
        writeln!(f, "{}", self.general.region)?;
        writeln!(f)?;
        writeln!(f, "Date: {}", self.date.format("%d/%m/%Y"))?;
        writeln!(f)?;

        writeln!(f, "## Configuration Summary")?;
        writeln!(f)?;
        self.write_meters(f)?;
        self.write_ai(f)?;
        self.write_edge(f)?;
        self.write_services(f)?;
        self.write_summary(f)?;

        writeln!(f, "## Terms and Conditions")?;
        writeln!(f)?;
        for (i, term) in self.document.terms.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, term)?;
        }
        writeln!(f)?;

        writeln!(f, "## Contact Information")?;
        writeln!(f)?;
        writeln!(f, "{}  ", self.document.company)?;
        writeln!(f, "{}  ", self.document.address)?;
        writeln!(f, "Email: {}  ", self.document.email)?;
        writeln!(f, "Phone: {}", self.document.phone)
    }
}

fn edge_units_label(quantity: u32) -> String {
    let plural = if quantity > 1 { "s" } else { "" };
    format!("TerraEdge Device ({quantity} unit{plural})")
}

/// Print whole amounts without decimals, like a price list does
fn plain_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Escape a value for use inside a Markdown table cell
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PricingCatalog;
    use crate::quote::Configurator;

    fn render(session: &Configurator) -> String {
        let general = GeneralConfig::default();
        let document = DocumentConfig::default();
        let mut doc = QuotationDocument::new(session.quotation(), session.state(), &general, &document);
        doc.date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        doc.render()
    }

    #[test]
    fn test_empty_quotation_sections() {
        let session = Configurator::new(&PricingCatalog::default());
        let text = render(&session);

        assert!(text.starts_with("# TerraEMS Quotation\n"));
        assert!(text.contains("India Pricing (INR)"));
        assert!(text.contains("Date: 16/10/2026"));
        assert!(text.contains("| **Total Monthly Meter Cost** | | | **\u{20B9}0.00** |"));
        assert!(text.contains("| TerraAI | No |"));
        assert!(!text.contains("### TerraEdge Device"));
        assert!(!text.contains("### Services"));
        assert!(!text.contains("Service Charges"));
        assert!(text.contains("| **Total One-Time Cost** | **\u{20B9}0.00** |"));
        assert!(text.contains("4. Delivery timeline will be confirmed upon order confirmation."));
        assert!(text.contains("Email: info@terraems.com"));
    }

    #[test]
    fn test_full_quotation_rows() {
        let mut session = Configurator::new(&PricingCatalog::default());
        session.set_meter_quantity("m1", "3").unwrap();
        session.set_ai_opt_in(true);
        session.set_edge_required(true);
        session.set_edge_quantity("2").unwrap();
        session.select_service("s3", true).unwrap();
        session.set_service_quantity("s3", "50").unwrap();
        session.select_service("s1", true).unwrap();

        let text = render(&session);

        assert!(text.contains("| Single phase energy meter KWH only | 3 | 20 | 60.00 |"));
        assert!(text.contains("| TerraAI | Yes |"));
        assert!(text.contains("| TerraEdge - Modbus RTU/TCP | 2 | Monthly | \u{20B9}200.00/month |"));
        assert!(text.contains("| TerraEdge Device (2 units) | \u{20B9}200.00/month |"));
        assert!(text.contains("| 50 | 1000 per component | \u{20B9}100000.00 (Min. applied) |"));
        assert!(text.contains("| 1 | 2000 per page | \u{20B9}2000.00 |"));
        assert!(text.contains("| Service Charges | \u{20B9}102000.00 |"));
        assert!(text.contains("| **Total Monthly Cost** | **\u{20B9}260.00/month** |"));
        assert!(text.contains("| **Total One-Time Cost** | **\u{20B9}102000.00** |"));
    }

    #[test]
    fn test_one_time_edge_row() {
        let mut session = Configurator::new(&PricingCatalog::default());
        session.set_edge_required(true);
        session.set_edge_payment(PaymentMode::OneTime);

        let text = render(&session);
        assert!(text.contains("| TerraEdge - Modbus RTU/TCP | 1 | One-Time | \u{20B9}3000.00 (one-time) |"));
        assert!(text.contains("| TerraEdge Device (1 unit) | \u{20B9}3000.00 |"));
    }

    #[test]
    fn test_gated_ai_service_leaves_empty_services_table() {
        let mut session = Configurator::new(&PricingCatalog::default());
        session.set_ai_opt_in(true);
        session.select_service("s2", true).unwrap();
        session.set_ai_opt_in(false);

        let text = render(&session);
        assert!(text.contains(
            "|---|---:|---:|---:|\n| **Total Service Cost (One-Time)** | | | **\u{20B9}0.00** |"
        ));
        assert!(!text.contains("AI Philosophy"));
        assert!(!text.contains("Service Charges"));
        assert!(text.contains("| **Total One-Time Cost** | **\u{20B9}0.00** |"));
    }

    #[test]
    fn test_save_uses_configured_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let session = Configurator::new(&PricingCatalog::default());
        let general = GeneralConfig::default();
        let document = DocumentConfig::default();

        let doc = QuotationDocument::new(session.quotation(), session.state(), &general, &document);
        let path = doc.save(dir.path()).unwrap();

        assert_eq!(path, dir.path().join("TerraEMS_Quotation.md"));
        let written = fs::read_to_string(path).unwrap();
        assert!(written.contains("## Cost Summary"));
    }

    #[test]
    fn test_plain_number() {
        assert_eq!(plain_number(2000.0), "2000");
        assert_eq!(plain_number(12.5), "12.5");
        assert_eq!(cell("a|b"), "a\\|b");
    }
}
