//! TerraEMS Quotation - CLI entry point
//!
//! Prices a meter / TerraAI / TerraEdge / services configuration, exports the
//! quotation document, and lets an admin maintain the price list.

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::cli::{AdminCommands, CatalogCommands, Cli, Commands, QuoteArgs};
use terraems_quotation_lib::admin;
use terraems_quotation_lib::catalog;
use terraems_quotation_lib::core::{Config, PricingCatalog};
use terraems_quotation_lib::db::Database;
use terraems_quotation_lib::export::QuotationDocument;
use terraems_quotation_lib::quote::Configurator;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    log::debug!("Starting TerraEMS Quotation v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Load or create configuration
    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    let store_path = match &cli.store {
        Some(path) => path.clone(),
        None => config.store_path()?,
    };
    let mut db = Database::open(&store_path)
        .with_context(|| format!("opening store at {}", store_path.display()))?;

    match cli.command {
        Commands::Quote(args) => run_quote(&config, &db, args),
        Commands::Catalog { action } => run_catalog(&mut db, action),
        Commands::Admin { action } => run_admin(&config, &mut db, action),
    }
}

fn run_quote(config: &Config, db: &Database, args: QuoteArgs) -> Result<()> {
    let pricing = catalog::load(db);
    let mut session = Configurator::new(&pricing);

    // TerraAI first: it gates which services may be selected
    session.set_ai_opt_in(args.ai);

    for (id, qty) in &args.meters {
        session.set_meter_quantity(id, qty)?;
    }

    if let Some(qty) = &args.edge {
        session.set_edge_required(true);
        session.set_edge_quantity(qty)?;
    }
    session.set_edge_payment(args.edge_payment);

    for (id, qty) in &args.services {
        session.select_service(id, true)?;
        if let Some(qty) = qty {
            session.set_service_quantity(id, qty)?;
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(session.quotation())?);
    } else {
        print_summary(&session, &config.general.currency_symbol);
    }

    if let Some(dir) = args.export {
        let doc = QuotationDocument::new(
            session.quotation(),
            session.state(),
            &config.general,
            &config.document,
        );
        let path = doc.save(&dir)?;
        eprintln!("Quotation saved to {}", path.display());
    }

    Ok(())
}

fn print_summary(session: &Configurator, symbol: &str) {
    let quote = session.quotation();
    let totals = &quote.totals;

    println!("Monthly Costs");
    for line in &quote.meters {
        println!(
            "  {} (Qty: {}): {}{:.2}",
            line.name, line.quantity, symbol, line.total
        );
    }
    println!("  Energy Meters: {}{:.2}/month", symbol, totals.meter_monthly);
    if totals.edge_monthly > 0.0 {
        println!("  TerraEdge Device: {}{:.2}/month", symbol, totals.edge_monthly);
    }
    println!("  Total Monthly: {}{:.2}/month", symbol, totals.total_monthly);
    println!();

    println!("One-Time Costs");
    if let Some(edge) = quote.edge.as_ref().filter(|_| totals.edge_one_time > 0.0) {
        println!(
            "  TerraEdge Device (Qty: {}): {}{:.2}",
            edge.quantity, symbol, totals.edge_one_time
        );
    }
    for line in &quote.services {
        let marker = if line.minimum_applied { " (Minimum applied)" } else { "" };
        println!(
            "  {} (Qty: {}): {}{:.2}{}",
            line.name, line.quantity, symbol, line.total, marker
        );
    }
    println!("  Total One-Time: {}{:.2}", symbol, totals.total_one_time);

    for warning in &quote.warnings {
        println!();
        println!("Warning: {}", warning);
    }
}

fn run_catalog(db: &mut Database, action: CatalogCommands) -> Result<()> {
    match action {
        CatalogCommands::Show { json } => {
            let pricing = catalog::load(&*db);
            if json {
                println!("{}", serde_json::to_string_pretty(&pricing)?);
            } else {
                print_catalog(&pricing);
            }
        }
        CatalogCommands::Reset => {
            require_admin(db)?;
            catalog::reset(db)?;
            println!("Pricing configuration reset to defaults.");
        }
        edit => {
            require_admin(db)?;
            let mut pricing = catalog::load(&*db);
            apply_catalog_edit(&mut pricing, edit)?;
            if !catalog::save(db, &mut pricing) {
                bail!("Failed to save pricing configuration. Please try again.");
            }
            println!("Pricing configuration saved successfully!");
        }
    }
    Ok(())
}

fn require_admin(db: &Database) -> Result<()> {
    admin::require_session(db).context("log in with `terraems-quote admin login` first")?;
    Ok(())
}

fn apply_catalog_edit(pricing: &mut PricingCatalog, edit: CatalogCommands) -> Result<()> {
    match edit {
        CatalogCommands::SetMeter { id, no_ai, with_ai } => {
            pricing.set_meter_rates(&id, no_ai, with_ai)?;
        }
        CatalogCommands::SetService { id, rate, minimum } => {
            if let Some(rate) = rate {
                pricing.set_service_rate(&id, rate)?;
            }
            if let Some(minimum) = minimum {
                pricing.set_service_minimum(&id, minimum)?;
            }
        }
        CatalogCommands::SetEdge { monthly, one_time } => {
            pricing.set_edge_rates(monthly, one_time)?;
        }
        CatalogCommands::Show { .. } | CatalogCommands::Reset => {}
    }
    Ok(())
}

fn print_catalog(pricing: &PricingCatalog) {
    println!("Energy Meters Pricing");
    for meter in &pricing.meters {
        println!(
            "  {:<4} {:<55} no AI {:>8.2}  with AI {:>8.2}",
            meter.id, meter.name, meter.rate_no_ai, meter.rate_with_ai
        );
    }
    println!();
    println!("Services Pricing");
    for service in &pricing.services {
        let unit = service.unit.as_deref().unwrap_or("");
        let minimum = service
            .minimum
            .map(|m| format!("min {:.2}", m))
            .unwrap_or_default();
        println!(
            "  {:<4} {:<66} {:>10.2} {:<14} {}",
            service.id, service.name, service.rate, unit, minimum
        );
    }
    println!();
    println!("TerraEdge Device Pricing");
    println!("  Monthly:  {:.2}", pricing.edge_device.monthly_rate);
    println!("  One-Time: {:.2}", pricing.edge_device.one_time_rate);
    println!();
    println!("Last updated: {}", pricing.last_updated.to_rfc3339());
}

fn run_admin(config: &Config, db: &mut Database, action: AdminCommands) -> Result<()> {
    match action {
        AdminCommands::Login { username, password } => {
            if !admin::login(db, &config.admin, &username, &password)? {
                bail!("Invalid username or password");
            }
            println!("Logged in successfully!");
        }
        AdminCommands::Logout => {
            admin::logout(db)?;
            println!("Logged out successfully!");
        }
        AdminCommands::Status => {
            let state = if admin::is_active(&*db) { "active" } else { "not active" };
            println!("Admin session {}", state);
        }
    }
    Ok(())
}
