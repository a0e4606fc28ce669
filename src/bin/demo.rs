//! TerraEMS Quotation - Demo CLI
//!
//! Walks through a sample session: catalog loading, incremental edits with
//! recalculation after each one, an admin price change, and the exported
//! document. Uses an in-memory store, so nothing is persisted.

use terraems_quotation_lib::admin;
use terraems_quotation_lib::catalog;
use terraems_quotation_lib::core::{Config, PaymentMode, Result};
use terraems_quotation_lib::db::MemoryStore;
use terraems_quotation_lib::export::QuotationDocument;
use terraems_quotation_lib::quote::Configurator;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::default();
    let symbol = config.general.currency_symbol.clone();
    let mut store = MemoryStore::new();

    println!("==============================================");
    println!("   TerraEMS Quotation - Demo");
    println!("==============================================\n");

    // 1. Catalog
    println!("[1/4] Loading price list...");
    let pricing = catalog::load(&store);
    println!(
        "      {} meters, {} services, TerraEdge {}{}/month or {}{} one-time\n",
        pricing.meters.len(),
        pricing.services.len(),
        symbol,
        pricing.edge_device.monthly_rate,
        symbol,
        pricing.edge_device.one_time_rate
    );

    // 2. Incremental edits
    println!("[2/4] Building a configuration...\n");
    let mut session = Configurator::new(&pricing);

    println!("----------------------------------------------");
    println!("  Step                        | Monthly  | One-Time");
    println!("----------------------------------------------");
    let show = |label: &str, session: &Configurator| {
        let totals = &session.quotation().totals;
        println!(
            "  {:<28}| {:>8.2} | {:>10.2}",
            label, totals.total_monthly, totals.total_one_time
        );
    };

    show("start", &session);
    session.set_meter_quantity("m1", "10")?;
    show("10 x single phase KWH", &session);
    session.set_meter_quantity("m3", "4")?;
    show("4 x 3 phase", &session);
    session.set_ai_opt_in(true);
    show("TerraAI opt-in", &session);
    session.set_edge_required(true);
    session.set_edge_quantity("2")?;
    show("2 x TerraEdge (monthly)", &session);
    session.set_edge_payment(PaymentMode::OneTime);
    show("TerraEdge paid one-time", &session);
    session.select_service("s3", true)?;
    session.set_service_quantity("s3", "40")?;
    show("Initialization x 40", &session);
    session.select_service("s2", true)?;
    show("AI Philosophy", &session);
    println!("----------------------------------------------\n");

    // 3. Admin edit
    println!("[3/4] Admin price change...");
    if admin::login(&mut store, &config.admin, &config.admin.username, &config.admin.password)? {
        let mut edited = catalog::load(&store);
        edited.set_edge_rates(None, Some(2500.0))?;
        if catalog::save(&mut store, &mut edited) {
            println!("      TerraEdge one-time rate now {}2500", symbol);
        }
        admin::logout(&mut store)?;
        session.replace_catalog(&catalog::load(&store));
        show("after price change", &session);
    }
    println!();

    // 4. Document
    println!("[4/4] Quotation document:\n");
    let doc = QuotationDocument::new(
        session.quotation(),
        session.state(),
        &config.general,
        &config.document,
    );
    println!("{}", doc.render());

    Ok(())
}
