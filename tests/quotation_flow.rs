use terraems_quotation_lib::admin;
use terraems_quotation_lib::catalog;
use terraems_quotation_lib::core::{Config, Error, PaymentMode};
use terraems_quotation_lib::db::{Database, KeyValueStore, MemoryStore};
use terraems_quotation_lib::export::QuotationDocument;
use terraems_quotation_lib::pricing::PricingWarning;
use terraems_quotation_lib::quote::Configurator;

#[test]
fn test_full_session_against_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default();
    let mut db = Database::open(&dir.path().join("store.db")).unwrap();

    let pricing = catalog::load(&db);
    let mut session = Configurator::new(&pricing);
    assert_eq!(session.quotation().totals.total_monthly, 0.0);
    assert_eq!(session.quotation().totals.total_one_time, 0.0);

    session.set_meter_quantity("m1", "3").unwrap();
    assert_eq!(session.quotation().totals.total_monthly, 30.0);

    session.set_ai_opt_in(true);
    assert_eq!(session.quotation().totals.total_monthly, 60.0);

    session.set_edge_required(true);
    session.set_edge_quantity("2").unwrap();
    assert_eq!(session.quotation().totals.edge_monthly, 200.0);
    assert_eq!(session.quotation().totals.total_monthly, 260.0);

    session.set_edge_payment(PaymentMode::OneTime);
    assert_eq!(session.quotation().totals.total_monthly, 60.0);
    assert_eq!(session.quotation().totals.edge_one_time, 6000.0);

    session.select_service("s3", true).unwrap();
    session.set_service_quantity("s3", "50").unwrap();
    let s3 = &session.quotation().services[0];
    assert_eq!(s3.total, 100000.0);
    assert!(s3.minimum_applied);

    session.select_service("s2", true).unwrap();
    session.set_service_quantity("s2", "100").unwrap();
    session.select_service("s1", true).unwrap();
    session.set_service_quantity("s1", "3").unwrap();
    let totals = &session.quotation().totals;
    assert_eq!(totals.service_one_time, 6000.0 + 200000.0 + 100000.0);
    assert_eq!(totals.total_one_time, 6000.0 + 306000.0);

    let doc = QuotationDocument::new(
        session.quotation(),
        session.state(),
        &config.general,
        &config.document,
    );
    let path = doc.save(dir.path()).unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.contains("(Min. applied)"));
    assert!(text.contains("Terms and Conditions"));

    // Admin raises the meter price; the running session picks it up on reload
    assert!(admin::login(&mut db, &config.admin, "admin", "password").unwrap());
    let mut edited = catalog::load(&db);
    edited.set_meter_rates("m1", None, Some(25.0)).unwrap();
    assert!(catalog::save(&mut db, &mut edited));
    admin::logout(&mut db).unwrap();
    assert!(!admin::is_active(&db));

    session.replace_catalog(&catalog::load(&db));
    assert_eq!(session.quotation().totals.meter_monthly, 75.0);
}

#[test]
fn test_stored_catalog_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    {
        let mut db = Database::open(&path).unwrap();
        let mut pricing = catalog::load(&db);
        pricing.set_edge_rates(Some(150.0), None).unwrap();
        assert!(catalog::save(&mut db, &mut pricing));
    }

    let mut db = Database::open(&path).unwrap();
    assert_eq!(catalog::load(&db).edge_device.monthly_rate, 150.0);

    catalog::reset(&mut db).unwrap();
    assert_eq!(catalog::load(&db).edge_device.monthly_rate, 100.0);
}

#[test]
fn test_corrupt_record_falls_back_to_defaults() {
    let mut store = MemoryStore::new();
    store.set(catalog::PRICING_STORAGE_KEY, "{not json").unwrap();

    let pricing = catalog::load(&store);
    assert_eq!(pricing.meters.len(), 4);
    assert_eq!(pricing.edge_device.one_time_rate, 3000.0);
}

#[test]
fn test_save_failure_keeps_previous_record() {
    let mut store = MemoryStore::with_quota(64);
    let mut pricing = catalog::load(&store);
    pricing.set_meter_rates("m1", Some(99.0), None).unwrap();

    assert!(!catalog::save(&mut store, &mut pricing));
    assert!(store.get(catalog::PRICING_STORAGE_KEY).unwrap().is_none());
    assert_eq!(catalog::load(&store).meters[0].rate_no_ai, 10.0);
}

#[test]
fn test_ai_withdrawal_keeps_selection_with_warning() {
    let mut session = Configurator::new(&catalog::load(&MemoryStore::new()));

    assert!(matches!(
        session.select_service("s2", true),
        Err(Error::ServiceRequiresAi(_))
    ));

    session.set_ai_opt_in(true);
    session.select_service("s2", true).unwrap();
    assert_eq!(session.quotation().totals.service_one_time, 150000.0);

    session.set_ai_opt_in(false);
    assert!(session.state().service("s2").selected);
    assert_eq!(session.quotation().totals.service_one_time, 0.0);
    assert_eq!(
        session.quotation().warnings,
        vec![PricingWarning::ServiceRequiresAi("s2".to_string())]
    );
}
