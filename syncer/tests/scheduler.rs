//! Scheduler loop behavior, exercised with compressed tick intervals.

use catalog::Catalog;
use model::database::CreateDatabase;
use model::engine::Engine;
use model::instance::{CreateInstance, SyncDuration};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use syncer::Syncer;
use syncer::profile::Profile;
use syncer::testing::{AllowAllLicense, ScriptedDriverFactory, probe_with_databases};
use tokio::sync::watch;

fn fast_profile() -> Profile {
    Profile {
        instance_sync_interval: Duration::from_millis(40),
        database_sync_checker_interval: Duration::from_millis(20),
        ..Profile::default()
    }
}

async fn run_for(syncer: Arc<Syncer>, duration: Duration) {
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let handle = tokio::spawn(syncer.run(shutdown_rx));
    tokio::time::sleep(duration).await;
    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("runner should stop after shutdown")
        .unwrap();
}

#[tokio::test]
async fn periodic_loops_sync_due_instances_and_databases() {
    let catalog = Catalog::for_test().await;
    let factory = ScriptedDriverFactory::new();
    catalog
        .instance
        .create_instance(
            CreateInstance::new("prod-mysql", Engine::Mysql)
                .sync_interval(SyncDuration::from_secs(300)),
        )
        .await
        .unwrap();
    catalog
        .database
        .create_database(CreateDatabase::discovered("prod-mysql", "orders"))
        .await
        .unwrap();

    let script = factory.script("prod-mysql");
    script.set_probe(probe_with_databases("8.0.36", &["orders"]));

    let syncer = Syncer::new(
        catalog.clone(),
        factory.clone(),
        Arc::new(AllowAllLicense),
        fast_profile(),
    );
    run_for(syncer, Duration::from_millis(300)).await;

    // Both the instance and its database were due exactly once: the first
    // pass stamps their last sync times and the 300s interval keeps every
    // later tick quiet.
    assert_eq!(script.sync_instance_calls.load(Ordering::SeqCst), 1);
    assert_eq!(script.sync_schema_calls.load(Ordering::SeqCst), 1);

    let database = catalog
        .database
        .find_database("prod-mysql", "orders")
        .await
        .unwrap()
        .unwrap();
    assert!(database.successful_sync_time_ts.is_some());
}

#[tokio::test]
async fn deactivated_instances_are_never_scheduled() {
    let catalog = Catalog::for_test().await;
    let factory = ScriptedDriverFactory::new();
    catalog
        .instance
        .create_instance(
            CreateInstance::new("prod-mysql", Engine::Mysql)
                .activation(false)
                .sync_interval(SyncDuration::from_secs(1)),
        )
        .await
        .unwrap();
    catalog
        .database
        .create_database(CreateDatabase::discovered("prod-mysql", "orders"))
        .await
        .unwrap();

    let script = factory.script("prod-mysql");
    script.set_probe(probe_with_databases("8.0.36", &["orders"]));

    let syncer = Syncer::new(
        catalog.clone(),
        factory.clone(),
        Arc::new(AllowAllLicense),
        fast_profile(),
    );
    run_for(syncer.clone(), Duration::from_millis(200)).await;

    assert_eq!(script.sync_instance_calls.load(Ordering::SeqCst), 0);
    assert_eq!(script.sync_schema_calls.load(Ordering::SeqCst), 0);
    assert!(syncer.pending_database_uids().is_empty());
}

#[tokio::test]
async fn at_most_one_inflight_sync_per_database() {
    let catalog = Catalog::for_test().await;
    let factory = ScriptedDriverFactory::new();
    catalog
        .instance
        .create_instance(
            CreateInstance::new("prod-mysql", Engine::Mysql)
                .sync_interval(SyncDuration::from_secs(300)),
        )
        .await
        .unwrap();
    catalog
        .database
        .create_database(CreateDatabase::discovered("prod-mysql", "orders"))
        .await
        .unwrap();

    let script = factory.script("prod-mysql");
    script.delay_calls(Duration::from_millis(50));

    let profile = Profile {
        // Instance tick far out so only database syncs open sessions.
        instance_sync_interval: Duration::from_secs(600),
        database_sync_checker_interval: Duration::from_millis(20),
        ..Profile::default()
    };
    let syncer = Syncer::new(
        catalog.clone(),
        factory.clone(),
        Arc::new(AllowAllLicense),
        profile,
    );

    // Hammer the queue while syncs are slow and in flight.
    let enqueuer = {
        let syncer = syncer.clone();
        tokio::spawn(async move {
            for _ in 0..20 {
                syncer.sync_all_databases(None).await;
                tokio::time::sleep(Duration::from_millis(15)).await;
            }
        })
    };

    run_for(syncer, Duration::from_millis(400)).await;
    enqueuer.await.unwrap();

    assert!(script.sync_schema_calls.load(Ordering::SeqCst) >= 2);
    assert!(script.peak_sessions.load(Ordering::SeqCst) <= 1);
}

#[tokio::test]
async fn sync_all_databases_can_target_one_instance() {
    let catalog = Catalog::for_test().await;
    let factory = ScriptedDriverFactory::new();
    let prod = catalog
        .instance
        .create_instance(CreateInstance::new("prod-mysql", Engine::Mysql))
        .await
        .unwrap();
    catalog
        .instance
        .create_instance(CreateInstance::new("staging-mysql", Engine::Mysql))
        .await
        .unwrap();
    let prod_db = catalog
        .database
        .create_database(CreateDatabase::discovered("prod-mysql", "orders"))
        .await
        .unwrap();
    catalog
        .database
        .create_database(CreateDatabase::discovered("staging-mysql", "orders"))
        .await
        .unwrap();

    let syncer = Syncer::new(
        catalog.clone(),
        factory.clone(),
        Arc::new(AllowAllLicense),
        Profile::default(),
    );
    syncer.sync_all_databases(Some(&prod)).await;
    assert_eq!(syncer.pending_database_uids(), vec![prod_db.uid]);
}
