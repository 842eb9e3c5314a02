use std::sync::Arc;
use std::time::Duration;

use coffer_types::{Address, Amount, BankName};
use coffer_wallet_core::ReadModelStore;

use coffer_nullables::NullLedger;

fn addr(last: &str) -> Address {
    Address::parse(&format!("0x{:0>40}", last)).unwrap()
}

fn tokens(n: u128) -> Amount {
    Amount::new(n * Amount::UNITS_PER_TOKEN)
}

#[tokio::test]
async fn refresh_populates_all_fields() {
    let ledger = NullLedger::new();
    ledger.set_bank_name(BankName::encode("MyBank").unwrap());
    ledger.set_owner(addr("aa"));
    ledger.set_balance(addr("bb"), tokens(500));

    let store = ReadModelStore::new(ledger.clone(), addr("bb"));
    let snapshot = store.refresh().await;

    assert_eq!(snapshot.bank_name.as_deref(), Some("MyBank"));
    assert_eq!(snapshot.owner, Some(addr("aa")));
    assert_eq!(snapshot.balance, Some(tokens(500)));
    assert!(!snapshot.has_errors());
}

#[tokio::test]
async fn is_owner_compares_cached_owner() {
    let ledger = NullLedger::new();
    ledger.set_owner(addr("aa"));
    let store = ReadModelStore::new(ledger.clone(), addr("aa"));
    let snapshot = store.refresh().await;

    assert!(snapshot.is_owner(&addr("aa")));
    assert!(!snapshot.is_owner(&addr("bb")));
}

#[tokio::test]
async fn owner_read_failure_keeps_sibling_fields() {
    let ledger = NullLedger::new();
    ledger.set_bank_name(BankName::encode("MyBank").unwrap());
    ledger.set_owner(addr("aa"));
    ledger.set_balance(addr("bb"), tokens(500));

    let store = ReadModelStore::new(ledger.clone(), addr("bb"));
    store.refresh().await;

    ledger.fail_owner_reads(Some("connection reset".into()));
    let snapshot = store.refresh().await;

    // Previous owner value is kept, with an error marker alongside.
    assert_eq!(snapshot.owner, Some(addr("aa")));
    assert!(snapshot.owner_error.is_some());
    assert_eq!(snapshot.bank_name.as_deref(), Some("MyBank"));
    assert!(snapshot.name_error.is_none());
    assert_eq!(snapshot.balance, Some(tokens(500)));
}

#[tokio::test]
async fn failed_field_recovers_on_next_refresh() {
    let ledger = NullLedger::new();
    ledger.set_owner(addr("aa"));
    let store = ReadModelStore::new(ledger.clone(), addr("bb"));

    ledger.fail_owner_reads(Some("timeout".into()));
    let snapshot = store.refresh().await;
    assert!(snapshot.owner_error.is_some());
    assert!(snapshot.owner.is_none());

    ledger.fail_owner_reads(None);
    let snapshot = store.refresh().await;
    assert!(snapshot.owner_error.is_none());
    assert_eq!(snapshot.owner, Some(addr("aa")));
}

#[tokio::test]
async fn concurrent_refreshes_coalesce_into_one_set_of_reads() {
    let ledger = NullLedger::new();
    ledger.set_owner(addr("aa"));
    ledger.set_read_delay(Duration::from_millis(50));

    let store = ReadModelStore::new(ledger.clone(), addr("bb"));
    let a = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.refresh().await }
    });
    let b = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.refresh().await }
    });
    let c = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.refresh().await }
    });
    let (a, b, c) = tokio::join!(a, b, c);
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert_eq!(ledger.name_read_count(), 1);
    assert_eq!(ledger.owner_read_count(), 1);
    assert_eq!(ledger.balance_read_count(), 1);
}

#[tokio::test]
async fn sequential_refreshes_each_issue_reads() {
    let ledger = NullLedger::new();
    let store = ReadModelStore::new(ledger.clone(), addr("bb"));

    store.refresh().await;
    store.refresh().await;
    assert_eq!(ledger.balance_read_count(), 2);
}
