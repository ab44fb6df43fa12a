//! Storage tests against PostgreSQL. Skipped unless `TEST_DATABASE_URL`
//! points at a database the tests may create schemas in.

mod common;

use common::{draft, item, jan_2025, PgTestApp, OWNER};
use futures::future::join_all;
use invoice_service::models::{CounterScope, InvoiceHeader, ListInvoicesFilter};
use invoice_service::services::numbering::format_base;
use invoice_service::services::{InvoiceStore, SaveOutcome, SequenceStore, StoreError};
use rust_decimal_macros::dec;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_are_gapless_in_postgres() {
    let Some(app) = PgTestApp::spawn().await else {
        return;
    };
    let scope = CounterScope::for_date(jan_2025());

    assert_eq!(app.state.counter.peek_next(&scope).await.unwrap(), 1);

    let calls = (0..50).map(|_| {
        let counter = app.state.counter.clone();
        let scope = scope.clone();
        tokio::spawn(async move { counter.increment_and_get(&scope).await })
    });

    let mut values: Vec<i64> = join_all(calls)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();
    values.sort_unstable();

    assert_eq!(values, (1..=50).collect::<Vec<_>>());
    assert_eq!(app.db.current_sequence(&scope).await.unwrap(), 50);

    app.cleanup().await;
}

#[tokio::test]
async fn resaving_replaces_items_in_one_row() {
    let Some(app) = PgTestApp::spawn().await else {
        return;
    };
    let company_id = app.company.company_id;

    let first = app
        .state
        .upsert
        .save(
            OWNER,
            &draft(company_id, "", vec![item("Ciment", dec!(2), dec!(1200))]),
            jan_2025(),
        )
        .await
        .unwrap();
    assert_eq!(first.number, "FAC-2501-0001");

    let edited = draft(
        company_id,
        &first.number,
        vec![
            item("Sable", dec!(1), dec!(800)),
            item("Gravier", dec!(1.5), dec!(450.20)),
        ],
    );
    for _ in 0..2 {
        let saved = app
            .state
            .upsert
            .save(OWNER, &edited, jan_2025())
            .await
            .unwrap();
        assert_eq!(saved.outcome, SaveOutcome::Updated);
        assert_eq!(saved.invoice_id, first.invoice_id);
    }

    let page = app
        .db
        .list_invoices(OWNER, &ListInvoicesFilter::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);

    let items = app.db.get_items(first.invoice_id).await.unwrap();
    let designations: Vec<_> = items.iter().map(|i| i.designation.as_str()).collect();
    assert_eq!(designations, vec!["Sable", "Gravier"]);
    assert_eq!(items[1].price, dec!(450.20));
    assert_eq!(items[1].total_price, items[1].quantity * items[1].price);

    let scope = CounterScope::for_date(jan_2025());
    assert_eq!(app.db.current_sequence(&scope).await.unwrap(), 1);

    app.cleanup().await;
}

#[tokio::test]
async fn duplicate_owner_number_is_a_conflict() {
    let Some(app) = PgTestApp::spawn().await else {
        return;
    };
    let new_draft = draft(app.company.company_id, "", vec![]);
    let header = InvoiceHeader::from_draft(OWNER, "FAC-2501-0007".to_string(), jan_2025(), &new_draft);

    app.db.insert_invoice(&header, &[]).await.unwrap();
    let err = app.db.insert_invoice(&header, &[]).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    // Same number under another owner is fine.
    let other = InvoiceHeader::from_draft("user-2", "FAC-2501-0007".to_string(), jan_2025(), &new_draft);
    app.db.insert_invoice(&other, &[]).await.unwrap();

    app.cleanup().await;
}

#[tokio::test]
async fn delete_removes_items_with_the_invoice() {
    let Some(app) = PgTestApp::spawn().await else {
        return;
    };

    let saved = app
        .state
        .upsert
        .save(
            OWNER,
            &draft(
                app.company.company_id,
                "",
                vec![item("Ciment", dec!(2), dec!(1200))],
            ),
            jan_2025(),
        )
        .await
        .unwrap();

    assert!(!app.db.delete_invoice("user-2", saved.invoice_id).await.unwrap());
    assert!(app.db.delete_invoice(OWNER, saved.invoice_id).await.unwrap());
    assert!(app.db.get_items(saved.invoice_id).await.unwrap().is_empty());
    assert!(!app.db.delete_invoice(OWNER, saved.invoice_id).await.unwrap());

    app.cleanup().await;
}

#[tokio::test]
async fn wide_sequences_list_first_in_postgres() {
    let Some(app) = PgTestApp::spawn().await else {
        return;
    };
    let new_draft = draft(app.company.company_id, "", vec![]);

    for sequence in [9999, 10000, 9998] {
        let header =
            InvoiceHeader::from_draft(OWNER, format_base(sequence, jan_2025()), jan_2025(), &new_draft);
        app.db.insert_invoice(&header, &[]).await.unwrap();
    }

    let page = app
        .db
        .list_invoices(OWNER, &ListInvoicesFilter::default())
        .await
        .unwrap();
    let numbers: Vec<_> = page.invoices.iter().map(|i| i.number.as_str()).collect();
    assert_eq!(
        numbers,
        vec!["FAC-2501-10000", "FAC-2501-9999", "FAC-2501-9998"]
    );

    app.cleanup().await;
}
