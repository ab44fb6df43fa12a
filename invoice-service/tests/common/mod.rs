//! Shared harness for invoice-service integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use invoice_service::models::{
    Company, CounterScope, Invoice, InvoiceDraft, InvoiceHeader, InvoiceItem, InvoicePage,
    InvoiceType, ListInvoicesFilter, NewInvoiceItem,
};
use invoice_service::services::{Database, InvoiceStore, MemoryStore, SequenceStore, StoreError};
use invoice_service::{build_router, AppState};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

pub const OWNER: &str = "user-1";
pub const OTHER_OWNER: &str = "user-2";
pub const COUNTER_TIMEOUT: Duration = Duration::from_millis(200);

// Counter for unique schema names
static SCHEMA_COUNTER: AtomicU32 = AtomicU32::new(0);

pub struct TestApp {
    pub store: MemoryStore,
    pub state: AppState,
    pub company: Company,
}

impl TestApp {
    /// In-memory app with one company, "ETS MLF", carrying a 10% markup.
    pub async fn spawn() -> Self {
        let store = MemoryStore::new();
        let company = test_company("ETS MLF", dec!(10));
        store.insert_company(company.clone()).await;

        let state = AppState::new(store.clone(), COUNTER_TIMEOUT);

        Self {
            store,
            state,
            company,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        owner: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(owner) = owner {
            builder = builder.header("X-User-ID", owner);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }
}

/// Application state over a real PostgreSQL database, isolated in its own
/// schema. Only available when `TEST_DATABASE_URL` is set.
pub struct PgTestApp {
    pub db: Database,
    pub state: AppState,
    pub company: Company,
    base_url: String,
    schema_name: String,
}

impl PgTestApp {
    /// `None` when no test database is configured.
    pub async fn spawn() -> Option<Self> {
        let Ok(base_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        };

        let counter = SCHEMA_COUNTER.fetch_add(1, Ordering::SeqCst);
        let schema_name = format!("test_invoice_{}_{}", std::process::id(), counter);

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&base_url)
            .await
            .expect("Failed to connect to test database");
        sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", schema_name))
            .execute(&pool)
            .await
            .ok();
        sqlx::query(&format!("CREATE SCHEMA {}", schema_name))
            .execute(&pool)
            .await
            .expect("Failed to create test schema");
        pool.close().await;

        let separator = if base_url.contains('?') { "&" } else { "?" };
        let url = format!(
            "{}{}options=-c search_path%3D{}",
            base_url, separator, schema_name
        );

        let db = Database::new(&url, 10, 1, Duration::from_secs(5))
            .await
            .expect("Failed to create test database");
        db.run_migrations().await.expect("Failed to run migrations");

        let company = test_company("ETS MLF", dec!(10));
        sqlx::query(
            "INSERT INTO companies (company_id, display_name, markup_percentage, template_id) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(company.company_id)
        .bind(&company.display_name)
        .bind(company.markup_percentage)
        .bind(&company.template_id)
        .execute(db.pool())
        .await
        .expect("Failed to seed company");

        let state = AppState::new(db.clone(), Duration::from_secs(5));

        Some(Self {
            db,
            state,
            company,
            base_url,
            schema_name,
        })
    }

    /// Drop the test schema.
    pub async fn cleanup(&self) {
        self.db.pool().close().await;

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&self.base_url)
            .await
            .ok();

        if let Some(pool) = pool {
            let _ = sqlx::query(&format!(
                "DROP SCHEMA IF EXISTS {} CASCADE",
                self.schema_name
            ))
            .execute(&pool)
            .await;
            pool.close().await;
        }
    }
}

pub fn test_company(name: &str, markup: Decimal) -> Company {
    Company {
        company_id: Uuid::new_v4(),
        display_name: name.to_string(),
        markup_percentage: markup,
        template_id: "classic".to_string(),
    }
}

pub fn jan_2025() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

pub fn item(designation: &str, quantity: Decimal, price: Decimal) -> NewInvoiceItem {
    NewInvoiceItem {
        designation: designation.to_string(),
        quantity,
        unit: None,
        price,
    }
}

pub fn draft(company_id: Uuid, number: &str, items: Vec<NewInvoiceItem>) -> InvoiceDraft {
    InvoiceDraft {
        number: number.to_string(),
        company_id,
        invoice_type: InvoiceType::Definitive,
        client_name: "Client SA".to_string(),
        client_address: Some("12 rue du Port".to_string()),
        amount_paid: Decimal::ZERO,
        total_amount: items.iter().map(NewInvoiceItem::total_price).sum(),
        items,
    }
}

/// Sequence store whose backend is down.
pub struct UnavailableSequences;

#[async_trait]
impl SequenceStore for UnavailableSequences {
    async fn current_sequence(&self, _scope: &CounterScope) -> Result<i64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn increment_sequence(&self, _scope: &CounterScope) -> Result<i64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Sequence store that answers only after `delay`.
pub struct SlowSequences {
    pub inner: MemoryStore,
    pub delay: Duration,
}

#[async_trait]
impl SequenceStore for SlowSequences {
    async fn current_sequence(&self, scope: &CounterScope) -> Result<i64, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.current_sequence(scope).await
    }

    async fn increment_sequence(&self, scope: &CounterScope) -> Result<i64, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.increment_sequence(scope).await
    }
}

/// Invoice store that rejects inserts while `fail_inserts` is set.
pub struct FailingInserts {
    pub inner: MemoryStore,
    pub fail_inserts: AtomicBool,
}

impl FailingInserts {
    pub fn new(inner: MemoryStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_inserts: AtomicBool::new(true),
        })
    }

    pub fn recover(&self) {
        self.fail_inserts.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl InvoiceStore for FailingInserts {
    async fn find_by_number(
        &self,
        owner_id: &str,
        number: &str,
    ) -> Result<Option<Invoice>, StoreError> {
        self.inner.find_by_number(owner_id, number).await
    }

    async fn get_invoice(
        &self,
        owner_id: &str,
        invoice_id: Uuid,
    ) -> Result<Option<Invoice>, StoreError> {
        self.inner.get_invoice(owner_id, invoice_id).await
    }

    async fn get_items(&self, invoice_id: Uuid) -> Result<Vec<InvoiceItem>, StoreError> {
        self.inner.get_items(invoice_id).await
    }

    async fn insert_invoice(
        &self,
        header: &InvoiceHeader,
        items: &[NewInvoiceItem],
    ) -> Result<Invoice, StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write timed out".to_string()));
        }
        self.inner.insert_invoice(header, items).await
    }

    async fn replace_invoice(
        &self,
        invoice_id: Uuid,
        header: &InvoiceHeader,
        items: &[NewInvoiceItem],
    ) -> Result<Invoice, StoreError> {
        self.inner.replace_invoice(invoice_id, header, items).await
    }

    async fn delete_invoice(&self, owner_id: &str, invoice_id: Uuid) -> Result<bool, StoreError> {
        self.inner.delete_invoice(owner_id, invoice_id).await
    }

    async fn list_invoices(
        &self,
        owner_id: &str,
        filter: &ListInvoicesFilter,
    ) -> Result<InvoicePage, StoreError> {
        self.inner.list_invoices(owner_id, filter).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }
}
