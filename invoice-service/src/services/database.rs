//! PostgreSQL storage for invoice-service.

use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use super::error::StoreError;
use super::metrics::DB_QUERY_DURATION;
use super::store::{CompanyDirectory, InvoiceStore, SequenceStore};
use crate::models::{
    Company, CounterScope, Invoice, InvoiceHeader, InvoiceItem, InvoicePage, ListInvoicesFilter,
    NewInvoiceItem,
};

const INVOICE_COLUMNS: &str = "invoice_id, owner_id, number, company_id, invoice_type, invoice_date, \
     client_name, client_address, amount_paid, total_amount, created_utc, updated_utc";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "invoice-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        Ok(self.pool.begin().await?)
    }
}

async fn insert_items(
    tx: &mut Transaction<'static, Postgres>,
    invoice_id: Uuid,
    items: &[NewInvoiceItem],
) -> Result<(), StoreError> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO invoice_items (item_id, invoice_id, position, designation, quantity, unit, price, total_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(invoice_id)
        .bind(position as i32)
        .bind(&item.designation)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.price)
        .bind(item.total_price())
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl SequenceStore for Database {
    #[instrument(skip(self), fields(scope = %scope))]
    async fn current_sequence(&self, scope: &CounterScope) -> Result<i64, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["current_sequence"])
            .start_timer();

        let last = sqlx::query_scalar::<_, i64>(
            "SELECT last_sequence FROM invoice_counters WHERE name = $1",
        )
        .bind(scope.as_str())
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();

        Ok(last.unwrap_or(0))
    }

    #[instrument(skip(self), fields(scope = %scope))]
    async fn increment_sequence(&self, scope: &CounterScope) -> Result<i64, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["increment_sequence"])
            .start_timer();

        let sequence = sqlx::query_scalar::<_, i64>("SELECT increment_invoice_counter($1)")
            .bind(scope.as_str())
            .fetch_one(&self.pool)
            .await?;

        timer.observe_duration();

        Ok(sequence)
    }
}

#[async_trait]
impl InvoiceStore for Database {
    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_number = %number))]
    async fn find_by_number(
        &self,
        owner_id: &str,
        number: &str,
    ) -> Result<Option<Invoice>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_by_number"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE owner_id = $1 AND number = $2"
        ))
        .bind(owner_id)
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();

        Ok(invoice)
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    async fn get_invoice(
        &self,
        owner_id: &str,
        invoice_id: Uuid,
    ) -> Result<Option<Invoice>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE owner_id = $1 AND invoice_id = $2"
        ))
        .bind(owner_id)
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();

        Ok(invoice)
    }

    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    async fn get_items(&self, invoice_id: Uuid) -> Result<Vec<InvoiceItem>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_items"])
            .start_timer();

        let items = sqlx::query_as::<_, InvoiceItem>(
            r#"
            SELECT item_id, invoice_id, position, designation, quantity, unit, price, total_price
            FROM invoice_items
            WHERE invoice_id = $1
            ORDER BY position
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        timer.observe_duration();

        Ok(items)
    }

    #[instrument(skip(self, header, items), fields(owner_id = %header.owner_id, invoice_number = %header.number))]
    async fn insert_invoice(
        &self,
        header: &InvoiceHeader,
        items: &[NewInvoiceItem],
    ) -> Result<Invoice, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_invoice"])
            .start_timer();

        let mut tx = self.begin().await?;

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            INSERT INTO invoices (
                invoice_id, owner_id, number, company_id, invoice_type, invoice_date,
                client_name, client_address, amount_paid, total_amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&header.owner_id)
        .bind(&header.number)
        .bind(header.company_id)
        .bind(header.invoice_type.as_str())
        .bind(header.invoice_date)
        .bind(&header.client_name)
        .bind(&header.client_address)
        .bind(header.amount_paid)
        .bind(header.total_amount)
        .fetch_one(&mut *tx)
        .await?;

        insert_items(&mut tx, invoice.invoice_id, items).await?;

        tx.commit().await?;

        timer.observe_duration();

        Ok(invoice)
    }

    #[instrument(skip(self, header, items), fields(invoice_id = %invoice_id))]
    async fn replace_invoice(
        &self,
        invoice_id: Uuid,
        header: &InvoiceHeader,
        items: &[NewInvoiceItem],
    ) -> Result<Invoice, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["replace_invoice"])
            .start_timer();

        let mut tx = self.begin().await?;

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            UPDATE invoices
            SET company_id = $2,
                invoice_type = $3,
                invoice_date = $4,
                client_name = $5,
                client_address = $6,
                amount_paid = $7,
                total_amount = $8,
                updated_utc = NOW()
            WHERE invoice_id = $1
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(invoice_id)
        .bind(header.company_id)
        .bind(header.invoice_type.as_str())
        .bind(header.invoice_date)
        .bind(&header.client_name)
        .bind(&header.client_address)
        .bind(header.amount_paid)
        .bind(header.total_amount)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::Query(format!("invoice {} does not exist", invoice_id)))?;

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, invoice_id, items).await?;

        tx.commit().await?;

        timer.observe_duration();

        Ok(invoice)
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    async fn delete_invoice(&self, owner_id: &str, invoice_id: Uuid) -> Result<bool, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_invoice"])
            .start_timer();

        let result = sqlx::query("DELETE FROM invoices WHERE owner_id = $1 AND invoice_id = $2")
            .bind(owner_id)
            .bind(invoice_id)
            .execute(&self.pool)
            .await?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(owner_id = %owner_id))]
    async fn list_invoices(
        &self,
        owner_id: &str,
        filter: &ListInvoicesFilter,
    ) -> Result<InvoicePage, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invoices WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE owner_id = $1
            ORDER BY invoice_date DESC, length(number) DESC, number DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner_id)
        .bind(i64::from(filter.page_size))
        .bind(filter.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        timer.observe_duration();

        Ok(InvoicePage {
            invoices,
            total: total.max(0) as u64,
        })
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl CompanyDirectory for Database {
    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn get_company(&self, company_id: Uuid) -> Result<Option<Company>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_company"])
            .start_timer();

        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT company_id, display_name, markup_percentage, template_id
            FROM companies
            WHERE company_id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();

        Ok(company)
    }
}
