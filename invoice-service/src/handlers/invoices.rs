use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::dtos::{
    InvoiceListResponse, InvoiceResponse, ListInvoicesParams, NextNumberParams,
    NextNumberResponse, SaveInvoiceRequest, SaveInvoiceResponse,
};
use crate::middleware::OwnerId;
use crate::models::{CounterScope, ListInvoicesFilter};
use crate::services::numbering::{adapt, format_base};
use crate::services::{render_document, InvoiceDocument, InvoiceError, SaveOutcome};
use crate::startup::AppState;

/// Preview the next invoice number without reserving it.
#[tracing::instrument(skip(state))]
pub async fn peek_next_number(
    State(state): State<AppState>,
    Query(params): Query<NextNumberParams>,
) -> Result<Json<NextNumberResponse>, AppError> {
    let date = params.date.unwrap_or_else(|| Local::now().date_naive());
    let scope = CounterScope::for_date(date);

    let sequence = state.counter.peek_next(&scope).await?;
    let base_number = format_base(sequence, date);

    let display_number = match params.company_id {
        Some(company_id) => {
            let company = state
                .companies
                .get_company(company_id)
                .await?
                .ok_or(InvoiceError::CompanyNotFound(company_id))?;
            Some(adapt(
                &base_number,
                &company,
                params.invoice_type.unwrap_or_default(),
            ))
        }
        None => None,
    };

    Ok(Json(NextNumberResponse {
        scope: scope.to_string(),
        sequence,
        base_number,
        display_number,
        provisional: true,
    }))
}

#[tracing::instrument(skip(state, request))]
pub async fn save_invoice(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(request): Json<SaveInvoiceRequest>,
) -> Result<(StatusCode, Json<SaveInvoiceResponse>), AppError> {
    request.validate()?;

    let draft = request.into_draft();
    let saved = state
        .upsert
        .save(&owner_id, &draft, Local::now().date_naive())
        .await?;

    let status = match saved.outcome {
        SaveOutcome::Updated => StatusCode::OK,
        SaveOutcome::Created | SaveOutcome::Renumbered { .. } => StatusCode::CREATED,
    };

    Ok((status, Json(SaveInvoiceResponse::from(saved))))
}

#[tracing::instrument(skip(state))]
pub async fn list_invoices(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Query(params): Query<ListInvoicesParams>,
) -> Result<Json<InvoiceListResponse>, AppError> {
    let filter = ListInvoicesFilter::new(params.page, params.page_size);
    let page = state.invoices.list_invoices(&owner_id, &filter).await?;

    Ok(Json(InvoiceListResponse::new(
        page,
        filter.page,
        filter.page_size,
    )))
}

#[tracing::instrument(skip(state))]
pub async fn get_invoice(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, AppError> {
    let invoice = state
        .invoices
        .get_invoice(&owner_id, invoice_id)
        .await?
        .ok_or(InvoiceError::NotFound(invoice_id))?;
    let items = state.invoices.get_items(invoice_id).await?;

    Ok(Json(InvoiceResponse::new(invoice, items)))
}

/// Presentation model for printing: branded number and marked-up prices.
#[tracing::instrument(skip(state))]
pub async fn get_invoice_document(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<InvoiceDocument>, AppError> {
    let invoice = state
        .invoices
        .get_invoice(&owner_id, invoice_id)
        .await?
        .ok_or(InvoiceError::NotFound(invoice_id))?;
    let items = state.invoices.get_items(invoice_id).await?;
    let company = state
        .companies
        .get_company(invoice.company_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!(
                "company {} of invoice {} not found",
                invoice.company_id,
                invoice.number
            ))
        })?;

    Ok(Json(render_document(&invoice, &items, &company)))
}

#[tracing::instrument(skip(state))]
pub async fn delete_invoice(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(invoice_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.invoices.delete_invoice(&owner_id, invoice_id).await? {
        tracing::info!(invoice_id = %invoice_id, "Invoice deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(InvoiceError::NotFound(invoice_id).into())
    }
}
