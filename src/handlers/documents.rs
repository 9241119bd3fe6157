// src/handlers/documents.rs

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{EnergyStaff, RequireRole},
    },
    models::{
        energy::{InvoiceFilter, TariffGroup},
        inventory::{InventoryExportQuery, InventoryKind},
    },
};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn xlsx_response(bytes: Vec<u8>, filename: &str) -> Response {
    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
        (header::CONTENT_DISPOSITION, &format!("attachment; filename=\"{}\"", filename)),
    ];
    (headers, bytes).into_response()
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}/pdf",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID de la factura")),
    responses(
        (status = 200, description = "Ficha de la factura en PDF", content_type = "application/pdf"),
        (status = 404, description = "Factura inexistente o fuera de alcance")
    ),
    security(("api_jwt" = []))
)]
pub async fn invoice_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let view = app_state
        .energy_service
        .get_invoice(&guard.user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let pdf_bytes = app_state
        .document_service
        .invoice_pdf(&view)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf"),
        (header::CONTENT_DISPOSITION, &format!("attachment; filename=\"factura_{}.pdf\"", id)),
    ];

    Ok((headers, pdf_bytes).into_response())
}

#[utoipa::path(
    get,
    path = "/api/invoices/export/{group}",
    tag = "Documents",
    params(
        ("group" = String, Path, description = "pdbt o triple"),
        ("orgUnitId" = Option<Uuid>, Query, description = "Solo para administradores"),
        ("year" = Option<i32>, Query, description = "Año de registro")
    ),
    responses((status = 200, description = "Libro de Excel con las facturas del grupo")),
    security(("api_jwt" = []))
)]
pub async fn export_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Path(group): Path<String>,
    Query(filter): Query<InvoiceFilter>,
) -> Result<Response, ApiError> {
    let group = TariffGroup::from_slug(&group).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let invoices = app_state
        .energy_service
        .list_invoices(&guard.user, InvoiceFilter { group: Some(group), ..filter })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let bytes = app_state
        .export_service
        .invoices_xlsx(group, &invoices)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let name = match group {
        TariffGroup::Pdbt => "facturas_pdbt.xlsx",
        TariffGroup::Triple => "facturas_triple.xlsx",
    };
    Ok(xlsx_response(bytes, name))
}

#[utoipa::path(
    get,
    path = "/api/inventory/export/{kind}",
    tag = "Documents",
    params(
        ("kind" = String, Path, description = "climatizacion, luminarias o miscelaneos"),
        ("orgUnitId" = Option<Uuid>, Query, description = "Obligatoria para administradores"),
        ("periodId" = Uuid, Query, description = "Periodo de inventario")
    ),
    responses((status = 200, description = "Libro de Excel con los equipos y sus totales")),
    security(("api_jwt" = []))
)]
pub async fn export_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Path(kind): Path<String>,
    Query(query): Query<InventoryExportQuery>,
) -> Result<Response, ApiError> {
    let kind = InventoryKind::from_slug(&kind).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let data = app_state
        .inventory_service
        .export_rows(&guard.user, query.org_unit_id, query.period_id, kind)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let bytes = app_state
        .export_service
        .inventory_xlsx(kind, &data)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let filename = format!("inventario_{}.xlsx", kind.slug());
    Ok(xlsx_response(bytes, &filename))
}
