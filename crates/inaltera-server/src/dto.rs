//! Wire schemas. Field names are fixed for compatibility with the existing
//! client; request shapes are closed, rejecting unknown fields before they
//! reach the ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inaltera_audit::{AuditEvent, EventCategory};
use inaltera_ledger::{InvoiceDraft, LedgerEntry, LineItem};
use inaltera_quota::QuotaStatus;
use inaltera_types::{EntryKind, EntryStatus};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmitirRequest {
    pub client_ref: String,
    pub nif: String,
    pub items: Vec<LineaFactura>,
    #[serde(default)]
    pub notas: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineaFactura {
    pub producto: String,
    pub cantidad: u32,
    pub precio_unitario: Decimal,
    pub iva: Decimal,
}

impl From<EmitirRequest> for InvoiceDraft {
    fn from(req: EmitirRequest) -> Self {
        Self {
            client_ref: req.client_ref,
            client_nif: req.nif,
            line_items: req
                .items
                .into_iter()
                .map(|item| LineItem {
                    description: item.producto,
                    quantity: item.cantidad,
                    unit_price: item.precio_unitario,
                    tax_rate: item.iva,
                })
                .collect(),
            notes: req.notas,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmitirResponse {
    pub datos_trazabilidad: DatosTrazabilidad,
}

#[derive(Debug, Serialize)]
pub struct DatosTrazabilidad {
    pub id: String,
    pub hash: String,
}

impl From<&LedgerEntry> for EmitirResponse {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            datos_trazabilidad: DatosTrazabilidad {
                id: entry.id.to_string(),
                hash: entry.chain_hash.to_hex(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnularRequest {
    pub motivo: String,
}

#[derive(Debug, Serialize)]
pub struct AnularResponse {
    pub status: &'static str,
    pub mensaje: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VerificarResponse {
    pub valido: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datos: Option<DatosVerificacion>,
    pub mensaje: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DatosVerificacion {
    pub numero_factura: String,
    pub fecha_registro: DateTime<Utc>,
    pub cliente: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl From<&LedgerEntry> for DatosVerificacion {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            numero_factura: entry.invoice_number.clone(),
            fecha_registro: entry.issued_at,
            cliente: entry.client_ref.clone(),
            total: entry.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsoPlanResponse {
    pub plan: String,
    pub consumo: u32,
    pub limite: u32,
    pub porcentaje: u32,
    pub reset_date: String,
}

impl From<QuotaStatus> for UsoPlanResponse {
    fn from(status: QuotaStatus) -> Self {
        Self {
            plan: status.plan.name().to_string(),
            consumo: status.issued_count,
            limite: status.limit,
            porcentaje: status.percentage,
            reset_date: status.reset_date.format("%d/%m/%Y").to_string(),
        }
    }
}

/// One row of a tenant's entry listing.
#[derive(Debug, Serialize)]
pub struct RegistroFactura {
    pub id: String,
    pub numero_factura: String,
    pub cliente: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub tipo: &'static str,
    pub estado: &'static str,
    pub fecha_registro: DateTime<Utc>,
    pub hash_anterior: String,
    pub hash_actual: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivo_anulacion: Option<String>,
}

impl From<&LedgerEntry> for RegistroFactura {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            numero_factura: entry.invoice_number.clone(),
            cliente: entry.client_ref.clone(),
            total: entry.total,
            tipo: match entry.kind {
                EntryKind::Issued => "Alta",
                EntryKind::Rectification => "Anulacion",
            },
            estado: match entry.status {
                EntryStatus::Valid => "Válida",
                EntryStatus::Cancelled => "Anulada",
            },
            fecha_registro: entry.issued_at,
            hash_anterior: entry.prev_hash.to_hex(),
            hash_actual: entry.chain_hash.to_hex(),
            motivo_anulacion: entry.cancel_reason.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BitacoraQuery {
    pub categoria: Option<String>,
    pub desde: Option<DateTime<Utc>>,
    pub hasta: Option<DateTime<Utc>>,
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct BitacoraEvento {
    pub id: u64,
    pub fecha: DateTime<Utc>,
    pub categoria: &'static str,
    pub descripcion: String,
    pub nivel: String,
}

impl From<&AuditEvent> for BitacoraEvento {
    fn from(event: &AuditEvent) -> Self {
        Self {
            id: event.id,
            fecha: event.at,
            categoria: categoria_wire(event.category),
            descripcion: event.description.clone(),
            nivel: event.severity.to_string(),
        }
    }
}

pub fn categoria_wire(category: EventCategory) -> &'static str {
    match category {
        EventCategory::Login => "LOGIN",
        EventCategory::Invoicing => "FACTURACION",
        EventCategory::Cancellation => "ANULACION",
        EventCategory::Download => "DESCARGA",
        EventCategory::Config => "CONFIG",
        EventCategory::Other => "SISTEMA",
    }
}

pub fn parse_categoria(raw: &str) -> Option<EventCategory> {
    match raw.to_ascii_uppercase().as_str() {
        "LOGIN" => Some(EventCategory::Login),
        "FACTURACION" => Some(EventCategory::Invoicing),
        "ANULACION" => Some(EventCategory::Cancellation),
        "DESCARGA" => Some(EventCategory::Download),
        "CONFIG" => Some(EventCategory::Config),
        "SISTEMA" => Some(EventCategory::Other),
        _ => None,
    }
}
