use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};

use inaltera_audit::{EventCategory, EventFilter, Severity};
use inaltera_ledger::{InvoiceDraft, LedgerError, LedgerReader, LedgerWriter};
use inaltera_types::{ChainHash, EntryId, TenantId};

use crate::dto::{
    AnularRequest, AnularResponse, BitacoraEvento, BitacoraQuery, DatosVerificacion,
    EmitirRequest, EmitirResponse, RegistroFactura, UsoPlanResponse, VerificarResponse,
    parse_categoria,
};
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the already-authenticated tenant identity, set by the
/// auth collaborator in front of this service.
pub const TENANT_HEADER: &str = "x-tenant-id";

const MENSAJE_VERIFICADO: &str = "Documento verificado correctamente.";
const MENSAJE_NO_VERIFICADO: &str =
    "El hash proporcionado no es auténtico o no consta en el registro.";

fn tenant_from(headers: &HeaderMap) -> Result<TenantId, ApiError> {
    let raw = headers
        .get(TENANT_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing x-tenant-id header"))?;
    TenantId::parse(raw).map_err(|_| ApiError::unauthorized("invalid tenant identity"))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "name": "inaltera-server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}

pub async fn emitir(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<EmitirRequest>,
) -> Result<Json<EmitirResponse>, ApiError> {
    let tenant = tenant_from(&headers)?;
    let draft = InvoiceDraft::from(request);
    let entry = state.ledger.issue(&tenant, &draft)?;
    Ok(Json(EmitirResponse::from(&entry)))
}

pub async fn anular(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<AnularRequest>,
) -> Result<Json<AnularResponse>, ApiError> {
    let tenant = tenant_from(&headers)?;
    let entry = EntryId::parse(&id).map_err(|_| ApiError::from(LedgerError::NotFound))?;
    state.ledger.cancel(&tenant, entry, &request.motivo)?;
    Ok(Json(AnularResponse {
        status: "Anulada",
        mensaje: "Factura anulada y evento registrado en la cadena.",
    }))
}

/// Public, unauthenticated. Unknown, malformed, and corrupted hashes all get
/// the same negative answer.
pub async fn verificar(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Json<VerificarResponse> {
    let negative = VerificarResponse {
        valido: false,
        datos: None,
        mensaje: MENSAJE_NO_VERIFICADO,
    };

    let Ok(hash) = ChainHash::from_hex(&hash) else {
        return Json(negative);
    };

    let verification = state.verifier.verify(&hash);
    match (verification.valid, verification.entry) {
        (true, Some(entry)) => Json(VerificarResponse {
            valido: true,
            datos: Some(DatosVerificacion::from(&entry)),
            mensaje: MENSAJE_VERIFICADO,
        }),
        _ => Json(negative),
    }
}

pub async fn uso_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UsoPlanResponse>, ApiError> {
    let tenant = tenant_from(&headers)?;
    Ok(Json(state.quota.status(&tenant).into()))
}

pub async fn bitacora(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BitacoraQuery>,
) -> Result<Json<Vec<BitacoraEvento>>, ApiError> {
    let tenant = tenant_from(&headers)?;
    let category = match &query.categoria {
        Some(raw) => Some(parse_categoria(raw).ok_or_else(|| {
            ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("unknown audit category: {raw}"),
            )
        })?),
        None => None,
    };
    let filter = EventFilter {
        category,
        from: query.desde,
        to: query.hasta,
        offset: query.offset,
        limit: query.limit,
    };
    let events = state.audit.query(&tenant, &filter);
    Ok(Json(events.iter().map(BitacoraEvento::from).collect()))
}

pub async fn registros(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<RegistroFactura>>, ApiError> {
    let tenant = tenant_from(&headers)?;
    let entries = state.ledger.entries(&tenant)?;
    Ok(Json(entries.iter().map(RegistroFactura::from).collect()))
}

/// Structured traceability export of one entry. Recorded in the bitácora as
/// a download, like the original PDF/JSON exports.
pub async fn registro_json(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let tenant = tenant_from(&headers)?;
    let entry_id = EntryId::parse(&id).map_err(|_| ApiError::from(LedgerError::NotFound))?;
    let entry = state
        .ledger
        .entry_by_id(&tenant, entry_id)?
        .ok_or_else(|| ApiError::from(LedgerError::NotFound))?;

    state
        .audit
        .append(
            Some(tenant),
            EventCategory::Download,
            Severity::Info,
            format!("Descarga JSON factura {}", entry.invoice_number),
        )
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(json!({
        "cabecera": {
            "id_registro": entry.id.to_string(),
            "timestamp": entry.issued_at.to_rfc3339(),
            "version_sif": "1.0",
        },
        "trazabilidad": {
            "hash_anterior": entry.prev_hash.to_hex(),
            "hash_actual": entry.chain_hash.to_hex(),
            "algoritmo": "BLAKE3-256",
        },
        "documento": {
            "numero_factura": entry.invoice_number,
            "cliente": entry.client_ref,
            "total": entry.total,
        },
        "nota_legal": "Registro generado conforme al reglamento No-Verifactu (Real Decreto 1007/2023).",
    })))
}
