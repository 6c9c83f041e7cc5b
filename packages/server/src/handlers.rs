//! HTTP handler functions for the traffic accidents API.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use traffic_accidents_database::DbError;
use traffic_accidents_database::queries::{check_connection, find_accidents};
use traffic_accidents_database_models::{AccidentRecord, FilterDescriptor};
use traffic_accidents_filter::{RawFilterParams, compile_filter};
use traffic_accidents_server_models::{
    ApiAccident, ApiError, ApiHealth, MetadataResponse, MunicipalityQueryParams,
    MunicipalityResponse, RequestedYears, StationQueryParams, StationResponse,
};

use crate::AppState;

const ACCIDENTS_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=600";
const METADATA_CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=7200";

/// `GET /api/health`
///
/// Reports whether the store answers a ping within the health check
/// timeout.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    match check_connection(state.store.as_ref()).await {
        Ok(()) => HttpResponse::Ok().json(ApiHealth::connected()),
        Err(e) => {
            log::error!("Health check failed: {e}");
            HttpResponse::ServiceUnavailable().json(ApiHealth::disconnected())
        }
    }
}

/// `GET /api/accidents/metadata`
///
/// Lists the accepted accident type and category filter codes.
pub async fn metadata(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, METADATA_CACHE_CONTROL))
        .json(MetadataResponse::build(state.label_strategy))
}

/// `GET /api/accidents`
///
/// Accidents at one municipality, optionally limited to the span of the
/// requested years.
pub async fn accidents(
    state: web::Data<AppState>,
    params: web::Query<MunicipalityQueryParams>,
) -> HttpResponse {
    let (filter, records) = match query(&state, RawFilterParams::from(&*params)).await {
        Ok(found) => found,
        Err(response) => return response,
    };

    let data = to_api(records, &state);
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, ACCIDENTS_CACHE_CONTROL))
        .json(MunicipalityResponse {
            municipality: filter.location_key().to_string(),
            years: RequestedYears::from_filter(&filter),
            total: data.len(),
            data,
        })
}

/// `GET /api/accidents/station`
///
/// Accidents at one police station, filtered by date bounds, accident type
/// and categories.
pub async fn station(
    state: web::Data<AppState>,
    params: web::Query<StationQueryParams>,
) -> HttpResponse {
    let (filter, records) = match query(&state, RawFilterParams::from(&*params)).await {
        Ok(found) => found,
        Err(response) => return response,
    };

    let data = to_api(records, &state);
    HttpResponse::Ok().json(StationResponse {
        pstation: filter.location_key().to_string(),
        total: data.len(),
        data,
    })
}

/// Compiles `params` and runs the resulting filter, mapping failures to
/// their error responses.
async fn query(
    state: &AppState,
    params: RawFilterParams,
) -> Result<(FilterDescriptor, Vec<AccidentRecord>), HttpResponse> {
    let filter = compile_filter(&params)
        .map_err(|failure| HttpResponse::BadRequest().json(ApiError::from(&failure)))?;

    match find_accidents(state.store.as_ref(), &filter, &state.store_config).await {
        Ok(records) => Ok((filter, records)),
        Err(e) => {
            log::error!("Failed to query accidents: {e}");
            Err(match e {
                DbError::Timeout { .. } => {
                    HttpResponse::GatewayTimeout().json(ApiError::new(e.to_string()))
                }
                DbError::Store { .. } => {
                    HttpResponse::InternalServerError().json(ApiError::new("Internal server error"))
                }
            })
        }
    }
}

fn to_api(records: Vec<AccidentRecord>, state: &AppState) -> Vec<ApiAccident> {
    records
        .into_iter()
        .map(|record| ApiAccident::from_record(record, state.label_strategy))
        .collect()
}
