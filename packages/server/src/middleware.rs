//! Cross-origin policy and security headers.

use actix_cors::Cors;
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Next};
use actix_web::{Error, HttpResponse, web};
use traffic_accidents_server_models::ApiError;

/// Seconds a browser may cache a preflight response.
pub const CORS_MAX_AGE: usize = 86_400;

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins(pub Vec<String>);

impl AllowedOrigins {
    /// Whether `origin` is on the list.
    #[must_use]
    pub fn contains(&self, origin: &str) -> bool {
        self.0.iter().any(|allowed| allowed == origin)
    }
}

/// Headers added to every response.
#[must_use]
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::X_FRAME_OPTIONS, "DENY"))
        .add((header::X_XSS_PROTECTION, "1; mode=block"))
        .add((header::REFERRER_POLICY, "strict-origin-when-cross-origin"))
}

/// CORS policy admitting only `origins`, for `GET` and `OPTIONS`.
///
/// Entries that are not valid origins (including `*`) are logged and
/// skipped.
#[must_use]
pub fn cors(origins: &AllowedOrigins) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(["GET", "OPTIONS"])
        .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(CORS_MAX_AGE);

    for origin in &origins.0 {
        if origin == "*" || origin.parse::<actix_web::http::Uri>().is_err() {
            log::warn!("Skipping invalid allowed origin {origin:?}");
            continue;
        }
        cors = cors.allowed_origin(origin);
    }

    cors
}

/// Middleware rejecting requests whose `Origin` header is present but not
/// allowed, with `403 Forbidden`.
///
/// Requests without an `Origin` header (same-origin or non-browser
/// clients) pass through.
///
/// # Errors
///
/// Propagates errors from the wrapped service.
pub async fn reject_foreign_origins(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .map(|value| value.to_str().unwrap_or_default().to_string());

    if let Some(origin) = origin {
        let allowed = req
            .app_data::<web::Data<AllowedOrigins>>()
            .is_some_and(|origins| origins.contains(&origin));
        if !allowed {
            log::debug!("Rejecting request from origin {origin:?}");
            return Ok(req.into_response(
                HttpResponse::Forbidden().json(ApiError::new("Forbidden: Origin not allowed")),
            ));
        }
    }

    Ok(next.call(req).await?.map_into_boxed_body())
}
