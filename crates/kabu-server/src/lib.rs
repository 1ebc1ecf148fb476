//! HTTP server assembly for Kabu.
//!
//! Nests the JSON API under `/api` and wraps it in the cross-origin and
//! request-tracing layers.

pub mod settings;
pub mod error;

pub use settings::ServerConfig;
pub use error::{Error, Result};

use std::sync::Arc;

use axum::{
  Router,
  http::{HeaderValue, Method},
};
use kabu_core::store::PlantStore;
use tower_http::{
  cors::{AllowHeaders, AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

/// Only `origin` may call the API cross-origin; any request header is
/// accepted and credentials are allowed.
pub fn cors_layer(origin: &str) -> Result<CorsLayer> {
  let origin: HeaderValue = origin
    .parse()
    .map_err(|_| Error::InvalidOrigin(origin.to_owned()))?;

  Ok(
    CorsLayer::new()
      // Matched against the request's `Origin`.
      .allow_origin(AllowOrigin::list([origin]))
      .allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
      ])
      // A wildcard is not permitted alongside credentials.
      .allow_headers(AllowHeaders::mirror_request())
      .allow_credentials(true),
  )
}

/// Build the complete application router for `store`.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Result<Router>
where
  S: PlantStore + 'static,
{
  let cors = cors_layer(&config.frontend_origin)?;
  tracing::info!(origin = %config.frontend_origin, "CORS restricted to frontend origin");

  Ok(
    Router::new()
      .nest("/api", kabu_api::api_router(store))
      .layer(cors)
      .layer(TraceLayer::new_for_http()),
  )
}
