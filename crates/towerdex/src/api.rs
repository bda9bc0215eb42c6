//! Read-only turret API.
//!
//! Routes `GET /api/...` requests to turret data held by the catalog. Paths
//! outside `/api/` are not handled and return `None`, so a host can fall
//! through to its own routes.
//!
//! | Path                     | Result                                   |
//! |--------------------------|------------------------------------------|
//! | `/api/data`              | the bundled turret list                  |
//! | `/api/turrets[?type=T]`  | turrets sorted by name, optionally typed |
//! | `/api/turret?name=N`     | one turret, name matched ignoring case   |
//!
//! When the catalog cannot serve turrets (an error or an empty collection)
//! the bundled list is served instead.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use towerdex_catalog::{bundled_turrets, Catalog, Turret};
use towerdex_query::{Query, Record as _};
use tracing::{debug, info, warn};
use url::Url;

/// Headers sent with every API response.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Content-Security-Policy", "default-src 'self'"),
];

pub const CONTENT_TYPE: &str = "application/json";

/// Failures that map to an error response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Turret name is required as a query parameter: /api/turret?name=TurretName")]
    MissingName,

    #[error("Turret '{0}' not found")]
    TurretNotFound(String),

    #[error("API endpoint not found: {0}")]
    EndpointNotFound(String),

    #[error("Malformed request target: {0}")]
    BadTarget(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::MethodNotAllowed => 405,
            ApiError::MissingName | ApiError::BadTarget(_) => 400,
            ApiError::TurretNotFound(_) | ApiError::EndpointNotFound(_) => 404,
            ApiError::Internal(_) => 500,
        }
    }
}

/// A complete API response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    #[serde(skip)]
    pub headers: &'static [(&'static str, &'static str)],
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        ApiResponse {
            status: 200,
            content_type: CONTENT_TYPE,
            headers: SECURITY_HEADERS,
            body,
        }
    }

    fn error(err: &ApiError) -> Self {
        let status = err.status();
        ApiResponse {
            status,
            content_type: CONTENT_TYPE,
            headers: SECURITY_HEADERS,
            body: json!({ "error": err.to_string(), "status": status }),
        }
    }

    pub fn header(&self, name: &str) -> Option<&'static str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Router over a shared catalog.
#[derive(Debug, Clone)]
pub struct Api {
    catalog: Catalog,
}

impl Api {
    pub fn new(catalog: Catalog) -> Self {
        Api { catalog }
    }

    /// Handles one request. `target` is the request path with its query
    /// string, e.g. `/api/turret?name=Hive`.
    ///
    /// Returns `None` for paths outside `/api/`.
    pub async fn handle(&self, method: &str, target: &str) -> Option<ApiResponse> {
        if !target.starts_with("/api/") {
            return None;
        }

        let response = match self.route(method, target).await {
            Ok(body) => ApiResponse::ok(body),
            Err(err) => {
                if err.status() >= 500 {
                    warn!(%method, %target, error = %err, "api request failed");
                } else {
                    debug!(%method, %target, status = err.status(), "api request rejected");
                }
                ApiResponse::error(&err)
            }
        };
        info!(%method, %target, status = response.status, "api request");
        Some(response)
    }

    async fn route(&self, method: &str, target: &str) -> Result<Value, ApiError> {
        if !method.eq_ignore_ascii_case("GET") {
            return Err(ApiError::MethodNotAllowed);
        }

        let url = Url::parse(&format!("http://localhost{target}"))
            .map_err(|_| ApiError::BadTarget(target.to_string()))?;
        let param = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
                .filter(|value| !value.is_empty())
        };

        match url.path() {
            "/api/data" => to_body(&bundled()?),
            "/api/turret" => {
                let name = param("name").ok_or(ApiError::MissingName)?;
                let turrets = self.turrets().await?;
                let turret = turrets
                    .iter()
                    .find(|t| t.name.eq_ignore_ascii_case(&name))
                    .ok_or(ApiError::TurretNotFound(name))?;
                to_body(turret)
            }
            "/api/turrets" => {
                let turrets = self.turrets().await?;
                let query = Query::new()
                    .exact(Turret::TYPE, param("type"))
                    .sort_asc(Turret::NAME);
                let view = query.run(turrets.iter(), Turret::accessor);
                to_body(&view.records())
            }
            _ => Err(ApiError::EndpointNotFound(target.to_string())),
        }
    }

    async fn turrets(&self) -> Result<Arc<Vec<Turret>>, ApiError> {
        match self.catalog.turrets().await {
            Ok(turrets) if !turrets.is_empty() => Ok(turrets),
            Ok(_) => {
                info!("catalog has no turrets, serving bundled data");
                bundled().map(Arc::new)
            }
            Err(err) => {
                warn!(error = %err, "turret fetch failed, serving bundled data");
                bundled().map(Arc::new)
            }
        }
    }
}

fn bundled() -> Result<Vec<Turret>, ApiError> {
    bundled_turrets().map_err(|e| ApiError::Internal(e.to_string()))
}

fn to_body<T: Serialize + ?Sized>(data: &T) -> Result<Value, ApiError> {
    serde_json::to_value(data).map_err(|e| ApiError::Internal(e.to_string()))
}
