use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Path, Query, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::catalog::StoreCatalog;
use crate::geo::GeoPoint;
use crate::markers::{Marker, build_markers};
use crate::models::{
    Classification, ClassificationId, RentFormData, Store, StoreDetail, StoreId, UmbrellaId,
};
use crate::position::{ReportedPosition, resolve_position};
use crate::selector::{ThreadRandom, select_default_store};
use crate::{LocatorError, VERSION};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn StoreCatalog>,
    pub position_timeout: Duration,
    /// Used when a request carries no usable position
    pub default_position: Option<GeoPoint>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn StoreCatalog>, position_timeout: Duration) -> Self {
        Self {
            catalog,
            position_timeout,
            default_position: None,
        }
    }

    #[must_use]
    pub fn with_default_position(mut self, position: Option<GeoPoint>) -> Self {
        self.default_position = position;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Error response: `{ "error": { "code", "message" } }`
#[derive(Debug)]
pub struct ApiError(LocatorError);

impl From<LocatorError> for ApiError {
    fn from(err: LocatorError) -> Self {
        Self(err)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(LocatorError::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LocatorError::Validation { .. } => StatusCode::BAD_REQUEST,
            LocatorError::NotFound { .. } => StatusCode::NOT_FOUND,
            LocatorError::Catalog { .. } => StatusCode::BAD_GATEWAY,
            LocatorError::Config { .. } | LocatorError::Cache { .. } | LocatorError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status.is_server_error() {
            error!(error = %self.0, "request failed");
            self.0.user_message()
        } else {
            self.0.to_string()
        };

        #[derive(Serialize)]
        struct Envelope {
            error: ErrorBody,
        }

        let body = Envelope {
            error: ErrorBody {
                code: self.0.code(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    version: &'static str,
}

/// Optional user position. Values that are missing or do not parse count as
/// no position rather than a bad request.
#[derive(Debug, Default, Deserialize)]
pub struct PositionQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

impl PositionQuery {
    fn reported(&self) -> ReportedPosition {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<f64>().ok());
        ReportedPosition {
            lat: parse(&self.lat),
            lng: parse(&self.lng),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoresResponse {
    pub classification_id: ClassificationId,
    pub stores: Vec<Store>,
    pub default_store_id: Option<StoreId>,
    /// Distance from the user to the default store, when the position is known
    pub distance_km: Option<f64>,
    pub markers: Vec<Marker>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/classifications", get(list_classifications))
        .route("/classifications/{id}/stores", get(classification_stores))
        .route("/stores/{id}", get(store_detail))
        .route("/umbrellas/{id}/rent-form", get(rent_form))
        .route("/cache/invalidate", post(invalidate_cache))
        .with_state(state)
}

async fn health() -> Json<HealthData> {
    Json(HealthData {
        status: "ok",
        version: VERSION,
    })
}

async fn list_classifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<Classification>>, ApiError> {
    let classifications = state.catalog.classifications().await?;
    Ok(Json(classifications))
}

async fn classification_stores(
    State(state): State<AppState>,
    path: Result<Path<ClassificationId>, PathRejection>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<StoresResponse>, ApiError> {
    let Path(classification_id) = path?;
    let stores = state.catalog.stores_in(classification_id).await?;

    let position = resolve_position(&query.reported(), state.position_timeout)
        .await
        .or(state.default_position);
    let default_store_id = select_default_store(position, &stores, &mut ThreadRandom);

    let distance_km = position.zip(default_store_id).and_then(|(position, id)| {
        stores
            .iter()
            .find(|s| s.id == id)
            .map(|s| position.distance_to(&s.position()))
    });

    info!(
        "Classification {}: {} stores, default {:?}",
        classification_id,
        stores.len(),
        default_store_id
    );

    let markers = build_markers(&stores, default_store_id);
    Ok(Json(StoresResponse {
        classification_id,
        stores,
        default_store_id,
        distance_km,
        markers,
    }))
}

async fn store_detail(
    State(state): State<AppState>,
    path: Result<Path<StoreId>, PathRejection>,
) -> Result<Json<StoreDetail>, ApiError> {
    let Path(store_id) = path?;
    let detail = state
        .catalog
        .store_detail(store_id)
        .await?
        .ok_or_else(|| LocatorError::not_found(format!("store {store_id}")))?;
    Ok(Json(detail))
}

async fn rent_form(
    State(state): State<AppState>,
    path: Result<Path<UmbrellaId>, PathRejection>,
) -> Result<Json<RentFormData>, ApiError> {
    let Path(umbrella_id) = path?;
    let form = state
        .catalog
        .rent_form(umbrella_id)
        .await?
        .ok_or_else(|| LocatorError::not_found(format!("umbrella {umbrella_id}")))?;
    Ok(Json(form))
}

async fn invalidate_cache(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.catalog.invalidate().await?;
    info!("Store catalog cache invalidated");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::file::{CatalogStore, CatalogUmbrella};
    use crate::catalog::{CatalogDocument, FileCatalog};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let document = CatalogDocument {
            classifications: vec![
                Classification::new(1, "Sinchon", 37.5559, 126.9368),
                Classification::new(2, "Hongdae", 37.5563, 126.9236),
            ],
            stores: vec![
                CatalogStore {
                    classification_id: 1,
                    store: Store::new(10, "Sinchon Station", 37.5551, 126.9368).with_umbrellas(3),
                },
                CatalogStore {
                    classification_id: 1,
                    store: Store::new(11, "Yonsei Gate", 37.5597, 126.9386),
                },
            ],
            details: Vec::new(),
            umbrellas: vec![CatalogUmbrella {
                id: 1,
                uuid: 31,
                store_id: 11,
            }],
        };
        let catalog = FileCatalog::from_document(document).unwrap();
        AppState::new(Arc::new(catalog), Duration::from_millis(500))
    }

    fn test_app() -> Router {
        router(test_state())
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, json) = send(test_app(), "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], VERSION);
    }

    #[tokio::test]
    async fn test_classifications() {
        let (status, json) = send(test_app(), "GET", "/classifications").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["name"], "Sinchon");
    }

    #[tokio::test]
    async fn test_stores_with_position_pick_nearest() {
        let (status, json) = send(
            test_app(),
            "GET",
            "/classifications/1/stores?lat=37.5598&lng=126.9385",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["classificationId"], 1);
        assert_eq!(json["defaultStoreId"], 11);
        assert!(json["distanceKm"].as_f64().unwrap() < 0.1);
        assert_eq!(json["markers"][1]["focused"], true);
        assert_eq!(json["markers"][0]["focused"], false);
    }

    #[tokio::test]
    async fn test_stores_without_valid_position_fall_back() {
        for uri in [
            "/classifications/1/stores",
            "/classifications/1/stores?lat=37.55",
            "/classifications/1/stores?lat=abc&lng=126.9",
            "/classifications/1/stores?lat=95&lng=126.9",
        ] {
            let (status, json) = send(test_app(), "GET", uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            let id = json["defaultStoreId"].as_i64().unwrap();
            assert!(id == 10 || id == 11);
            assert!(json["distanceKm"].is_null());
        }
    }

    #[tokio::test]
    async fn test_unknown_classification_is_404() {
        let (status, json) = send(test_app(), "GET", "/classifications/9/stores").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn test_bad_path_is_400() {
        let (status, json) = send(test_app(), "GET", "/stores/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn test_store_detail() {
        let (status, json) = send(test_app(), "GET", "/stores/10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Sinchon Station");

        let (status, json) = send(test_app(), "GET", "/stores/99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn test_configured_default_position() {
        let near_yonsei = GeoPoint::new(37.5598, 126.9385).unwrap();
        let app = router(test_state().with_default_position(Some(near_yonsei)));

        let (status, json) = send(app.clone(), "GET", "/classifications/1/stores").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["defaultStoreId"], 11);
        assert!(json["distanceKm"].as_f64().unwrap() < 0.1);

        // A position sent by the client wins
        let (_, json) = send(
            app,
            "GET",
            "/classifications/1/stores?lat=37.5551&lng=126.9368",
        )
        .await;
        assert_eq!(json["defaultStoreId"], 10);
    }

    #[tokio::test]
    async fn test_rent_form() {
        let (status, json) = send(test_app(), "GET", "/umbrellas/1/rent-form").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["classificationName"], "Sinchon");
        assert_eq!(json["rentStoreName"], "Yonsei Gate");
        assert_eq!(json["umbrellaUuid"], 31);
        assert_eq!(json["storeMetaId"], 11);

        let (status, json) = send(test_app(), "GET", "/umbrellas/5/rent-form").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn test_invalidate_returns_no_content() {
        let (status, _) = send(test_app(), "POST", "/cache/invalidate").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_catalog_errors_map_to_bad_gateway() {
        let response = ApiError::from(LocatorError::catalog("backend down")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
