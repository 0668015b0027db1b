use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use futures::FutureExt;
use serde::Deserialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};
use validator::Validate;

use super::middleware::secret_matches;
use super::{ApiError, ApiResponse, AppState, HealthResponse, TriggerFailure, TriggerResponse};
use crate::catalog::parse_product_url;
use crate::models::{NewProduct, Product, Vendor};
use crate::utils::error::AppError;

#[derive(Debug, Deserialize)]
pub struct TriggerParams {
    pub secret: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub vendor: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddProductRequest {
    #[validate(url(message = "url must be a valid URL"))]
    pub url: String,
    /// Part number, required for Apple pages.
    #[validate(length(min = 1, max = 64))]
    pub product_id: Option<String>,
    #[validate(url(message = "affiliate_link must be a valid URL"))]
    pub affiliate_link: Option<String>,
}

impl AddProductRequest {
    // Form posts send empty strings for untouched optional fields
    fn normalized(self) -> Self {
        let non_blank = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            url: self.url.trim().to_string(),
            product_id: non_blank(self.product_id),
            affiliate_link: non_blank(self.affiliate_link),
        }
    }
}

/// `GET /api/check?secret=`: one full run, for the external scheduler.
pub async fn trigger_check(State(state): State<AppState>, Query(params): Query<TriggerParams>) -> Response {
    if !secret_matches(&state.trigger_secret, params.secret.as_deref()) {
        warn!("Trigger rejected: bad or missing secret");
        return (
            StatusCode::UNAUTHORIZED,
            Json(TriggerFailure {
                error: AppError::Unauthorized.to_string(),
            }),
        )
            .into_response();
    }

    info!("Trigger accepted, starting run");

    match AssertUnwindSafe(state.watcher.run_and_notify()).catch_unwind().await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(TriggerResponse {
                status: outcome.status().to_string(),
                found: outcome.found(),
            }),
        )
            .into_response(),
        Err(panic) => {
            let err = AppError::Internal(panic_message(panic.as_ref()));
            error!(error = %err, "Run panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TriggerFailure { error: err.to_string() }),
            )
                .into_response()
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "run panicked".to_string()
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let vendor = params
        .vendor
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(Vendor::from_tag);

    let products = state.catalog.list_products(vendor.as_ref()).await?;
    Ok(Json(ApiResponse::success(products)))
}

pub async fn add_product(
    State(state): State<AppState>,
    Json(request): Json<AddProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let request = request.normalized();
    request.validate().map_err(AppError::from)?;

    let details = parse_product_url(&request.url, request.product_id.as_deref())?;
    if !details.vendor.is_supported() {
        info!(vendor = %details.vendor, "Storing product for a vendor without a checker");
    }

    let product = state
        .catalog
        .insert_product(NewProduct {
            name: details.name,
            url: request.url,
            product_identifier: details.product_identifier,
            vendor: details.vendor,
            affiliate_link: request.affiliate_link,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if !state.catalog.delete_product(&id).await? {
        return Err(AppError::NotFound {
            resource: "Product".to_string(),
        }
        .into());
    }

    Ok(Json(ApiResponse::success(serde_json::json!({ "deleted": id }))))
}
