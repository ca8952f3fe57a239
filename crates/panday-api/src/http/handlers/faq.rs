//! FAQ handler.

use axum::Json;
use axum::extract::{Query, State};

use panday_types::faq::FaqListing;

use crate::http::error::{AppError, or_internal};
use crate::http::extractors::query::FaqQuery;
use crate::state::AppState;

/// GET /api/faq?categoryId=&global=
///
/// Public. `global=true` gives the top global entries, `categoryId` one
/// category's entries, and no filter every category with its entries.
pub async fn list_faq(
    State(state): State<AppState>,
    Query(query): Query<FaqQuery>,
) -> Result<Json<FaqListing>, AppError> {
    let global = query.global.as_deref() == Some("true");
    let listing = state
        .faq_service
        .list(query.category_id.as_deref(), global)
        .await
        .map_err(or_internal("Failed to fetch FAQs"))?;
    Ok(Json(listing))
}
