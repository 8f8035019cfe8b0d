use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use finder::SelectionSet;
use meals::{
    Area, FilterKind, FilterValue, Gateway, MealRecord, MealsEnvelope, models::CategoriesEnvelope,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{error::AppError, state::AppState};

#[derive(Deserialize)]
pub struct ValueQuery {
    query: Option<String>,
}

#[derive(Deserialize)]
pub struct SelectionQuery {
    #[serde(default)]
    categories: String,

    #[serde(default)]
    areas: String,
}

type MealsResponse = Result<Json<MealsEnvelope<MealRecord>>, AppError>;

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ValueQuery>,
) -> MealsResponse {
    let query = params.query.ok_or(AppError::MissingParameter("query"))?;
    let meals = state.client.search(&query).await?;

    Ok(Json(MealsEnvelope::new(meals)))
}

pub async fn categories_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoriesEnvelope>, AppError> {
    let categories = state.client.categories().await?;

    Ok(Json(CategoriesEnvelope::new(categories)))
}

pub async fn areas_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MealsEnvelope<Area>>, AppError> {
    let areas = state.client.areas().await?;

    Ok(Json(MealsEnvelope::new(areas)))
}

pub async fn category_filter_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ValueQuery>,
) -> MealsResponse {
    filter_one(&state, FilterKind::Category, params).await
}

pub async fn area_filter_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ValueQuery>,
) -> MealsResponse {
    filter_one(&state, FilterKind::Area, params).await
}

pub async fn filter_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SelectionQuery>,
) -> MealsResponse {
    let categories = SelectionSet::parse_list(&params.categories)?;
    let areas = SelectionSet::parse_list(&params.areas)?;

    let merged = state.aggregator.resolve(&categories, &areas).await?;

    info!(
        "Resolved categories {:?} areas {:?} into {} meals",
        categories.cache_key(),
        areas.cache_key(),
        merged.len()
    );
    debug!(
        "Cached selections: {} category, {} area",
        state.aggregator.caches().category.len(),
        state.aggregator.caches().area.len()
    );

    Ok(Json(MealsEnvelope::new(merged.into_vec())))
}

async fn filter_one(state: &AppState, kind: FilterKind, params: ValueQuery) -> MealsResponse {
    let raw = params.query.ok_or(AppError::MissingParameter("query"))?;
    let value = FilterValue::new(raw)?;

    let meals = state.client.fetch_by_value(kind, &value).await?;

    Ok(Json(MealsEnvelope::new(meals)))
}
