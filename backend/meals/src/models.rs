use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

pub const DELIMITER: char = ',';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Category,
    Area,
}

impl FilterKind {
    /// Query parameter understood by `filter.php`.
    pub fn param(self) -> &'static str {
        match self {
            FilterKind::Category => "c",
            FilterKind::Area => "a",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Category => f.write_str("category"),
            FilterKind::Area => f.write_str("area"),
        }
    }
}

/// One category or area name, compared byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FilterValue(String);

impl FilterValue {
    pub fn new(value: impl Into<String>) -> Result<Self, FetchError> {
        let value = value.into();

        if value.trim().is_empty() || value.contains(DELIMITER) {
            return Err(FetchError::InvalidValue(value));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FilterValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRecord {
    #[serde(rename = "idMeal")]
    pub id: String,

    #[serde(rename = "strMeal")]
    pub name: String,

    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,

    #[serde(rename = "strCategory", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(rename = "strArea", default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "idCategory")]
    pub id: String,

    #[serde(rename = "strCategory")]
    pub name: String,

    #[serde(rename = "strCategoryThumb", default)]
    pub thumbnail: Option<String>,

    #[serde(rename = "strCategoryDescription", default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    #[serde(rename = "strArea")]
    pub name: String,
}

/// `{"meals": [...]}`, where the list may be `null` or absent.
#[derive(Debug, Deserialize, Serialize)]
pub struct MealsEnvelope<T> {
    pub meals: Option<Vec<T>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CategoriesEnvelope {
    pub categories: Option<Vec<Category>>,
}

impl<T> MealsEnvelope<T> {
    pub fn new(meals: Vec<T>) -> Self {
        Self { meals: Some(meals) }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.meals.unwrap_or_default()
    }
}

impl CategoriesEnvelope {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories: Some(categories),
        }
    }

    pub fn into_vec(self) -> Vec<Category> {
        self.categories.unwrap_or_default()
    }
}
