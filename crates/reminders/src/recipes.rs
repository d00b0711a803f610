//! Client for the recipe-suggestion service
//!
//! The service accepts a list of ingredients on `POST /generate-recipes` and
//! answers with up to three generated recipes. Reminders use it to suggest
//! dishes built from items that are about to expire.

use async_trait::async_trait;
use grocify_core::telemetry::external_api_span;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, Instrument};

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("No valid ingredients provided")]
    NoIngredients,

    #[error("Recipe service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Recipe service returned status {status}: {detail}")]
    Service { status: u16, detail: String },
}

/// A generated recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub short_description: String,
    pub instructions: String,
}

#[derive(Debug, Serialize)]
struct RecipeRequest<'a> {
    ingredients: &'a [String],
}

#[derive(Debug, Deserialize)]
struct RecipeResponse {
    recipes: Vec<Recipe>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    detail: String,
}

/// Source of recipe ideas for a set of ingredients
#[async_trait]
pub trait RecipeSource: Send + Sync {
    async fn suggest(&self, ingredients: &[String]) -> Result<Vec<Recipe>, RecipeError>;
}

/// Trim, lower-case and drop blank ingredient names
///
/// Order is preserved and repeats are removed.
pub fn clean_ingredients<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(raw.len());
    for ingredient in raw {
        let normalized = ingredient.as_ref().trim().to_lowercase();
        if !normalized.is_empty() && !cleaned.contains(&normalized) {
            cleaned.push(normalized);
        }
    }
    cleaned
}

/// HTTP client for the recipe service
pub struct RecipeClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl RecipeClient {
    pub fn new(base_url: String, request_timeout: Duration) -> Result<Self, RecipeError> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Whether the service answers its health endpoint
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        matches!(
            self.http_client.get(&url).send().await,
            Ok(resp) if resp.status().is_success()
        )
    }
}

#[async_trait]
impl RecipeSource for RecipeClient {
    async fn suggest(&self, ingredients: &[String]) -> Result<Vec<Recipe>, RecipeError> {
        let cleaned = clean_ingredients(ingredients);
        if cleaned.is_empty() {
            return Err(RecipeError::NoIngredients);
        }

        let url = format!("{}/generate-recipes", self.base_url);
        debug!(count = cleaned.len(), "Requesting recipe suggestions");

        let response = self
            .http_client
            .post(&url)
            .json(&RecipeRequest {
                ingredients: &cleaned,
            })
            .send()
            .instrument(external_api_span("POST", &url, "recipe-service"))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ServiceErrorBody>()
                .await
                .map(|body| body.detail)
                .unwrap_or_else(|_| status.to_string());
            return Err(RecipeError::Service {
                status: status.as_u16(),
                detail,
            });
        }

        let body: RecipeResponse = response.json().await?;
        Ok(body.recipes)
    }
}
