use async_trait::async_trait;
use serde_json::{Map, Value};

mod client;
mod error;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::{ApiError, GENERIC_ERROR_MESSAGE};

use crate::models::{LoginDetails, ProfileUpdate, RegistrationDetails};

pub type ApiResult = Result<Value, ApiError>;

/// One method per capability of the remote movie API. Response bodies are passed
/// through untyped.
#[async_trait]
pub trait MovieApi: Send + Sync {
    async fn register_user(&self, details: &RegistrationDetails) -> ApiResult;
    async fn login(&self, details: &LoginDetails) -> ApiResult;
    async fn list_movies(&self) -> ApiResult;
    async fn get_movie(&self, title: &str) -> ApiResult;
    async fn get_director(&self, name: &str) -> ApiResult;
    async fn get_genre(&self, genre: &str) -> ApiResult;
    async fn get_user(&self) -> ApiResult;
    async fn get_favorites(&self) -> ApiResult;
    async fn add_favorite(&self, movie_id: &str) -> ApiResult;
    async fn remove_favorite(&self, movie_id: &str) -> ApiResult;
    async fn update_user(&self, username: &str, profile: &ProfileUpdate) -> ApiResult;
    async fn delete_user(&self) -> ApiResult;
}

/// Falsy bodies (`null`, `false`, `0`, `""`) become an empty object; anything else is
/// returned as-is.
pub fn extract_response_data(body: Value) -> Value {
    let falsy = match &body {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    };
    if falsy {
        Value::Object(Map::new())
    } else {
        body
    }
}
