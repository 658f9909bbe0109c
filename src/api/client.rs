use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::error::Failure;
use super::{extract_response_data, ApiResult, MovieApi};
use crate::models::{LoginDetails, ProfileUpdate, RegistrationDetails};
use crate::session::{Credentials, SessionStore};

pub const DEFAULT_API_URL: &str = "https://amro-mansour-movie-api.herokuapp.com/";

/// reqwest-backed client for the remote movie API. Credentials are read from the
/// session store on every call.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> Result<Self> {
        let user_agent = format!("cinecatalog/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build movie API HTTP client")?;
        Ok(Self {
            client,
            base_url: format!("{}/", base_url.trim_end_matches('/')),
            session,
        })
    }

    pub fn from_env(session: Arc<dyn SessionStore>) -> Result<Self> {
        let base_url = env::var("MOVIE_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(&base_url, session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Joins percent-encoded path segments onto the base URL.
    fn url(&self, segments: &[&str]) -> String {
        let path = segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Value, Failure> {
        let res = request.send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(Failure::Status { status, body: text });
        }
        Ok(parse_body(&text))
    }

    async fn unauthenticated<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        segments: &[&str],
        body: &B,
    ) -> ApiResult {
        let url = self.url(segments);
        debug!(operation, %url, "sending request");
        let request = self.client.post(url).json(body);
        self.execute(request)
            .await
            .map_err(|f| f.normalize(operation))
    }

    /// Loads a fresh credential snapshot, lets `build` shape the request from it, attaches
    /// the bearer token and unwraps the response body.
    async fn authorized<F>(&self, operation: &str, build: F) -> ApiResult
    where
        F: FnOnce(&Credentials) -> Result<RequestBuilder, Failure>,
    {
        let result = async {
            let credentials = self.session.load().map_err(Failure::SessionStore)?;
            let token = credentials
                .token()
                .ok_or(Failure::Session("token"))?
                .to_string();
            let request = build(&credentials)?.bearer_auth(token);
            debug!(operation, "sending authenticated request");
            self.execute(request).await
        }
        .await;
        result
            .map(extract_response_data)
            .map_err(|f| f.normalize(operation))
    }
}

fn username(credentials: &Credentials) -> Result<&str, Failure> {
    credentials.user().ok_or(Failure::Session("user"))
}

/// Empty bodies read as `null`; text that is not JSON is kept as a JSON string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[async_trait]
impl MovieApi for ApiClient {
    async fn register_user(&self, details: &RegistrationDetails) -> ApiResult {
        self.unauthenticated("register_user", &["users"], details)
            .await
    }

    async fn login(&self, details: &LoginDetails) -> ApiResult {
        self.unauthenticated("login", &["login"], details).await
    }

    async fn list_movies(&self) -> ApiResult {
        self.authorized("list_movies", |_| Ok(self.client.get(self.url(&["movies"]))))
            .await
    }

    async fn get_movie(&self, title: &str) -> ApiResult {
        self.authorized("get_movie", |_| {
            Ok(self.client.get(self.url(&["movies", title])))
        })
        .await
    }

    async fn get_director(&self, name: &str) -> ApiResult {
        self.authorized("get_director", |_| {
            Ok(self.client.get(self.url(&["movies", "directors", name])))
        })
        .await
    }

    async fn get_genre(&self, genre: &str) -> ApiResult {
        self.authorized("get_genre", |_| {
            Ok(self.client.get(self.url(&["movies", "genres", genre])))
        })
        .await
    }

    async fn get_user(&self) -> ApiResult {
        self.authorized("get_user", |credentials| {
            let user = username(credentials)?;
            Ok(self.client.get(self.url(&["users", user])))
        })
        .await
    }

    async fn get_favorites(&self) -> ApiResult {
        self.authorized("get_favorites", |credentials| {
            let user = username(credentials)?;
            Ok(self.client.get(self.url(&["users", user, "movies"])))
        })
        .await
    }

    async fn add_favorite(&self, movie_id: &str) -> ApiResult {
        self.authorized("add_favorite", |credentials| {
            let user = username(credentials)?;
            Ok(self
                .client
                .post(self.url(&["users", user, "movies", movie_id]))
                .json(&json!({ "FavouriteMovies": movie_id })))
        })
        .await
    }

    async fn remove_favorite(&self, movie_id: &str) -> ApiResult {
        self.authorized("remove_favorite", |credentials| {
            let user = username(credentials)?;
            Ok(self
                .client
                .delete(self.url(&["users", user, "movies", movie_id])))
        })
        .await
    }

    async fn update_user(&self, username: &str, profile: &ProfileUpdate) -> ApiResult {
        self.authorized("update_user", |_| {
            Ok(self.client.put(self.url(&["users", username])).json(profile))
        })
        .await
    }

    async fn delete_user(&self) -> ApiResult {
        self.authorized("delete_user", |credentials| {
            let user = username(credentials)?;
            Ok(self.client.delete(self.url(&["users", user])))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Arc::new(MemorySessionStore::default())).expect("client")
    }

    #[test]
    fn normalizes_base_url_to_single_trailing_slash() {
        assert_eq!(client("http://localhost:8080").base_url(), "http://localhost:8080/");
        assert_eq!(client("http://localhost:8080//").base_url(), "http://localhost:8080/");
    }

    #[test]
    fn encodes_each_path_segment() {
        let api = client("http://localhost:8080/");
        assert_eq!(
            api.url(&["movies", "The Matrix"]),
            "http://localhost:8080/movies/The%20Matrix"
        );
        assert_eq!(
            api.url(&["movies", "directors", "AC/DC?x=1#frag"]),
            "http://localhost:8080/movies/directors/AC%2FDC%3Fx%3D1%23frag"
        );
        assert_eq!(api.url(&["users", "neo", "movies"]), "http://localhost:8080/users/neo/movies");
    }

    #[test]
    fn parses_json_text_and_empty_bodies() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("  \n"), Value::Null);
        assert_eq!(parse_body(r#"["1","2"]"#), json!(["1", "2"]));
        assert_eq!(
            parse_body("neo was deleted."),
            Value::String("neo was deleted.".to_string())
        );
    }
}
