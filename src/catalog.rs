//! The catalog screen: owns the fetched movies and favorites and mediates user actions.
//!
//! Both collections are replaced wholesale by whichever fetch for them completes last.
//! Responses are not versioned, so a slow stale response can overwrite a newer one.
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use crate::api::MovieApi;
use crate::dialog::{DetailPanel, DetailPresenter, DialogRequest};

pub struct CatalogScreen {
    api: Arc<dyn MovieApi>,
    presenter: Arc<dyn DetailPresenter>,
    movies: Mutex<Value>,
    favorites: Mutex<Value>,
}

fn replace(slot: &Mutex<Value>, value: Value) {
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = value;
}

fn snapshot(slot: &Mutex<Value>) -> Value {
    slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

impl CatalogScreen {
    pub fn new(api: Arc<dyn MovieApi>, presenter: Arc<dyn DetailPresenter>) -> Self {
        Self {
            api,
            presenter,
            movies: Mutex::new(Value::Array(Vec::new())),
            favorites: Mutex::new(Value::Array(Vec::new())),
        }
    }

    /// Fetches movies and favorites concurrently. Each fetch assigns its own collection;
    /// a failure in one leaves the other unaffected.
    pub async fn init(&self) {
        tokio::join!(self.load_movies(), self.load_favorites());
    }

    pub async fn load_movies(&self) {
        match self.api.list_movies().await {
            Ok(movies) => {
                info!(
                    count = ?movies.as_array().map(Vec::len),
                    "Movies refreshed"
                );
                replace(&self.movies, movies);
            }
            Err(e) => warn!("Keeping previous movies: {}", e),
        }
    }

    pub async fn load_favorites(&self) {
        match self.api.get_favorites().await {
            Ok(favorites) => {
                info!(
                    count = ?favorites.as_array().map(Vec::len),
                    "Favorites refreshed"
                );
                replace(&self.favorites, favorites);
            }
            Err(e) => warn!("Keeping previous favorites: {}", e),
        }
    }

    pub fn movies(&self) -> Value {
        snapshot(&self.movies)
    }

    pub fn favorites(&self) -> Value {
        snapshot(&self.favorites)
    }

    /// True iff `id` is in the last successfully fetched favorites.
    pub fn is_favorite(&self, id: &str) -> bool {
        let favorites = self.favorites.lock().unwrap_or_else(PoisonError::into_inner);
        favorites
            .as_array()
            .is_some_and(|ids| ids.iter().any(|v| v.as_str() == Some(id)))
    }

    /// Adds the movie remotely, then refetches everything. Failures are only logged.
    pub async fn add_to_favorites(&self, id: &str) {
        debug!(movie_id = id, "Adding favorite");
        match self.api.add_favorite(id).await {
            Ok(result) => {
                debug!("Favorite added: {}", result);
                self.init().await;
            }
            Err(e) => warn!(movie_id = id, "Failed to add favorite: {}", e),
        }
    }

    pub async fn remove_from_favorites(&self, id: &str) {
        debug!(movie_id = id, "Removing favorite");
        match self.api.remove_favorite(id).await {
            Ok(result) => {
                debug!("Favorite removed: {}", result);
                self.init().await;
            }
            Err(e) => warn!(movie_id = id, "Failed to remove favorite: {}", e),
        }
    }

    pub fn open_dialog(&self, panel: DetailPanel) {
        debug!(kind = ?panel.kind(), "Opening detail dialog");
        self.presenter.open(DialogRequest::new(panel));
    }

    pub fn open_director_dialog(&self, name: &str, bio: &str, birth: &str) {
        self.open_dialog(DetailPanel::Director {
            name: name.to_string(),
            bio: bio.to_string(),
            birth: birth.to_string(),
        });
    }

    pub fn open_genre_dialog(&self, name: &str, description: &str) {
        self.open_dialog(DetailPanel::Genre {
            name: name.to_string(),
            description: description.to_string(),
        });
    }

    pub fn open_synopsis_dialog(&self, title: &str, description: &str) {
        self.open_dialog(DetailPanel::Synopsis {
            title: title.to_string(),
            description: description.to_string(),
        });
    }
}
