//! Detail panels (director, genre, synopsis) handed to an opaque presenter.
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

pub const DIALOG_WIDTH: &str = "500px";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailKind {
    Director,
    Genre,
    Synopsis,
}

impl FromStr for DetailKind {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "director" => Ok(DetailKind::Director),
            "genre" => Ok(DetailKind::Genre),
            "synopsis" => Ok(DetailKind::Synopsis),
            _ => Err(anyhow::anyhow!(
                "detail kind must be 'director', 'genre' or 'synopsis'"
            )),
        }
    }
}

/// Payload of a detail dialog. Serializes to the field names the dialogs bind to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DetailPanel {
    Director {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Bio")]
        bio: String,
        #[serde(rename = "Birth")]
        birth: String,
    },
    Genre {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Description")]
        description: String,
    },
    Synopsis {
        #[serde(rename = "Title")]
        title: String,
        #[serde(rename = "Description")]
        description: String,
    },
}

impl DetailPanel {
    pub fn kind(&self) -> DetailKind {
        match self {
            DetailPanel::Director { .. } => DetailKind::Director,
            DetailPanel::Genre { .. } => DetailKind::Genre,
            DetailPanel::Synopsis { .. } => DetailKind::Synopsis,
        }
    }

    /// Builds the panel a movie card would open for `kind`. Missing text fields become
    /// empty strings; a missing `Director`/`Genre` object yields `None`.
    pub fn from_movie(kind: DetailKind, movie: &Value) -> Option<Self> {
        let text = |v: &Value, key: &str| {
            v.get(key)
                .and_then(|s| s.as_str())
                .unwrap_or_default()
                .to_string()
        };
        match kind {
            DetailKind::Director => {
                let director = movie.get("Director").filter(|d| d.is_object())?;
                Some(DetailPanel::Director {
                    name: text(director, "Name"),
                    bio: text(director, "Bio"),
                    birth: text(director, "Birth"),
                })
            }
            DetailKind::Genre => {
                let genre = movie.get("Genre").filter(|g| g.is_object())?;
                Some(DetailPanel::Genre {
                    name: text(genre, "Name"),
                    description: text(genre, "Description"),
                })
            }
            DetailKind::Synopsis => Some(DetailPanel::Synopsis {
                title: text(movie, "Title"),
                description: text(movie, "Description"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogRequest {
    pub data: DetailPanel,
    pub width: String,
}

impl DialogRequest {
    pub fn new(data: DetailPanel) -> Self {
        Self {
            data,
            width: DIALOG_WIDTH.to_string(),
        }
    }
}

/// Shows a detail dialog. Implementations own all rendering.
pub trait DetailPresenter: Send + Sync {
    fn open(&self, request: DialogRequest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn panels_serialize_to_dialog_field_names() {
        let director = DetailPanel::Director {
            name: "Ridley Scott".to_string(),
            bio: "English filmmaker".to_string(),
            birth: "1937".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&director).unwrap(),
            json!({ "Name": "Ridley Scott", "Bio": "English filmmaker", "Birth": "1937" })
        );

        let genre = DetailPanel::Genre {
            name: "Horror".to_string(),
            description: "Scary".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&genre).unwrap(),
            json!({ "Name": "Horror", "Description": "Scary" })
        );

        let request = DialogRequest::new(DetailPanel::Synopsis {
            title: "Alien".to_string(),
            description: "In space no one can hear you scream.".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "data": { "Title": "Alien", "Description": "In space no one can hear you scream." },
                "width": "500px"
            })
        );
    }

    #[test]
    fn builds_panels_from_movie_record() {
        let movie = json!({
            "_id": "42",
            "Title": "Alien",
            "Description": "A crew meets a creature.",
            "Director": { "Name": "Ridley Scott", "Bio": "English filmmaker" },
            "Genre": { "Name": "Horror", "Description": "Scary" }
        });

        let director = DetailPanel::from_movie(DetailKind::Director, &movie).unwrap();
        assert_eq!(
            director,
            DetailPanel::Director {
                name: "Ridley Scott".to_string(),
                bio: "English filmmaker".to_string(),
                birth: String::new(),
            }
        );
        assert_eq!(director.kind(), DetailKind::Director);

        let synopsis = DetailPanel::from_movie(DetailKind::Synopsis, &movie).unwrap();
        assert_eq!(synopsis.kind(), DetailKind::Synopsis);

        let bare = json!({ "Title": "Untitled" });
        assert!(DetailPanel::from_movie(DetailKind::Genre, &bare).is_none());
        assert!(DetailPanel::from_movie(DetailKind::Director, &bare).is_none());
    }

    #[test]
    fn parses_detail_kind() {
        assert_eq!("Director".parse::<DetailKind>().unwrap(), DetailKind::Director);
        assert_eq!("genre".parse::<DetailKind>().unwrap(), DetailKind::Genre);
        assert!("cast".parse::<DetailKind>().is_err());
    }
}
