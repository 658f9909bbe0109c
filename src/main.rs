use anyhow::{bail, Context, Result};
use cinecatalog::api::{ApiClient, MovieApi};
use cinecatalog::catalog::CatalogScreen;
use cinecatalog::dialog::{DetailKind, DetailPanel, DetailPresenter, DialogRequest};
use cinecatalog::models::{LoginDetails, ProfileUpdate, RegistrationDetails};
use cinecatalog::session::{Credentials, FileSessionStore, SessionStore};
use dotenvy::dotenv;
use serde_json::Value;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: cinecatalog <command> [args]
  register <username> <password> <email> [birthday]
  login <username> <password>
  logout
  movies | movie <title> | director <name> | genre <name>
  user | favorites | add <movieId> | remove <movieId>
  update-user <username> key=value...   (username, password, email, birthday)
  delete-user
  browse
  details <title> <director|genre|synopsis>";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

struct ConsolePresenter;

impl DetailPresenter for ConsolePresenter {
    fn open(&self, request: DialogRequest) {
        match serde_json::to_string_pretty(&request.data) {
            Ok(body) => println!("[{:?} | {}]\n{}", request.data.kind(), request.width, body),
            Err(e) => warn!("Failed to render detail panel: {}", e),
        }
    }
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing <{}>\n{}", name, USAGE))
}

fn parse_profile_update(pairs: &[String]) -> Result<ProfileUpdate> {
    let mut update = ProfileUpdate::default();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("expected key=value, got '{}'", pair))?;
        let value = Some(value.to_string());
        match key.to_lowercase().as_str() {
            "username" => update.username = value,
            "password" => update.password = value,
            "email" => update.email = value,
            "birthday" => update.birthday = value,
            other => bail!("unknown profile field '{}'", other),
        }
    }
    if update.is_empty() {
        bail!("update-user needs at least one key=value pair");
    }
    Ok(update)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn browse(api: Arc<dyn MovieApi>) {
    let screen = CatalogScreen::new(api, Arc::new(ConsolePresenter));
    screen.init().await;
    let movies = screen.movies();
    for movie in movies.as_array().into_iter().flatten() {
        let id = movie.get("_id").and_then(|v| v.as_str()).unwrap_or_default();
        let title = movie.get("Title").and_then(|v| v.as_str()).unwrap_or("(untitled)");
        let marker = if screen.is_favorite(id) { "*" } else { " " };
        println!("{} {} [{}]", marker, title, id);
    }
}

async fn details(api: Arc<dyn MovieApi>, title: &str, kind: DetailKind) -> Result<()> {
    let movie = api.get_movie(title).await?;
    let panel = DetailPanel::from_movie(kind, &movie)
        .with_context(|| format!("'{}' has no {:?} details", title, kind))?;
    CatalogScreen::new(api, Arc::new(ConsolePresenter)).open_dialog(panel);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    match dotenv() {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let Some(command) = args.get(1) else {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    };

    let store = Arc::new(FileSessionStore::from_env());
    let session: Arc<dyn SessionStore> = store.clone();
    let client = ApiClient::from_env(session.clone())?;
    info!("Using movie API at {}", client.base_url());
    let api: Arc<dyn MovieApi> = Arc::new(client);

    match command.as_str() {
        "register" => {
            let details = RegistrationDetails {
                username: arg(&args, 2, "username")?.to_string(),
                password: arg(&args, 3, "password")?.to_string(),
                email: arg(&args, 4, "email")?.to_string(),
                birthday: args.get(5).cloned(),
            };
            print_json(&api.register_user(&details).await?)?;
        }
        "login" => {
            let details = LoginDetails {
                username: arg(&args, 2, "username")?.to_string(),
                password: arg(&args, 3, "password")?.to_string(),
            };
            let response = api.login(&details).await?;
            let credentials = Credentials::from_login_response(&response)
                .context("login response did not include a token and username")?;
            session.save(&credentials)?;
            info!(
                "Logged in as {} (session stored in {:?})",
                credentials.user().unwrap_or_default(),
                store.path()
            );
        }
        "logout" => {
            session.clear()?;
            info!("Session cleared");
        }
        "movies" => print_json(&api.list_movies().await?)?,
        "movie" => print_json(&api.get_movie(arg(&args, 2, "title")?).await?)?,
        "director" => print_json(&api.get_director(arg(&args, 2, "name")?).await?)?,
        "genre" => print_json(&api.get_genre(arg(&args, 2, "name")?).await?)?,
        "user" => print_json(&api.get_user().await?)?,
        "favorites" => print_json(&api.get_favorites().await?)?,
        "add" => print_json(&api.add_favorite(arg(&args, 2, "movieId")?).await?)?,
        "remove" => print_json(&api.remove_favorite(arg(&args, 2, "movieId")?).await?)?,
        "update-user" => {
            let username = arg(&args, 2, "username")?;
            let update = parse_profile_update(&args[3..])?;
            print_json(&api.update_user(username, &update).await?)?;
        }
        "delete-user" => {
            print_json(&api.delete_user().await?)?;
            session.clear()?;
        }
        "browse" => browse(api).await,
        "details" => {
            let title = arg(&args, 2, "title")?;
            let kind: DetailKind = arg(&args, 3, "director|genre|synopsis")?.parse()?;
            details(api, title, kind).await?;
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }
    Ok(())
}
