use std::path::Path;
use std::sync::Arc;

use structopt::StructOpt;

pub mod db;
pub mod gallery;
pub mod models;
pub mod telemetry;
pub mod web;

#[derive(Clone, Debug)]
pub struct State {
    pub args: Arc<Args>,
    pub db: db::SqlitePool,
    pub tera: Arc<tera::Tera>,
    pub cache_busting_string: Option<String>,
}

#[derive(Debug)]
pub enum Error {
    DatabaseError(db::Error),
    TemplateParseError(tera::Error),
    TelemetryInitError(anyhow::Error),
    StaticPathError(std::io::Error),
    ListenError(std::io::Error),
    CacheBusterError(std::io::Error),
}

impl From<Error> for u8 {
    fn from(error: Error) -> u8 {
        match error {
            Error::DatabaseError(_) => 2,
            Error::TemplateParseError(_) => 3,
            Error::TelemetryInitError(_) => 4,
            Error::StaticPathError(_) => 5,
            Error::ListenError(_) => 6,
            Error::CacheBusterError(_) => 7,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DatabaseError(err) => {
                write!(f, "Database error: {}", err)?;
                if let Some(source) = std::error::Error::source(err) {
                    write!(f, ": {}", source)?;
                }
                Ok(())
            },
            Error::TemplateParseError(err) => {
                write!(f, "Template parsing error: {}", err)
            },
            Error::TelemetryInitError(err) => {
                write!(f, "Failed to init telemetry: {}", err)
            },
            Error::StaticPathError(err) => {
                write!(f, "Could not serve static files: {}", err)
            },
            Error::ListenError(err) => {
                write!(f, "Failed to start HTTP server: {}", err)
            },
            Error::CacheBusterError(err) => {
                write!(f, "Could not read cache busting string: {}", err)
            },
        }
    }
}

fn parse_base_url(src: &str) -> Result<String, url::ParseError> {
    let url = url::Url::parse(src)?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[derive(Debug, StructOpt)]
pub struct Args {
    /// Host address to bind to.
    #[structopt(long, default_value = "localhost", env = "PHOTO_GALLERY_BIND_ADDRESS")]
    pub address: String,
    /// Port to bind to.
    #[structopt(long, default_value = "8166", env = "PHOTO_GALLERY_BIND_PORT")]
    pub port: u16,

    /// SQLite database url.
    #[structopt(
        long,
        default_value = "sqlite://gallery.db",
        env = "DATABASE_URL",
        hide_env_values = true
    )]
    pub database_url: String,

    /// Gallery base URL, used for canonical links and the sitemap.
    #[structopt(
        long,
        default_value = "http://localhost:8166",
        parse(try_from_str = parse_base_url),
        env = "PHOTO_GALLERY_BASE_URL"
    )]
    pub base_url: String,

    /// Path to Tera templates directory
    #[structopt(
        long,
        parse(from_os_str),
        default_value = "./templates",
        env = "PHOTO_GALLERY_TEMPLATE_PATH"
    )]
    pub template_path: std::path::PathBuf,

    /// Path to the static files directory, served under /static
    #[structopt(
        long,
        parse(from_os_str),
        default_value = "./static",
        env = "PHOTO_GALLERY_STATIC_PATH"
    )]
    pub static_path: std::path::PathBuf,
}

/// Loads every `.html` template below `template_path`.
pub fn load_templates(template_path: &Path) -> Result<tera::Tera, Error> {
    let glob = template_path.join("**").join("*.html");
    tera::Tera::new(&glob.to_string_lossy()).map_err(Error::TemplateParseError)
}

/// Reads the first word of `<template_path>/cache-buster`, if the file exists.
pub fn load_cache_busting_string(template_path: &Path) -> Result<Option<String>, Error> {
    match std::fs::read_to_string(template_path.join("cache-buster")) {
        Ok(data) => Ok(data.split_whitespace().next().map(|s| s.to_string())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(Error::CacheBusterError(err)),
    }
}

/// Builds the server with every route mounted.
pub fn app(state: State) -> Result<tide::Server<State>, Error> {
    let static_path = state.args.static_path.clone();
    let mut app = tide::with_state(state);

    web::mount(&mut app);
    app.at("/static")
        .serve_dir(&static_path)
        .map_err(Error::StaticPathError)?;

    Ok(app)
}

pub async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    let args = Arc::new(Args::from_args());

    telemetry::init().map_err(Error::TelemetryInitError)?;

    let pool = db::get_pool(&args.database_url)
        .await
        .map_err(Error::DatabaseError)?;
    db::migrate(&pool).await.map_err(Error::DatabaseError)?;

    let tera = load_templates(&args.template_path)?;
    let cache_busting_string = load_cache_busting_string(&args.template_path)?;

    let state = State {
        args: args.clone(),
        db: pool,
        tera: Arc::new(tera),
        cache_busting_string,
    };
    let app = app(state)?;

    tracing::info!(address = %args.address, port = args.port, "starting photo gallery");
    let address: &str = args.address.as_ref();
    app.listen((address, args.port))
        .await
        .map_err(Error::ListenError)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_trailing_slash() {
        assert_eq!(
            parse_base_url("https://photos.example.com/").unwrap(),
            "https://photos.example.com"
        );
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn args_fall_back_to_defaults() {
        let args = Args::from_iter_safe(["photo-gallery", "--database-url", "sqlite::memory:"])
            .unwrap();
        assert_eq!(args.database_url, "sqlite::memory:");
        assert_eq!(args.template_path, std::path::PathBuf::from("./templates"));
    }

    #[test]
    fn cache_buster_is_optional_but_must_be_readable() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_cache_busting_string(dir.path()).unwrap(), None);

        std::fs::write(dir.path().join("cache-buster"), "abc123\nignored\n").unwrap();
        assert_eq!(
            load_cache_busting_string(dir.path()).unwrap(),
            Some("abc123".to_string())
        );

        std::fs::remove_file(dir.path().join("cache-buster")).unwrap();
        std::fs::create_dir(dir.path().join("cache-buster")).unwrap();
        assert!(matches!(
            load_cache_busting_string(dir.path()),
            Err(Error::CacheBusterError(_))
        ));
    }

    #[test]
    fn templates_in_repository_parse() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        let tera = load_templates(&path).unwrap();
        let names: Vec<_> = tera.get_template_names().collect();
        assert!(names.contains(&"gallery.html"));
        assert!(names.contains(&"partials/photo_detail.html"));
    }
}
