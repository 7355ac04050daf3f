use anyhow::{Context, Result};
use structopt::StructOpt;

use photo_gallery::db::SqlitePool;
use photo_gallery_cli::{scan, seed};

#[derive(StructOpt)]
struct SharedDatabaseArgs {
    /// SQLite database url.
    #[structopt(
        long,
        default_value = "sqlite://gallery.db",
        env = "DATABASE_URL",
        hide_env_values = true
    )]
    database_url: String,
}

#[derive(StructOpt)]
pub struct SeedArgs {
    #[structopt(flatten)]
    database_arguments: SharedDatabaseArgs,

    /// JSON file with the photos to insert instead of the built-in samples.
    #[structopt(long, parse(from_os_str))]
    file: Option<std::path::PathBuf>,
}

#[derive(StructOpt)]
pub struct ScanArgs {
    #[structopt(flatten)]
    database_arguments: SharedDatabaseArgs,

    /// Directory holding the gallery images.
    #[structopt(
        long,
        parse(from_os_str),
        default_value = "./static/images",
        env = "PHOTO_GALLERY_IMAGES_DIR"
    )]
    images_dir: std::path::PathBuf,
}

#[derive(StructOpt)]
pub enum Command {
    /// Insert sample photos into an empty gallery.
    Seed(SeedArgs),
    /// Synchronise the gallery with the images directory.
    Scan(ScanArgs),
}

async fn open_database(args: &SharedDatabaseArgs) -> Result<SqlitePool> {
    let pool = photo_gallery::db::get_pool(&args.database_url)
        .await
        .context("couldn't open database")?;
    photo_gallery::db::migrate(&pool)
        .await
        .context("couldn't migrate database")?;
    Ok(pool)
}

async fn seed_photos(args: SeedArgs) -> Result<()> {
    let photos = match &args.file {
        Some(path) => seed::read_photos(path)?,
        None => seed::sample_photos()?,
    };

    let pool = open_database(&args.database_arguments).await?;
    let mut trans = pool.begin().await?;
    seed::seed(&mut *trans, &photos).await?;
    trans.commit().await?;

    Ok(())
}

async fn scan_photos(args: ScanArgs) -> Result<()> {
    let pool = open_database(&args.database_arguments).await?;
    let mut trans = pool.begin().await?;
    let report = scan::sync_directory(&mut *trans, &args.images_dir).await?;
    trans.commit().await?;

    log::info!(
        "Scanned {}: {} added, {} removed",
        args.images_dir.display(),
        report.added,
        report.removed
    );

    Ok(())
}

#[async_std::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    match Command::from_args() {
        Command::Seed(args) => seed_photos(args).await,
        Command::Scan(args) => scan_photos(args).await,
    }
}
