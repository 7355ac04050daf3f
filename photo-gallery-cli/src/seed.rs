use std::path::Path;

use anyhow::{Context, Result};
use photo_gallery::db::photos::PhotoProvider;
use photo_gallery::models::photos::NewPhoto;

const SAMPLE_PHOTOS: &str = include_str!("../seed/photos.json");

/// The sample photos shipped with the gallery.
pub fn sample_photos() -> Result<Vec<NewPhoto>> {
    serde_json::from_str(SAMPLE_PHOTOS).context("built-in sample photos are invalid")
}

/// Reads a JSON array of photos from `path`.
pub fn read_photos(path: &Path) -> Result<Vec<NewPhoto>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("couldn't read seed file {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("couldn't parse seed file {}", path.display()))
}

/// Inserts `photos` unless the gallery already holds any photo.
///
/// Returns the number of inserted photos.
pub async fn seed<P>(provider: &mut P, photos: &[NewPhoto]) -> Result<usize>
where
    P: PhotoProvider + Send + ?Sized,
{
    let existing = provider.count_photos().await?;
    if existing > 0 {
        log::info!("Database already seeded with {} photos", existing);
        return Ok(0);
    }

    for photo in photos {
        provider
            .insert_photo(photo)
            .await
            .with_context(|| format!("couldn't insert {}", photo.filename))?;
    }

    log::info!("Seeded database with {} photos", photos.len());
    Ok(photos.len())
}
