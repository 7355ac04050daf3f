use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use photo_gallery::db::photos::PhotoProvider;
use photo_gallery::models::photos::NewPhoto;

pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub added: usize,
    pub removed: usize,
}

pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => SUPPORTED_EXTENSIONS
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Upper-cases every letter that follows a non-letter and lower-cases the rest.
fn title_case(text: &str) -> String {
    let mut after_letter = false;
    let mut title = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphabetic() {
            if after_letter {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            title.push(c);
            after_letter = false;
        }
    }
    title
}

/// Turns `my_photo-2024.jpg` into `My Photo 2024`.
pub fn filename_to_title(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();

    let words: Vec<&str> = stem
        .split(|c| c == '_' || c == '-' || c == '.')
        .filter(|word| !word.is_empty())
        .collect();
    let title = title_case(words.join(" ").trim());

    if title.is_empty() {
        filename.to_string()
    } else {
        title
    }
}

/// Names of the supported image files directly inside `dir`, creating the
/// directory if it does not exist yet.
pub fn image_filenames(dir: &Path) -> Result<BTreeSet<String>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("couldn't create images directory {}", dir.display()))?;

    let mut filenames = BTreeSet::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("couldn't read images directory {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() || !is_supported_image(&path) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            filenames.insert(name.to_string());
        }
    }

    Ok(filenames)
}

/// Makes the gallery match the image files in `dir`: new files are added,
/// photos whose file disappeared are removed.
pub async fn sync_directory<P>(provider: &mut P, dir: &Path) -> Result<ScanReport>
where
    P: PhotoProvider + Send + ?Sized,
{
    let on_disk = image_filenames(dir)?;
    let in_db = provider.list_photo_filenames().await?;

    let mut report = ScanReport::default();

    let known: BTreeSet<&str> = in_db.iter().map(|(_, name)| name.as_str()).collect();
    for filename in on_disk.iter().filter(|name| !known.contains(name.as_str())) {
        let photo = NewPhoto {
            filename: filename.clone(),
            title: filename_to_title(filename),
            ..Default::default()
        };
        provider
            .insert_photo(&photo)
            .await
            .with_context(|| format!("couldn't insert {}", filename))?;
        log::debug!("Added {} as {:?}", filename, photo.title);
        report.added += 1;
    }

    for (photo_id, filename) in in_db.iter().filter(|(_, name)| !on_disk.contains(name)) {
        if provider.delete_photo(*photo_id).await? {
            log::debug!("Removed {} ({})", filename, photo_id);
            report.removed += 1;
        }
    }

    if report.added > 0 || report.removed > 0 {
        log::info!(
            "Photo sync: +{} added, -{} removed",
            report.added,
            report.removed
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_from_filenames() {
        assert_eq!(filename_to_title("my_photo_2024.jpg"), "My Photo 2024");
        assert_eq!(filename_to_title("golden-HOUR.v2.png"), "Golden Hour V2");
        assert_eq!(filename_to_title("__.jpg"), "__.jpg");
    }

    #[test]
    fn titles_start_a_word_after_any_non_letter() {
        assert_eq!(filename_to_title("my photo.jpg"), "My Photo");
        assert_eq!(filename_to_title("photo2024abc_x.jpg"), "Photo2024Abc X");
        assert_eq!(filename_to_title("o'neil's_BEACH.jpg"), "O'Neil'S Beach");
    }

    #[test]
    fn supported_extensions_ignore_case() {
        assert!(is_supported_image(Path::new("a.JPG")));
        assert!(is_supported_image(Path::new("a.webp")));
        assert!(!is_supported_image(Path::new("a.txt")));
        assert!(!is_supported_image(Path::new("jpg")));
    }

    #[async_std::test]
    async fn sync_adds_and_removes_photos() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["lake_view.jpg", "Snow-Day.PNG", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let pool = photo_gallery::db::get_pool("sqlite::memory:").await.unwrap();
        photo_gallery::db::migrate(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let report = sync_directory(&mut *conn, dir.path()).await.unwrap();
        assert_eq!(report, ScanReport { added: 2, removed: 0 });

        let titles: Vec<_> = conn
            .list_photos()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Snow Day", "Lake View"]);

        let report = sync_directory(&mut *conn, dir.path()).await.unwrap();
        assert_eq!(report, ScanReport::default());

        std::fs::remove_file(dir.path().join("lake_view.jpg")).unwrap();
        let report = sync_directory(&mut *conn, dir.path()).await.unwrap();
        assert_eq!(report, ScanReport { added: 0, removed: 1 });
        assert_eq!(conn.count_photos().await.unwrap(), 1);
    }

    #[test]
    fn missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("static").join("images");

        assert!(image_filenames(&images).unwrap().is_empty());
        assert!(images.is_dir());
    }
}
