use serde::{Deserialize, Serialize};

pub type PhotoId = i64;

/// Directory under the static root that holds the image files.
pub const IMAGES_DIR: &str = "images";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Photo {
    pub id: PhotoId,
    pub filename: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub taken_timestamp: Option<String>,
    pub tags: Vec<String>,
    /// Path of the image relative to the static root.
    pub image_path: String,
}

/// Everything needed to insert a photo. The id is assigned by the database.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewPhoto {
    pub filename: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub taken_timestamp: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub fn image_path(filename: &str) -> String {
    format!("{}/{}", IMAGES_DIR, filename)
}

/// Drops repeated labels, keeping the first occurrence of each.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !unique.contains(&tag) {
            unique.push(tag);
        }
    }
    unique
}

impl From<crate::db::photos::Photo> for Photo {
    fn from(p: crate::db::photos::Photo) -> Self {
        let tags = match serde_json::from_str::<Vec<String>>(&p.tags) {
            Ok(tags) => dedup_tags(tags),
            Err(err) => {
                tracing::warn!(photo_id = p.id, "ignoring malformed tags: {}", err);
                Vec::new()
            },
        };

        Photo {
            id: p.id,
            image_path: image_path(&p.filename),
            filename: p.filename,
            title: p.title,
            description: p.description,
            location: p.location,
            taken_timestamp: p.taken_timestamp,
            tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tags: &str) -> crate::db::photos::Photo {
        crate::db::photos::Photo {
            id: 7,
            filename: "lake.jpg".to_string(),
            title: "Lake".to_string(),
            description: None,
            location: Some("Lake Tahoe".to_string()),
            taken_timestamp: None,
            tags: tags.to_string(),
        }
    }

    #[test]
    fn conversion_builds_image_path() {
        let photo = Photo::from(row("[]"));
        assert_eq!(photo.image_path, "images/lake.jpg");
        assert_eq!(photo.location.as_deref(), Some("Lake Tahoe"));
    }

    #[test]
    fn conversion_removes_duplicate_tags() {
        let photo = Photo::from(row(r#"["water","nature","water"]"#));
        assert_eq!(photo.tags, vec!["water", "nature"]);
    }

    #[test]
    fn malformed_tags_load_as_empty() {
        let photo = Photo::from(row("water, nature"));
        assert!(photo.tags.is_empty());
    }

    #[test]
    fn new_photo_optional_fields_default() {
        let new: NewPhoto =
            serde_json::from_str(r#"{"filename": "a.jpg", "title": "A"}"#).unwrap();
        assert_eq!(new.description, None);
        assert!(new.tags.is_empty());
    }
}
