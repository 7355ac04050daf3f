//! Request-facing retrieval of photos.
//!
//! Sits between the web handlers and [`PhotoProvider`]: validates photo
//! identifiers before they reach storage and turns a missing photo into a
//! [`Detail::NotFound`] value instead of an error.

use serde::Serialize;
use thiserror::Error;

use crate::db::photos::PhotoProvider;
use crate::models::photos::{Photo, PhotoId};

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid photo id {0:?}")]
pub struct InvalidPhotoId(pub String);

#[derive(Debug, PartialEq, Serialize)]
pub struct PhotoDetail {
    pub photo: Photo,
    pub previous_id: Option<PhotoId>,
    pub next_id: Option<PhotoId>,
}

#[derive(Debug, PartialEq)]
pub enum Detail {
    Found(PhotoDetail),
    NotFound(PhotoId),
}

/// Parses a positive decimal photo id. Signs, whitespace and zero are rejected.
pub fn parse_photo_id(raw: &str) -> Result<PhotoId, InvalidPhotoId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidPhotoId(raw.to_string()));
    }

    match raw.parse::<PhotoId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(InvalidPhotoId(raw.to_string())),
    }
}

pub async fn get_gallery<P>(provider: &mut P) -> Result<Vec<Photo>, sqlx::Error>
where
    P: PhotoProvider + Send + ?Sized,
{
    provider.list_photos().await
}

pub async fn get_detail<P>(provider: &mut P, photo_id: PhotoId) -> Result<Detail, sqlx::Error>
where
    P: PhotoProvider + Send + ?Sized,
{
    let photo = match provider.get_photo_by_id(photo_id).await? {
        Some(photo) => photo,
        None => {
            tracing::debug!(photo_id, "photo not found");
            return Ok(Detail::NotFound(photo_id));
        },
    };

    let (previous_id, next_id) = provider.get_photo_neighbour_ids(photo_id).await?;

    Ok(Detail::Found(PhotoDetail {
        photo,
        previous_id,
        next_id,
    }))
}
