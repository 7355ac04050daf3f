use sqlx::{FromRow, SqliteConnection};

use crate::models;
use crate::models::photos::PhotoId;

/// A row of the `photos` table. Tags are stored as a JSON array.
#[derive(Debug, FromRow)]
pub struct Photo {
    pub id: PhotoId,
    pub filename: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub taken_timestamp: Option<String>,
    pub tags: String,
}

const PHOTO_COLUMNS: &str =
    "id, filename, title, description, location, taken_timestamp, tags";

/// Serialises a JSON column value, reporting failures as a protocol error.
fn encode_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, sqlx::Error> {
    serde_json::to_string(value)
        .map_err(|err| sqlx::Error::Protocol(format!("couldn't encode JSON column: {}", err)))
}

#[async_trait::async_trait]
pub trait PhotoProvider {
    /// All photos in insertion order.
    async fn list_photos(&mut self) -> Result<Vec<models::photos::Photo>, sqlx::Error>;

    async fn list_photo_ids(&mut self) -> Result<Vec<PhotoId>, sqlx::Error>;

    async fn list_photo_filenames(&mut self) -> Result<Vec<(PhotoId, String)>, sqlx::Error>;

    async fn get_photo_by_id(
        &mut self,
        photo_id: PhotoId,
    ) -> Result<Option<models::photos::Photo>, sqlx::Error>;

    /// Ids of the photos listed right before and right after `photo_id`.
    async fn get_photo_neighbour_ids(
        &mut self,
        photo_id: PhotoId,
    ) -> Result<(Option<PhotoId>, Option<PhotoId>), sqlx::Error>;

    async fn count_photos(&mut self) -> Result<i64, sqlx::Error>;

    async fn insert_photo(
        &mut self,
        photo: &models::photos::NewPhoto,
    ) -> Result<PhotoId, sqlx::Error>;

    async fn delete_photo(&mut self, photo_id: PhotoId) -> Result<bool, sqlx::Error>;
}

#[async_trait::async_trait]
impl PhotoProvider for SqliteConnection {
    async fn list_photos(&mut self) -> Result<Vec<models::photos::Photo>, sqlx::Error> {
        let query = format!(
            r#"
                SELECT
                    {}
                FROM
                    photos
                ORDER BY
                    id ASC
            "#,
            PHOTO_COLUMNS,
        );

        let res: Vec<Photo> = sqlx::query_as(&query).fetch_all(self).await?;
        Ok(res.into_iter().map(models::photos::Photo::from).collect())
    }


    async fn list_photo_ids(&mut self) -> Result<Vec<PhotoId>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
                SELECT
                    id
                FROM
                    photos
                ORDER BY
                    id ASC
            "#,
        )
        .fetch_all(self)
        .await
    }


    async fn list_photo_filenames(&mut self) -> Result<Vec<(PhotoId, String)>, sqlx::Error> {
        sqlx::query_as(
            r#"
                SELECT
                    id, filename
                FROM
                    photos
                ORDER BY
                    id ASC
            "#,
        )
        .fetch_all(self)
        .await
    }


    async fn get_photo_by_id(
        &mut self,
        photo_id: PhotoId,
    ) -> Result<Option<models::photos::Photo>, sqlx::Error> {
        let query = format!(
            r#"
                SELECT
                    {}
                FROM
                    photos
                WHERE
                    id = ?
            "#,
            PHOTO_COLUMNS,
        );

        let res: Option<Photo> = sqlx::query_as(&query)
            .bind(photo_id)
            .fetch_optional(self)
            .await?;
        Ok(res.map(models::photos::Photo::from))
    }


    async fn get_photo_neighbour_ids(
        &mut self,
        photo_id: PhotoId,
    ) -> Result<(Option<PhotoId>, Option<PhotoId>), sqlx::Error> {
        let previous: Option<PhotoId> = sqlx::query_scalar(
            r#"
                SELECT
                    id
                FROM
                    photos
                WHERE
                    id < ?
                ORDER BY
                    id DESC
                LIMIT 1
            "#,
        )
        .bind(photo_id)
        .fetch_optional(&mut *self)
        .await?;

        let next: Option<PhotoId> = sqlx::query_scalar(
            r#"
                SELECT
                    id
                FROM
                    photos
                WHERE
                    id > ?
                ORDER BY
                    id ASC
                LIMIT 1
            "#,
        )
        .bind(photo_id)
        .fetch_optional(&mut *self)
        .await?;

        Ok((previous, next))
    }


    async fn count_photos(&mut self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM photos")
            .fetch_one(self)
            .await
    }


    async fn insert_photo(
        &mut self,
        photo: &models::photos::NewPhoto,
    ) -> Result<PhotoId, sqlx::Error> {
        let tags = encode_json(&models::photos::dedup_tags(photo.tags.clone()))?;

        let res = sqlx::query(
            r#"
                INSERT INTO photos
                    (filename, title, description, location, taken_timestamp, tags)
                VALUES
                    (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&photo.filename)
        .bind(&photo.title)
        .bind(&photo.description)
        .bind(&photo.location)
        .bind(&photo.taken_timestamp)
        .bind(tags)
        .execute(self)
        .await?;

        Ok(res.last_insert_rowid())
    }


    async fn delete_photo(&mut self, photo_id: PhotoId) -> Result<bool, sqlx::Error> {
        let res = sqlx::query(
            r#"
                DELETE FROM
                    photos
                WHERE
                    id = ?
            "#,
        )
        .bind(photo_id)
        .execute(self)
        .await?;

        Ok(res.rows_affected() > 0)
    }
}
