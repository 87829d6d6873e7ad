use sqlx::PgPool;

use crate::database::models::{Exhibition, ExhibitionPatch, NewExhibition};
use crate::database::{DatabaseError, DatabaseManager, Repository};
use crate::services::like_pattern;

pub struct ExhibitionService {
    pool: PgPool,
    repo: Repository<Exhibition>,
}

impl ExhibitionService {
    pub async fn new() -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self {
            repo: Repository::new("exhibitions", pool.clone()),
            pool,
        })
    }

    /// Newest first, optionally filtered by a substring of title/description/location
    pub async fn list(&self, q: Option<&str>) -> Result<Vec<Exhibition>, DatabaseError> {
        let rows = sqlx::query_as::<_, Exhibition>(
            "SELECT * FROM exhibitions
             WHERE $1::TEXT IS NULL OR title ILIKE $1 OR description ILIKE $1 OR location ILIKE $1
             ORDER BY id DESC",
        )
        .bind(like_pattern(q))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i64) -> Result<Exhibition, DatabaseError> {
        self.repo.select_404(id, None).await
    }

    pub async fn create(&self, input: NewExhibition) -> Result<Exhibition, DatabaseError> {
        let row = sqlx::query_as::<_, Exhibition>(
            "INSERT INTO exhibitions
                (title, description, location, creator, sponsors, videos, images, start_time, end_time)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(input.title)
        .bind(input.description)
        .bind(input.location)
        .bind(input.creator)
        .bind(input.sponsors)
        .bind(input.videos)
        .bind(input.images)
        .bind(input.start_time)
        .bind(input.end_time)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!("Created exhibition {} ({})", row.id, row.title);
        Ok(row)
    }

    pub async fn update(&self, id: i64, patch: ExhibitionPatch) -> Result<Exhibition, DatabaseError> {
        self.repo.update_404(id, None, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        self.repo.delete_404(id, None).await
    }

    /// Mark active; the touched `updated_at` makes it the current one.
    pub async fn activate(&self, id: i64) -> Result<Exhibition, DatabaseError> {
        sqlx::query_as::<_, Exhibition>(
            "UPDATE exhibitions SET is_active = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("exhibition {} not found", id)))
    }

    /// Most recently updated active exhibition
    pub async fn current(&self) -> Result<Exhibition, DatabaseError> {
        sqlx::query_as::<_, Exhibition>(
            "SELECT * FROM exhibitions WHERE is_active ORDER BY updated_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("no active exhibition".to_string()))
    }
}
