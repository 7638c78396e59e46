use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::ranking::RankingEntryDto;
use crate::error::{Result, StorageError};
use crate::models::Ranking;

/// Repository for per-judge top-3 assignments
pub struct RankingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RankingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, category_id: Uuid, judge_id: Uuid) -> Result<Vec<Ranking>> {
        let rankings = sqlx::query_as::<_, Ranking>(
            r#"
            SELECT category_id, judge_id, rank, submission_id, created_at
            FROM rankings
            WHERE category_id = $1 AND judge_id = $2
            ORDER BY rank
            "#,
        )
        .bind(category_id)
        .bind(judge_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rankings)
    }

    /// Replace the whole assignment in one transaction.
    ///
    /// Readers see either the previous assignment or the new one, never a mix.
    /// Every submission must belong to `category_id`, otherwise nothing is written.
    pub async fn replace_all(
        &self,
        category_id: Uuid,
        judge_id: Uuid,
        entries: &[RankingEntryDto],
    ) -> Result<Vec<Ranking>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM rankings
            WHERE category_id = $1 AND judge_id = $2
            "#,
        )
        .bind(category_id)
        .bind(judge_id)
        .execute(&mut *tx)
        .await?;

        let mut saved = Vec::with_capacity(entries.len());
        for entry in entries {
            let ranking = sqlx::query_as::<_, Ranking>(
                r#"
                INSERT INTO rankings (category_id, judge_id, rank, submission_id)
                SELECT s.category_id, $2, $3, s.submission_id
                FROM submissions s
                WHERE s.submission_id = $4 AND s.category_id = $1
                RETURNING category_id, judge_id, rank, submission_id, created_at
                "#,
            )
            .bind(category_id)
            .bind(judge_id)
            .bind(entry.rank)
            .bind(entry.submission_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StorageError::from(e).on_constraint("Duplicate rank or submission"))?
            .ok_or(StorageError::NotFound)?;

            saved.push(ranking);
        }

        tx.commit().await?;

        tracing::info!(
            %category_id,
            %judge_id,
            entries = saved.len(),
            "Rankings replaced"
        );

        Ok(saved)
    }
}
