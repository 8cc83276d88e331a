use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::member::Member;
use crate::domain::value_objects::MemberId;
use crate::ports::member_repository::{MemberRepository as MemberRepositoryTrait, Result};

/// MemberRepositoryのPostgreSQL実装
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// PostgreSQLコネクションプールから新しいMemberRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepositoryTrait for MemberRepository {
    async fn find_by_id(&self, member_id: &MemberId) -> Result<Option<Member>> {
        let row = sqlx::query("SELECT id, name FROM members WHERE id = $1")
            .bind(member_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Member {
            id: MemberId::new(row.get::<String, _>("id")),
            name: row.get("name"),
        }))
    }

    async fn exists_by_id(&self, member_id: &MemberId) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)")
            .bind(member_id.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<bool, _>(0))
    }

    async fn save(&self, member: Member) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO members (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id)
            DO UPDATE SET name = EXCLUDED.name
            "#,
        )
        .bind(member.id.as_str())
        .bind(&member.name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, member_id: &MemberId) -> Result<()> {
        sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(member_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query("SELECT id, name FROM members ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| Member {
                id: MemberId::new(row.get::<String, _>("id")),
                name: row.get("name"),
            })
            .collect())
    }
}
