// PostgreSQL repository implementations using sqlx
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use crate::{Result, AppError};
use crate::models::{Post, Tag, User};
use crate::db::repository::{PostRepository, TagRepository, UserRepository};

// PostgreSQL connection pool wrapper
pub struct PostgresDatabase {
    pub pool: Arc<PgPool>,
}

impl PostgresDatabase {
    pub async fn connect(database_url: &str) -> Result<Self> {
        tracing::info!("🔗 DATABASE: Configuring connection pool");
        tracing::info!("   📊 Max connections: 20");
        tracing::info!("   ⏰ Connection timeout: 30s");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(3600))
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await
            .map_err(|e| {
                tracing::error!("❌ DATABASE: Failed to create connection pool: {}", e);
                AppError::DatabaseError(format!("Failed to connect to PostgreSQL: {}", e))
            })?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;
        tracing::info!("✅ DATABASE: Schema is up to date");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    pub fn user_repo(&self) -> PostgresUserRepository {
        PostgresUserRepository { pool: self.pool.clone() }
    }

    pub fn post_repo(&self) -> PostgresPostRepository {
        PostgresPostRepository { pool: self.pool.clone() }
    }

    pub fn tag_repo(&self) -> PostgresTagRepository {
        PostgresTagRepository { pool: self.pool.clone() }
    }
}

/// Wraps a search term for `ILIKE`, escaping the pattern metacharacters.
fn like_pattern(search: Option<&str>) -> Option<String> {
    search.filter(|s| !s.is_empty()).map(|s| {
        let escaped = s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

// PostgreSQL User Repository
pub struct PostgresUserRepository {
    pool: Arc<PgPool>,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, user: &User) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create user: {}", e)))?;

        Ok(row.into())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get user by username: {}", e)))?;

        Ok(row.map(User::from))
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    slug: String,
    body: String,
    author_username: String,
    date_pub: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PostTagRow {
    post_id: Uuid,
    id: Uuid,
    title: String,
    slug: String,
}

#[derive(sqlx::FromRow)]
struct TagRow {
    id: Uuid,
    title: String,
    slug: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Tag { id: row.id, title: row.title, slug: row.slug }
    }
}

// PostgreSQL Post Repository
pub struct PostgresPostRepository {
    pool: Arc<PgPool>,
}

impl PostgresPostRepository {
    /// Loads the tags of every row in one query and assembles the posts.
    async fn attach_tags(&self, rows: Vec<PostRow>) -> Result<Vec<Post>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let tag_rows = sqlx::query_as::<_, PostTagRow>(
            r#"
            SELECT pt.post_id, t.id, t.title, t.slug
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY t.title, t.slug
            "#,
        )
        .bind(&ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to load post tags: {}", e)))?;

        let mut tags_by_post: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in tag_rows {
            tags_by_post.entry(row.post_id).or_default().push(Tag {
                id: row.id,
                title: row.title,
                slug: row.slug,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| Post {
                tags: tags_by_post.remove(&row.id).unwrap_or_default(),
                id: row.id,
                title: row.title,
                slug: row.slug,
                body: row.body,
                author_username: row.author_username,
                date_pub: row.date_pub,
            })
            .collect())
    }

    async fn reload(&self, id: Uuid) -> Result<Post> {
        let row = sqlx::query_as::<_, PostRow>(
            "SELECT id, title, slug, body, author_username, date_pub FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to reload post: {}", e)))?
        .ok_or_else(|| AppError::NotFound("No post found matching the query".to_string()))?;

        let mut posts = self.attach_tags(vec![row]).await?;
        posts
            .pop()
            .ok_or_else(|| AppError::InternalError("Post vanished while loading tags".to_string()))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, post: &Post) -> Result<Post> {
        let mut tx = self.pool.begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to start post transaction: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO posts (id, title, slug, body, author_username, date_pub)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.body)
        .bind(&post.author_username)
        .bind(post.date_pub)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create post: {}", e)))?;

        sqlx::query(
            "INSERT INTO post_tags (post_id, tag_id) SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
        )
        .bind(post.id)
        .bind(post.tag_ids())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to link post tags: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit post: {}", e)))?;

        self.reload(post.id).await
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, slug, body, author_username, date_pub
            FROM posts WHERE LOWER(slug) = LOWER($1)
            "#,
        )
        .bind(slug)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get post by slug: {}", e)))?;

        match row {
            Some(row) => Ok(self.attach_tags(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn count_posts(&self, search: Option<&str>) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM posts
            WHERE ($1::text IS NULL OR title ILIKE $1 OR body ILIKE $1)
            "#,
        )
        .bind(like_pattern(search))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to count posts: {}", e)))?;

        Ok(count.max(0) as u64)
    }

    async fn get_posts_paginated(&self, search: Option<&str>, limit: u32, offset: u32) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, slug, body, author_username, date_pub
            FROM posts
            WHERE ($1::text IS NULL OR title ILIKE $1 OR body ILIKE $1)
            ORDER BY date_pub DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(like_pattern(search))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get posts: {}", e)))?;

        self.attach_tags(rows).await
    }

    async fn get_posts_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT p.id, p.title, p.slug, p.body, p.author_username, p.date_pub
            FROM posts p
            JOIN post_tags pt ON pt.post_id = p.id
            WHERE pt.tag_id = $1
            ORDER BY p.date_pub DESC, p.id DESC
            "#,
        )
        .bind(tag_id)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get posts by tag: {}", e)))?;

        self.attach_tags(rows).await
    }

    async fn update_post(&self, post: &Post) -> Result<Post> {
        let mut tx = self.pool.begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to start post transaction: {}", e)))?;

        let updated = sqlx::query("UPDATE posts SET title = $2, body = $3 WHERE id = $1")
            .bind(post.id)
            .bind(&post.title)
            .bind(&post.body)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update post: {}", e)))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("No post found matching the query".to_string()));
        }

        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to clear post tags: {}", e)))?;

        sqlx::query(
            "INSERT INTO post_tags (post_id, tag_id) SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
        )
        .bind(post.id)
        .bind(post.tag_ids())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to link post tags: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit post update: {}", e)))?;

        self.reload(post.id).await
    }

    async fn delete_post(&self, id: Uuid) -> Result<()> {
        // post_tags rows go with it via ON DELETE CASCADE
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete post: {}", e)))?;

        Ok(())
    }
}

// PostgreSQL Tag Repository
pub struct PostgresTagRepository {
    pool: Arc<PgPool>,
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn create_tag(&self, tag: &Tag) -> Result<Tag> {
        let row = sqlx::query_as::<_, TagRow>(
            "INSERT INTO tags (id, title, slug) VALUES ($1, $2, $3) RETURNING id, title, slug",
        )
        .bind(tag.id)
        .bind(&tag.title)
        .bind(&tag.slug)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create tag: {}", e)))?;

        Ok(row.into())
    }

    async fn get_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let row = sqlx::query_as::<_, TagRow>(
            "SELECT id, title, slug FROM tags WHERE LOWER(slug) = LOWER($1)",
        )
        .bind(slug)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get tag by slug: {}", e)))?;

        Ok(row.map(Tag::from))
    }

    async fn get_tags_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = sqlx::query_as::<_, TagRow>(
            "SELECT id, title, slug FROM tags WHERE id = ANY($1) ORDER BY title, slug",
        )
        .bind(ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get tags by id: {}", e)))?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query_as::<_, TagRow>("SELECT id, title, slug FROM tags ORDER BY title, slug")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list tags: {}", e)))?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn slug_in_use(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM tags
                WHERE LOWER(slug) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to check tag slug: {}", e)))?;

        Ok(taken)
    }

    async fn update_tag(&self, tag: &Tag) -> Result<Tag> {
        let row = sqlx::query_as::<_, TagRow>(
            "UPDATE tags SET title = $2, slug = $3 WHERE id = $1 RETURNING id, title, slug",
        )
        .bind(tag.id)
        .bind(&tag.title)
        .bind(&tag.slug)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update tag: {}", e)))?
        .ok_or_else(|| AppError::NotFound("No tag found matching the query".to_string()))?;

        Ok(row.into())
    }

    async fn delete_tag(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete tag: {}", e)))?;

        Ok(())
    }
}
