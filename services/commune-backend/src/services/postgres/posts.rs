use async_trait::async_trait;
use common::err_context::ErrorContextExt;
use uuid::Uuid;

use super::PostgresStorage;
use crate::domain::ports::secondary::{PostError as Error, PostStorage};
use crate::domain::{Comment, FeedQuery, NewPost, Post, PostWithMetadata};

const POST_COLUMNS: &str =
    "id, user_id, title, content, tags, version, created_at, updated_at";

#[async_trait]
impl PostStorage for PostgresStorage {
    #[tracing::instrument(name = "Storing a new post in postgres", skip(self, post))]
    async fn create_post(&self, user_id: &Uuid, post: &NewPost) -> Result<Post, Error> {
        let id = Uuid::new_v4();
        let saved = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (id, user_id, title, content, tags)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.tags)
        .fetch_one(&self.pool)
        .await
        .context(format!("Could not store new post for user {user_id}"))?;

        Ok(saved)
    }

    #[tracing::instrument(name = "Fetching a post by id in postgres", skip(self))]
    async fn get_post_by_id(&self, id: &Uuid) -> Result<Option<Post>, Error> {
        let saved = sqlx::query_as::<_, Post>(&format!(
            r#"SELECT {POST_COLUMNS} FROM posts WHERE id = $1"#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context(format!("Could not get post {id}"))?;

        Ok(saved)
    }

    #[tracing::instrument(name = "Updating a post in postgres", skip(self, post))]
    async fn update_post(&self, post: &Post) -> Result<Option<Post>, Error> {
        // The version check makes the update conditional: no row is
        // touched when another writer has bumped the version since
        // this post was read.
        let saved = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET title = $2, content = $3, tags = $4,
                version = version + 1, updated_at = now()
            WHERE id = $1 AND version = $5
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.tags)
        .bind(post.version)
        .fetch_optional(&self.pool)
        .await
        .context(format!("Could not update post {}", post.id))?;

        Ok(saved)
    }

    #[tracing::instrument(name = "Deleting a post in postgres", skip(self))]
    async fn delete_post(&self, id: &Uuid) -> Result<bool, Error> {
        let result = sqlx::query(r#"DELETE FROM posts WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .context(format!("Could not delete post {id}"))?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Fetching a user feed in postgres", skip(self))]
    async fn get_user_feed(
        &self,
        user_id: &Uuid,
        query: &FeedQuery,
    ) -> Result<Vec<PostWithMetadata>, Error> {
        let feed = sqlx::query_as::<_, PostWithMetadata>(&format!(
            r#"
            SELECT p.id, p.user_id, p.title, p.content, p.tags, p.version,
                   p.created_at, p.updated_at,
                   u.username AS author, COUNT(c.id) AS comment_count
            FROM posts p
            JOIN users u ON u.id = p.user_id
            LEFT JOIN comments c ON c.post_id = p.id
            WHERE (p.user_id = $1
                   OR p.user_id IN (SELECT user_id FROM followers WHERE follower_id = $1))
              AND ($4 = '' OR p.title ILIKE '%' || $4 || '%' OR p.content ILIKE '%' || $4 || '%')
              AND (cardinality($5::text[]) = 0 OR p.tags @> $5)
            GROUP BY p.id, u.username
            ORDER BY p.created_at {}
            LIMIT $2 OFFSET $3
            "#,
            query.sort.as_sql()
        ))
        .bind(user_id)
        .bind(query.limit)
        .bind(query.offset)
        .bind(query.search.clone().unwrap_or_default())
        .bind(&query.tags)
        .fetch_all(&self.pool)
        .await
        .context(format!("Could not get feed for user {user_id}"))?;

        Ok(feed)
    }

    #[tracing::instrument(name = "Storing a new comment in postgres", skip(self, content))]
    async fn create_comment(
        &self,
        post_id: &Uuid,
        user_id: &Uuid,
        content: &str,
    ) -> Result<Comment, Error> {
        let id = Uuid::new_v4();
        let saved = sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (id, post_id, user_id, content)
                VALUES ($1, $2, $3, $4)
                RETURNING id, post_id, user_id, content, created_at
            )
            SELECT i.id, i.post_id, i.user_id, i.content,
                   u.username AS author, i.created_at
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(id)
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .context(format!("Could not store comment on post {post_id}"))?;

        Ok(saved)
    }

    #[tracing::instrument(name = "Fetching comments by post id in postgres", skip(self))]
    async fn get_comments_by_post_id(&self, post_id: &Uuid) -> Result<Vec<Comment>, Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.post_id, c.user_id, c.content,
                   u.username AS author, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context(format!("Could not get comments for post {post_id}"))?;

        Ok(comments)
    }
}
