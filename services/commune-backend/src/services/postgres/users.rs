use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::err_context::ErrorContextExt;
use secrecy::Secret;
use uuid::Uuid;

use super::PostgresStorage;
use crate::domain::ports::secondary::{UserError as Error, UserStorage};
use crate::domain::{NewUser, Role, User, UserEmail, Username};

const USER_COLUMNS: &str = r#"
    u.id, u.username, u.email, u.is_active, u.created_at,
    r.id AS role_id, r.name AS role_name,
    r.description AS role_description, r.level AS role_level
"#;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    role_id: Uuid,
    role_name: String,
    role_description: String,
    role_level: i32,
}

impl UserRow {
    fn into_user(self) -> Result<User, Error> {
        let username = Username::parse(self.username).map_err(|err| Error::Validation {
            context: format!("Invalid username stored in the database: {err}"),
        })?;
        let email = UserEmail::parse(self.email).map_err(|err| Error::Validation {
            context: format!("Invalid email stored in the database: {err}"),
        })?;
        Ok(User {
            id: self.id,
            username,
            email,
            is_active: self.is_active,
            role: Role {
                id: self.role_id,
                name: self.role_name,
                description: self.role_description,
                level: self.role_level,
            },
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl UserStorage for PostgresStorage {
    #[tracing::instrument(name = "Storing a new user and invitation in postgres", skip(self, user, password_hash))]
    async fn create_and_invite(
        &self,
        user: &NewUser,
        password_hash: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<User, Error> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Could not start transaction")?;

        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role_id)
            VALUES ($1, $2, $3, $4, (SELECT id FROM roles WHERE name = 'user'))
            "#,
        )
        .bind(id)
        .bind(user.username.as_ref())
        .bind(user.email.as_ref())
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .context(format!(
            "Could not store new user {}",
            user.username.as_ref()
        ))?;

        sqlx::query(
            r#"INSERT INTO user_invitations (token, user_id, expires_at) VALUES ($1, $2, $3)"#,
        )
        .bind(token)
        .bind(id)
        .bind(expires_at)
        .execute(&mut *tx)
        .await
        .context(format!("Could not store invitation for user id {id}"))?;

        let saved = sqlx::query_as::<_, UserRow>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users u JOIN roles r ON u.role_id = r.id WHERE u.id = $1"#,
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context(format!("Could not get user {id}"))?;

        tx.commit().await.context("Could not commit transaction")?;

        saved.into_user()
    }

    #[tracing::instrument(name = "Activating a user by invitation token in postgres", skip(self, token))]
    async fn activate_by_token(&self, token: &str) -> Result<Option<User>, Error> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Could not start transaction")?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"SELECT user_id FROM user_invitations WHERE token = $1 AND expires_at > now()"#,
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await
        .context("Could not look up invitation token")?;

        let Some(user_id) = user_id else {
            return Ok(None);
        };

        sqlx::query(r#"UPDATE users SET is_active = true WHERE id = $1"#)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context(format!("Could not activate user {user_id}"))?;

        sqlx::query(r#"DELETE FROM user_invitations WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context(format!("Could not burn invitations for user {user_id}"))?;

        let saved = sqlx::query_as::<_, UserRow>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users u JOIN roles r ON u.role_id = r.id WHERE u.id = $1"#,
        ))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .context(format!("Could not get user {user_id}"))?;

        tx.commit().await.context("Could not commit transaction")?;

        saved.into_user().map(Some)
    }

    #[tracing::instrument(name = "Fetching a user by id in postgres", skip(self))]
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<User>, Error> {
        let saved = sqlx::query_as::<_, UserRow>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users u JOIN roles r ON u.role_id = r.id WHERE u.id = $1"#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context(format!("Could not get user {id}"))?;

        saved.map(UserRow::into_user).transpose()
    }

    #[tracing::instrument(name = "Deleting a user in postgres", skip(self))]
    async fn delete(&self, id: &Uuid) -> Result<(), Error> {
        // Invitations, posts, comments and follower rows cascade.
        sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .context(format!("Could not delete user {id}"))?;

        Ok(())
    }

    #[tracing::instrument(name = "Storing a follower in postgres", skip(self))]
    async fn follow(&self, user_id: &Uuid, follower_id: &Uuid) -> Result<(), Error> {
        sqlx::query(r#"INSERT INTO followers (user_id, follower_id) VALUES ($1, $2)"#)
            .bind(user_id)
            .bind(follower_id)
            .execute(&self.pool)
            .await
            .context(format!("Could not store follower for user {user_id}"))?;

        Ok(())
    }

    #[tracing::instrument(name = "Deleting a follower in postgres", skip(self))]
    async fn unfollow(&self, user_id: &Uuid, follower_id: &Uuid) -> Result<(), Error> {
        sqlx::query(r#"DELETE FROM followers WHERE user_id = $1 AND follower_id = $2"#)
            .bind(user_id)
            .bind(follower_id)
            .execute(&self.pool)
            .await
            .context(format!("Could not delete follower for user {user_id}"))?;

        Ok(())
    }

    #[tracing::instrument(name = "Fetching a role by name in postgres", skip(self))]
    async fn get_role_by_name(&self, name: &str) -> Result<Role, Error> {
        let role = sqlx::query_as::<_, Role>(
            r#"SELECT id, name, description, level FROM roles WHERE name = $1"#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context(format!("Could not get role {name}"))?;

        role.ok_or_else(|| Error::Missing {
            context: format!("No role named {name}"),
        })
    }

    #[tracing::instrument(name = "Checking email exists in postgres", skip(self, email))]
    async fn email_exists(&self, email: &str) -> Result<bool, Error> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)"#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .context("Could not check email exists")?;

        Ok(exists)
    }

    #[tracing::instrument(name = "Checking username exists in postgres", skip(self, username))]
    async fn username_exists(&self, username: &str) -> Result<bool, Error> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)"#,
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .context("Could not check username exists")?;

        Ok(exists)
    }

    #[tracing::instrument(name = "Getting credentials from postgres", skip(self, email))]
    async fn get_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(Uuid, Secret<String>)>, Error> {
        let row = sqlx::query_as::<_, (Uuid, String)>(
            r#"SELECT id, password_hash FROM users WHERE email = $1 AND is_active"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Could not retrieve credentials")?
        .map(|(id, hash)| (id, Secret::new(hash)));

        Ok(row)
    }
}
