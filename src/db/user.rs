use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

/// Login lookup row. The hash never leaves the server.
#[derive(Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub password_hash: String,
}

impl std::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("id", &self.id)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// A single user as returned to the owner or an admin.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct UserDetails {
    pub id: i64,
    pub email: String,
    pub created: String,
    pub is_admin: bool,
    pub notes_count: i64,
}

/// User row for the admin listing.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub created: String,
    pub notes_count: i64,
}

/// Result of inserting a user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreatedUser {
    pub id: i64,
    pub created: String,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a regular user.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<CreatedUser, sqlx::Error> {
        self.insert(email, password_hash, false).await
    }

    /// Create an admin user.
    pub async fn create_admin(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<CreatedUser, sqlx::Error> {
        self.insert(email, password_hash, true).await
    }

    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<CreatedUser, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO users (email, password_hash, is_admin) VALUES (?, ?, ?)
             RETURNING id, created",
        )
        .bind(email)
        .bind(password_hash)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await
    }

    /// Get the id and password hash for an email (exact match).
    pub async fn get_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, sqlx::Error> {
        sqlx::query_as("SELECT id, password_hash FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    /// Get a user with admin flag and note count.
    pub async fn get(&self, id: i64) -> Result<Option<UserDetails>, sqlx::Error> {
        sqlx::query_as(
            "SELECT u.id, u.email, u.created, u.is_admin, COUNT(n.id) AS notes_count
             FROM users u
             LEFT JOIN notes n ON u.id = n.user_id
             WHERE u.id = ?
             GROUP BY u.id",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Check whether a user exists.
    pub async fn exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Replace a user's password hash (used to upgrade old hashes on login).
    pub async fn update_password_hash(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List users, newest first.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<UserSummary>, sqlx::Error> {
        sqlx::query_as(
            "SELECT u.id, u.email, u.created, COUNT(n.id) AS notes_count
             FROM users u
             LEFT JOIN notes n ON u.id = n.user_id
             GROUP BY u.id
             ORDER BY u.created DESC, u.id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}
