use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::db::models::User;
use crate::error::AppError;

/// Fields required to insert a user. The id and creation timestamp are
/// assigned here.
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub phone: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub gender: String,
    pub profile_pic: String,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn create(pool: &Pool<Sqlite>, new_user: NewUser) -> Result<User, AppError> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp_millis();

        let user = sqlx::query_as::<_, User>(
            r#"
INSERT INTO users (id, full_name, username, phone, email, password_hash, gender, profile_pic, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&new_user.full_name)
        .bind(&new_user.username)
        .bind(&new_user.phone)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.gender)
        .bind(&new_user.profile_pic)
        .bind(created_at)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(pool: &Pool<Sqlite>, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn get_by_username(
        pool: &Pool<Sqlite>,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn get_by_email(pool: &Pool<Sqlite>, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn get_by_phone(pool: &Pool<Sqlite>, phone: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone = ?")
            .bind(phone)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Every user except `user_id`, oldest first. Backs the sidebar roster.
    pub async fn list_except(pool: &Pool<Sqlite>, user_id: &str) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id != ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    pub async fn update_profile_pic(
        pool: &Pool<Sqlite>,
        user_id: &str,
        profile_pic: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET profile_pic = ? WHERE id = ? RETURNING *",
        )
        .bind(profile_pic)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }
}
