//! Per-user documents: profiles, address books and support queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use super::PgStore;
use crate::domain::aggregates::{AddressBook, SavedAddress, SupportQuery, User};
use crate::domain::value_objects::{SupportQueryId, UserId};
use crate::storage::{AddressStore, Result, SupportQueryStore, UserStore};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    auth0_id: String,
    email: String,
    profile_image_url: Option<String>,
    name: Option<String>,
    number: Option<String>,
    address_line1: Option<String>,
    city: Option<String>,
    country: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: UserId::from_uuid(r.id), auth0_id: r.auth0_id, email: r.email, profile_image_url: r.profile_image_url,
            name: r.name, number: r.number, address_line1: r.address_line1, city: r.city, country: r.country,
            created_at: r.created_at, updated_at: r.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, auth0_id, email, profile_image_url, name, number, address_line1, city, country, \
    created_at, updated_at";

#[async_trait]
impl UserStore for PgStore {
    async fn get(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_subject(&self, auth0_id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE auth0_id = $1"))
            .bind(auth0_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(User::from))
    }

    async fn insert(&self, u: &User) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(u.id.as_uuid()).bind(&u.auth0_id).bind(&u.email).bind(&u.profile_image_url).bind(&u.name)
        .bind(&u.number).bind(&u.address_line1).bind(&u.city).bind(&u.country).bind(u.created_at).bind(u.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn update(&self, u: &User) -> Result<()> {
        sqlx::query(
            "UPDATE users SET email = $2, profile_image_url = $3, name = $4, number = $5, address_line1 = $6, \
             city = $7, country = $8, updated_at = $9 WHERE id = $1",
        )
        .bind(u.id.as_uuid()).bind(&u.email).bind(&u.profile_image_url).bind(&u.name).bind(&u.number)
        .bind(&u.address_line1).bind(&u.city).bind(&u.country).bind(u.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct AddressBookRow {
    user_id: Uuid,
    addresses: Json<Vec<SavedAddress>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl AddressStore for PgStore {
    async fn get(&self, user: UserId) -> Result<Option<AddressBook>> {
        let row = sqlx::query_as::<_, AddressBookRow>(
            "SELECT user_id, addresses, created_at, updated_at FROM address_books WHERE user_id = $1",
        )
        .bind(user.as_uuid())
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(|r| AddressBook {
            user: UserId::from_uuid(r.user_id),
            addresses: r.addresses.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }))
    }

    async fn save(&self, book: &AddressBook) -> Result<()> {
        sqlx::query(
            "INSERT INTO address_books (user_id, addresses, created_at, updated_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO UPDATE SET addresses = EXCLUDED.addresses, updated_at = EXCLUDED.updated_at",
        )
        .bind(book.user.as_uuid())
        .bind(Json(&book.addresses))
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct SupportQueryRow {
    id: Uuid,
    user_id: Uuid,
    subject: String,
    describe_subject: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl SupportQueryStore for PgStore {
    async fn insert(&self, q: &SupportQuery) -> Result<()> {
        sqlx::query(
            "INSERT INTO support_queries (id, user_id, subject, describe_subject, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(q.id.as_uuid()).bind(q.user.as_uuid()).bind(&q.subject).bind(&q.describe_subject).bind(q.created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<SupportQuery>> {
        let rows = sqlx::query_as::<_, SupportQueryRow>(
            "SELECT id, user_id, subject, describe_subject, created_at FROM support_queries \
             WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user.as_uuid())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(|r| SupportQuery {
            id: SupportQueryId::from_uuid(r.id),
            user: UserId::from_uuid(r.user_id),
            subject: r.subject,
            describe_subject: r.describe_subject,
            created_at: r.created_at,
        }).collect())
    }
}
