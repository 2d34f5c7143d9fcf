//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::{AccountStatus, NewUser, ShopDetails, ShopkeeperProfile, User, UserView};

const USER_COLUMNS: &str = "id, name, email, password_hash, phone, role, status, created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();
        Ok(hash)
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let result = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);

        Ok(result.is_ok())
    }

    /// Create a customer account; customers are approved at creation
    pub async fn create_customer(&self, new_user: &NewUser) -> Result<User> {
        info!("Creating customer account: {}", new_user.email);

        let password_hash = Self::hash_password(&new_user.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, phone, role, status)
            VALUES ($1, $2, $3, $4, 'customer', 'approved')
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&password_hash)
        .bind(&new_user.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Create a shopkeeper account plus its profile in one transaction.
    /// Shopkeepers start `pending` and cannot log in until approved.
    pub async fn create_shopkeeper(
        &self,
        new_user: &NewUser,
        shop: &ShopDetails,
    ) -> Result<(User, ShopkeeperProfile)> {
        info!("Creating shopkeeper account: {}", new_user.email);

        let password_hash = Self::hash_password(&new_user.password)?;

        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, phone, role, status)
            VALUES ($1, $2, $3, $4, 'shopkeeper', 'pending')
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&password_hash)
        .bind(&new_user.phone)
        .fetch_one(&mut *tx)
        .await?;

        let profile = sqlx::query_as::<_, ShopkeeperProfile>(
            r#"
            INSERT INTO shopkeeper_profiles (user_id, shop_name, address, city, state, pincode)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING user_id, shop_name, address, city, state, pincode
            "#,
        )
        .bind(user.id)
        .bind(&shop.shop_name)
        .bind(&shop.address)
        .bind(&shop.city)
        .bind(&shop.state)
        .bind(&shop.pincode)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((user, profile))
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Fetch the shopkeeper profile for a user, if any
    pub async fn profile_of(&self, user_id: Uuid) -> Result<Option<ShopkeeperProfile>> {
        let profile = sqlx::query_as::<_, ShopkeeperProfile>(
            r#"
            SELECT user_id, shop_name, address, city, state, pincode
            FROM shopkeeper_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Persist a reviewed status and return the updated user
    pub async fn set_status(&self, id: Uuid, status: AccountStatus) -> Result<User> {
        info!("Setting account {} status to {}", id, status.as_str());

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// List shopkeepers, optionally restricted to one status, newest first
    pub async fn list_shopkeepers(&self, status: Option<AccountStatus>) -> Result<Vec<UserView>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.name, u.email, u.phone, u.role, u.status,
                   sp.shop_name, sp.address, sp.city, sp.state, sp.pincode
            FROM users u
            LEFT JOIN shopkeeper_profiles sp ON sp.user_id = u.id
            WHERE u.role = 'shopkeeper' AND ($1::account_status IS NULL OR u.status = $1)
            ORDER BY u.created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        let shopkeepers = rows
            .into_iter()
            .map(|row| {
                let shop_details =
                    row.get::<Option<String>, _>("shop_name")
                        .map(|shop_name| ShopDetails {
                            shop_name,
                            address: row.get("address"),
                            city: row.get("city"),
                            state: row.get("state"),
                            pincode: row.get("pincode"),
                        });
                UserView {
                    id: row.get("id"),
                    name: row.get("name"),
                    email: row.get("email"),
                    phone: row.get("phone"),
                    role: row.get("role"),
                    status: row.get("status"),
                    shop_details,
                }
            })
            .collect();

        Ok(shopkeepers)
    }

    /// Shopkeeper counts by status plus the customer total, for the admin
    /// dashboard
    pub async fn account_stats(&self) -> Result<AccountStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE role = 'shopkeeper') AS total_shopkeepers,
                COUNT(*) FILTER (WHERE role = 'shopkeeper' AND status = 'pending') AS pending_shopkeepers,
                COUNT(*) FILTER (WHERE role = 'shopkeeper' AND status = 'approved') AS approved_shopkeepers,
                COUNT(*) FILTER (WHERE role = 'customer') AS total_customers
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AccountStats {
            total_shopkeepers: row.get("total_shopkeepers"),
            pending_shopkeepers: row.get("pending_shopkeepers"),
            approved_shopkeepers: row.get("approved_shopkeepers"),
            total_customers: row.get("total_customers"),
        })
    }

    /// Create the admin account at startup if it does not exist yet.
    /// Returns true when a new admin was inserted.
    pub async fn ensure_admin(&self, name: &str, email: &str, password: &str, phone: &str) -> Result<bool> {
        if self.find_by_email(email).await?.is_some() {
            return Ok(false);
        }

        let password_hash = Self::hash_password(password)?;

        sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, phone, role, status)
            VALUES ($1, $2, $3, $4, 'admin', 'approved')
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .bind(phone)
        .execute(&self.pool)
        .await?;

        info!("Bootstrapped admin account {}", email);
        Ok(true)
    }
}

/// Account totals for the admin dashboard
#[derive(Debug, Clone)]
pub struct AccountStats {
    pub total_shopkeepers: i64,
    pub pending_shopkeepers: i64,
    pub approved_shopkeepers: i64,
    pub total_customers: i64,
}
