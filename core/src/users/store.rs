use log::{info, warn};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tokio::task;

use super::model::{NewUser, User};
use crate::auth::{hash_password, verify_password};
use crate::error::{MammoriskError, Result};
use crate::types::Role;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS utilisateurs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nom TEXT NOT NULL,
    prenom TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL DEFAULT 'medecin',
    password TEXT NOT NULL
)";

const SELECT_BY_EMAIL: &str =
    "SELECT id, nom, prenom, email, role, password FROM utilisateurs WHERE email = ?";

const INSERT: &str =
    "INSERT INTO utilisateurs (nom, prenom, email, role, password) VALUES (?, ?, ?, ?, ?)";

/// Account storage over a SQLite pool
#[derive(Debug, Clone)]
pub struct UserStore {
    pool: SqlitePool,
    bcrypt_cost: u32,
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    let role = Role::parse(&role).unwrap_or_else(|| {
        warn!("Unknown role '{}' in database, using default", role);
        Role::default()
    });
    Ok(User {
        id: row.try_get("id")?,
        nom: row.try_get("nom")?,
        prenom: row.try_get("prenom")?,
        email: row.try_get("email")?,
        role,
        password_hash: row.try_get("password")?,
    })
}

/// Runs CPU-bound hashing off the async executor
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| MammoriskError::AuthError(format!("password task failed: {}", e)))?
}

impl UserStore {
    /// Connects to `database_url` and makes sure the table exists
    pub async fn connect(database_url: &str, bcrypt_cost: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        info!("Connected to {}", database_url);
        Self::from_pool(pool, bcrypt_cost).await
    }

    /// Wraps an existing pool and makes sure the table exists
    pub async fn from_pool(pool: SqlitePool, bcrypt_cost: u32) -> Result<Self> {
        let store = Self { pool, bcrypt_cost };
        store.init().await?;
        Ok(store)
    }

    /// Creates the accounts table if missing
    pub async fn init(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Validates and stores a new account
    ///
    /// Fails with [`MammoriskError::Conflict`] when the email is taken.
    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        new_user.validate()?;
        let email = new_user.email.trim().to_string();
        if self.find_by_email(&email).await?.is_some() {
            return Err(MammoriskError::Conflict(format!(
                "email '{}' is already registered",
                email
            )));
        }

        let role = new_user.role();
        let cost = self.bcrypt_cost;
        let password = new_user.password;
        let password_hash = blocking(move || hash_password(&password, cost)).await?;

        let result = sqlx::query(INSERT)
            .bind(new_user.nom.trim())
            .bind(new_user.prenom.trim())
            .bind(&email)
            .bind(role.simple_name())
            .bind(&password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_unique_violation() {
                        return MammoriskError::Conflict(format!(
                            "email '{}' is already registered",
                            email
                        ));
                    }
                }
                MammoriskError::from(e)
            })?;

        let user = User {
            id: result.last_insert_rowid(),
            nom: new_user.nom.trim().to_string(),
            prenom: new_user.prenom.trim().to_string(),
            email,
            role,
            password_hash,
        };
        info!("Created {} account {} (id {})", user.role, user.email, user.id);
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(SELECT_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    /// Returns the account when `password` matches, `None` otherwise
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        let hash = user.password_hash.clone();
        let password = password.to_string();
        let matches = blocking(move || verify_password(&password, &hash)).await?;
        Ok(matches.then_some(user))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::super::model::tests::new_user;
    use super::*;

    pub(crate) async fn memory_store() -> UserStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        UserStore::from_pool(pool, 4).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = memory_store().await;
        let created = store.create(new_user("marie@example.org")).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.role, Role::Medecin);
        assert_ne!(created.password_hash, "radium");

        let found = store.find_by_email("marie@example.org").await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let store = memory_store().await;
        store.create(new_user("marie@example.org")).await.unwrap();
        let err = store
            .create(new_user("marie@example.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, MammoriskError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_invalid_user_not_stored() {
        let store = memory_store().await;
        let err = store.create(new_user("not-an-email")).await.unwrap_err();
        assert!(matches!(err, MammoriskError::ValidationError(_)));
        assert_eq!(store.find_by_email("not-an-email").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let store = memory_store().await;
        store.create(new_user("marie@example.org")).await.unwrap();

        let ok = store
            .authenticate("marie@example.org", "radium")
            .await
            .unwrap();
        assert_eq!(ok.map(|u| u.email), Some("marie@example.org".to_string()));

        let wrong = store
            .authenticate("marie@example.org", "polonium")
            .await
            .unwrap();
        assert!(wrong.is_none());

        let unknown = store
            .authenticate("pierre@example.org", "radium")
            .await
            .unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let store = memory_store().await;
        store.init().await.unwrap();
        store.create(new_user("a@example.org")).await.unwrap();
        store.init().await.unwrap();
        assert!(store.find_by_email("a@example.org").await.unwrap().is_some());
    }
}
