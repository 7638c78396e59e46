use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        self.has_code(UNIQUE_VIOLATION)
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        self.has_code(FOREIGN_KEY_VIOLATION)
    }

    pub fn is_check_violation(&self) -> bool {
        self.has_code(CHECK_VIOLATION)
    }

    fn has_code(&self, code: &str) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some(code)
        )
    }

    /// Turns constraint failures into a `ConstraintViolation` carrying `message`,
    /// leaving every other error untouched.
    pub fn on_constraint(self, message: &str) -> Self {
        if self.is_unique_violation() || self.is_check_violation() {
            StorageError::ConstraintViolation(message.to_string())
        } else if self.is_foreign_key_violation() {
            StorageError::NotFound
        } else {
            self
        }
    }
}
