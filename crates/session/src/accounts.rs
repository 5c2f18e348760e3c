use std::fs;
use std::io::Write;
use std::path::PathBuf;

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::SessionError;

/// Minimum spacing between two username changes. The first change after
/// registration is always free.
const USERNAME_CHANGE_COOLDOWN_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountRecord {
    username: String,
    hash: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    username_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    suspended: bool,
}

/// Public view of an account, without the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub username_updated_at: Option<DateTime<Utc>>,
}

impl From<&AccountRecord> for Account {
    fn from(record: &AccountRecord) -> Self {
        Self {
            username: record.username.clone(),
            created_at: record.created_at,
            username_updated_at: record.username_updated_at,
        }
    }
}

/// File-backed account registry. Cloneable handle; every operation reads and
/// rewrites `accounts.json` under the data directory.
#[derive(Debug, Clone)]
pub struct AccountStore {
    data_dir: PathBuf,
}

impl AccountStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn accounts_path(&self) -> PathBuf {
        self.data_dir.join("accounts.json")
    }

    fn load(&self) -> Result<Vec<AccountRecord>, SessionError> {
        let path = self.accounts_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&self, records: &[AccountRecord]) -> Result<(), SessionError> {
        fs::create_dir_all(&self.data_dir)?;
        let mut file = fs::File::create(self.accounts_path())?;
        let data = serde_json::to_vec_pretty(records)?;
        file.write_all(&data)?;
        Ok(())
    }

    /// Register a new account. Usernames are compared case-insensitively.
    pub fn register(&self, username: &str, password: &str) -> Result<Account, SessionError> {
        let mut records = self.load()?;
        if records
            .iter()
            .any(|r| r.username.eq_ignore_ascii_case(username))
        {
            return Err(SessionError::UsernameTaken);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| SessionError::Hash(e.to_string()))?
            .to_string();

        let record = AccountRecord {
            username: username.to_string(),
            hash,
            created_at: Utc::now(),
            username_updated_at: None,
            suspended: false,
        };
        let account = Account::from(&record);
        records.push(record);
        self.save(&records)?;
        info!(username, "registered account");
        Ok(account)
    }

    /// Verify credentials. A wrong username and a wrong password produce the
    /// same error so the message leaks nothing about which one was off.
    pub fn login(&self, username: &str, password: &str) -> Result<Account, SessionError> {
        let records = self.load()?;
        let record = records
            .iter()
            .find(|r| r.username.eq_ignore_ascii_case(username))
            .ok_or(SessionError::InvalidCredentials)?;

        let parsed =
            PasswordHash::new(&record.hash).map_err(|e| SessionError::Hash(e.to_string()))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(SessionError::InvalidCredentials);
        }
        if record.suspended {
            return Err(SessionError::Suspended);
        }
        Ok(Account::from(record))
    }

    pub fn is_username_available(&self, username: &str) -> Result<bool, SessionError> {
        let records = self.load()?;
        Ok(!records
            .iter()
            .any(|r| r.username.eq_ignore_ascii_case(username)))
    }

    /// Rename an account. The first rename is free; later ones are spaced at
    /// least [`USERNAME_CHANGE_COOLDOWN_DAYS`] apart.
    pub fn change_username(
        &self,
        current: &str,
        new_username: &str,
    ) -> Result<Account, SessionError> {
        if current.eq_ignore_ascii_case(new_username) {
            return Err(SessionError::UsernameUnchanged);
        }

        let mut records = self.load()?;
        if records
            .iter()
            .any(|r| r.username.eq_ignore_ascii_case(new_username))
        {
            return Err(SessionError::UsernameTaken);
        }

        let record = records
            .iter_mut()
            .find(|r| r.username.eq_ignore_ascii_case(current))
            .ok_or(SessionError::UnknownAccount)?;

        if let Some(changed_at) = record.username_updated_at {
            let eligible_at = changed_at + Duration::days(USERNAME_CHANGE_COOLDOWN_DAYS);
            let now = Utc::now();
            if now < eligible_at {
                let days_left = (eligible_at - now).num_days().max(1);
                return Err(SessionError::ChangeTooSoon { days_left });
            }
        }

        record.username = new_username.to_string();
        record.username_updated_at = Some(Utc::now());
        let account = Account::from(&*record);
        self.save(&records)?;
        info!(from = current, to = new_username, "changed username");
        Ok(account)
    }
}
