use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::SessionError;

/// Redemption request body, mirroring the original endpoint's JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCodeRequest {
    pub gift_code: String,
}

/// Redemption response body. Exactly one of `message` / `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCodeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GiftCodeRecord {
    code: String,
    reward: String,
    #[serde(default)]
    redeemed_by: Option<String>,
    #[serde(default)]
    redeemed_at: Option<DateTime<Utc>>,
}

/// File-backed gift-code registry (`codes.json` under the data directory).
#[derive(Debug, Clone)]
pub struct GiftCodeLedger {
    data_dir: PathBuf,
}

impl GiftCodeLedger {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn codes_path(&self) -> PathBuf {
        self.data_dir.join("codes.json")
    }

    fn load(&self) -> Result<Vec<GiftCodeRecord>, SessionError> {
        let path = self.codes_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&self, records: &[GiftCodeRecord]) -> Result<(), SessionError> {
        fs::create_dir_all(&self.data_dir)?;
        let mut file = fs::File::create(self.codes_path())?;
        let data = serde_json::to_vec_pretty(records)?;
        file.write_all(&data)?;
        Ok(())
    }

    /// Add a redeemable code. Re-granting an existing code is a no-op.
    pub fn grant(&self, code: &str, reward: &str) -> Result<(), SessionError> {
        let mut records = self.load()?;
        if records.iter().any(|r| r.code.eq_ignore_ascii_case(code)) {
            return Ok(());
        }
        records.push(GiftCodeRecord {
            code: code.to_string(),
            reward: reward.to_string(),
            redeemed_by: None,
            redeemed_at: None,
        });
        self.save(&records)
    }

    /// Redeem a code for `username`. Each code can be redeemed once.
    pub fn redeem(
        &self,
        request: &GiftCodeRequest,
        username: &str,
    ) -> Result<GiftCodeResponse, SessionError> {
        let mut records = self.load()?;
        let record = records
            .iter_mut()
            .find(|r| r.code.eq_ignore_ascii_case(&request.gift_code))
            .ok_or(SessionError::UnknownGiftCode)?;

        if record.redeemed_by.is_some() {
            return Err(SessionError::GiftCodeRedeemed);
        }

        record.redeemed_by = Some(username.to_string());
        record.redeemed_at = Some(Utc::now());
        let message = format!("Gift code redeemed: {}", record.reward);
        self.save(&records)?;
        info!(code = %request.gift_code, username, "redeemed gift code");
        Ok(GiftCodeResponse {
            message: Some(message),
            error: None,
        })
    }
}
