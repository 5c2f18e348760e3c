use thiserror::Error;

/// Service failures. The `Display` text of every variant is user-facing: the
/// form lifecycle surfaces it verbatim in the error display window.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("This username already exists, please pick another one")]
    UsernameTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("This account has been suspended. Contact support if you believe this is a mistake.")]
    Suspended,

    #[error("No account with that username")]
    UnknownAccount,

    #[error("That is already your username")]
    UsernameUnchanged,

    #[error("Your username was changed recently, try again in {days_left} days")]
    ChangeTooSoon { days_left: i64 },

    #[error("This gift code does not exist")]
    UnknownGiftCode,

    #[error("This gift code has already been redeemed")]
    GiftCodeRedeemed,
}
