/*!
Local services consumed by the account forms.

`AccountStore` keeps registered accounts (argon2 password hashes) in
`accounts.json` under a data directory; `GiftCodeLedger` keeps redeemable
codes in `codes.json` next to it. Both are cheap cloneable handles over a
directory path, and every failure maps to a [`SessionError`] variant whose
`Display` text is what the forms show to the user.
*/

mod accounts;
mod errors;
mod gift_codes;

pub use accounts::{Account, AccountStore};
pub use errors::SessionError;
pub use gift_codes::{GiftCodeLedger, GiftCodeRequest, GiftCodeResponse};
