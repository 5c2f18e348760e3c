/*!
Synchronous field rules shared by the forms. Each returns the localized
message to display inline on rejection.
*/

use crate::locale::translate;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 18;
pub const LOGIN_PASSWORD_MIN: usize = 6;
pub const REGISTRATION_PASSWORD_MIN: usize = 8;
pub const GIFT_CODE_MIN: usize = 3;

fn username_shape_ok(value: &str) -> bool {
    let value = value.trim();
    let len = value.chars().count();
    (USERNAME_MIN..=USERNAME_MAX).contains(&len)
        && value.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn username_rule(value: &str) -> Result<(), String> {
    if username_shape_ok(value) {
        Ok(())
    } else {
        Err(translate(
            "registration.registration_validation_username_instructions",
        ))
    }
}

/// Same shape as [`username_rule`], with the sign-in form's wording.
pub fn login_username_rule(value: &str) -> Result<(), String> {
    if username_shape_ok(value) {
        Ok(())
    } else {
        Err(translate("login.login_validation_username_instructions"))
    }
}

pub fn login_password_rule(value: &str) -> Result<(), String> {
    if value.chars().count() >= LOGIN_PASSWORD_MIN {
        Ok(())
    } else {
        Err(translate("login.login_validation_password_instructions"))
    }
}

pub fn registration_password_rule(value: &str) -> Result<(), String> {
    if value.chars().count() >= REGISTRATION_PASSWORD_MIN {
        Ok(())
    } else {
        Err(translate(
            "registration.registration_validation_password_instructions",
        ))
    }
}

pub fn gift_code_rule(value: &str) -> Result<(), String> {
    if value.trim().chars().count() >= GIFT_CODE_MIN {
        Ok(())
    } else {
        Err(translate("gift_code.gift_code_validation_instructions"))
    }
}
