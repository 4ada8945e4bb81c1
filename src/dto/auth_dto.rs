use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{User, UserRole};
use crate::utils::validation::PHONE_REGEX;

// Ask for a one-time code on a phone number
#[derive(Debug, Deserialize, Validate)]
pub struct OtpRequest {
    #[validate(regex(path = "PHONE_REGEX", message = "Invalid phone number"))]
    pub phone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequestResponse {
    pub message: String,
    pub expires_in: u64,
}

// Phone + OTP login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(regex(path = "PHONE_REGEX", message = "Invalid phone number"))]
    pub phone: String,

    #[validate(length(equal = 6, message = "OTP must have 6 digits"))]
    pub otp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub name: Option<String>,
    pub phone: String,
    pub role: UserRole,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            phone: user.phone,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

// Admin credential login
#[derive(Debug, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[validate(length(min = 1, message = "Username and password required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Username and password required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminUserDto {
    pub id: String,
    pub username: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub message: String,
    pub token: String,
    pub user: AdminUserDto,
}

#[derive(Debug, Serialize)]
pub struct AdminVerifyResponse {
    pub valid: bool,
    pub user: AdminUserDto,
}
