//! Phone + OTP login for users, credential login for the admin

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::EnvironmentConfig;
use crate::dto::auth_dto::{
    AdminLoginRequest, AdminLoginResponse, AdminUserDto, AdminVerifyResponse, LoginRequest,
    LoginResponse, OtpRequest, OtpRequestResponse,
};
use crate::middleware::AuthenticatedUser;
use crate::models::UserRole;
use crate::repositories::UserRepository;
use crate::services::jwt_service::ADMIN_SUBJECT;
use crate::services::{JwtService, OtpService};
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct AuthController {
    users: Arc<dyn UserRepository>,
    otp: OtpService,
    jwt: JwtService,
    config: Arc<EnvironmentConfig>,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.repositories.users.clone(),
            otp: state.otp.clone(),
            jwt: state.jwt.clone(),
            config: state.config.clone(),
        }
    }

    pub async fn request_otp(&self, request: OtpRequest) -> AppResult<OtpRequestResponse> {
        self.otp.issue(&request.phone).await?;
        Ok(OtpRequestResponse {
            message: "OTP sent successfully".to_string(),
            expires_in: self.otp.ttl().as_secs(),
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        if !self.otp.verify(&request.phone, &request.otp).await? {
            warn!("🔒 Rejected OTP for {}", request.phone);
            return Err(AppError::Unauthorized("Invalid or expired OTP".to_string()));
        }

        let user = self.users.upsert_by_phone(&request.phone).await?;
        let token = self.jwt.issue_user_token(&user)?;

        info!("👤 User {} logged in", user.id);
        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    pub async fn admin_login(&self, request: AdminLoginRequest) -> AppResult<AdminLoginResponse> {
        let (Some(username), Some(password_hash)) = (
            self.config.admin_username.clone(),
            self.config.admin_password_hash.clone(),
        ) else {
            return Err(AppError::Internal("Admin credentials not configured".to_string()));
        };

        let password = request.password;
        let password_matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(|e| AppError::Hash(e.to_string()))?;

        if request.username != username || !password_matches {
            warn!("🔒 Failed admin login for '{}'", request.username);
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = self.jwt.issue_admin_token(&username)?;
        info!("🛡️ Admin '{}' logged in", username);

        Ok(AdminLoginResponse {
            message: "Admin login successful".to_string(),
            token,
            user: AdminUserDto {
                id: ADMIN_SUBJECT.to_string(),
                username,
                role: UserRole::Admin,
            },
        })
    }

    pub fn verify_admin(&self, admin: AuthenticatedUser) -> AdminVerifyResponse {
        AdminVerifyResponse {
            valid: true,
            user: AdminUserDto {
                id: admin.subject,
                username: admin.username.unwrap_or_default(),
                role: admin.role,
            },
        }
    }
}
