//! User and session endpoints

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::client::{ApiClient, RequestOptions};
use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, ResponseValue};
use crate::types::{PasswordChange, UserCreate};
use crate::validate::{self, STATUS_CREATED, STATUS_OK};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Client for the `/users/*` endpoints
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn path(&self, name: &str) -> ApiResult<String> {
        Ok(self.client.endpoint(name)?.to_string())
    }

    /// Register a new user. Takes any payload so invalid registrations can
    /// be exercised too.
    pub async fn register<B: Serialize + ?Sized>(&self, user_data: &B) -> ApiResult<ApiResponse> {
        let options = RequestOptions::post(self.path("register_user_url")?).json(user_data)?;
        self.client.request(options).await
    }

    pub async fn login<B: Serialize + ?Sized>(&self, credentials: &B) -> ApiResult<ApiResponse> {
        let options = RequestOptions::post(self.path("login_user_url")?).json(credentials)?;
        self.client.request(options).await
    }

    pub async fn logout(&self, token: &str) -> ApiResult<ApiResponse> {
        let options = RequestOptions::delete(self.path("logout_user_url")?)
            .headers(self.client.get_auth_headers(token));
        self.client.request(options).await
    }

    pub async fn get_profile(&self, token: &str) -> ApiResult<ApiResponse> {
        let options = RequestOptions::get(self.path("profile_user_url")?)
            .headers(self.client.get_auth_headers(token));
        self.client.request(options).await
    }

    pub async fn change_password(
        &self,
        token: &str,
        password_data: &PasswordChange,
    ) -> ApiResult<ApiResponse> {
        let options = RequestOptions::post(self.path("change_password_user_url")?)
            .json(password_data)?
            .headers(self.client.get_auth_headers(token));
        self.client.request(options).await
    }

    pub async fn delete_account(&self, token: &str) -> ApiResult<ApiResponse> {
        let options = RequestOptions::delete(self.path("delete_account_user_url")?)
            .headers(self.client.get_auth_headers(token));
        self.client.request(options).await
    }

    /// Register, then log in with the same credentials and return the
    /// session token from `body.data.token`.
    ///
    /// The registration response is not inspected; a login answer without a
    /// token fails with an assertion naming `data.token`.
    pub async fn register_and_login(&self, user_data: &UserCreate) -> ApiResult<String> {
        self.register(user_data).await?;
        let login = self.login(&user_data.credentials()).await?;

        login
            .body_path("data.token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::Assertion(format!(
                    "expected login response ({}) to carry data.token, got {}",
                    login.status, login.body
                ))
            })
    }

    /// `id`, `name` and `email` are non-empty strings and the email is well formed
    pub fn validate_user_data(&self, data: &Value) -> ApiResult<()> {
        for prop in ["id", "name", "email"] {
            validate::expect_non_empty_string(data, "user", prop)?;
        }
        let email = validate::expect_string(data, "user", "email")?;
        if !EMAIL_PATTERN.is_match(email) {
            return Err(ApiError::assertion(
                "user.email",
                format!("to match {}, got '{}'", EMAIL_PATTERN.as_str(), email),
            ));
        }
        Ok(())
    }

    pub fn validate_user_structure(&self, user: &Value) -> ApiResult<()> {
        self.validate_user_data(user)
    }

    pub fn validate_data_structure(&self, data: &Value) -> ApiResult<()> {
        self.validate_user_data(data)
    }

    /// Envelope check, plus `data.token` and `data.user` on 200/201
    pub fn validate_auth_response(
        &self,
        response: impl Into<ResponseValue>,
        expected_status: u16,
    ) -> ApiResult<()> {
        let response = self.client.normalize_response(response);
        validate::validate_standard_response(&response, expected_status)?;

        if expected_status == STATUS_OK || expected_status == STATUS_CREATED {
            let data = validate::expect_property(&response.body, "body", "data")?;
            validate::expect_non_empty_string(data, "body.data", "token")?;
            let user = validate::expect_property(data, "body.data", "user")?;
            self.validate_user_structure(user)?;
        }
        Ok(())
    }

    /// Envelope check, plus `message` and a valid user in `data` on 200/201
    pub fn validate_registration_response(
        &self,
        response: impl Into<ResponseValue>,
        expected_status: u16,
    ) -> ApiResult<()> {
        let response = self.client.normalize_response(response);
        validate::validate_standard_response(&response, expected_status)?;

        if expected_status == STATUS_OK || expected_status == STATUS_CREATED {
            validate::expect_property(&response.body, "body", "message")?;
            let data = validate::expect_property(&response.body, "body", "data")?;
            self.validate_data_structure(data)?;
        }
        Ok(())
    }
}
