//! 认证模块
//!
//! 管理会话：登录、登出、刷新令牌。
//! 登录和刷新走公开接口，不经过认证客户端的重试流程。

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::messages;
use crate::request::{HttpClient, HttpMethod, HttpRequest};
use crate::state::ResourceState;
use crate::storage::TokenStore;
use serde::Serialize;
use shopadmin_shared::{
    AuthTokenData, Envelope, HEADER_TUNNEL_BYPASS, LoginCredentials, RefreshTokenRequest, paths,
};
use std::cell::Cell;
use std::rc::Rc;

/// 会话阶段
///
/// `Anonymous -> Authenticating -> Authenticated -> Anonymous`，
/// 刷新时 `Authenticated -> Refreshing -> Authenticated`，刷新失败保持原阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    Refreshing,
}

pub struct SessionController<C: HttpClient> {
    http: Rc<C>,
    config: Rc<ClientConfig>,
    tokens: Rc<TokenStore>,
    phase: Cell<SessionPhase>,
    state: ResourceState,
}

impl<C: HttpClient> SessionController<C> {
    pub fn new(http: Rc<C>, config: Rc<ClientConfig>, tokens: Rc<TokenStore>) -> Self {
        // 进程启动时可能已有持久化的会话
        let phase = if tokens.access_token().is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        };

        Self {
            http,
            config,
            tokens,
            phase: Cell::new(phase),
            state: ResourceState::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase.get()
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.access_token().is_some()
    }

    /// 登录
    ///
    /// 成功条件：信封成功且返回非空的访问令牌
    pub async fn login(&self, credentials: &LoginCredentials) -> bool {
        let _loading = self.state.begin();

        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            self.state.fail(messages::auth::REQUIRED_FIELDS);
            return false;
        }

        let previous = self.phase.replace(SessionPhase::Authenticating);

        match self.post_public(paths::LOGIN, credentials).await {
            Ok(envelope) if envelope.is_success() && has_access_token(&envelope) => {
                let message = envelope
                    .message()
                    .unwrap_or(messages::auth::LOGIN_SUCCESS)
                    .to_string();
                if let Some(data) = envelope.data.as_ref() {
                    self.tokens.set(data);
                }
                self.phase.set(SessionPhase::Authenticated);
                self.state.succeed(message);
                tracing::info!(email = %credentials.email, "login succeeded");
                true
            }
            Ok(envelope) => {
                self.phase.set(previous);
                self.state.fail(
                    envelope
                        .message()
                        .unwrap_or(messages::auth::LOGIN_ERROR)
                        .to_string(),
                );
                tracing::info!(email = %credentials.email, code = %envelope.code, "login rejected");
                false
            }
            Err(err) => {
                self.phase.set(previous);
                tracing::info!(email = %credentials.email, error = %err, "login failed");
                self.state.fail(err.user_message(messages::auth::LOGIN_ERROR));
                false
            }
        }
    }

    /// 登出，不会失败
    pub fn logout(&self) {
        self.tokens.clear();
        self.state.clear_messages();
        self.phase.set(SessionPhase::Anonymous);
        tracing::info!("logged out");
    }

    /// 用刷新令牌换取新会话
    ///
    /// 失败时不修改任何状态
    pub async fn refresh_access_token(&self) -> bool {
        let Some(refresh_token) = self.tokens.refresh_token() else {
            tracing::info!("no refresh token, skip refresh");
            return false;
        };

        let previous = self.phase.get();
        if previous == SessionPhase::Authenticated {
            self.phase.set(SessionPhase::Refreshing);
        }

        let payload = RefreshTokenRequest { refresh_token };
        let refreshed = match self.post_public(paths::REFRESH, &payload).await {
            Ok(envelope) if envelope.is_success() && has_access_token(&envelope) => envelope.data,
            Ok(envelope) => {
                tracing::info!(code = %envelope.code, "refresh rejected");
                None
            }
            Err(err) => {
                tracing::info!(error = %err, "refresh failed");
                None
            }
        };

        match refreshed {
            Some(data) => {
                self.tokens.set(&data);
                self.phase.set(SessionPhase::Authenticated);
                tracing::info!("access token refreshed");
                true
            }
            None => {
                self.phase.set(previous);
                false
            }
        }
    }

    /// 公开接口：只附加隧道绕过头
    async fn post_public<B: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &B,
    ) -> ApiResult<Envelope<AuthTokenData>> {
        let mut req = HttpRequest::new(&self.config.url(path), HttpMethod::Post).with_json(payload)?;
        if self.config.tunnel_bypass {
            req = req.with_header(HEADER_TUNNEL_BYPASS, "true");
        }

        let resp = self.http.send(req).await?;
        tracing::debug!(method = "POST", path, status = resp.status, "public request");
        if !resp.is_success() {
            return Err(ApiError::http(resp.status, &resp.body));
        }
        resp.json()
    }
}

fn has_access_token(envelope: &Envelope<AuthTokenData>) -> bool {
    envelope
        .data
        .as_ref()
        .is_some_and(|d| !d.access_token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::MockHttpClient;
    use serde_json::json;

    const LOGIN_URL: &str = "http://api.test/public/auth/login";
    const REFRESH_URL: &str = "http://api.test/public/auth/refresh";

    fn far_future() -> i64 {
        shopadmin_shared::EpochSecs::now().as_secs() + 3_600
    }

    fn token_body(access: &str, refresh: &str) -> serde_json::Value {
        json!({
            "code": "200",
            "message": "ok",
            "data": {
                "access_token": access,
                "refresh_token": refresh,
                "token_type": "Bearer",
                "access_expires_at": far_future(),
                "refresh_expires_at": far_future()
            }
        })
    }

    fn controller() -> SessionController<MockHttpClient> {
        SessionController::new(
            Rc::new(MockHttpClient::new()),
            Rc::new(ClientConfig::new("http://api.test")),
            Rc::new(TokenStore::in_memory(false)),
        )
    }

    fn credentials(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_requires_fields_without_network() {
        let session = controller();
        assert!(!session.login(&credentials(" ", "secret")).await);

        assert_eq!(session.http.total_requests(), 0);
        assert_eq!(session.state.error().as_deref(), Some(messages::auth::REQUIRED_FIELDS));
        assert!(!session.state.is_loading());
    }

    #[tokio::test]
    async fn test_login_success_stores_tokens() {
        let session = controller();
        session
            .http
            .mock_response(HttpMethod::Post, LOGIN_URL, 200, token_body("a1", "r1"));

        assert!(session.login(&credentials("admin@shop.test", "secret")).await);
        assert_eq!(session.phase(), SessionPhase::Authenticated);
        assert_eq!(session.tokens.authorization().as_deref(), Some("Bearer a1"));
        assert_eq!(session.state.success().as_deref(), Some("ok"));

        let req = session.http.last_request().unwrap();
        assert_eq!(req.header(HEADER_TUNNEL_BYPASS), Some("true"));
        assert_eq!(req.json_body()["email"], "admin@shop.test");
    }

    #[tokio::test]
    async fn test_login_without_token_fails() {
        let session = controller();
        session.http.mock_response(
            HttpMethod::Post,
            LOGIN_URL,
            200,
            json!({"code": "200", "message": "", "data": {"access_token": ""}}),
        );

        assert!(!session.login(&credentials("admin@shop.test", "secret")).await);
        assert_eq!(session.phase(), SessionPhase::Anonymous);
        assert_eq!(session.state.error().as_deref(), Some(messages::auth::LOGIN_ERROR));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_error_message_from_body() {
        let session = controller();
        session.http.mock_response(
            HttpMethod::Post,
            LOGIN_URL,
            401,
            json!({"code": "401", "message": "invalid credentials"}),
        );

        assert!(!session.login(&credentials("admin@shop.test", "wrong")).await);
        assert_eq!(session.state.error().as_deref(), Some("invalid credentials"));
        assert_eq!(session.http.total_requests(), 1);
        assert!(!session.state.is_loading());
    }

    #[tokio::test]
    async fn test_refresh_without_token_skips_network() {
        let session = controller();
        assert!(!session.refresh_access_token().await);
        assert_eq!(session.http.total_requests(), 0);
    }

    #[tokio::test]
    async fn test_refresh_success_replaces_tokens() {
        let session = controller();
        session
            .http
            .mock_response(HttpMethod::Post, LOGIN_URL, 200, token_body("a1", "r1"));
        session
            .http
            .mock_response(HttpMethod::Post, REFRESH_URL, 200, token_body("a2", "r2"));
        session.login(&credentials("admin@shop.test", "secret")).await;

        assert!(session.refresh_access_token().await);
        assert_eq!(session.tokens.access_token().as_deref(), Some("a2"));
        assert_eq!(session.tokens.refresh_token().as_deref(), Some("r2"));
        assert_eq!(session.phase(), SessionPhase::Authenticated);

        let req = session.http.last_request().unwrap();
        assert_eq!(req.json_body(), json!({"refresh_token": "r1"}));
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_tokens() {
        let session = controller();
        session
            .http
            .mock_response(HttpMethod::Post, LOGIN_URL, 200, token_body("a1", "r1"));
        session
            .http
            .mock_response(HttpMethod::Post, REFRESH_URL, 401, json!({"code": "401"}));
        session.login(&credentials("admin@shop.test", "secret")).await;
        let success_before = session.state.success();

        assert!(!session.refresh_access_token().await);
        assert_eq!(session.tokens.access_token().as_deref(), Some("a1"));
        assert_eq!(session.phase(), SessionPhase::Authenticated);
        assert_eq!(session.state.success(), success_before);
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let session = controller();
        session
            .http
            .mock_response(HttpMethod::Post, LOGIN_URL, 200, token_body("a1", "r1"));
        session.login(&credentials("admin@shop.test", "secret")).await;

        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.tokens.refresh_token().is_none());
        assert!(session.state.success().is_none());
        assert_eq!(session.phase(), SessionPhase::Anonymous);
    }
}
