//! 认证请求客户端
//!
//! 所有受保护接口都经过这里：
//! 1. 附加认证头和隧道绕过头
//! 2. 遇到未授权错误时刷新令牌
//! 3. 刷新成功则用新令牌重发一次，刷新失败则登出并跳转到匿名页面
//! 4. 校验响应信封

use crate::auth::SessionController;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, SessionExpired};
use crate::navigation::Navigator;
use crate::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::storage::TokenStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shopadmin_shared::{Envelope, HEADER_AUTHORIZATION, HEADER_TUNNEL_BYPASS};
use std::rc::Rc;
use url::Url;

#[cfg(test)]
mod tests;

pub struct ApiClient<C: HttpClient> {
    config: Rc<ClientConfig>,
    http: Rc<C>,
    tokens: Rc<TokenStore>,
    navigator: Rc<dyn Navigator>,
    session: SessionController<C>,
}

impl<C: HttpClient> ApiClient<C> {
    pub fn new(
        config: ClientConfig,
        http: C,
        tokens: Rc<TokenStore>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        let config = Rc::new(config);
        let http = Rc::new(http);
        let session = SessionController::new(http.clone(), config.clone(), tokens.clone());
        Self {
            config,
            http,
            tokens,
            navigator,
            session,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn session(&self) -> &SessionController<C> {
        &self.session
    }

    // =========================================================
    // 地址构造
    // =========================================================

    /// 构造接口地址
    ///
    /// `segments` 逐段转义后追加在 `path` 之后，空字符串表示保留末尾 `/`
    pub fn endpoint(
        &self,
        path: &str,
        segments: &[&str],
        query: &[(&'static str, String)],
    ) -> ApiResult<String> {
        let mut url = Url::parse(&self.config.api_base_url)
            .map_err(|e| ApiError::Validation(format!("invalid api base url: {}", e)))?;

        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| ApiError::Validation("api base url cannot be a base".to_string()))?;
            parts.pop_if_empty();
            parts.extend(path.split('/').filter(|s| !s.is_empty()));
            if segments.is_empty() {
                if path.ends_with('/') {
                    parts.push("");
                }
            } else {
                parts.extend(segments);
            }
        }

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url.to_string())
    }

    // =========================================================
    // 请求
    // =========================================================

    /// 发送请求并在未授权时刷新重试
    ///
    /// 刷新成功后只重发一次，重发的结果原样返回
    pub async fn request(&self, template: &HttpRequest) -> ApiResult<HttpResponse> {
        let err = match self.dispatch(template).await {
            Err(err) if err.is_unauthorized() => err,
            other => return other,
        };

        if self.session.refresh_access_token().await {
            tracing::debug!(url = %template.url, "retrying with refreshed token");
            return self.dispatch(template).await;
        }

        tracing::warn!(url = %template.url, "session expired, redirecting to anonymous route");
        self.session.logout();
        self.navigator.navigate(&self.config.anonymous_route);
        Err(SessionExpired::new(err).into())
    }

    /// 单次发送：每次都重新读取令牌
    async fn dispatch(&self, template: &HttpRequest) -> ApiResult<HttpResponse> {
        let mut req = template.clone();
        if let Some(authorization) = self.tokens.authorization() {
            req.headers
                .insert(HEADER_AUTHORIZATION.to_string(), authorization);
        }
        if self.config.tunnel_bypass {
            req.headers
                .insert(HEADER_TUNNEL_BYPASS.to_string(), "true".to_string());
        }

        let method = req.method;
        let url = req.url.clone();
        let resp = self.http.send(req).await?;
        tracing::debug!(method = method.as_str(), url = %url, status = resp.status, "api request");

        if resp.is_success() {
            Ok(resp)
        } else {
            Err(ApiError::http(resp.status, &resp.body))
        }
    }

    /// 请求并校验信封
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<Envelope<T>> {
        let mut req = HttpRequest::new(url, method);
        if let Some(body) = body {
            req = req.with_body(body);
        }

        let resp = self.request(&req).await?;
        let envelope: Envelope<T> = resp.json()?;
        ensure_success(envelope)
    }

    pub async fn call_with<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        url: &str,
        payload: &B,
    ) -> ApiResult<Envelope<T>> {
        let body = serde_json::to_value(payload)?;
        self.call(method, url, Some(body)).await
    }
}

/// 信封 code 不是成功码时转换为 `Domain` 错误
pub fn ensure_success<T>(envelope: Envelope<T>) -> ApiResult<Envelope<T>> {
    if envelope.is_success() {
        Ok(envelope)
    } else {
        Err(ApiError::Domain {
            code: envelope.code,
            message: envelope.message,
        })
    }
}
