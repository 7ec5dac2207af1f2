//! 商店后台 API 客户端
//!
//! 模块分层（从底层到上层）：
//! - `request`: HTTP 传输抽象
//! - `storage`: 令牌的双份持久化（Cookie + 本地存储）
//! - `auth`: 登录、登出、刷新令牌
//! - `client`: 带认证头、401 自动刷新重试的请求客户端
//! - `resources`: 各实体的访问器与加载/错误/成功状态
//! - `enrich` / `queue`: 关联数据补全与订单快速队列
//!
//! 宿主（桌面、TUI 或服务端渲染）通过 `AdminApi` 拿到各个访问器，
//! 自行决定如何渲染状态。库本身不安装 tracing subscriber。

pub mod auth;
pub mod client;
pub mod config;
pub mod enrich;
pub mod error;
pub mod messages;
pub mod navigation;
pub mod queue;
pub mod request;
pub mod resources;
pub mod state;
pub mod storage;

pub use shopadmin_shared as shared;

pub use auth::{SessionController, SessionPhase};
pub use client::ApiClient;
pub use config::{ClientConfig, EnvVarSource, VarSource};
pub use error::{ApiError, ApiResult, ConfigError, Outcome, SessionExpired, StorageError};
pub use navigation::{Navigator, RouterService};
pub use queue::QuickQueue;
pub use request::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use resources::orders::StatusUpdate;
pub use state::{LoadingFlag, ResourceState};
pub use storage::{CookieJar, JsonFileStorage, MemoryStorage, TokenBackend, TokenKey, TokenStore};

use crate::resources::{
    Categories, ContactMessages, ContactReplies, Orders, ProductDetails, ProductImages,
    ProductStocks, Products, Profile, Statuses, Tiers,
};
use std::rc::Rc;

// =========================================================
// 应用上下文
// =========================================================

/// 共享同一个请求客户端的访问器工厂
///
/// 访问器各自持有状态，宿主按页面创建，页面销毁时一并丢弃
pub struct AdminApi<C: HttpClient> {
    client: Rc<ApiClient<C>>,
}

impl<C: HttpClient> Clone for AdminApi<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

impl AdminApi<ReqwestHttpClient> {
    /// 使用 reqwest 传输
    pub fn connect(
        config: ClientConfig,
        tokens: Rc<TokenStore>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        tracing::info!(base_url = %config.api_base_url, production = config.production, "admin api ready");
        Self::new(ApiClient::new(
            config,
            ReqwestHttpClient::new(),
            tokens,
            navigator,
        ))
    }
}

impl<C: HttpClient> AdminApi<C> {
    pub fn new(client: ApiClient<C>) -> Self {
        Self {
            client: Rc::new(client),
        }
    }

    pub fn client(&self) -> &Rc<ApiClient<C>> {
        &self.client
    }

    pub fn session(&self) -> &SessionController<C> {
        self.client.session()
    }

    pub fn statuses(&self) -> Statuses<C> {
        resources::catalog::statuses(self.client.clone())
    }

    pub fn tiers(&self) -> Tiers<C> {
        resources::catalog::tiers(self.client.clone())
    }

    pub fn categories(&self) -> Categories<C> {
        resources::catalog::categories(self.client.clone())
    }

    pub fn products(&self) -> Products<C> {
        resources::products::products(self.client.clone())
    }

    pub fn product_images(&self) -> ProductImages<C> {
        ProductImages::new(self.client.clone())
    }

    pub fn product_details(&self) -> ProductDetails<C> {
        ProductDetails::new(self.client.clone())
    }

    pub fn product_stocks(&self) -> ProductStocks<C> {
        ProductStocks::new(self.client.clone())
    }

    pub fn orders(&self) -> Orders<C> {
        Orders::new(self.client.clone())
    }

    pub fn contact_messages(&self) -> ContactMessages<C> {
        ContactMessages::new(self.client.clone())
    }

    pub fn contact_replies(&self) -> ContactReplies<C> {
        ContactReplies::new(self.client.clone())
    }

    pub fn profile(&self) -> Profile<C> {
        Profile::new(self.client.clone())
    }
}
