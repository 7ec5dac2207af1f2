//! 资源访问器
//!
//! `Collection` 封装了列表类资源的通用增删改查流程，各实体只需要提供接口路径。
//! 所有操作都遵循同一套状态规则：
//! - 开始前清除上一次的消息并设置加载标记
//! - 成功时整体替换实体状态
//! - 失败时只写错误消息，实体状态保持不变
//! - 返回值中只有会话失效是 `Err`

use crate::client::ApiClient;
use crate::error::{ApiError, Outcome};
use crate::messages::{CRUD, CrudMessages};
use crate::request::{HttpClient, HttpMethod};
use crate::state::ResourceState;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shopadmin_shared::{Envelope, Paginate, QueryParams};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub mod catalog;
pub mod contact;
pub mod orders;
pub mod products;
pub mod profile;
pub mod stocks;

pub use catalog::{Categories, Statuses, Tiers};
pub use contact::{ContactMessages, ContactReplies};
pub use orders::Orders;
pub use products::{ProductDetails, ProductImages, Products};
pub use profile::Profile;
pub use stocks::ProductStocks;

/// 成功消息：优先使用信封消息
pub(crate) fn success_message<T>(envelope: &Envelope<T>, fallback: &str) -> String {
    envelope.message().unwrap_or(fallback).to_string()
}

/// 通用列表资源
pub struct Collection<C: HttpClient, T> {
    client: Rc<ApiClient<C>>,
    path: &'static str,
    messages: CrudMessages,
    items: RefCell<Vec<T>>,
    paginate: Cell<Paginate>,
    state: ResourceState,
}

impl<C: HttpClient, T: DeserializeOwned + Clone> Collection<C, T> {
    pub fn new(client: Rc<ApiClient<C>>, path: &'static str) -> Self {
        Self::with_messages(client, path, CRUD)
    }

    pub fn with_messages(client: Rc<ApiClient<C>>, path: &'static str, messages: CrudMessages) -> Self {
        Self {
            client,
            path,
            messages,
            items: RefCell::new(Vec::new()),
            paginate: Cell::new(Paginate::default()),
            state: ResourceState::new(),
        }
    }

    pub fn items(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn paginate(&self) -> Paginate {
        self.paginate.get()
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    pub fn client(&self) -> &ApiClient<C> {
        &self.client
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    /// 读取列表，成功时替换列表和分页
    pub async fn fetch_list<Q: QueryParams + ?Sized>(&self, params: &Q) -> Outcome<bool> {
        let _loading = self.state.begin();

        match self.list(params).await {
            Ok(envelope) => {
                let items = envelope.data.unwrap_or_default();
                let paginate = envelope
                    .paginate
                    .unwrap_or_else(|| Paginate::fallback(params.page_size(), items.len()));
                self.items.replace(items);
                self.paginate.set(paginate);
                Ok(true)
            }
            Err(err) => {
                self.state.reject(err, self.messages.load_error)?;
                Ok(false)
            }
        }
    }

    async fn list<Q: QueryParams + ?Sized>(&self, params: &Q) -> Result<Envelope<Vec<T>>, ApiError> {
        let url = self.client.endpoint(self.path, &[""], &params.query_pairs())?;
        self.client.call(HttpMethod::Get, &url, None).await
    }

    /// 读取单个实体
    pub async fn fetch_one(&self, id: &str) -> Outcome<Option<T>> {
        let _loading = self.state.begin();

        let result = match self.client.endpoint(self.path, &[id], &[]) {
            Ok(url) => self.client.call::<T>(HttpMethod::Get, &url, None).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(envelope) => Ok(envelope.data),
            Err(err) => {
                self.state.reject(err, self.messages.load_error)?;
                Ok(None)
            }
        }
    }

    pub async fn create<P: Serialize + ?Sized>(&self, payload: &P) -> Outcome<bool> {
        let url = self.client.endpoint(self.path, &[""], &[]);
        self.mutate(HttpMethod::Post, url, Some(payload), self.messages.create_success, self.messages.create_error)
            .await
    }

    /// PATCH 更新
    pub async fn update<P: Serialize + ?Sized>(&self, id: &str, payload: &P) -> Outcome<bool> {
        let url = self.client.endpoint(self.path, &[id], &[]);
        self.mutate(HttpMethod::Patch, url, Some(payload), self.messages.update_success, self.messages.update_error)
            .await
    }

    pub async fn remove(&self, id: &str) -> Outcome<bool> {
        let url = self.client.endpoint(self.path, &[id], &[]);
        self.mutate::<()>(HttpMethod::Delete, url, None, self.messages.delete_success, self.messages.delete_error)
            .await
    }

    async fn mutate<P: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        url: Result<String, ApiError>,
        payload: Option<&P>,
        success: &str,
        failure: &str,
    ) -> Outcome<bool> {
        let _loading = self.state.begin();

        match send_mutation(&self.client, method, url, payload).await {
            Ok(envelope) => {
                self.state.succeed(success_message(&envelope, success));
                Ok(true)
            }
            Err(err) => {
                self.state.reject(err, failure)?;
                Ok(false)
            }
        }
    }
}

/// 发送写操作，响应数据不关心
pub(crate) async fn send_mutation<C: HttpClient, P: Serialize + ?Sized>(
    client: &ApiClient<C>,
    method: HttpMethod,
    url: Result<String, ApiError>,
    payload: Option<&P>,
) -> Result<Envelope<serde_json::Value>, ApiError> {
    let url = url?;
    match payload {
        Some(payload) => client.call_with(method, &url, payload).await,
        None => client.call(method, &url, None).await,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::client::ApiClient;
    use crate::config::ClientConfig;
    use crate::navigation::RouterService;
    use crate::request::MockHttpClient;
    use crate::storage::TokenStore;
    use shopadmin_shared::{AuthTokenData, EpochSecs};
    use std::rc::Rc;

    pub const BASE: &str = "http://api.test";

    /// 已登录的客户端
    pub fn client() -> Rc<ApiClient<MockHttpClient>> {
        let later = EpochSecs::now().as_secs() + 3_600;
        let tokens = Rc::new(TokenStore::in_memory(false));
        tokens.set(&AuthTokenData {
            access_token: "a1".to_string(),
            refresh_token: "r1".to_string(),
            token_type: "Bearer".to_string(),
            access_expires_at: EpochSecs::new(later),
            refresh_expires_at: EpochSecs::new(later),
        });

        Rc::new(ApiClient::new(
            ClientConfig::new(BASE),
            MockHttpClient::new(),
            tokens,
            Rc::new(RouterService::default()),
        ))
    }

    pub fn url(path_and_query: &str) -> String {
        format!("{}{}", BASE, path_and_query)
    }
}
