//! 商品及其子资源：图片、详情

use super::{Collection, send_mutation, success_message};
use crate::client::ApiClient;
use crate::error::Outcome;
use crate::messages::{self, CRUD};
use crate::request::{HttpClient, HttpMethod};
use crate::state::{LoadingFlag, ResourceState};
use shopadmin_shared::{
    ProductDetailItem, ProductDetailPayload, ProductImageItem, ProductImageUploadPayload,
    ProductItem, paths,
};
use std::cell::RefCell;
use std::rc::Rc;

const IMAGES: &str = "images";
const DETAIL: &str = "detail";

pub type Products<C> = Collection<C, ProductItem>;

pub fn products<C: HttpClient>(client: Rc<ApiClient<C>>) -> Products<C> {
    Collection::new(client, paths::PRODUCTS)
}

// =========================================================
// 商品图片
// =========================================================

pub struct ProductImages<C: HttpClient> {
    client: Rc<ApiClient<C>>,
    images: RefCell<Vec<ProductImageItem>>,
    uploading: LoadingFlag,
    /// 正在删除的图片 id，空字符串表示没有
    deleting_image_id: RefCell<String>,
    state: ResourceState,
}

impl<C: HttpClient> ProductImages<C> {
    pub fn new(client: Rc<ApiClient<C>>) -> Self {
        Self {
            client,
            images: RefCell::new(Vec::new()),
            uploading: LoadingFlag::default(),
            deleting_image_id: RefCell::new(String::new()),
            state: ResourceState::new(),
        }
    }

    pub fn images(&self) -> Vec<ProductImageItem> {
        self.images.borrow().clone()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.is_loading()
    }

    pub fn deleting_image_id(&self) -> Option<String> {
        let id = self.deleting_image_id.borrow();
        (!id.is_empty()).then(|| id.clone())
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    /// 读取图片列表，失败时保留已有列表
    ///
    /// 只清除错误消息：上传、删除成功后会重新加载，成功消息需要保留
    pub async fn fetch_images(&self, product_id: &str) -> Outcome<bool> {
        let _loading = self.state.begin_keep_success();

        let result = match self.client.endpoint(paths::PRODUCTS, &[product_id, IMAGES], &[]) {
            Ok(url) => {
                self.client
                    .call::<Vec<ProductImageItem>>(HttpMethod::Get, &url, None)
                    .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(envelope) => {
                self.images.replace(envelope.data.unwrap_or_default());
                Ok(true)
            }
            Err(err) => {
                let err = err.into_expired()?;
                self.state
                    .fail(err.user_message(messages::product_image::LOAD_ERROR));
                Ok(false)
            }
        }
    }

    /// 上传图片（base64 内容），成功后重新加载列表
    pub async fn upload_image(
        &self,
        product_id: &str,
        payload: &ProductImageUploadPayload,
    ) -> Outcome<Option<ProductImageItem>> {
        let _uploading = self.uploading.start();
        self.state.clear_messages();

        let result = match self.client.endpoint(paths::PRODUCTS, &[product_id, IMAGES], &[]) {
            Ok(url) => {
                self.client
                    .call_with::<ProductImageItem, _>(HttpMethod::Post, &url, payload)
                    .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(envelope) => {
                self.state.succeed(success_message(
                    &envelope,
                    messages::product_image::UPLOAD_SUCCESS,
                ));
                self.fetch_images(product_id).await?;
                Ok(envelope.data)
            }
            Err(err) => {
                self.state
                    .reject(err, messages::product_image::UPLOAD_ERROR)?;
                Ok(None)
            }
        }
    }

    /// 删除单张图片，图片 id 为空时直接返回 false
    pub async fn delete_image(&self, product_id: &str, image_id: &str) -> Outcome<bool> {
        let image_id = image_id.trim();
        if image_id.is_empty() {
            return Ok(false);
        }

        self.deleting_image_id.replace(image_id.to_string());
        let _loading = self.state.begin();
        let outcome = self.delete_image_inner(product_id, image_id).await;
        self.deleting_image_id.replace(String::new());
        outcome
    }

    async fn delete_image_inner(&self, product_id: &str, image_id: &str) -> Outcome<bool> {
        let url = self
            .client
            .endpoint(paths::PRODUCTS, &[product_id, IMAGES, image_id], &[]);

        match send_mutation::<_, ()>(&self.client, HttpMethod::Delete, url, None).await {
            Ok(envelope) => {
                self.state.succeed(success_message(
                    &envelope,
                    messages::product_image::DELETE_SUCCESS,
                ));
                self.fetch_images(product_id).await?;
                Ok(true)
            }
            Err(err) => {
                self.state
                    .reject(err, messages::product_image::DELETE_ERROR)?;
                Ok(false)
            }
        }
    }
}

// =========================================================
// 商品详情
// =========================================================

pub struct ProductDetails<C: HttpClient> {
    client: Rc<ApiClient<C>>,
    detail: RefCell<Option<ProductDetailItem>>,
    state: ResourceState,
}

impl<C: HttpClient> ProductDetails<C> {
    pub fn new(client: Rc<ApiClient<C>>) -> Self {
        Self {
            client,
            detail: RefCell::new(None),
            state: ResourceState::new(),
        }
    }

    pub fn detail(&self) -> Option<ProductDetailItem> {
        self.detail.borrow().clone()
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    /// 读取详情，失败时不提示也不改动已有详情（商品可能还没有详情）
    pub async fn fetch_detail(&self, product_id: &str) -> Outcome<bool> {
        let _loading = self.state.begin();

        let result = match self.client.endpoint(paths::PRODUCTS, &[product_id, DETAIL], &[]) {
            Ok(url) => {
                self.client
                    .call::<ProductDetailItem>(HttpMethod::Get, &url, None)
                    .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(envelope) => {
                self.detail.replace(envelope.data);
                Ok(true)
            }
            Err(err) => {
                err.into_expired()?;
                Ok(false)
            }
        }
    }

    pub async fn create_detail(&self, product_id: &str, payload: &ProductDetailPayload) -> Outcome<bool> {
        self.write(product_id, HttpMethod::Post, Some(payload), CRUD.create_success, CRUD.create_error)
            .await
    }

    pub async fn update_detail(&self, product_id: &str, payload: &ProductDetailPayload) -> Outcome<bool> {
        self.write(product_id, HttpMethod::Patch, Some(payload), CRUD.update_success, CRUD.update_error)
            .await
    }

    /// 删除成功后清空本地详情
    pub async fn delete_detail(&self, product_id: &str) -> Outcome<bool> {
        let deleted = self
            .write(product_id, HttpMethod::Delete, None, CRUD.delete_success, CRUD.delete_error)
            .await?;
        if deleted {
            self.detail.replace(None);
        }
        Ok(deleted)
    }

    async fn write(
        &self,
        product_id: &str,
        method: HttpMethod,
        payload: Option<&ProductDetailPayload>,
        success: &str,
        failure: &str,
    ) -> Outcome<bool> {
        let _loading = self.state.begin();

        let url = self.client.endpoint(paths::PRODUCTS, &[product_id, DETAIL], &[]);
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
