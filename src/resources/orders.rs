//! 订单
//!
//! 除了列表和详情，订单还聚合了明细、时间线、付款凭证、会员银行账户，
//! 以及看板用的快速队列统计（见 `queue` 模块）。
//! 订单接口的错误消息统一经过 `normalize_order_message`。

use super::{send_mutation, success_message};
use crate::client::ApiClient;
use crate::enrich;
use crate::error::{ApiError, ApiResult, Outcome};
use crate::messages::{self, CRUD, normalize_order_message};
use crate::queue::{self, QuickQueue};
use crate::request::{HttpClient, HttpMethod};
use crate::state::{LoadingFlag, ResourceState};
use serde::de::DeserializeOwned;
use shopadmin_shared::{
    MemberBankItem, Order, OrderItem, OrderListParams, OrderPaymentDetail, OrderStatus,
    OrderTimelineItem, PAYMENT_FILE_ENTITY, Paginate, QueryParams, StorageFileItem,
    SystemPaymentItem, UpdateOrderStatusPayload, paths,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;


/// 读取单个订单全部明细时的页大小
const ALL_ITEMS_PAGE_SIZE: u64 = 200;
const MEMBER_BANKS_PAGE_SIZE: u64 = 100;

/// 状态变更附带的可选信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    pub shipping_tracking_no: Option<String>,
    pub cancel_reason: Option<String>,
    pub refund_reason: Option<String>,
}

#[derive(serde::Serialize)]
struct RejectPayment<'a> {
    reason: &'a str,
}

pub struct Orders<C: HttpClient> {
    client: Rc<ApiClient<C>>,
    orders: RefCell<Vec<Order>>,
    order_items: RefCell<Vec<OrderItem>>,
    timeline: RefCell<Vec<OrderTimelineItem>>,
    paginate: Cell<Paginate>,
    items_paginate: Cell<Paginate>,
    items_loading: LoadingFlag,
    state: ResourceState,
}

impl<C: HttpClient> Orders<C> {
    pub fn new(client: Rc<ApiClient<C>>) -> Self {
        Self {
            client,
            orders: RefCell::new(Vec::new()),
            order_items: RefCell::new(Vec::new()),
            timeline: RefCell::new(Vec::new()),
            paginate: Cell::new(Paginate::default()),
            items_paginate: Cell::new(Paginate::default()),
            items_loading: LoadingFlag::default(),
            state: ResourceState::new(),
        }
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders.borrow().clone()
    }

    pub fn order_items(&self) -> Vec<OrderItem> {
        self.order_items.borrow().clone()
    }

    pub fn timeline(&self) -> Vec<OrderTimelineItem> {
        self.timeline.borrow().clone()
    }

    pub fn paginate(&self) -> Paginate {
        self.paginate.get()
    }

    pub fn items_paginate(&self) -> Paginate {
        self.items_paginate.get()
    }

    pub fn is_items_loading(&self) -> bool {
        self.items_loading.is_loading()
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    fn reject(&self, err: ApiError, fallback: &str) -> Outcome<()> {
        let err = err.into_expired()?;
        self.state
            .fail(normalize_order_message(&err.user_message(""), fallback));
        Ok(())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        segments: &[&str],
        query: &[(&'static str, String)],
    ) -> ApiResult<shopadmin_shared::Envelope<T>> {
        let url = self.client.endpoint(path, segments, query)?;
        self.client.call(HttpMethod::Get, &url, None).await
    }

    // =========================================================
    // 查询
    // =========================================================

    pub async fn fetch_orders(&self, params: &OrderListParams) -> Outcome<bool> {
        let _loading = self.state.begin();

        match self
            .get::<Vec<Order>>(paths::ORDERS, &[""], &params.query_pairs())
            .await
        {
            Ok(envelope) => {
                let orders = envelope.data.unwrap_or_default();
                let paginate = envelope
                    .paginate
                    .unwrap_or_else(|| Paginate::fallback(params.page_size(), orders.len()));
                self.orders.replace(orders);
                self.paginate.set(paginate);
                Ok(true)
            }
            Err(err) => {
                self.reject(err, CRUD.load_error)?;
                Ok(false)
            }
        }
    }

    /// 读取单个订单，不改动列表
    pub async fn fetch_order(&self, id: &str) -> Outcome<Option<Order>> {
        let _loading = self.state.begin();

        match self.get::<Order>(paths::ORDERS, &[id], &[]).await {
            Ok(envelope) => Ok(envelope.data),
            Err(err) => {
                self.reject(err, CRUD.load_error)?;
                Ok(None)
            }
        }
    }

    /// 读取订单明细的一页并补全商品名称
    pub async fn fetch_order_items(&self, id: &str, page: u64, size: u64) -> Outcome<bool> {
        let _loading = self.items_loading.start();
        self.state.clear_messages();

        match self.load_items(id, page, size).await {
            Ok(envelope) => {
                let items = enrich::enrich_order_items(
                    &self.client,
                    envelope.data.unwrap_or_default(),
                )
                .await;
                let paginate = envelope
                    .paginate
                    .unwrap_or_else(|| Paginate::fallback(size, items.len()));
                self.order_items.replace(items);
                self.items_paginate.set(paginate);
                Ok(true)
            }
            Err(err) => {
                self.reject(err, CRUD.load_error)?;
                Ok(false)
            }
        }
    }

    /// 一次读取订单的全部明细（补全后直接返回，不写入状态）
    pub async fn fetch_all_order_items(&self, id: &str) -> Outcome<Vec<OrderItem>> {
        let _loading = self.state.begin_keep_success();

        match self.load_items(id, 1, ALL_ITEMS_PAGE_SIZE).await {
            Ok(envelope) => {
                Ok(enrich::enrich_order_items(&self.client, envelope.data.unwrap_or_default()).await)
            }
            Err(err) => {
                self.reject(err, CRUD.load_error)?;
                Ok(Vec::new())
            }
        }
    }

    async fn load_items(
        &self,
        id: &str,
        page: u64,
        size: u64,
    ) -> ApiResult<shopadmin_shared::Envelope<Vec<OrderItem>>> {
        let query = [("page", page.max(1).to_string()), ("size", size.max(1).to_string())];
        self.get(paths::ORDERS, &[id, "items"], &query).await
    }

    pub async fn fetch_timeline(&self, id: &str) -> Outcome<bool> {
        let _loading = self.state.begin_keep_success();

        match self
            .get::<Vec<OrderTimelineItem>>(paths::ORDERS, &[id, "timeline"], &[])
            .await
        {
            Ok(envelope) => {
                self.timeline.replace(envelope.data.unwrap_or_default());
                Ok(true)
            }
            Err(err) => {
                self.reject(err, CRUD.load_error)?;
                Ok(false)
            }
        }
    }

    /// 付款记录与付款凭证
    ///
    /// 两个查询互不影响，任何一个失败都只返回空值
    pub async fn fetch_payment_detail(&self, order: &Order) -> OrderPaymentDetail {
        let payment_id = order.payment_id.trim();
        if payment_id.is_empty() {
            return OrderPaymentDetail::default();
        }

        let payment_segments = [payment_id];
        let storage_query = [("ref_id", payment_id.to_string())];
        let (payment, slips) = futures::join!(
            self.get::<SystemPaymentItem>(paths::PAYMENTS, &payment_segments, &[]),
            self.get::<Vec<StorageFileItem>>(paths::STORAGES, &[], &storage_query),
        );

        let payment = payment
            .map_err(|err| tracing::warn!(payment_id, error = %err, "payment lookup failed"))
            .ok()
            .and_then(|envelope| envelope.data);

        let slips = slips
            .map_err(|err| tracing::warn!(payment_id, error = %err, "payment slip lookup failed"))
            .ok()
            .and_then(|envelope| envelope.data)
            .unwrap_or_default()
            .into_iter()
            .filter(|file| file.related_entity.trim().eq_ignore_ascii_case(PAYMENT_FILE_ENTITY))
            .collect();

        OrderPaymentDetail { payment, slips }
    }

    /// 会员的银行账户，补全银行名称并把默认账户排在最前，失败时返回空列表
    pub async fn fetch_member_banks(&self, member_id: &str) -> Vec<MemberBankItem> {
        let member_id = member_id.trim();
        if member_id.is_empty() {
            return Vec::new();
        }

        let query = [
            ("page", "1".to_string()),
            ("size", MEMBER_BANKS_PAGE_SIZE.to_string()),
        ];
        match self
            .get::<Vec<MemberBankItem>>(paths::MEMBERS, &[member_id, "banks", ""], &query)
            .await
        {
            Ok(envelope) => {
                let banks = envelope
                    .data
                    .unwrap_or_default()
                    .into_iter()
                    .map(|mut bank| {
                        bank.bank_name_th.clear();
                        bank.bank_name_en.clear();
                        bank
                    })
                    .collect();
                enrich::enrich_member_banks(&self.client, banks).await
            }
            Err(err) => {
                tracing::warn!(member_id, error = %err, "member bank lookup failed");
                Vec::new()
            }
        }
    }

    /// 看板快速队列
    pub async fn fetch_quick_queue(&self, filter: Option<OrderStatus>) -> QuickQueue {
        queue::load_quick_queue(&self.client, filter).await
    }

    // =========================================================
    // 写操作
    // =========================================================

    /// 变更订单状态，发送完整的订单字段
    pub async fn update_status(
        &self,
        order: &Order,
        status: OrderStatus,
        update: &StatusUpdate,
    ) -> Outcome<bool> {
        let payload = UpdateOrderStatusPayload {
            member_id: order.member_id.clone(),
            payment_id: order.payment_id.clone(),
            address_id: order.address_id.clone(),
            status,
            shipping_tracking_no: update.shipping_tracking_no.clone().unwrap_or_default(),
            cancel_reason: update.cancel_reason.clone().unwrap_or_default(),
            refund_reason: update.refund_reason.clone().unwrap_or_default(),
            total_amount: order.total_amount.to_string(),
            discount_amount: order.discount_amount.to_string(),
            net_amount: order.net_amount.to_string(),
        };

        let url = self.client.endpoint(paths::ORDERS, &[order.id.as_str()], &[]);
        self.write(url, Some(&payload), CRUD.update_success, CRUD.update_error)
            .await
    }

    pub async fn approve_payment(&self, id: &str) -> Outcome<bool> {
        let url = self.client.endpoint(paths::ORDERS, &[id, "payment", "approve"], &[]);
        self.write::<()>(
            url,
            None,
            messages::payment::APPROVE_SUCCESS,
            messages::payment::APPROVE_ERROR,
        )
        .await
    }

    pub async fn reject_payment(&self, id: &str, reason: &str) -> Outcome<bool> {
        let url = self.client.endpoint(paths::ORDERS, &[id, "payment", "reject"], &[]);
        self.write(
            url,
            Some(&RejectPayment { reason }),
            messages::payment::REJECT_SUCCESS,
            messages::payment::REJECT_ERROR,
        )
        .await
    }

    /// 订单写操作都是 PATCH
    async fn write<P: serde::Serialize + ?Sized>(
        &self,
        url: ApiResult<String>,
        payload: Option<&P>,
        success: &str,
        failure: &str,
    ) -> Outcome<bool> {
        let _loading = self.state.begin();

        match send_mutation(&self.client, HttpMethod::Patch, url, payload).await {
            Ok(envelope) => {
                self.state.succeed(success_message(&envelope, success));
                Ok(true)
            }
            Err(err) => {
                self.reject(err, failure)?;
                Ok(false)
            }
        }
    }
}
