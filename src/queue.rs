//! 订单快速队列
//!
//! 看板上按状态统计订单数量，并把待处理订单细分为：
//! - 等待审核：买家已提交付款凭证
//! - 等待重新付款：付款被拒且尚未重新提交
//!
//! 细分需要逐页读取待处理订单。页数只有读完第 1 页才知道，
//! 因此后续页按顺序读取，并设置页数上限，防止服务端返回异常的总数。

use crate::client::ApiClient;
use crate::request::{HttpClient, HttpMethod};
use futures::future::join_all;
use shopadmin_shared::{Order, OrderListParams, OrderStatus, Paginate, QueryParams, paths};


/// 无筛选时单独统计的状态
pub const QUEUE_STATUSES: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Paid,
    OrderStatus::RefundRequested,
    OrderStatus::Shipping,
    OrderStatus::Completed,
];

/// 细分待处理订单时的页大小
pub const PENDING_PAGE_SIZE: u64 = 100;
/// 细分待处理订单时最多读取的页数
pub const MAX_PENDING_PAGES: u64 = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuickQueue {
    pub total: u64,
    pub pending: u64,
    pub paid: u64,
    pub refund_requested: u64,
    pub shipping: u64,
    pub completed: u64,
    pub waiting_review: u64,
    pub waiting_repay: u64,
}

impl QuickQueue {
    fn set_bucket(&mut self, status: OrderStatus, count: u64) {
        match status {
            OrderStatus::Pending => self.pending = count,
            OrderStatus::Paid => self.paid = count,
            OrderStatus::RefundRequested => self.refund_requested = count,
            OrderStatus::Shipping => self.shipping = count,
            OrderStatus::Completed => self.completed = count,
            // 没有对应的计数项
            OrderStatus::Cancelled | OrderStatus::Unknown => {}
        }
    }

    fn classify(&mut self, order: &Order) {
        if order.payment_submitted {
            self.waiting_review += 1;
        } else if order.payment_rejected {
            self.waiting_repay += 1;
        }
    }
}

/// 统计快速队列
///
/// - 有筛选：只统计总数和筛选状态
/// - 无筛选：总数和 `QUEUE_STATUSES` 并发统计
///
/// 无筛选或筛选为待处理时，额外细分待处理订单。统计失败的项记为 0。
pub async fn load_quick_queue<C: HttpClient>(
    client: &ApiClient<C>,
    filter: Option<OrderStatus>,
) -> QuickQueue {
    let mut queue = QuickQueue::default();

    match filter {
        Some(status) => {
            let (total, count) =
                futures::join!(count_orders(client, None), count_orders(client, Some(status)));
            queue.total = total;
            queue.set_bucket(status, count);
        }
        None => {
            let per_status = join_all(
                QUEUE_STATUSES
                    .iter()
                    .map(|status| count_orders(client, Some(*status))),
            );
            let (total, counts) = futures::join!(count_orders(client, None), per_status);
            queue.total = total;
            for (status, count) in QUEUE_STATUSES.iter().zip(counts) {
                queue.set_bucket(*status, count);
            }
        }
    }

    if matches!(filter, None | Some(OrderStatus::Pending)) {
        classify_pending(client, &mut queue).await;
    }

    queue
}

/// 读取一页订单
async fn fetch_page<C: HttpClient>(
    client: &ApiClient<C>,
    params: &OrderListParams,
) -> Option<(Vec<Order>, Paginate)> {
    let result = match client.endpoint(paths::ORDERS, &[""], &params.query_pairs()) {
        Ok(url) => client.call::<Vec<Order>>(HttpMethod::Get, &url, None).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(envelope) => {
            let orders = envelope.data.unwrap_or_default();
            let paginate = envelope
                .paginate
                .unwrap_or_else(|| Paginate::fallback(params.page_size(), orders.len()));
            Some((orders, paginate))
        }
        Err(err) => {
            tracing::warn!(
                status = params.status.map(|s| s.as_str()).unwrap_or("all"),
                page = params.list.page_or_default(),
                error = %err,
                "order page failed"
            );
            None
        }
    }
}

/// 订单总数，只需要分页信息
async fn count_orders<C: HttpClient>(client: &ApiClient<C>, status: Option<OrderStatus>) -> u64 {
    let params = OrderListParams::status_page(status, 1, 1);
    fetch_page(client, &params)
        .await
        .map(|(_, paginate)| paginate.total)
        .unwrap_or(0)
}

/// 逐页细分待处理订单，某一页失败时停止
async fn classify_pending<C: HttpClient>(client: &ApiClient<C>, queue: &mut QuickQueue) {
    let first = OrderListParams::status_page(Some(OrderStatus::Pending), 1, PENDING_PAGE_SIZE);
    let Some((orders, paginate)) = fetch_page(client, &first).await else {
        return;
    };
    orders.iter().for_each(|order| queue.classify(order));

    let last_page = paginate.total_pages().min(MAX_PENDING_PAGES);
    for page in 2..=last_page {
        let params =
            OrderListParams::status_page(Some(OrderStatus::Pending), page, PENDING_PAGE_SIZE);
        let Some((orders, _)) = fetch_page(client, &params).await else {
            break;
        };
        orders.iter().for_each(|order| queue.classify(order));
    }
}
