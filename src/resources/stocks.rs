//! 商品库存

use super::{send_mutation, success_message};
use crate::client::ApiClient;
use crate::error::Outcome;
use crate::messages::{self, CRUD};
use crate::request::{HttpClient, HttpMethod};
use crate::state::ResourceState;
use shopadmin_shared::{ListParams, Paginate, ProductStockItem, ProductStockPayload, paths};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct ProductStocks<C: HttpClient> {
    client: Rc<ApiClient<C>>,
    stocks: RefCell<Vec<ProductStockItem>>,
    paginate: Cell<Paginate>,
    state: ResourceState,
}

impl<C: HttpClient> ProductStocks<C> {
    pub fn new(client: Rc<ApiClient<C>>) -> Self {
        Self {
            client,
            stocks: RefCell::new(Vec::new()),
            paginate: Cell::new(Paginate::default()),
            state: ResourceState::new(),
        }
    }

    pub fn stocks(&self) -> Vec<ProductStockItem> {
        self.stocks.borrow().clone()
    }

    pub fn paginate(&self) -> Paginate {
        self.paginate.get()
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    /// 库存列表只支持排序参数，读取失败时保留已有列表
    pub async fn fetch_stocks(&self, params: &ListParams) -> Outcome<bool> {
        let _loading = self.state.begin();

        let result = match self.client.endpoint(paths::PRODUCT_STOCKS, &[""], &params.sort_pairs()) {
            Ok(url) => {
                self.client
                    .call::<Vec<ProductStockItem>>(HttpMethod::Get, &url, None)
                    .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(envelope) => {
                let stocks = envelope.data.unwrap_or_default();
                let paginate = envelope
                    .paginate
                    .unwrap_or_else(|| Paginate::fallback(params.size_or_default(), stocks.len()));
                self.stocks.replace(stocks);
                self.paginate.set(paginate);
                Ok(true)
            }
            Err(err) => {
                self.state.reject(err, messages::stock::LOAD_ERROR)?;
                Ok(false)
            }
        }
    }

    /// 调整库存
    pub async fn adjust(&self, id: &str, payload: &ProductStockPayload) -> Outcome<bool> {
        let _loading = self.state.begin();

        let url = self.client.endpoint(paths::PRODUCT_STOCKS, &[id], &[]);
        match send_mutation(&self.client, HttpMethod::Patch, url, Some(payload)).await {
            Ok(envelope) => {
                self.state.succeed(success_message(&envelope, CRUD.update_success));
                Ok(true)
            }
            Err(err) => {
                self.state.reject(err, CRUD.update_error)?;
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{client, url};
    use serde_json::json;
    use shopadmin_shared::{SortOrder, StockAction};

    const LIST: &str = "/system/product_stocks/?page=1&size=10&sort_by=remaining&order_by=asc";

    fn params() -> ListParams {
        ListParams {
            search: Some("ignored".to_string()),
            sort_by: Some("remaining".to_string()),
            order_by: Some(SortOrder::Asc),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_sends_sort_only() {
        let stocks = ProductStocks::new(client());
        stocks.client.http().mock_response(
            HttpMethod::Get,
            &url(LIST),
            200,
            json!({"code": "200", "data": [{"id": "st1", "product_id": "p1", "unit_price": "120.50", "stock_amount": 10, "remaining": 4}]}),
        );

        assert!(stocks.fetch_stocks(&params()).await.unwrap());
        assert_eq!(stocks.stocks()[0].remaining, 4);
        assert_eq!(stocks.paginate().total, 1);
    }

    #[tokio::test]
    async fn test_failed_list_keeps_stocks() {
        let stocks = ProductStocks::new(client());
        let http = stocks.client.http();
        http.mock_response(
            HttpMethod::Get,
            &url(LIST),
            200,
            json!({"code": "200", "data": [{"id": "st1", "product_id": "p1"}], "paginate": {"page": 1, "size": 10, "total": 1}}),
        );
        http.mock_response(HttpMethod::Get, &url(LIST), 500, json!({"message": ""}));
        http.mock_response(HttpMethod::Get, &url(LIST), 200, json!({"code": "500"}));

        assert!(stocks.fetch_stocks(&params()).await.unwrap());
        assert!(!stocks.fetch_stocks(&params()).await.unwrap());
        assert_eq!(stocks.stocks().len(), 1);
        assert_eq!(
            stocks.state().error().as_deref(),
            Some("request failed with status 500")
        );

        assert!(!stocks.fetch_stocks(&params()).await.unwrap());
        assert_eq!(stocks.stocks()[0].id, "st1");
        assert_eq!(stocks.paginate().total, 1);
        assert_eq!(stocks.state().error().as_deref(), Some(messages::stock::LOAD_ERROR));
    }

    #[tokio::test]
    async fn test_adjust_patches_stock() {
        let stocks = ProductStocks::new(client());
        let http = stocks.client.http();
        http.mock_response(
            HttpMethod::Patch,
            &url("/system/product_stocks/st1"),
            200,
            json!({"code": "200", "message": "adjusted"}),
        );

        let payload = ProductStockPayload {
            stock_amount: 12,
            remaining: 6,
            action: Some(StockAction::Increase),
            adjustment_qty: Some(2),
        };
        assert!(stocks.adjust("st1", &payload).await.unwrap());
        assert_eq!(stocks.state().success().as_deref(), Some("adjusted"));

        let body = http.last_request().unwrap().json_body();
        assert_eq!(body["adjustment_qty"], 2);
        assert_eq!(body["remaining"], 6);
    }
}
