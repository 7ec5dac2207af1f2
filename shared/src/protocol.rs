use crate::models::OrderStatus;
use serde::{Deserialize, Serialize};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A list query that knows how to serialise itself onto a URL.
///
/// Only parameters that are set are emitted, except `page` and `size`
/// which always are.
pub trait QueryParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)>;

    /// Requested page size, used when the response carries no `paginate`
    fn page_size(&self) -> u64;
}

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

// =========================================================
// Query Definitions
// =========================================================

/// Generic list parameters shared by every paginated endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub search: Option<String>,
    pub search_by: Option<String>,
    pub sort_by: Option<String>,
    pub order_by: Option<SortOrder>,
}

impl ListParams {
    pub fn page(page: u64, size: u64) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn page_or_default(&self) -> u64 {
        self.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE)
    }

    pub fn size_or_default(&self) -> u64 {
        self.size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Only sorting, used by endpoints that ignore search
    pub fn sort_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.paging_pairs();
        push_opt(&mut pairs, "sort_by", self.sort_by.as_deref());
        push_opt(&mut pairs, "order_by", self.order_by.map(|o| o.as_str()));
        pairs
    }

    fn paging_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page_or_default().to_string()),
            ("size", self.size_or_default().to_string()),
        ]
    }
}

impl QueryParams for ListParams {
    fn page_size(&self) -> u64 {
        self.size_or_default()
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.paging_pairs();
        push_opt(&mut pairs, "search", self.search.as_deref());
        push_opt(&mut pairs, "search_by", self.search_by.as_deref());
        push_opt(&mut pairs, "sort_by", self.sort_by.as_deref());
        push_opt(&mut pairs, "order_by", self.order_by.map(|o| o.as_str()));
        pairs
    }
}

/// Order list filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderListParams {
    pub list: ListParams,
    pub member_id: Option<String>,
    pub status: Option<OrderStatus>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

impl OrderListParams {
    pub fn status_page(status: Option<OrderStatus>, page: u64, size: u64) -> Self {
        Self {
            list: ListParams::page(page, size),
            status,
            ..Default::default()
        }
    }
}

impl QueryParams for OrderListParams {
    fn page_size(&self) -> u64 {
        self.list.size_or_default()
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.list.paging_pairs();
        push_opt(&mut pairs, "member_id", self.member_id.as_deref());
        push_opt(&mut pairs, "search", self.list.search.as_deref());
        push_opt(&mut pairs, "status", self.status.map(|s| s.as_str()));
        if let Some(start) = self.start_date {
            pairs.push(("start_date", start.to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.to_string()));
        }
        push_opt(&mut pairs, "sort_by", self.list.sort_by.as_deref());
        push_opt(&mut pairs, "order_by", self.list.order_by.map(|o| o.as_str()));
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadStatus {
    Read,
    Unread,
}

impl ReadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadStatus::Read => "read",
            ReadStatus::Unread => "unread",
        }
    }
}

/// Contact message filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactMessageListParams {
    pub list: ListParams,
    pub send_status: Option<String>,
    pub read_status: Option<ReadStatus>,
}

impl QueryParams for ContactMessageListParams {
    fn page_size(&self) -> u64 {
        self.list.size_or_default()
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.list.paging_pairs();
        push_opt(&mut pairs, "sort_by", self.list.sort_by.as_deref());
        push_opt(&mut pairs, "order_by", self.list.order_by.map(|o| o.as_str()));
        push_opt(&mut pairs, "send_status", self.send_status.as_deref());
        push_opt(&mut pairs, "read_status", self.read_status.map(|r| r.as_str()));
        push_opt(&mut pairs, "search", self.list.search.as_deref());
        pairs
    }
}

fn push_opt(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        pairs.push((key, v.to_string()));
    }
}
