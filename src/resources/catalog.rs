//! 系统字典：状态、会员等级、商品分类
//!
//! 这三类资源只有标准的增删改查，直接复用 `Collection`。

use super::Collection;
use crate::client::ApiClient;
use crate::request::HttpClient;
use shopadmin_shared::{CategoryItem, StatusItem, TierItem, paths};
use std::rc::Rc;

pub type Statuses<C> = Collection<C, StatusItem>;
pub type Tiers<C> = Collection<C, TierItem>;
pub type Categories<C> = Collection<C, CategoryItem>;

pub fn statuses<C: HttpClient>(client: Rc<ApiClient<C>>) -> Statuses<C> {
    Collection::new(client, paths::STATUSES)
}

pub fn tiers<C: HttpClient>(client: Rc<ApiClient<C>>) -> Tiers<C> {
    Collection::new(client, paths::TIERS)
}

pub fn categories<C: HttpClient>(client: Rc<ApiClient<C>>) -> Categories<C> {
    Collection::new(client, paths::CATEGORIES)
}
