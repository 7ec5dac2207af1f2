//! 关联数据补全
//!
//! 订单明细只带 product_id，会员银行账户只带 bank_id，显示名称需要逐个查询。
//! 查询按去重后的 key 并发发出，任何一个失败都只影响它自己那一项。

use crate::client::ApiClient;
use crate::request::{HttpClient, HttpMethod};
use futures::future::join_all;
use shopadmin_shared::{BankItem, MemberBankItem, OrderItem, ProductItem, paths};
use std::collections::{HashMap, HashSet};
use std::future::Future;

/// 去重并发查询
///
/// key 先去空白，空 key 丢弃；`fetch` 返回 None 的 key 不会出现在结果中
pub async fn lookup_distinct<I, S, F, Fut, V>(keys: I, fetch: F) -> HashMap<String, V>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Option<V>>,
{
    let mut seen = HashSet::new();
    let distinct: Vec<String> = keys
        .into_iter()
        .map(|k| k.as_ref().trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.clone()))
        .collect();

    if distinct.is_empty() {
        return HashMap::new();
    }

    let lookups = distinct.into_iter().map(|key| {
        let pending = fetch(key.clone());
        async move { (key, pending.await) }
    });

    join_all(lookups)
        .await
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
}

/// 显示名称（泰文 / 英文）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayName {
    pub name_th: String,
    pub name_en: String,
}

/// 按 id 读取单个实体，失败一律视为查不到
async fn fetch_entity<C, T>(client: &ApiClient<C>, path: &str, id: &str) -> Option<T>
where
    C: HttpClient,
    T: serde::de::DeserializeOwned,
{
    let result = match client.endpoint(path, &[id], &[]) {
        Ok(url) => client.call::<T>(HttpMethod::Get, &url, None).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(envelope) => envelope.data,
        Err(err) => {
            tracing::warn!(path, id, error = %err, "lookup failed");
            None
        }
    }
}

/// 补全订单明细的商品名称，查不到的商品名称为空字符串
pub async fn enrich_order_items<C: HttpClient>(
    client: &ApiClient<C>,
    items: Vec<OrderItem>,
) -> Vec<OrderItem> {
    let names = lookup_distinct(items.iter().map(|i| i.product_id.as_str()), |id| async move {
        fetch_entity::<C, ProductItem>(client, paths::PRODUCTS, &id)
            .await
            .map(|p| DisplayName {
                name_th: p.name_th.trim().to_string(),
                name_en: p.name_en.trim().to_string(),
            })
    })
    .await;

    items
        .into_iter()
        .map(|mut item| {
            let name = names.get(item.product_id.trim()).cloned().unwrap_or_default();
            item.product_name_th = name.name_th;
            item.product_name_en = name.name_en;
            item
        })
        .collect()
}

/// 补全银行名称，默认账户排在最前（其余保持原顺序）
pub async fn enrich_member_banks<C: HttpClient>(
    client: &ApiClient<C>,
    banks: Vec<MemberBankItem>,
) -> Vec<MemberBankItem> {
    let names = lookup_distinct(banks.iter().map(|b| b.bank_id.as_str()), |id| async move {
        fetch_entity::<C, BankItem>(client, paths::BANKS, &id)
            .await
            .map(|b| DisplayName {
                name_th: b.name_th.trim().to_string(),
                name_en: b.name_en.trim().to_string(),
            })
    })
    .await;

    let mut banks: Vec<MemberBankItem> = banks
        .into_iter()
        .map(|mut bank| {
            let name = names.get(bank.bank_id.trim()).cloned().unwrap_or_default();
            bank.bank_name_th = name.name_th;
            bank.bank_name_en = name.name_en;
            bank
        })
        .collect();

    banks.sort_by_key(|b| !b.is_default);
    banks
}
