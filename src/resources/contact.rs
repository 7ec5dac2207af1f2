//! 联系消息与回复

use super::send_mutation;
use crate::client::ApiClient;
use crate::error::Outcome;
use crate::messages;
use crate::request::{HttpClient, HttpMethod};
use crate::state::{LoadingFlag, ResourceState};
use shopadmin_shared::{
    ContactMessageItem, ContactMessageListParams, ContactReplyItem, ContactReplyPayload,
    Paginate, QueryParams, UnreadCount, paths,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// =========================================================
// 联系消息
// =========================================================

pub struct ContactMessages<C: HttpClient> {
    client: Rc<ApiClient<C>>,
    messages: RefCell<Vec<ContactMessageItem>>,
    paginate: Cell<Paginate>,
    unread_count: Cell<u64>,
    state: ResourceState,
}

impl<C: HttpClient> ContactMessages<C> {
    pub fn new(client: Rc<ApiClient<C>>) -> Self {
        Self {
            client,
            messages: RefCell::new(Vec::new()),
            paginate: Cell::new(Paginate::default()),
            unread_count: Cell::new(0),
            state: ResourceState::new(),
        }
    }

    pub fn messages(&self) -> Vec<ContactMessageItem> {
        self.messages.borrow().clone()
    }

    pub fn paginate(&self) -> Paginate {
        self.paginate.get()
    }

    pub fn unread_count(&self) -> u64 {
        self.unread_count.get()
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    pub async fn fetch_messages(&self, params: &ContactMessageListParams) -> Outcome<bool> {
        let _loading = self.state.begin();

        let result = match self
            .client
            .endpoint(paths::CONTACT_MESSAGES, &[], &params.query_pairs())
        {
            Ok(url) => {
                self.client
                    .call::<Vec<ContactMessageItem>>(HttpMethod::Get, &url, None)
                    .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(envelope) => {
                let items = envelope.data.unwrap_or_default();
                let paginate = envelope
                    .paginate
                    .unwrap_or_else(|| Paginate::fallback(params.page_size(), items.len()));
                self.messages.replace(items);
                self.paginate.set(paginate);
                Ok(true)
            }
            Err(err) => {
                self.state.reject(err, messages::contact::LOAD_ERROR)?;
                Ok(false)
            }
        }
    }

    /// 标记已读 / 未读
    pub async fn mark_as_read(&self, id: &str, is_read: bool) -> Outcome<bool> {
        let _loading = self.state.begin();

        let action = if is_read { "read" } else { "unread" };
        let url = self.client.endpoint(paths::CONTACT_MESSAGES, &[id, action], &[]);
        match send_mutation::<_, ()>(&self.client, HttpMethod::Patch, url, None).await {
            Ok(_) => Ok(true),
            Err(err) => {
                self.state
                    .reject(err, messages::contact::READ_STATUS_ERROR)?;
                Ok(false)
            }
        }
    }

    /// 未读数量，失败时不写错误消息
    pub async fn fetch_unread_count(&self) -> Outcome<bool> {
        let _loading = self.state.track();

        let result = match self
            .client
            .endpoint(paths::CONTACT_MESSAGES, &["unread-count"], &[])
        {
            Ok(url) => {
                self.client
                    .call::<UnreadCount>(HttpMethod::Get, &url, None)
                    .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(envelope) => {
                self.unread_count
                    .set(envelope.data.unwrap_or_default().unread);
                Ok(true)
            }
            Err(err) => {
                let err = err.into_expired()?;
                tracing::warn!(error = %err, "{}", messages::contact::UNREAD_COUNT_ERROR);
                Ok(false)
            }
        }
    }
}

// =========================================================
// 回复
// =========================================================

pub struct ContactReplies<C: HttpClient> {
    client: Rc<ApiClient<C>>,
    replies: RefCell<Vec<ContactReplyItem>>,
    submitting: LoadingFlag,
    state: ResourceState,
}

impl<C: HttpClient> ContactReplies<C> {
    pub fn new(client: Rc<ApiClient<C>>) -> Self {
        Self {
            client,
            replies: RefCell::new(Vec::new()),
            submitting: LoadingFlag::default(),
            state: ResourceState::new(),
        }
    }

    pub fn replies(&self) -> Vec<ContactReplyItem> {
        self.replies.borrow().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_loading()
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    pub async fn fetch_replies(&self, message_id: &str) -> Outcome<bool> {
        let _loading = self.state.begin();

        let result = match self.replies_url(message_id) {
            Ok(url) => {
                self.client
                    .call::<Vec<ContactReplyItem>>(HttpMethod::Get, &url, None)
                    .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(envelope) => {
                self.replies.replace(envelope.data.unwrap_or_default());
                Ok(true)
            }
            Err(err) => {
                self.state
                    .reject(err, messages::contact::REPLIES_LOAD_ERROR)?;
                Ok(false)
            }
        }
    }

    /// 发送回复，成功后追加到本地列表末尾
    pub async fn create_reply(&self, message_id: &str, payload: &ContactReplyPayload) -> Outcome<bool> {
        let _submitting = self.submitting.start();
        self.state.clear_messages();

        let result = match self.replies_url(message_id) {
            Ok(url) => {
                self.client
                    .call_with::<ContactReplyItem, _>(HttpMethod::Post, &url, payload)
                    .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(envelope) => {
                if let Some(reply) = envelope.data {
                    self.replies.borrow_mut().push(reply);
                }
                Ok(true)
            }
            Err(err) => {
                self.state
                    .reject(err, messages::contact::REPLY_SEND_ERROR)?;
                Ok(false)
            }
        }
    }

    fn replies_url(&self, message_id: &str) -> crate::error::ApiResult<String> {
        self.client
            .endpoint(paths::CONTACT_MESSAGES, &[message_id, "replies"], &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{client, url};
    use serde_json::json;
    use shopadmin_shared::{ListParams, ReadStatus};

    #[tokio::test]
    async fn test_fetch_messages_query_order() {
        let contact = ContactMessages::new(client());
        contact.client.http().mock_response(
            HttpMethod::Get,
            &url("/auth/contact-messages?page=1&size=20&send_status=sent&read_status=unread&search=refund"),
            200,
            json!({"code": "200", "data": [{"id": "m1", "subject": "Refund", "is_read": false}]}),
        );

        let params = ContactMessageListParams {
            list: ListParams {
                search: Some("refund".to_string()),
                ..ListParams::page(1, 20)
            },
            send_status: Some("sent".to_string()),
            read_status: Some(ReadStatus::Unread),
        };
        assert!(contact.fetch_messages(&params).await.unwrap());
        assert_eq!(contact.messages()[0].subject, "Refund");
        assert_eq!(contact.paginate().size, 20);
    }

    #[tokio::test]
    async fn test_mark_as_read_and_unread() {
        let contact = ContactMessages::new(client());
        let http = contact.client.http();
        http.mock_response(HttpMethod::Patch, &url("/auth/contact-messages/m1/read"), 200, json!({"code": "200"}));
        http.mock_response(
            HttpMethod::Patch,
            &url("/auth/contact-messages/m1/unread"),
            200,
            json!({"code": "400", "message": ""}),
        );

        assert!(contact.mark_as_read("m1", true).await.unwrap());
        assert!(!contact.mark_as_read("m1", false).await.unwrap());
        assert_eq!(
            contact.state().error().as_deref(),
            Some(messages::contact::READ_STATUS_ERROR)
        );
    }

    #[tokio::test]
    async fn test_unread_count_failure_is_silent() {
        let contact = ContactMessages::new(client());
        let http = contact.client.http();
        let count_url = url("/auth/contact-messages/unread-count");
        http.mock_response(HttpMethod::Get, &count_url, 200, json!({"code": "200", "data": {"unread": 3}}));
        http.mock_failure(HttpMethod::Get, &count_url, "offline");

        assert!(contact.fetch_unread_count().await.unwrap());
        assert_eq!(contact.unread_count(), 3);

        assert!(!contact.fetch_unread_count().await.unwrap());
        assert_eq!(contact.unread_count(), 3);
        assert!(contact.state().error().is_none());
    }

    #[tokio::test]
    async fn test_read_status_and_unread_count_hold_loading() {
        let contact = ContactMessages::new(client());
        let http = contact.client.http();
        http.stall_replies();
        http.mock_response(HttpMethod::Patch, &url("/auth/contact-messages/m1/read"), 200, json!({"code": "200"}));
        http.mock_response(
            HttpMethod::Get,
            &url("/auth/contact-messages/unread-count"),
            200,
            json!({"code": "200", "data": {"unread": 1}}),
        );

        let (marked, in_flight) =
            futures::join!(contact.mark_as_read("m1", true), async { contact.state().is_loading() });
        assert!(marked.unwrap());
        assert!(in_flight);
        assert!(!contact.state().is_loading());

        contact.state().succeed("kept");
        let (counted, in_flight) =
            futures::join!(contact.fetch_unread_count(), async { contact.state().is_loading() });
        assert!(counted.unwrap());
        assert!(in_flight);
        assert!(!contact.state().is_loading());
        assert_eq!(contact.state().success().as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn test_reply_is_appended() {
        let replies = ContactReplies::new(client());
        let http = replies.client.http();
        let replies_url = url("/auth/contact-messages/m1/replies");
        http.mock_response(
            HttpMethod::Get,
            &replies_url,
            200,
            json!({"code": "200", "data": [{"id": "r1", "sender_role": "member", "message": "hello"}]}),
        );
        http.mock_response(
            HttpMethod::Post,
            &replies_url,
            200,
            json!({"code": "200", "data": {"id": "r2", "sender_role": "admin", "message": "hi"}}),
        );

        assert!(replies.fetch_replies("m1").await.unwrap());
        let payload = ContactReplyPayload {
            message: "hi".to_string(),
        };
        assert!(replies.create_reply("m1", &payload).await.unwrap());

        let all = replies.replies();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].id, "r2");
        assert!(!replies.is_submitting());
        assert_eq!(http.last_request().unwrap().json_body(), json!({"message": "hi"}));
    }
}
