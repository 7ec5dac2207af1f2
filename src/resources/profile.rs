//! 当前管理员的个人资料

use super::{send_mutation, success_message};
use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult, Outcome};
use crate::messages::{self, CRUD};
use crate::request::{HttpClient, HttpMethod};
use crate::state::ResourceState;
use serde::Serialize;
use shopadmin_shared::{AdminProfile, ChangePasswordData, UpdateProfileData, paths};
use std::cell::RefCell;
use std::rc::Rc;

/// 修改密码时只发送这两个字段
#[derive(Serialize)]
struct PasswordChange<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

pub struct Profile<C: HttpClient> {
    client: Rc<ApiClient<C>>,
    profile: RefCell<Option<AdminProfile>>,
    state: ResourceState,
}

impl<C: HttpClient> Profile<C> {
    pub fn new(client: Rc<ApiClient<C>>) -> Self {
        Self {
            client,
            profile: RefCell::new(None),
            state: ResourceState::new(),
        }
    }

    pub fn profile(&self) -> Option<AdminProfile> {
        self.profile.borrow().clone()
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    pub async fn fetch_profile(&self) -> Outcome<bool> {
        let _loading = self.state.begin();

        match self.load().await {
            Ok(_) => Ok(true),
            Err(err) => {
                self.state.reject(err, CRUD.load_error)?;
                Ok(false)
            }
        }
    }

    /// PATCH 更新资料，接口返回新资料时替换本地缓存
    pub async fn update_profile(&self, data: &UpdateProfileData) -> Outcome<bool> {
        let _loading = self.state.begin();

        let result = match self.member_url("").await {
            Ok(url) => {
                self.client
                    .call_with::<AdminProfile, _>(HttpMethod::Patch, &url, data)
                    .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(envelope) => {
                let message = success_message(&envelope, messages::profile::UPDATE_SUCCESS);
                if let Some(profile) = envelope.data {
                    self.profile.replace(Some(profile));
                }
                self.state.succeed(message);
                Ok(true)
            }
            Err(err) => {
                self.state.reject(err, messages::profile::UPDATE_ERROR)?;
                Ok(false)
            }
        }
    }

    /// 修改密码，两次输入不一致时不发请求
    pub async fn change_password(&self, data: &ChangePasswordData) -> Outcome<bool> {
        self.state.clear_messages();
        if data.new_password != data.confirm_password {
            self.state.fail(messages::profile::PASSWORD_MISMATCH);
            return Ok(false);
        }

        let _loading = self.state.begin();
        let payload = PasswordChange {
            current_password: &data.current_password,
            new_password: &data.new_password,
        };

        let url = self.member_url("password").await;
        match send_mutation(&self.client, HttpMethod::Patch, url, Some(&payload)).await {
            Ok(envelope) => {
                self.state.succeed(success_message(
                    &envelope,
                    messages::profile::PASSWORD_CHANGE_SUCCESS,
                ));
                Ok(true)
            }
            Err(err) => {
                self.state
                    .reject(err, messages::profile::PASSWORD_CHANGE_ERROR)?;
                Ok(false)
            }
        }
    }

    async fn load(&self) -> ApiResult<AdminProfile> {
        let url = self.client.endpoint(paths::ME, &[], &[])?;
        let envelope = self
            .client
            .call::<AdminProfile>(HttpMethod::Get, &url, None)
            .await?;
        let profile = envelope
            .data
            .ok_or_else(|| ApiError::Validation(envelope.message.clone()))?;
        self.profile.replace(Some(profile.clone()));
        Ok(profile)
    }

    /// 会员 id 优先取缓存，没有时重新读取资料
    async fn member_id(&self) -> ApiResult<String> {
        let cached = self
            .profile
            .borrow()
            .as_ref()
            .map(|p| p.member_id.clone())
            .filter(|id| !id.is_empty());
        if let Some(id) = cached {
            return Ok(id);
        }

        let profile = self.load().await?;
        if profile.member_id.is_empty() {
            return Err(ApiError::Validation(CRUD.load_error.to_string()));
        }
        Ok(profile.member_id)
    }

    async fn member_url(&self, suffix: &str) -> ApiResult<String> {
        let member_id = self.member_id().await?;
        let mut segments = vec![member_id.as_str()];
        if !suffix.is_empty() {
            segments.push(suffix);
        }
        self.client.endpoint(paths::MEMBERS, &segments, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{client, url};
    use serde_json::json;

    fn profile_body() -> serde_json::Value {
        json!({"code": "200", "data": {"member_id": "m1", "email": "admin@shop.test", "firstname_en": "Ann"}})
    }

    fn update() -> UpdateProfileData {
        UpdateProfileData {
            firstname_th: "แอน".to_string(),
            lastname_th: "ดี".to_string(),
            firstname_en: "Ann".to_string(),
            lastname_en: "Dee".to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_update_fetches_member_id_first() {
        let profile = Profile::new(client());
        let http = profile.client.http();
        http.mock_response(HttpMethod::Get, &url("/auth/me"), 200, profile_body());
        http.mock_response(
            HttpMethod::Patch,
            &url("/auth/members/m1"),
            200,
            json!({"code": "200", "data": {"member_id": "m1", "firstname_en": "Anne"}}),
        );

        assert!(profile.update_profile(&update()).await.unwrap());
        assert_eq!(profile.profile().unwrap().firstname_en, "Anne");
        assert_eq!(
            profile.state().success().as_deref(),
            Some(messages::profile::UPDATE_SUCCESS)
        );

        assert!(profile.update_profile(&update()).await.unwrap());
        assert_eq!(http.count(HttpMethod::Get, &url("/auth/me")), 1);
    }

    #[tokio::test]
    async fn test_password_mismatch_skips_network() {
        let profile = Profile::new(client());
        let data = ChangePasswordData {
            current_password: "old".to_string(),
            new_password: "new-1".to_string(),
            confirm_password: "new-2".to_string(),
        };

        assert!(!profile.change_password(&data).await.unwrap());
        assert_eq!(profile.client.http().total_requests(), 0);
        assert_eq!(
            profile.state().error().as_deref(),
            Some(messages::profile::PASSWORD_MISMATCH)
        );
    }

    #[tokio::test]
    async fn test_change_password_sends_current_and_new_only() {
        let profile = Profile::new(client());
        let http = profile.client.http();
        http.mock_response(HttpMethod::Get, &url("/auth/me"), 200, profile_body());
        http.mock_response(
            HttpMethod::Patch,
            &url("/auth/members/m1/password"),
            200,
            json!({"code": "200", "message": ""}),
        );

        let data = ChangePasswordData {
            current_password: "old".to_string(),
            new_password: "new".to_string(),
            confirm_password: "new".to_string(),
        };
        assert!(profile.change_password(&data).await.unwrap());
        assert_eq!(
            http.last_request().unwrap().json_body(),
            json!({"current_password": "old", "new_password": "new"})
        );
        assert_eq!(
            profile.state().success().as_deref(),
            Some(messages::profile::PASSWORD_CHANGE_SUCCESS)
        );
    }

    #[tokio::test]
    async fn test_profile_failure_uses_fallback() {
        let profile = Profile::new(client());
        profile.client.http().mock_response(
            HttpMethod::Get,
            &url("/auth/me"),
            200,
            json!({"code": "200", "data": null}),
        );

        assert!(!profile.fetch_profile().await.unwrap());
        assert_eq!(profile.state().error().as_deref(), Some(CRUD.load_error));
        assert!(!profile.update_profile(&update()).await.unwrap());
        assert_eq!(profile.state().error().as_deref(), Some(messages::profile::UPDATE_ERROR));
    }
}
