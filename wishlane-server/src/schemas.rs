//! Input schemas accepted by the endpoints, along with the
//! validation-aware JSON extractor

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Validate, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginSchema {
    #[validate(email, length(max = 128))]
    pub email: String,
    #[validate(length(max = 64))]
    pub password: String,
}

#[derive(Debug, Validate, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterSchema {
    #[validate(email, length(max = 128))]
    pub email: String,
    #[validate(length(min = 8, max = 64))]
    pub password: String,
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
}

#[derive(Debug, Validate, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewNotificationSchema {
    pub recipient_id: i32,
    #[validate(length(min = 1, max = 500))]
    pub message: String,
}

#[derive(Debug, Validate, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewFriendRequestSchema {
    pub recipient_id: i32,
    #[validate(length(max = 500))]
    pub message: Option<String>,
}

#[derive(Debug, Validate, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJoinRequestSchema {
    pub community_id: i32,
}

#[derive(Debug, Validate, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCommunitySchema {
    #[validate(length(min = 2, max = 128))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(length(max = 64))]
    pub category: Option<String>,
    #[validate(length(max = 4000))]
    pub rules: Option<String>,
}

#[derive(Debug, Validate, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCommunitySchema {
    #[validate(length(min = 2, max = 128))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(length(max = 64))]
    pub category: Option<String>,
    #[validate(length(max = 4000))]
    pub rules: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Validate, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewWishSchema {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(range(min = 0.0))]
    pub goal: f64,
    pub community_id: Option<i32>,
    pub is_public: bool,
}

#[derive(Debug, Validate, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCommentSchema {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
}

pub const DEFAULT_NOTIFICATION_LIMIT: i64 = 25;

#[derive(Debug, Deserialize, IntoParams)]
pub struct NotificationQuery {
    /// Only return notifications with this read state
    pub read_filter: Option<bool>,
    pub limit: Option<i64>,
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extracted_json: Json<T> = Json::from_request(req, state)
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "JSON parse failed"))?;

        extracted_json
            .0
            .validate()
            .map_err(|_| (StatusCode::BAD_REQUEST, "Request body is invalid"))?;

        Ok(Self(extracted_json.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_schema_validation() {
        let valid = LoginSchema {
            email: "a@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = LoginSchema {
            email: "not an email".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_wish_schema_rejects_negative_goal() {
        let wish = NewWishSchema {
            title: "New bike".to_string(),
            description: None,
            image_url: None,
            goal: -1.0,
            community_id: None,
            is_public: true,
        };
        assert!(wish.validate().is_err());
    }
}
