use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use wishlane_social::{
    AuthError, CommunityError, DatabaseError, EngagementError, FriendsError, NotificationError,
};

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{resource}:{identifier} not found")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    /// Duplicate state reported by the social layer rather than the database
    #[error("{0}")]
    AlreadyExists(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.as_status_code(), self.to_string()).into_response()
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                resource,
                identifier,
            },
            DatabaseError::Conflict {
                resource,
                field,
                value,
            } => Self::Conflict {
                resource,
                field,
                value,
            },
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Db(e) => e.into(),
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<FriendsError> for ServerError {
    fn from(value: FriendsError) -> Self {
        match value {
            e @ FriendsError::SelfFriendship => Self::Validation(e.to_string()),
            e @ FriendsError::GuestRestricted => Self::Forbidden(e.to_string()),
            FriendsError::Db(e) => e.into(),
        }
    }
}

impl From<CommunityError> for ServerError {
    fn from(value: CommunityError) -> Self {
        match value {
            e @ CommunityError::GuestRestricted => Self::Forbidden(e.to_string()),
            e @ CommunityError::NotAdmin => Self::Forbidden(e.to_string()),
            CommunityError::Db(e) => e.into(),
        }
    }
}

impl From<NotificationError> for ServerError {
    fn from(value: NotificationError) -> Self {
        match value {
            e @ (NotificationError::GuestRestricted | NotificationError::NotRecipient) => {
                Self::Forbidden(e.to_string())
            }
            e @ (NotificationError::SelfRequest | NotificationError::UnsupportedKind { .. }) => {
                Self::Validation(e.to_string())
            }
            e @ (NotificationError::AlreadyFriends
            | NotificationError::AlreadyMember
            | NotificationError::AlreadyResolved) => Self::AlreadyExists(e.to_string()),
            // The referenced row was removed, usually a deleted sender account
            NotificationError::MissingSender => Self::NotFound {
                resource: "sender",
                identifier: "id",
            },
            NotificationError::MissingCommunity => Self::NotFound {
                resource: "community",
                identifier: "id",
            },
            NotificationError::Friends(e) => e.into(),
            NotificationError::Community(e) => e.into(),
            NotificationError::Db(e) => e.into(),
        }
    }
}

impl From<EngagementError> for ServerError {
    fn from(value: EngagementError) -> Self {
        match value {
            e @ EngagementError::GuestRestricted => Self::Forbidden(e.to_string()),
            e @ EngagementError::AlreadyLiked => Self::AlreadyExists(e.to_string()),
            EngagementError::Db(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let not_found = ServerError::from(DatabaseError::NotFound {
            resource: "user",
            identifier: "id",
        });
        assert_eq!(not_found.as_status_code(), StatusCode::NOT_FOUND);

        let conflict = ServerError::from(DatabaseError::Conflict {
            resource: "user",
            field: "email",
            value: "a@example.com".to_string(),
        });
        assert_eq!(conflict.as_status_code(), StatusCode::CONFLICT);

        let forbidden = ServerError::from(NotificationError::NotRecipient);
        assert_eq!(forbidden.as_status_code(), StatusCode::FORBIDDEN);

        let resolved = ServerError::from(NotificationError::AlreadyResolved);
        assert_eq!(resolved.as_status_code(), StatusCode::CONFLICT);

        let invalid = ServerError::from(FriendsError::SelfFriendship);
        assert_eq!(invalid.as_status_code(), StatusCode::BAD_REQUEST);

        let guest = ServerError::from(FriendsError::GuestRestricted);
        assert_eq!(guest.as_status_code(), StatusCode::FORBIDDEN);

        // A deleted sender behind a request surfaces as not found, not 500
        let missing = ServerError::from(NotificationError::MissingSender);
        assert_eq!(missing.as_status_code(), StatusCode::NOT_FOUND);

        let missing = ServerError::from(NotificationError::MissingCommunity);
        assert_eq!(missing.as_status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_nested_errors_unwrap_to_their_source() {
        let nested = NotificationError::Db(DatabaseError::NotFound {
            resource: "notification",
            identifier: "id",
        });

        assert!(matches!(
            ServerError::from(nested),
            ServerError::NotFound { .. }
        ));

        let nested = NotificationError::Community(CommunityError::NotAdmin);
        assert!(matches!(ServerError::from(nested), ServerError::Forbidden(_)));
    }
}
