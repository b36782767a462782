use uuid::Uuid;

use crate::models::UserId;

/// Request-scoped identity of whoever is making the call
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub user_id: Option<UserId>,
    pub session_token: Option<Uuid>,
    pub request_id: String,
}

impl ViewerContext {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            session_token: None,
            request_id: format!("req-{}", Uuid::new_v4()),
        }
    }

    pub fn authenticated(user_id: UserId, session_token: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            session_token: Some(session_token),
            request_id: format!("req-{}", Uuid::new_v4()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}
