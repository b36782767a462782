// Vc extractor - hands the request-scoped ViewerContext to handlers

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::infrastructure::viewer::ViewerContext;
use crate::models::UserId;

/// Cheap-to-clone handle on the ViewerContext; derefs to it.
#[derive(Debug, Clone)]
pub struct Vc(Arc<ViewerContext>);

impl Vc {
    pub fn new(vc: Arc<ViewerContext>) -> Self {
        Self(vc)
    }

    /// The signed-in user, or `Unauthorized`.
    pub fn require_user(&self) -> AppResult<UserId> {
        self.0
            .user_id
            .ok_or_else(|| AppError::Unauthorized("Sign in required".into()))
    }
}

impl std::ops::Deref for Vc {
    type Target = ViewerContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Vc
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        // Installed by viewer_context_middleware on every route
        let vc = parts
            .extensions
            .get::<Arc<ViewerContext>>()
            .map(|vc| Vc(vc.clone()))
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR);

        async move { vc }
    }
}
