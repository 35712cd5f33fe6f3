use crate::session::SessionManager;
use async_trait::async_trait;
use reqwest::RequestBuilder;
use std::sync::Arc;
use tracing::trace;

/// A step applied to every outgoing request, in registration order.
///
/// Stages only decorate the request and never fail.
#[async_trait]
pub trait RequestStage: Send + Sync {
    async fn apply(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Attaches the session's bearer token when there is one.
pub struct AuthStage {
    session: Arc<SessionManager>,
}

impl AuthStage {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl RequestStage for AuthStage {
    async fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.get_token().await {
            Some(token) if !token.is_empty() => {
                trace!("Attaching bearer token");
                request.bearer_auth(token)
            }
            _ => request,
        }
    }
}
