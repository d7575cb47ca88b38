//! Request context for correlation and tracing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use docket_core::Actor;
use serde::{Deserialize, Serialize};
use tracing::instrument::Instrumented;
use uuid::Uuid;

/// Per-request context carried into handler spans.
///
/// The actor is resolved once by the caller and travels with the request;
/// nothing downstream reads it from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: Uuid,
    /// Correlation ID for tracing related requests.
    pub correlation_id: Uuid,
    /// Parent request ID if this is a sub-request.
    pub parent_id: Option<Uuid>,
    /// Acting user, or the sentinel.
    pub actor: Actor,
    /// When the request started.
    pub started_at: DateTime<Utc>,
    /// Source component that created this context.
    pub source: String,
    /// Operation being performed.
    pub operation: Option<String>,
    /// Additional metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl RequestContext {
    /// Create a new request context attributed to the sentinel actor.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        Self {
            request_id: id,
            correlation_id: id,
            parent_id: None,
            actor: Actor::system(),
            started_at: Utc::now(),
            source: source.into(),
            operation: None,
            metadata: HashMap::new(),
        }
    }

    /// Create a child context that inherits correlation info and actor.
    #[must_use]
    pub fn child(&self, source: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            correlation_id: self.correlation_id,
            parent_id: Some(self.request_id),
            actor: self.actor.clone(),
            started_at: Utc::now(),
            source: source.into(),
            operation: None,
            metadata: self.metadata.clone(),
        }
    }

    /// Set the acting user.
    #[must_use]
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = actor;
        self
    }

    /// Set the correlation ID.
    #[must_use]
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = id;
        self
    }

    /// Set the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Add metadata.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Milliseconds since the request started.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_milliseconds()
    }

    /// Create a tracing span with this context.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            correlation_id = %self.correlation_id,
            actor = %self.actor,
            source = %self.source,
            operation = self.operation.as_deref(),
        )
    }

    /// Wrap `future` so it runs inside this context's span.
    ///
    /// Use this instead of [`RequestGuard`] when the work spans `.await`
    /// points.
    #[must_use]
    pub fn instrument<F: Future>(&self, future: F) -> Instrumented<F> {
        use tracing::Instrument as _;
        future.instrument(self.span())
    }

    /// First eight characters of the request id.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.request_id.simple().to_string().chars().take(8).collect()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}

/// Guard that keeps the request span entered and logs completion on drop.
pub struct RequestGuard {
    context: RequestContext,
    _span: tracing::span::EnteredSpan,
}

impl RequestGuard {
    /// Enter the span for `context`.
    #[must_use]
    pub fn new(context: RequestContext) -> Self {
        let span = context.span().entered();
        tracing::debug!("Request started");
        Self {
            context,
            _span: span,
        }
    }

    /// Get the request context.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        tracing::debug!(elapsed_ms = self.context.elapsed_ms(), "Request completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_creation() {
        let ctx = RequestContext::new("cli");
        assert_eq!(ctx.source, "cli");
        assert_eq!(ctx.request_id, ctx.correlation_id);
        assert!(ctx.parent_id.is_none());
        assert!(ctx.actor.is_system());
    }

    #[test]
    fn test_child_inherits_actor() {
        let parent = RequestContext::new("cli")
            .with_actor(Actor::new("clerk"))
            .with_metadata("branch", "3");
        let child = parent.child("audit");

        assert_ne!(child.request_id, parent.request_id);
        assert_eq!(child.correlation_id, parent.correlation_id);
        assert_eq!(child.parent_id, Some(parent.request_id));
        assert_eq!(child.actor.name(), "clerk");
        assert_eq!(child.metadata.get("branch").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_short_id() {
        assert_eq!(RequestContext::new("cli").short_id().len(), 8);
    }

    #[test]
    fn test_guard_exposes_context() {
        let guard = RequestGuard::new(RequestContext::new("cli").with_operation("user create"));
        assert_eq!(guard.context().operation.as_deref(), Some("user create"));
        assert!(guard.context().elapsed_ms() >= 0);
    }

    #[tokio::test]
    async fn test_instrumented_future_completes() {
        let ctx = RequestContext::new("cli").with_operation("audit list");
        let value = ctx.instrument(async { 7 }).await;
        assert_eq!(value, 7);
    }

    #[test]
    fn test_serialization() {
        let ctx = RequestContext::new("cli").with_actor(Actor::new("judge"));
        let json = serde_json::to_string(&ctx).unwrap();
        assert!(json.contains("\"actor\":\"judge\""));

        let parsed: RequestContext = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.actor, ctx.actor);
    }
}
