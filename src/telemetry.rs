//! Logging setup, delivery timing, and scoped log muting.
//!
//! The PDF renderer is known to emit a harmless but alarming network warning
//! for every document it produces. [`mute`] hides matching events on the
//! shared subscriber for exactly as long as the returned [`MuteGuard`] lives.

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

/// Install the global subscriber: env filter, mute layer, and fmt output.
///
/// `RUST_LOG` overrides the default `info` level. `json` switches the output
/// to one JSON object per line.
pub fn init(json: bool) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(MuteLayer)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_target(true)))
        .init();
}

// ============================================================================
// Scoped mute
// ============================================================================

struct MuteRule {
    id: u64,
    target_prefix: String,
    required: Vec<String>,
    any_of: Vec<String>,
}

impl MuteRule {
    fn covers_target(&self, target: &str) -> bool {
        target.starts_with(&self.target_prefix)
    }

    fn matches(&self, target: &str, message: &str) -> bool {
        self.covers_target(target)
            && self.required.iter().all(|p| message.contains(p.as_str()))
            && self.any_of.iter().any(|p| message.contains(p.as_str()))
    }
}

static MUTE_RULES: RwLock<Vec<MuteRule>> = parking_lot::const_rwlock(Vec::new());
static NEXT_MUTE_ID: AtomicU64 = AtomicU64::new(1);

/// Removes its mute rule when dropped.
#[must_use = "the mute is lifted as soon as the guard is dropped"]
pub struct MuteGuard {
    id: u64,
}

impl Drop for MuteGuard {
    fn drop(&mut self) {
        MUTE_RULES.write().retain(|rule| rule.id != self.id);
    }
}

/// Suppress events under `target_prefix` whose message contains every string
/// in `required` and at least one of `any_of`.
pub fn mute(target_prefix: &str, required: &[&str], any_of: &[&str]) -> MuteGuard {
    let owned = |patterns: &[&str]| patterns.iter().map(|p| p.to_string()).collect();
    let id = NEXT_MUTE_ID.fetch_add(1, Ordering::Relaxed);
    MUTE_RULES.write().push(MuteRule {
        id,
        target_prefix: target_prefix.to_string(),
        required: owned(required),
        any_of: owned(any_of),
    });
    MuteGuard { id }
}

/// Whether an event with this target and message is currently muted.
pub fn is_muted(target: &str, message: &str) -> bool {
    MUTE_RULES
        .read()
        .iter()
        .any(|rule| rule.matches(target, message))
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

/// Subscriber layer that drops events matched by an active [`MuteGuard`].
pub struct MuteLayer;

impl<S: Subscriber> Layer<S> for MuteLayer {
    fn event_enabled(&self, event: &Event<'_>, _ctx: Context<'_, S>) -> bool {
        let rules = MUTE_RULES.read();
        let target = event.metadata().target();
        if !rules.iter().any(|rule| rule.covers_target(target)) {
            return true;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        !rules.iter().any(|rule| rule.matches(target, &visitor.message))
    }
}

// ============================================================================
// Timing
// ============================================================================

/// Times one outbound delivery call and records it when finished.
pub struct DeliveryTimer {
    strategy: &'static str,
    start: Instant,
}

impl DeliveryTimer {
    pub fn start(strategy: &'static str) -> Self {
        Self {
            strategy,
            start: Instant::now(),
        }
    }

    /// Record the attempt under `outcome` ("ok" or an error code).
    pub fn finish(self, outcome: &str) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_delivery(self.strategy, outcome, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for one PDF endpoint request.
    pub fn pdf_request(id: &str) -> Span {
        info_span!("pdf_request", id = %id)
    }

    /// Span for one user-triggered send action.
    pub fn send(strategy: &str, invoice_id: i64) -> Span {
        info_span!("send", strategy = %strategy, invoice_id = invoice_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mute_applies_only_while_guard_lives() {
        let target = "telemetry_test::scoped";
        assert!(!is_muted(target, "wkhtmltopdf network error"));
        {
            let _guard = mute(target, &[], &["network error"]);
            assert!(is_muted(target, "wkhtmltopdf network error"));
            assert!(is_muted("telemetry_test::scoped::child", "a network error here"));
            assert!(!is_muted(target, "unrelated warning"));
            assert!(!is_muted("other_target", "wkhtmltopdf network error"));
        }
        assert!(!is_muted(target, "wkhtmltopdf network error"));
    }

    #[test]
    fn nested_mutes_are_released_independently() {
        let target = "telemetry_test::nested";
        let outer = mute(target, &[], &["outer"]);
        let inner = mute(target, &[], &["inner"]);
        drop(inner);
        assert!(is_muted(target, "outer message"));
        assert!(!is_muted(target, "inner message"));
        drop(outer);
        assert!(!is_muted(target, "outer message"));
    }

    #[test]
    fn mute_is_lifted_on_early_return() {
        fn render_and_fail(target: &str) -> Result<(), String> {
            let _guard = mute(target, &[], &["noisy"]);
            Err("render failed".to_string())
        }

        let target = "telemetry_test::early";
        assert!(render_and_fail(target).is_err());
        assert!(!is_muted(target, "noisy"));
    }

    #[test]
    fn required_text_must_also_be_present() {
        let target = "telemetry_test::required";
        let _guard = mute(target, &["wkhtmltopdf"], &["UnknownContentError", "network error"]);
        assert!(is_muted(target, "wkhtmltopdf: Exit with code 1 due to network error"));
        assert!(is_muted(target, "wkhtmltopdf raised UnknownContentError"));
        assert!(!is_muted(target, "Exit with code 1 due to network error"));
        assert!(!is_muted(target, "wkhtmltopdf: page size A4"));
    }
}
