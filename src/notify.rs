// notify.rs - Transient user notifications (toasts)

use serde::Serialize;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Success,
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub variant: ToastVariant,
    pub title: String,
    pub description: Option<String>,
}

impl Toast {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Success,
            title: title.into(),
            description: Some(description.into()),
        }
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Info,
            title: title.into(),
            description: Some(description.into()),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Destructive,
            title: title.into(),
            description: Some(description.into()),
        }
    }

    /// Notice raised by stubbed service functions
    pub fn feature_disabled(resource: &str) -> Self {
        Self::info(
            "Feature temporarily disabled",
            format!(
                "Saving {} is unavailable while the database is being migrated.",
                resource.replace('_', " ")
            ),
        )
    }
}

/// Sink for toasts. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Logs every toast through tracing
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        let description = toast.description.as_deref().unwrap_or("");
        match toast.variant {
            ToastVariant::Destructive => tracing::warn!(title = %toast.title, "{}", description),
            _ => tracing::info!(title = %toast.title, "{}", description),
        }
    }
}

/// Collects toasts in memory so a shell can render them after an action
#[derive(Debug, Default, Clone)]
pub struct ToastQueue {
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything queued so far
    pub fn drain(&self) -> Vec<Toast> {
        match self.toasts.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        match self.toasts.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, toast: Toast) {
        tracing::debug!(title = %toast.title, variant = ?toast.variant, "toast queued");
        match self.toasts.lock() {
            Ok(mut guard) => guard.push(toast),
            Err(poisoned) => poisoned.into_inner().push(toast),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_drains_in_order() {
        let queue = ToastQueue::new();
        queue.notify(Toast::success("Saved", "Case created"));
        queue.notify(Toast::error("Failed", "boom"));

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].variant, ToastVariant::Success);
        assert_eq!(drained[1].variant, ToastVariant::Destructive);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn feature_disabled_names_resource() {
        let toast = Toast::feature_disabled("form_templates");
        assert_eq!(toast.variant, ToastVariant::Info);
        assert!(toast.description.unwrap().contains("form templates"));
    }
}
