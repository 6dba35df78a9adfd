use icons::{Check, X};
use leptos::prelude::*;
use leptos_dom::helpers::set_timeout;
use std::time::Duration;
use tw_merge::tw_merge;

pub(crate) const TOAST_SHORT_MS: u64 = 3_000;
pub(crate) const TOAST_DEFAULT_MS: u64 = 4_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum ToastVariant {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Toast {
    pub id: u64,
    pub message: String,
    pub variant: ToastVariant,
    pub duration_ms: u64,
}

/// Ordered list of visible notifications.
#[derive(Clone, Debug, Default)]
pub(crate) struct ToastQueue {
    items: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn push(&mut self, message: impl Into<String>, variant: ToastVariant, duration_ms: u64) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Toast {
            id,
            message: message.into(),
            variant,
            duration_ms,
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }
}

/// Notification channel shared through `AppContext`.
#[derive(Clone, Copy)]
pub(crate) struct Toaster {
    queue: RwSignal<ToastQueue>,
}

impl Toaster {
    pub fn new() -> Self {
        Self {
            queue: RwSignal::new(ToastQueue::default()),
        }
    }

    pub fn toast(&self, message: impl Into<String>, variant: ToastVariant, duration_ms: u64) {
        let mut id = 0;
        self.queue
            .update(|q| id = q.push(message, variant, duration_ms));

        let queue = self.queue;
        set_timeout(
            move || queue.update(|q| {
                q.dismiss(id);
            }),
            Duration::from_millis(duration_ms),
        );
    }

    pub fn success(&self, message: impl Into<String>, duration_ms: u64) {
        self.toast(message, ToastVariant::Success, duration_ms);
    }

    pub fn error(&self, message: impl Into<String>, duration_ms: u64) {
        self.toast(message, ToastVariant::Error, duration_ms);
    }

    pub fn dismiss(&self, id: u64) {
        self.queue.update(|q| {
            q.dismiss(id);
        });
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

#[component]
pub fn ToastRegion(#[prop(into, optional)] class: String) -> impl IntoView {
    let toaster = expect_context::<crate::state::AppContext>().0.toaster;
    let region_class = tw_merge!(
        "pointer-events-none fixed bottom-4 right-4 z-50 flex w-80 flex-col gap-2",
        class
    );

    view! {
        <div data-name="ToastRegion" class=region_class aria-live="polite">
            {move || {
                toaster
                    .queue
                    .get()
                    .items()
                    .iter()
                    .cloned()
                    .map(|t| {
                        let id = t.id;
                        let tone = match t.variant {
                            ToastVariant::Success => "border-success/40 text-foreground",
                            ToastVariant::Error => "border-destructive/40 text-destructive",
                        };
                        let item_class = tw_merge!(
                            "pointer-events-auto flex items-center gap-2 rounded-md border bg-card px-3 py-2 text-sm shadow-md",
                            tone
                        );
                        view! {
                            <div
                                role="alert"
                                data-variant=t.variant.as_ref().to_string()
                                class=item_class
                            >
                                {match t.variant {
                                    ToastVariant::Success => view! { <Check class="size-4" /> }.into_any(),
                                    ToastVariant::Error => view! { <X class="size-4" /> }.into_any(),
                                }}
                                <span class="flex-1">{t.message}</span>
                                <button
                                    class="text-xs text-muted-foreground hover:text-foreground"
                                    aria-label="Dismiss notification"
                                    on:click=move |_| toaster.dismiss(id)
                                >
                                    "×"
                                </button>
                            </div>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_increasing_ids() {
        let mut q = ToastQueue::default();
        let a = q.push("Link Copied !", ToastVariant::Success, TOAST_SHORT_MS);
        let b = q.push("Failed to copy link", ToastVariant::Error, TOAST_SHORT_MS);
        assert!(b > a);
        assert_eq!(q.items().len(), 2);
        assert_eq!(q.items()[0].duration_ms, 3_000);
    }

    #[test]
    fn test_dismiss_removes_only_that_toast() {
        let mut q = ToastQueue::default();
        let a = q.push("a", ToastVariant::Success, 10);
        let b = q.push("b", ToastVariant::Error, 10);
        assert!(q.dismiss(a));
        assert!(!q.dismiss(a));
        assert_eq!(q.items().len(), 1);
        assert_eq!(q.items()[0].id, b);
    }
}
