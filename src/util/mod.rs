use leptos::prelude::*;
use leptos_dom::helpers::set_timeout;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Writes `text` with `navigator.clipboard.writeText`.
///
/// Errors when the clipboard API is missing (insecure context, old browser) or
/// when the browser rejects the write.
pub(crate) async fn write_clipboard_text(text: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window")?;
    let navigator: wasm_bindgen::JsValue = window.navigator().into();

    let clipboard = js_sys::Reflect::get(&navigator, &"clipboard".into())
        .ok()
        .filter(|c| c.is_object())
        .ok_or("clipboard unavailable")?;
    let write_text = js_sys::Reflect::get(&clipboard, &"writeText".into())
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
        .ok_or("clipboard.writeText unavailable")?;

    let promise = write_text
        .call1(&clipboard, &text.into())
        .map_err(|e| format!("{e:?}"))?
        .dyn_into::<js_sys::Promise>()
        .map_err(|_| "clipboard.writeText did not return a promise".to_string())?;

    JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|e| format!("{e:?}"))
}

pub(crate) fn current_href() -> Option<String> {
    web_sys::window().and_then(|w| w.location().href().ok())
}

/// Latest-wins gate for delayed work: only the most recently armed ticket fires.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Debounce {
    armed: u64,
}

impl Debounce {
    pub fn arm(&mut self) -> u64 {
        self.armed += 1;
        self.armed
    }

    pub fn fires(&self, ticket: u64) -> bool {
        ticket == self.armed
    }
}

/// Follows `source` once it has stopped changing for `delay_ms`.
pub(crate) fn debounced(source: RwSignal<String>, delay_ms: u64) -> ReadSignal<String> {
    let (settled, set_settled) = signal(source.get_untracked());
    let gate = StoredValue::new(Debounce::default());

    Effect::new(move |_| {
        let value = source.get();
        let Some(ticket) = gate.try_update_value(|g| g.arm()) else {
            return;
        };
        set_timeout(
            move || {
                if gate.try_with_value(|g| g.fires(ticket)).unwrap_or(false) {
                    let _ = set_settled.try_set(value);
                }
            },
            Duration::from_millis(delay_ms),
        );
    });

    settled
}


#[cfg(all(test, target_arch = "wasm32"))]
pub(crate) mod test_support {
    use crate::state::{AppContext, AppState};
    use leptos::prelude::*;
    use wasm_bindgen::JsCast;

    /// Points the API at a closed local port so every request fails fast.
    pub fn use_unreachable_api() {
        let window = web_sys::window().unwrap();
        let env = js_sys::Object::new();
        js_sys::Reflect::set(&env, &"API_URL".into(), &"http://127.0.0.1:9".into()).unwrap();
        js_sys::Reflect::set(&window, &"ENV".into(), &env).unwrap();
    }

    /// Mounts `f` under a fresh `AppContext` in a new div appended to the body.
    pub fn mount<F, N>(f: F) -> web_sys::HtmlElement
    where
        F: FnOnce() -> N + 'static,
        N: IntoView + 'static,
    {
        let _ = leptos::task::Executor::init_wasm_bindgen();
        let document = web_sys::window().unwrap().document().unwrap();
        let parent = document
            .create_element("div")
            .unwrap()
            .unchecked_into::<web_sys::HtmlElement>();
        document.body().unwrap().append_child(&parent).unwrap();

        leptos::mount::mount_to(parent.clone(), move || {
            provide_context(AppContext(AppState::new()));
            f()
        })
        .forget();
        parent
    }

    pub async fn sleep(ms: i32) {
        let promise = js_sys::Promise::new(&mut |resolve, _| {
            web_sys::window()
                .unwrap()
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
                .unwrap();
        });
        wasm_bindgen_futures::JsFuture::from(promise).await.unwrap();
    }

    /// Polls `cond` every 25 ms for up to `timeout_ms`.
    pub async fn wait_for(cond: impl Fn() -> bool, timeout_ms: i32) -> bool {
        let mut waited = 0;
        while waited < timeout_ms {
            if cond() {
                return true;
            }
            sleep(25).await;
            waited += 25;
        }
        cond()
    }

    pub fn text(root: &web_sys::HtmlElement) -> String {
        root.text_content().unwrap_or_default()
    }

    pub fn click(root: &web_sys::HtmlElement, selector: &str) {
        root.query_selector(selector)
            .unwrap()
            .unwrap_or_else(|| panic!("no element matches {selector}"))
            .unchecked_into::<web_sys::HtmlElement>()
            .click();
    }
}
