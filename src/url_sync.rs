//! URL Sync Bridge: keeps the store state and the address bar equal
//! without the two change sources feeding back into each other.
//!
//! Two paths touch the URL. The write path runs on every store change and
//! replaces the query in place. The read path watches for changes made by
//! anything else (back/forward, other code) and pushes the decoded result
//! into the stores. Loop suppression: a self-update flag is up while a
//! write settles (cleared after [`SELF_UPDATE_CLEAR_MS`]), and a
//! last-observed query owned by the bridge alone decides whether a change
//! is real. Not every programmatic URL write fires `popstate`, so a
//! low-priority poll runs the same comparison as the event listener.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use dioxus::prelude::*;
use dioxus_logger::tracing::info;

use crate::_const::{SELF_UPDATE_CLEAR_MS, URL_POLL_MS};
use crate::filters::FiltersStore;
use crate::sorting::SortingStore;
use crate::url_state::{
    decode_query, encode_query, parse_pairs, percent_encode, FilterValues, SortValues, UrlState,
    OWNED_PARAMS,
};

/// The two things the bridge needs from an address bar. The browser impl
/// uses the History API; native builds and tests use an in-memory query.
/// A platform with a real "URL changed" notification can satisfy the read
/// side without the poll.
pub trait UrlBackend {
    /// Current query string, without the leading `?`.
    fn current_query(&self) -> String;
    /// Replaces the query in place: no navigation, no reload, no new
    /// history entry.
    fn replace_query(&self, query: &str);
}

impl<T: UrlBackend + ?Sized> UrlBackend for Rc<T> {
    fn current_query(&self) -> String {
        (**self).current_query()
    }

    fn replace_query(&self, query: &str) {
        (**self).replace_query(query)
    }
}

#[cfg(target_arch = "wasm32")]
pub struct BrowserUrl;

#[cfg(target_arch = "wasm32")]
impl UrlBackend for BrowserUrl {
    fn current_query(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().search().ok())
            .map(|s| s.trim_start_matches('?').to_string())
            .unwrap_or_default()
    }

    fn replace_query(&self, query: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(history) = window.history() else {
            return;
        };
        let path = window
            .location()
            .pathname()
            .unwrap_or_else(|_| "/".to_string());
        let url = if query.is_empty() {
            path
        } else {
            format!("{path}?{query}")
        };
        if let Err(err) =
            history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&url))
        {
            dioxus_logger::tracing::warn!("replace_query: history.replaceState failed: {err:?}");
        }
    }
}

#[derive(Default)]
pub struct MemoryUrl {
    query: RefCell<String>,
}

impl MemoryUrl {
    pub fn with_query(query: &str) -> Self {
        MemoryUrl {
            query: RefCell::new(query.to_string()),
        }
    }
}

impl UrlBackend for MemoryUrl {
    fn current_query(&self) -> String {
        self.query.borrow().clone()
    }

    fn replace_query(&self, query: &str) {
        *self.query.borrow_mut() = query.to_string();
    }
}

struct SyncInner {
    backend: Box<dyn UrlBackend>,
    /// Owned by the bridge alone; both paths go through the methods below,
    /// never around them.
    last_observed: RefCell<String>,
    self_update: Cell<bool>,
    write_subscribers: RefCell<Vec<Box<dyn Fn(&str)>>>,
}

/// One bridge per mounted view, handed around through context. Cloning
/// shares the same underlying state, so independent views each get their
/// own `UrlSync::new` and cannot interfere.
#[derive(Clone)]
pub struct UrlSync {
    inner: Rc<SyncInner>,
}

impl UrlSync {
    pub fn new(backend: impl UrlBackend + 'static) -> Self {
        let last_observed = backend.current_query();
        UrlSync {
            inner: Rc::new(SyncInner {
                backend: Box::new(backend),
                last_observed: RefCell::new(last_observed),
                self_update: Cell::new(false),
                write_subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn current_query(&self) -> String {
        self.inner.backend.current_query()
    }

    pub fn is_self_updating(&self) -> bool {
        self.inner.self_update.get()
    }

    /// Called after each self-write with the query that was written.
    pub fn subscribe_writes(&self, subscriber: impl Fn(&str) + 'static) {
        self.inner
            .write_subscribers
            .borrow_mut()
            .push(Box::new(subscriber));
    }

    /// Write path. Encodes the state, keeps foreign params (`utm_source`
    /// in particular) untouched, and skips the write entirely when the
    /// result matches what is already observed. Returns true when a write
    /// happened; the caller is responsible for clearing the self-update
    /// flag once the commit cycle has settled.
    pub fn write_state(&self, filters: &FilterValues, sorts: &SortValues) -> bool {
        let merged = merge_owned_params(&self.inner.backend.current_query(), filters, sorts);
        if merged == *self.inner.last_observed.borrow() {
            return false;
        }
        self.inner.self_update.set(true);
        self.inner.backend.replace_query(&merged);
        *self.inner.last_observed.borrow_mut() = merged.clone();
        for subscriber in self.inner.write_subscribers.borrow().iter() {
            subscriber(&merged);
        }
        true
    }

    pub fn end_self_update(&self) {
        self.inner.self_update.set(false);
    }

    /// Read path, shared by the popstate listener and the poll. Never
    /// fires while a self-update is settling; otherwise adopts a changed
    /// query and hands back its decoded state.
    pub fn check_external(&self) -> Option<UrlState> {
        if self.inner.self_update.get() {
            return None;
        }
        let current = self.inner.backend.current_query();
        if current == *self.inner.last_observed.borrow() {
            return None;
        }
        *self.inner.last_observed.borrow_mut() = current.clone();
        Some(decode_query(&current))
    }
}

/// Encoded owned params first, then every foreign pair in its original
/// order. Decoding a malformed foreign pair and re-encoding it normalizes
/// the escaping but keeps key and value intact.
pub fn merge_owned_params(
    current_query: &str,
    filters: &FilterValues,
    sorts: &SortValues,
) -> String {
    let owned = encode_query(filters, sorts);
    let foreign: Vec<String> = parse_pairs(current_query)
        .into_iter()
        .filter(|(key, _)| !OWNED_PARAMS.contains(&key.as_str()))
        .map(|(key, value)| format!("{}={}", percent_encode(&key), percent_encode(&value)))
        .collect();
    if foreign.is_empty() {
        owned
    } else {
        format!("{owned}&{}", foreign.join("&"))
    }
}

/// Browser bridge on wasm, in-memory elsewhere (desktop builds have no
/// address bar to mirror).
pub fn platform_url_sync() -> UrlSync {
    #[cfg(target_arch = "wasm32")]
    {
        UrlSync::new(BrowserUrl)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        UrlSync::new(MemoryUrl::default())
    }
}

pub(crate) async fn sleep_ms(ms: u32) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::TimeoutFuture::new(ms).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(Duration::from_millis(ms as u64)).await;
}

#[cfg(target_arch = "wasm32")]
struct PopstateListener {
    callback: wasm_bindgen::closure::Closure<dyn FnMut()>,
}

#[cfg(target_arch = "wasm32")]
impl PopstateListener {
    fn install(mut bump: Signal<u32>) -> Self {
        use wasm_bindgen::JsCast;

        let callback = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || {
            // defer the actual work into component scope
            *bump.write() += 1;
        });
        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", callback.as_ref().unchecked_ref());
        }
        PopstateListener { callback }
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for PopstateListener {
    fn drop(&mut self) {
        use wasm_bindgen::JsCast;

        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                "popstate",
                self.callback.as_ref().unchecked_ref(),
            );
        }
    }
}

/// Wires the bridge between the stores and the address bar for the
/// lifetime of the calling component.
pub fn use_url_sync(mut filters: FiltersStore, mut sorting: SortingStore) {
    let sync = use_context::<UrlSync>();

    {
        let sync = sync.clone();
        use_hook(move || sync.subscribe_writes(|query| info!("url now ?{query}")));
    }

    // state -> URL, synchronous on every store change
    {
        let sync = sync.clone();
        use_effect(move || {
            let filter_values = filters.values().read().clone();
            let sort_values = sorting.values().read().clone();
            if sync.write_state(&filter_values, &sort_values) {
                let sync = sync.clone();
                spawn(async move {
                    sleep_ms(SELF_UPDATE_CLEAR_MS).await;
                    sync.end_self_update();
                });
            }
        });
    }

    // URL -> state on browser navigation
    let external_bump = use_signal(|| 0u32);
    #[cfg(target_arch = "wasm32")]
    use_hook(move || Rc::new(PopstateListener::install(external_bump)));
    {
        let sync = sync.clone();
        use_effect(move || {
            let _ = external_bump.read();
            adopt_external(&sync, &mut filters, &mut sorting);
        });
    }

    // URL -> state fallback for writes that fire no event; strictly lower
    // priority than the paths above and silent during self-updates
    dioxus_sdk::utils::timing::use_interval(Duration::from_millis(URL_POLL_MS), move || {
        adopt_external(&sync, &mut filters, &mut sorting);
    });
}

fn adopt_external(sync: &UrlSync, filters: &mut FiltersStore, sorting: &mut SortingStore) {
    if let Some(url) = sync.check_external() {
        info!("adopting external url change");
        filters.adopt_url_state(&url);
        sorting.adopt_url_state(&url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_state::StarsParam;

    fn go_filters() -> FilterValues {
        FilterValues {
            selected_languages: vec!["Go".into()],
            ..FilterValues::default()
        }
    }

    #[test]
    fn write_replaces_query_and_skips_noops() {
        let backend = Rc::new(MemoryUrl::default());
        let sync = UrlSync::new(backend.clone());

        assert!(sync.write_state(&go_filters(), &SortValues::default()));
        sync.end_self_update();
        let written = backend.current_query();
        assert!(written.contains("languages=Go"));
        assert!(written.contains("sort=ei.created_at:desc"));

        // same state again: no write, no flag
        assert!(!sync.write_state(&go_filters(), &SortValues::default()));
        assert!(!sync.is_self_updating());
    }

    #[test]
    fn utm_source_survives_every_rewrite() {
        let backend = Rc::new(MemoryUrl::with_query("utm_source=newsletter"));
        let sync = UrlSync::new(backend.clone());

        assert!(sync.write_state(&go_filters(), &SortValues::default()));
        sync.end_self_update();
        assert!(backend.current_query().contains("utm_source=newsletter"));

        // clearing the filters still keeps the foreign param
        assert!(sync.write_state(&FilterValues::default(), &SortValues::default()));
        sync.end_self_update();
        let query = backend.current_query();
        assert!(query.contains("utm_source=newsletter"));
        assert!(!query.contains("languages"));
    }

    #[test]
    fn own_write_is_not_an_external_change() {
        let backend = Rc::new(MemoryUrl::default());
        let sync = UrlSync::new(backend);

        assert!(sync.write_state(&go_filters(), &SortValues::default()));
        // while the flag is up
        assert!(sync.check_external().is_none());
        sync.end_self_update();
        // and after it cleared: the query matches last-observed
        assert!(sync.check_external().is_none());
    }

    #[test]
    fn external_change_is_adopted_once() {
        let backend = Rc::new(MemoryUrl::default());
        let sync = UrlSync::new(backend.clone());

        backend.replace_query("languages=Zig&sort=er.stars:asc");
        let url = sync.check_external().expect("change should be seen");
        assert_eq!(url.languages, Some(vec!["Zig".to_string()]));
        assert_eq!(url.sort_values().orders()[0].field, "er.stars");

        // second look: already observed
        assert!(sync.check_external().is_none());
    }

    #[test]
    fn poll_is_suppressed_while_self_update_settles() {
        let backend = Rc::new(MemoryUrl::default());
        let sync = UrlSync::new(backend.clone());

        assert!(sync.write_state(&go_filters(), &SortValues::default()));
        // an external write lands while the flag is still up
        backend.replace_query("languages=Zig&sort=ei.created_at:desc");
        assert!(sync.check_external().is_none());

        // once the flag clears the change is picked up, not lost
        sync.end_self_update();
        let url = sync.check_external().expect("deferred change visible");
        assert_eq!(url.languages, Some(vec!["Zig".to_string()]));
    }

    #[test]
    fn subscribers_hear_self_writes_only() {
        let backend = Rc::new(MemoryUrl::default());
        let sync = UrlSync::new(backend.clone());
        let seen = Rc::new(RefCell::new(Vec::<String>::new()));
        {
            let seen = seen.clone();
            sync.subscribe_writes(move |query| seen.borrow_mut().push(query.to_string()));
        }

        assert!(sync.write_state(&go_filters(), &SortValues::default()));
        sync.end_self_update();
        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].contains("languages=Go"));

        backend.replace_query("languages=Zig&sort=ei.created_at:desc");
        let _ = sync.check_external();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn stale_owned_params_are_dropped_on_merge() {
        let merged = merge_owned_params(
            "languages=Go&stars=10&starsOp=GREATER&utm_source=x&flag=1",
            &FilterValues::default(),
            &SortValues::default(),
        );
        assert!(!merged.contains("languages="));
        assert!(!merged.contains("stars="));
        assert!(merged.contains("utm_source=x"));
        assert!(merged.contains("flag=1"));
    }

    #[test]
    fn malformed_external_url_decodes_to_defaults() {
        let backend = Rc::new(MemoryUrl::default());
        let sync = UrlSync::new(backend.clone());

        backend.replace_query("stars=banana&starsOp=GREATER&sort=:::");
        let url = sync.check_external().expect("still a change");
        assert_eq!(url.stars, StarsParam::Cleared);
        assert_eq!(url.sort_values(), SortValues::default());
    }
}
