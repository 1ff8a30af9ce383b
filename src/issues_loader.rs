//! Incremental loading of the issue list.
//!
//! `PageState` is the whole state machine: reset on a new request identity,
//! guarded load-more, and a generation fence standing in for request
//! cancellation. Every fetch carries the generation it was issued under; a
//! response whose generation was superseded is dropped on the floor, so a
//! slow request for old filters can never overwrite results for new ones.

use dioxus::prelude::*;
use dioxus_logger::tracing::info;

use crate::_const::PAGE_SIZE;
use crate::api::{self, Issue, IssuesRequest, IssuesResponse};

#[derive(Clone, Debug, PartialEq)]
pub enum FetchError {
    /// Page-0 fetch failed: the list is empty and this is all there is.
    Initial(String),
    /// A continuation failed: the items already on screen stay usable.
    LoadMore(String),
}

impl FetchError {
    pub fn message(&self) -> &str {
        match self {
            FetchError::Initial(msg) | FetchError::LoadMore(msg) => msg,
        }
    }

    pub fn is_initial(&self) -> bool {
        matches!(self, FetchError::Initial(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageState {
    pub items: Vec<Issue>,
    pub loading: bool,
    pub loading_more: bool,
    pub has_more: bool,
    pub error: Option<FetchError>,
    next_offset: u32,
    generation: u64,
}

impl Default for PageState {
    fn default() -> Self {
        PageState::new()
    }
}

impl PageState {
    pub fn new() -> Self {
        PageState {
            items: Vec::new(),
            loading: true,
            loading_more: false,
            has_more: true,
            error: None,
            next_offset: 0,
            generation: 0,
        }
    }

    /// Entered whenever the filter/sort identity changes. Clears the list,
    /// invalidates every in-flight fetch and returns the generation the
    /// page-0 fetch must carry.
    pub fn begin_reset(&mut self) -> u64 {
        self.generation += 1;
        self.items.clear();
        self.loading = true;
        self.loading_more = false;
        self.has_more = true;
        self.error = None;
        self.next_offset = 0;
        self.generation
    }

    /// Guarded entry into LoadingMore: refused while any fetch is in
    /// flight or when the list is exhausted, so a scroll sentinel firing
    /// several times in one tick issues a single request.
    pub fn begin_load_more(&mut self) -> Option<(u64, u32)> {
        if self.loading || self.loading_more || !self.has_more {
            return None;
        }
        self.loading_more = true;
        self.error = None;
        Some((self.generation, self.next_offset))
    }

    /// Applies a page-0 response. Returns false when the response belongs
    /// to a superseded generation and was discarded.
    pub fn finish_initial(
        &mut self,
        generation: u64,
        result: anyhow::Result<IssuesResponse>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        match result {
            Ok(response) => {
                self.items = response.issues;
                self.apply_page_accounting(self.items.len());
            }
            Err(err) => {
                self.error = Some(FetchError::Initial(format!("{err:#}")));
            }
        }
        true
    }

    /// Applies a continuation response. Failures keep the loaded items.
    pub fn finish_more(&mut self, generation: u64, result: anyhow::Result<IssuesResponse>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading_more = false;
        match result {
            Ok(response) => {
                let page_len = response.issues.len();
                self.items.extend(response.issues);
                self.apply_page_accounting(page_len);
            }
            Err(err) => {
                self.error = Some(FetchError::LoadMore(format!("{err:#}")));
            }
        }
        true
    }

    /// The wire response carries no "last page" flag, so a full page is
    /// read as "probably more". When the total is an exact multiple of the
    /// page size this yields one extra fetch that comes back empty and
    /// flips `has_more` off; callers tolerate that extra round trip.
    fn apply_page_accounting(&mut self, page_len: usize) {
        self.has_more = page_len == PAGE_SIZE as usize;
        // next offset derives from the accumulated count, never from a
        // value captured when the fetch was issued
        self.next_offset = self.items.len() as u32;
    }
}

#[derive(Clone, Copy)]
pub struct InfiniteIssues {
    pub page: Signal<PageState>,
    pub load_more: Callback<()>,
}

/// Owns the paged list for one request identity. The memoized request is
/// the cache key: while it is structurally unchanged nothing refetches;
/// any change resets to offset 0.
pub fn use_infinite_issues(base_request: Memo<IssuesRequest>) -> InfiniteIssues {
    let mut page = use_signal(PageState::new);

    use_effect(move || {
        let request = base_request.read().clone();
        let generation = page.write().begin_reset();
        spawn(async move {
            let result = api::fetch_issues(&request).await;
            if !page.write().finish_initial(generation, result) {
                info!("dropped stale page-0 response (generation {generation})");
            }
        });
    });

    let load_more = use_callback(move |_: ()| {
        let Some((generation, offset)) = page.write().begin_load_more() else {
            return;
        };
        let request = base_request.peek().with_offset(offset);
        spawn(async move {
            let result = api::fetch_issues(&request).await;
            if !page.write().finish_more(generation, result) {
                info!("dropped stale load-more response (generation {generation})");
            }
        });
    });

    InfiniteIssues { page, load_more }
}
