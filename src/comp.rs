//! Display side of the issues view: the list, one card per issue, the
//! load-more sentinel and the small status surfaces around them.

use dioxus::prelude::*;

use crate::issues_loader::PageState;
use crate::options::use_sync_status;

pub(crate) fn format_date(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[component]
pub fn IssuesPanel(page: ReadOnlySignal<PageState>, on_load_more: EventHandler<()>) -> Element {
    let state = page.read();
    let initial_error = state.error.as_ref().filter(|e| e.is_initial()).cloned();
    let more_error = state.error.as_ref().filter(|e| !e.is_initial()).cloned();

    rsx! {
        div { id: "issues_panel",
            if state.loading && state.items.is_empty() {
                p { "Loading issues..." }
            }
            {initial_error.map(|error| rsx! {
                p { style: "color:#b00;", "Failed to load issues: {error.message()}" }
            })}
            if !state.loading && state.items.is_empty() && state.error.is_none() {
                p { "No issues found. Try adjusting your filters." }
            }
            if !state.items.is_empty() {
                p { "Showing {state.items.len()} issues" }
                ul { style: "list-style-type:none;margin:0;padding:0;",
                    for issue in state.items.iter().cloned() {
                        li { key: "issue_{issue.issue_id}",
                            IssueCard { issue }
                        }
                    }
                }
                {more_error.map(|error| rsx! {
                    p { style: "color:#b00;", "Failed to load more: {error.message()}" }
                })}
                LoadMoreTrigger {
                    has_more: state.has_more,
                    loading_more: state.loading_more,
                    on_intersect: move |_| on_load_more.call(()),
                }
            }
        }
    }
}

#[component]
fn IssueCard(issue: crate::api::Issue) -> Element {
    let created = format_date(&issue.issue_created);
    let language = issue.repository_language.clone().unwrap_or_default();
    let license = issue.repository_license.clone().unwrap_or_default();
    let description = issue.repository_description.clone().unwrap_or_default();

    rsx! {
        div { style: "border:1px solid #ddd;border-radius:6px;padding:0.75rem;margin-bottom:0.5rem;",
            a { href: "{issue.issue_url}", target: "_blank", rel: "noopener noreferrer",
                strong { "{issue.issue_title}" }
            }
            div { style: "font-size:0.85rem;color:#555;",
                a { href: "{issue.repository_url}", target: "_blank", rel: "noopener noreferrer",
                    "{issue.repository_title}"
                }
                span { " · ★ {issue.repository_stars}" }
                if !language.is_empty() {
                    span { " · {language}" }
                }
                if !license.is_empty() {
                    span { " · {license}" }
                }
                span { " · opened {created}" }
            }
            if !description.is_empty() {
                p { style: "margin:0.25rem 0 0 0;font-size:0.85rem;", "{description}" }
            }
            if !issue.issue_labels.is_empty() {
                div {
                    for label in issue.issue_labels.iter() {
                        span { style: "font-size:0.75rem;border:1px solid #ccc;border-radius:8px;padding:0 0.4rem;margin-right:0.25rem;",
                            "{label}"
                        }
                    }
                }
            }
        }
    }
}

/// Sits under the list; entering the viewport asks for the next page.
/// The guard here is cosmetic, the loader enforces the real one.
#[component]
fn LoadMoreTrigger(has_more: bool, loading_more: bool, on_intersect: EventHandler<()>) -> Element {
    if !has_more {
        return rsx! {
            p { style: "text-align:center;color:#777;", "No more issues to load" }
        };
    }
    rsx! {
        div {
            id: "load_more_trigger",
            style: "min-height:4rem;display:flex;justify-content:center;align-items:center;",
            onvisible: move |evt| {
                if evt.data().is_intersecting().unwrap_or(false) {
                    on_intersect.call(());
                }
            },
            if loading_more {
                span { "Loading more..." }
            }
        }
    }
}

#[component]
pub fn ActionButtons(
    picking: ReadOnlySignal<bool>,
    notice: ReadOnlySignal<Option<String>>,
    on_pick: EventHandler<()>,
) -> Element {
    rsx! {
        div {
            button {
                disabled: *picking.read(),
                onclick: move |_| on_pick.call(()),
                if *picking.read() { "Picking..." } else { "Pick a random issue" }
            }
            {notice.read().clone().map(|message| rsx! {
                span { style: "margin-left:0.5rem;color:#777;", "{message}" }
            })}
        }
    }
}

#[component]
pub fn SyncStatusLine() -> Element {
    let events = use_sync_status();

    rsx! {
        div { style: "margin-top:1rem;font-size:0.8rem;color:#777;",
            {match events.read().as_ref() {
                None => rsx! { span { "Checking sync status..." } },
                Some(Err(_)) => rsx! { span { "Sync status unavailable" } },
                Some(Ok(list)) => rsx! {
                    for event in list.iter() {
                        span { style: "margin-right:1rem;",
                            "{event.source}: {format_date(&event.last_update_dttm)}"
                        }
                    }
                },
            }}
        }
    }
}
