//! "Feeling lucky" sampler: asks the backend for a single issue matching
//! the current filters at a random offset, a bounded number of times.
//!
//! The probe loop is generic over the fetch so the retry policy runs under
//! a plain executor in tests; the hook below plugs in the real API call
//! and a thread-local RNG.

use std::future::Future;

use dioxus::prelude::*;
use dioxus_logger::tracing::{info, warn};
use rand::Rng;

use crate::_const::{RANDOM_MAX_ATTEMPTS, RANDOM_MAX_OFFSET};
use crate::api::{self, Issue, IssuesRequest, IssuesResponse};

#[derive(Clone, Debug, PartialEq)]
pub enum RandomOutcome {
    Found(Issue),
    /// Nothing matches the filters. A normal outcome, not a failure.
    NoMatch,
}

/// Up to [`RANDOM_MAX_ATTEMPTS`] probes at limit 1 and a random offset
/// below [`RANDOM_MAX_OFFSET`], then one last probe at offset 0: with a
/// sparse result set every random offset may overshoot the end, and the
/// first row decides whether anything matches at all. Transport errors
/// propagate; they are not an empty result.
pub async fn sample<F, Fut>(
    base: &IssuesRequest,
    mut fetch: F,
    mut random_offset: impl FnMut(u32) -> u32,
) -> anyhow::Result<RandomOutcome>
where
    F: FnMut(IssuesRequest) -> Fut,
    Fut: Future<Output = anyhow::Result<IssuesResponse>>,
{
    for attempt in 1..=RANDOM_MAX_ATTEMPTS {
        let offset = random_offset(RANDOM_MAX_OFFSET);
        let response = fetch(base.probe_at(offset)).await?;
        if let Some(issue) = response.issues.into_iter().next() {
            info!("random probe hit at offset {offset} (attempt {attempt}/{RANDOM_MAX_ATTEMPTS})");
            return Ok(RandomOutcome::Found(issue));
        }
    }
    let response = fetch(base.probe_at(0)).await?;
    Ok(match response.issues.into_iter().next() {
        Some(issue) => RandomOutcome::Found(issue),
        None => RandomOutcome::NoMatch,
    })
}

#[derive(Clone, Copy)]
pub struct RandomIssue {
    pub picking: Signal<bool>,
    /// Outcome line for the view; `None` while there is nothing to say.
    pub notice: Signal<Option<String>>,
    pub pick: Callback<IssuesRequest>,
}

pub fn use_random_issue() -> RandomIssue {
    let mut picking = use_signal(|| false);
    let mut notice = use_signal(|| None);

    let pick = use_callback(move |base: IssuesRequest| {
        if *picking.peek() {
            return;
        }
        picking.set(true);
        notice.set(None);
        spawn(async move {
            let result = sample(
                &base,
                |request| async move { api::fetch_issues(&request).await },
                |max| rand::thread_rng().gen_range(0..max),
            )
            .await;
            match result {
                Ok(RandomOutcome::Found(issue)) => {
                    open_in_new_tab(&issue.issue_url);
                }
                Ok(RandomOutcome::NoMatch) => {
                    notice.set(Some(
                        "No issues match the current filters. Try adjusting them.".to_string(),
                    ));
                }
                Err(err) => {
                    warn!("random pick failed: {err:#}");
                    notice.set(Some(
                        "Could not pick a random issue. Please try again.".to_string(),
                    ));
                }
            }
            picking.set(false);
        });
    });

    RandomIssue {
        picking,
        notice,
        pick,
    }
}

fn open_in_new_tab(url: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            if let Err(err) = window.open_with_url_and_target(url, "_blank") {
                warn!("window.open failed: {err:?}");
            }
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        info!("random pick: {url}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_state::{FilterValues, SortValues};
    use futures::executor::block_on;

    fn base_request() -> IssuesRequest {
        api::build_request(&FilterValues::default(), &SortValues::default())
    }

    fn issue_page() -> IssuesResponse {
        serde_json::from_value(serde_json::json!({
            "issues": [{
                "issueId": 1,
                "issueTitle": "t",
                "issueUrl": "https://github.com/a/b/issues/1",
                "issueCreated": "2024-05-01T12:00:00Z",
                "issueUpdated": "2024-05-01T12:00:00Z",
                "repositoryTitle": "a/b",
                "repositoryUrl": "https://github.com/a/b",
                "repositoryStars": 3
            }]
        }))
        .unwrap()
    }

    #[test]
    fn all_probes_empty_reports_no_match() {
        let mut offsets: Vec<u32> = Vec::new();
        let outcome = block_on(sample(
            &base_request(),
            |request| {
                offsets.push(request.offset);
                assert_eq!(request.limit, 1);
                async { Ok(IssuesResponse::default()) }
            },
            |max| {
                assert_eq!(max, RANDOM_MAX_OFFSET);
                37
            },
        ))
        .unwrap();

        assert_eq!(outcome, RandomOutcome::NoMatch);
        // five random probes plus the final offset-0 attempt
        assert_eq!(offsets, vec![37, 37, 37, 37, 37, 0]);
    }

    #[test]
    fn stops_at_first_hit() {
        let mut calls = 0u32;
        let outcome = block_on(sample(
            &base_request(),
            |_request| {
                calls += 1;
                let response = if calls == 3 {
                    issue_page()
                } else {
                    IssuesResponse::default()
                };
                async move { Ok(response) }
            },
            |_| 5,
        ))
        .unwrap();

        assert!(matches!(outcome, RandomOutcome::Found(_)));
        assert_eq!(calls, 3);
    }

    #[test]
    fn final_offset_zero_attempt_can_still_hit() {
        let mut calls = 0u32;
        let outcome = block_on(sample(
            &base_request(),
            |request| {
                calls += 1;
                let response = if request.offset == 0 {
                    issue_page()
                } else {
                    IssuesResponse::default()
                };
                async move { Ok(response) }
            },
            |_| 99,
        ))
        .unwrap();

        assert!(matches!(outcome, RandomOutcome::Found(_)));
        assert_eq!(calls, RANDOM_MAX_ATTEMPTS + 1);
    }

    #[test]
    fn transport_error_is_not_no_match() {
        let result = block_on(sample(
            &base_request(),
            |_request| async { anyhow::bail!("socket closed") },
            |_| 1,
        ));
        assert!(result.is_err());
    }
}
