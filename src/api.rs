//! Wire contract with the issues backend (JSON over HTTP) plus the pure
//! request builder. `build_request` output doubles as the fetch identity:
//! two structurally equal payloads mean the loaded list is still valid.

use anyhow::Context;
use dioxus_logger::tracing::warn;
use serde::{Deserialize, Serialize};

use crate::_const::{api_base_url, GITHUB_API_URL, PAGE_SIZE};
use crate::url_state::{FilterValues, SetOperator, SortOrder, SortValues, StarsFilter};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub issue_id: i64,
    pub issue_title: String,
    pub issue_url: String,
    pub issue_created: String,
    pub issue_updated: String,
    #[serde(default)]
    pub issue_labels: Vec<String>,
    #[serde(default)]
    pub issue_language: Option<String>,
    pub repository_title: String,
    pub repository_url: String,
    pub repository_stars: u32,
    #[serde(default)]
    pub repository_description: Option<String>,
    #[serde(default)]
    pub repository_language: Option<String>,
    #[serde(default)]
    pub repository_license: Option<String>,
    #[serde(default)]
    pub repository_owner_avatar: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct IssuesResponse {
    pub issues: Vec<Issue>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValuesFilter {
    pub values: Vec<String>,
    pub operator: SetOperator,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IssuesFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<ValuesFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub licenses: Option<ValuesFilter>,
    #[serde(rename = "issueLanguages", skip_serializing_if = "Option::is_none")]
    pub issue_languages: Option<ValuesFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<StarsFilter>,
}

impl IssuesFilter {
    fn is_inactive(&self) -> bool {
        self.languages.is_none()
            && self.licenses.is_none()
            && self.issue_languages.is_none()
            && self.stars.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IssuesRequest {
    pub limit: u32,
    pub offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<IssuesFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<SortOrder>>,
}

impl IssuesRequest {
    pub fn with_offset(&self, offset: u32) -> Self {
        IssuesRequest {
            offset,
            ..self.clone()
        }
    }

    /// Single-row probe used by the random picker.
    pub fn probe_at(&self, offset: u32) -> Self {
        IssuesRequest {
            limit: 1,
            offset,
            ..self.clone()
        }
    }
}

/// Maps filter/sort state to the wire payload. A criterion only produces a
/// filter group while it is active (non-empty set, stars present); with no
/// active group the `filter` key is omitted entirely.
pub fn build_request(filters: &FilterValues, sorts: &SortValues) -> IssuesRequest {
    let set_group = |values: &[String], operator: SetOperator| -> Option<ValuesFilter> {
        if values.is_empty() {
            None
        } else {
            Some(ValuesFilter {
                values: values.to_vec(),
                operator,
            })
        }
    };

    let filter = IssuesFilter {
        // language selection is always inclusive
        languages: set_group(&filters.selected_languages, SetOperator::In),
        licenses: set_group(&filters.selected_licenses, filters.licenses_operator),
        issue_languages: set_group(
            &filters.selected_issue_languages,
            filters.issue_languages_operator,
        ),
        stars: filters.stars,
    };

    IssuesRequest {
        limit: PAGE_SIZE,
        offset: 0,
        filter: if filter.is_inactive() {
            None
        } else {
            Some(filter)
        },
        orders: if sorts.orders().is_empty() {
            None
        } else {
            Some(sorts.orders().to_vec())
        },
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEvent {
    pub source: String,
    pub last_update_dttm: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct FeedGenerateRequest {
    pub nickname: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FeedGenerateResponse {
    pub id: i64,
    pub nickname: String,
    pub email: String,
    pub status: String,
    pub created: String,
}

/// The backend also exposes `GET /api/issues/random` (plain URL body, 404
/// for no match); the random picker probes this POST endpoint instead so
/// it shares one request shape with the list.
pub async fn fetch_issues(request: &IssuesRequest) -> anyhow::Result<IssuesResponse> {
    let url = format!("{}/api/issues", api_base_url());
    let response = reqwest::Client::new()
        .post(&url)
        .json(request)
        .send()
        .await
        .context("issues request failed")?;
    if !response.status().is_success() {
        anyhow::bail!("issues request: bad status {}", response.status());
    }
    response
        .json::<IssuesResponse>()
        .await
        .context("issues response body")
}

async fn fetch_string_list(path: &str) -> anyhow::Result<Vec<String>> {
    let url = format!("{}{}", api_base_url(), path);
    let response = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .with_context(|| format!("GET {path} failed"))?;
    if !response.status().is_success() {
        anyhow::bail!("GET {path}: bad status {}", response.status());
    }
    let raw = response
        .json::<Vec<Option<String>>>()
        .await
        .with_context(|| format!("GET {path}: response body"))?;
    // backends have shipped nulls and blank entries in these lists
    Ok(raw
        .into_iter()
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .collect())
}

pub async fn fetch_languages() -> anyhow::Result<Vec<String>> {
    fetch_string_list("/api/issues/languages").await
}

pub async fn fetch_licenses() -> anyhow::Result<Vec<String>> {
    fetch_string_list("/api/issues/licenses").await
}

pub async fn fetch_issue_languages() -> anyhow::Result<Vec<String>> {
    fetch_string_list("/api/issues/issue-languages").await
}

pub async fn fetch_sync_events() -> anyhow::Result<Vec<SyncEvent>> {
    let url = format!("{}/api/sync", api_base_url());
    let response = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .context("sync events request failed")?;
    if !response.status().is_success() {
        anyhow::bail!("sync events: bad status {}", response.status());
    }
    response.json().await.context("sync events body")
}

/// 404 means "no such user", anything else unsuccessful is a real error.
pub async fn check_github_user_exists(nickname: &str) -> anyhow::Result<bool> {
    let url = format!("{}/users/{}", GITHUB_API_URL, nickname);
    let response = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .context("github user lookup failed")?;
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(false);
    }
    if !response.status().is_success() {
        warn!("github user lookup: unexpected status {}", response.status());
        anyhow::bail!("github user lookup: bad status {}", response.status());
    }
    Ok(true)
}

pub async fn generate_feed(request: &FeedGenerateRequest) -> anyhow::Result<FeedGenerateResponse> {
    let url = format!("{}/api/feed", api_base_url());
    let response = reqwest::Client::new()
        .post(&url)
        .json(request)
        .send()
        .await
        .context("feed signup failed")?;
    if !response.status().is_success() {
        anyhow::bail!("feed signup: bad status {}", response.status());
    }
    response.json().await.context("feed signup body")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_state::{SortDirection, StarsOperator};

    #[test]
    fn inactive_criteria_omit_filter_entirely() {
        let request = build_request(&FilterValues::default(), &SortValues::default());
        assert_eq!(request.limit, PAGE_SIZE);
        assert_eq!(request.offset, 0);
        assert!(request.filter.is_none());

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("filter").is_none());
        assert_eq!(json["limit"], 20);
    }

    #[test]
    fn active_groups_only() {
        let filters = FilterValues {
            selected_languages: vec!["Go".into()],
            selected_licenses: vec![],
            licenses_operator: SetOperator::NotIn,
            selected_issue_languages: vec!["English".into()],
            issue_languages_operator: SetOperator::NotIn,
            stars: Some(StarsFilter {
                value: 50,
                operator: StarsOperator::Greater,
            }),
        };
        let request = build_request(&filters, &SortValues::default());
        let filter = request.filter.unwrap();
        assert_eq!(filter.languages.as_ref().unwrap().operator, SetOperator::In);
        assert!(filter.licenses.is_none());
        assert_eq!(
            filter.issue_languages.as_ref().unwrap().operator,
            SetOperator::NotIn
        );
        assert!(filter.stars.is_some());
    }

    #[test]
    fn wire_shape_matches_contract() {
        let filters = FilterValues {
            selected_languages: vec!["Go".into(), "Rust".into()],
            stars: Some(StarsFilter {
                value: 50,
                operator: StarsOperator::Greater,
            }),
            ..FilterValues::default()
        };
        let sorts = SortValues::from_orders(vec![SortOrder {
            field: "er.stars".into(),
            direction: SortDirection::Desc,
        }]);
        let json = serde_json::to_value(build_request(&filters, &sorts)).unwrap();
        assert_eq!(
            json["filter"]["languages"],
            serde_json::json!({"values": ["Go", "Rust"], "operator": "IN"})
        );
        assert_eq!(
            json["filter"]["stars"],
            serde_json::json!({"value": 50, "operator": "GREATER"})
        );
        assert_eq!(
            json["orders"],
            serde_json::json!([{"field": "er.stars", "type": "desc"}])
        );
    }

    #[test]
    fn request_identity_is_structural() {
        let filters = FilterValues {
            selected_languages: vec!["Go".into()],
            ..FilterValues::default()
        };
        let a = build_request(&filters, &SortValues::default());
        let b = build_request(&filters.clone(), &SortValues::default());
        assert_eq!(a, b);
        let mut changed = filters;
        changed.toggle_language("Rust");
        assert_ne!(a, build_request(&changed, &SortValues::default()));
    }

    #[test]
    fn probe_overrides_limit_and_offset() {
        let base = build_request(&FilterValues::default(), &SortValues::default());
        let probe = base.probe_at(42);
        assert_eq!(probe.limit, 1);
        assert_eq!(probe.offset, 42);
        assert_eq!(probe.filter, base.filter);
        assert_eq!(base.with_offset(40).offset, 40);
    }

    #[test]
    fn issue_deserializes_from_wire_names() {
        let json = serde_json::json!({
            "issueId": 7,
            "issueTitle": "Fix the thing",
            "issueUrl": "https://github.com/a/b/issues/7",
            "issueCreated": "2024-05-01T12:00:00Z",
            "issueUpdated": "2024-05-02T12:00:00Z",
            "issueLabels": ["good first issue"],
            "issueLanguage": "English",
            "repositoryTitle": "a/b",
            "repositoryUrl": "https://github.com/a/b",
            "repositoryStars": 321,
            "repositoryDescription": null,
            "repositoryLanguage": "Rust",
            "repositoryLicense": "MIT"
        });
        let issue: Issue = serde_json::from_value(json).unwrap();
        assert_eq!(issue.issue_id, 7);
        assert_eq!(issue.repository_stars, 321);
        assert_eq!(issue.repository_description, None);
        assert_eq!(issue.repository_owner_avatar, None);
    }
}
