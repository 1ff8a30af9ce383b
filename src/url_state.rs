//! Filter/sort view state and its URL query-string codec.
//!
//! The query string is the single source of truth at page load and after
//! browser navigation, so encode/decode must round-trip exactly. Decoding is
//! total: a mangled link never errors, each bad field just falls back to its
//! default while the rest of the query still applies.

use serde::{Deserialize, Serialize};

use crate::_const::DEFAULT_SORT_FIELD;

/// Query params this codec owns. Anything else in the query string is
/// foreign state (`utm_source` and friends) and must survive rewrites.
pub const OWNED_PARAMS: &[&str] = &[
    "languages",
    "licenses",
    "licensesOp",
    "issueLanguages",
    "issueLanguagesOp",
    "stars",
    "starsOp",
    "sort",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetOperator {
    #[default]
    In,
    NotIn,
}

impl SetOperator {
    pub fn as_token(&self) -> &'static str {
        match self {
            SetOperator::In => "IN",
            SetOperator::NotIn => "NOT_IN",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "IN" => Some(SetOperator::In),
            "NOT_IN" => Some(SetOperator::NotIn),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StarsOperator {
    Greater,
    Less,
}

impl StarsOperator {
    pub fn as_token(&self) -> &'static str {
        match self {
            StarsOperator::Greater => "GREATER",
            StarsOperator::Less => "LESS",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "GREATER" => Some(StarsOperator::Greater),
            "LESS" => Some(StarsOperator::Less),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_token(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarsFilter {
    pub value: u32,
    pub operator: StarsOperator,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    #[serde(rename = "type")]
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn default_order() -> Self {
        SortOrder {
            field: DEFAULT_SORT_FIELD.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

/// Canonical in-memory filter state. Selections behave as sets: insertion
/// order is kept for display, duplicates are refused.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterValues {
    pub selected_languages: Vec<String>,
    pub selected_licenses: Vec<String>,
    pub licenses_operator: SetOperator,
    pub selected_issue_languages: Vec<String>,
    pub issue_languages_operator: SetOperator,
    pub stars: Option<StarsFilter>,
}

fn toggle_member(list: &mut Vec<String>, value: &str) {
    if let Some(at) = list.iter().position(|v| v == value) {
        list.remove(at);
    } else {
        list.push(value.to_string());
    }
}

fn dedup_keep_order(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

impl FilterValues {
    pub fn toggle_language(&mut self, language: &str) {
        toggle_member(&mut self.selected_languages, language);
    }

    pub fn set_languages(&mut self, languages: Vec<String>) {
        self.selected_languages = dedup_keep_order(languages);
    }

    pub fn reset_languages(&mut self) {
        self.selected_languages.clear();
    }

    pub fn toggle_license(&mut self, license: &str) {
        toggle_member(&mut self.selected_licenses, license);
    }

    pub fn set_licenses(&mut self, licenses: Vec<String>) {
        self.selected_licenses = dedup_keep_order(licenses);
    }

    pub fn set_licenses_operator(&mut self, operator: SetOperator) {
        self.licenses_operator = operator;
    }

    pub fn reset_licenses(&mut self) {
        self.selected_licenses.clear();
        self.licenses_operator = SetOperator::In;
    }

    pub fn toggle_issue_language(&mut self, language: &str) {
        toggle_member(&mut self.selected_issue_languages, language);
    }

    pub fn set_issue_languages(&mut self, languages: Vec<String>) {
        self.selected_issue_languages = dedup_keep_order(languages);
    }

    pub fn set_issue_languages_operator(&mut self, operator: SetOperator) {
        self.issue_languages_operator = operator;
    }

    pub fn reset_issue_languages(&mut self) {
        self.selected_issue_languages.clear();
        self.issue_languages_operator = SetOperator::In;
    }

    /// Empty input clears the filter; a fresh value keeps the current
    /// operator, defaulting to GREATER when the filter was off.
    pub fn set_stars_value(&mut self, value: Option<u32>) {
        match value {
            None => self.stars = None,
            Some(value) => {
                let operator = self
                    .stars
                    .map(|s| s.operator)
                    .unwrap_or(StarsOperator::Greater);
                self.stars = Some(StarsFilter { value, operator });
            }
        }
    }

    pub fn set_stars_operator(&mut self, operator: StarsOperator) {
        let value = self.stars.map(|s| s.value).unwrap_or(0);
        self.stars = Some(StarsFilter { value, operator });
    }

    pub fn add_stars(&mut self, filter: StarsFilter) {
        self.stars = Some(filter);
    }

    pub fn remove_stars(&mut self) {
        self.stars = None;
    }

    pub fn reset_all(&mut self) {
        *self = FilterValues::default();
    }
}

/// Ordered sort criteria, never empty: the first entry is the primary
/// order, later entries break ties. Removing the last entry is refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortValues {
    orders: Vec<SortOrder>,
}

impl Default for SortValues {
    fn default() -> Self {
        SortValues {
            orders: vec![SortOrder::default_order()],
        }
    }
}

impl SortValues {
    /// An empty input collapses to the single default order.
    pub fn from_orders(orders: Vec<SortOrder>) -> Self {
        if orders.is_empty() {
            SortValues::default()
        } else {
            SortValues { orders }
        }
    }

    pub fn orders(&self) -> &[SortOrder] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn push_default(&mut self) {
        self.orders.push(SortOrder::default_order());
    }

    /// Returns false (and leaves the list alone) when the index is out of
    /// range or only one order remains.
    pub fn remove(&mut self, index: usize) -> bool {
        if self.orders.len() <= 1 || index >= self.orders.len() {
            return false;
        }
        self.orders.remove(index);
        true
    }

    pub fn set_field(&mut self, index: usize, field: &str) {
        if let Some(order) = self.orders.get_mut(index) {
            order.field = field.to_string();
        }
    }

    pub fn set_direction(&mut self, index: usize, direction: SortDirection) {
        if let Some(order) = self.orders.get_mut(index) {
            order.direction = direction;
        }
    }
}

/// Stars as decoded from the URL. `Unset` and `Cleared` both mean "no
/// active filter", but only `Unset` lets a caller-supplied default apply:
/// the params being present at all means somebody touched the filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StarsParam {
    Unset,
    Cleared,
    Set(StarsFilter),
}

/// Raw decode result. `None` means the param key was absent, which matters
/// for initialization (key presence beats caller defaults, even when the
/// value decodes to nothing).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlState {
    pub languages: Option<Vec<String>>,
    pub licenses: Option<Vec<String>>,
    pub licenses_op: Option<SetOperator>,
    pub issue_languages: Option<Vec<String>>,
    pub issue_languages_op: Option<SetOperator>,
    pub stars: StarsParam,
    pub sort: Option<Vec<SortOrder>>,
}

impl UrlState {
    pub fn filter_values(&self) -> FilterValues {
        FilterValues {
            selected_languages: self.languages.clone().unwrap_or_default(),
            selected_licenses: self.licenses.clone().unwrap_or_default(),
            licenses_operator: self.licenses_op.unwrap_or_default(),
            selected_issue_languages: self.issue_languages.clone().unwrap_or_default(),
            issue_languages_operator: self.issue_languages_op.unwrap_or_default(),
            stars: match self.stars {
                StarsParam::Set(filter) => Some(filter),
                StarsParam::Unset | StarsParam::Cleared => None,
            },
        }
    }

    pub fn sort_values(&self) -> SortValues {
        match &self.sort {
            Some(orders) => SortValues::from_orders(orders.clone()),
            None => SortValues::default(),
        }
    }
}

/// Decodes a query string (no leading `?`). Total: never fails, unknown
/// params are ignored, malformed fields degrade one by one.
pub fn decode_query(query: &str) -> UrlState {
    let pairs = parse_pairs(query);
    let get = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    let split_list = |raw: &str| -> Vec<String> {
        raw.split(',')
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect()
    };

    let stars = match (get("stars"), get("starsOp")) {
        (None, None) => StarsParam::Unset,
        (Some(value), Some(op)) => {
            match (value.parse::<u32>(), StarsOperator::from_token(op)) {
                (Ok(value), Some(operator)) => StarsParam::Set(StarsFilter { value, operator }),
                _ => StarsParam::Cleared,
            }
        }
        // one key without the other: touched, but not a usable filter
        _ => StarsParam::Cleared,
    };

    let sort = get("sort").map(|raw| {
        let mut orders = Vec::new();
        for token in raw.split(',') {
            let mut parts = token.splitn(2, ':');
            let field = parts.next().unwrap_or_default();
            let direction = parts.next().and_then(SortDirection::from_token);
            if let (false, Some(direction)) = (field.is_empty(), direction) {
                orders.push(SortOrder {
                    field: field.to_string(),
                    direction,
                });
            }
        }
        if orders.is_empty() {
            orders.push(SortOrder::default_order());
        }
        orders
    });

    UrlState {
        languages: get("languages").map(split_list),
        licenses: get("licenses").map(split_list),
        licenses_op: get("licensesOp").and_then(SetOperator::from_token),
        issue_languages: get("issueLanguages").map(split_list),
        issue_languages_op: get("issueLanguagesOp").and_then(SetOperator::from_token),
        stars,
        sort,
    }
}

/// Encodes the owned params, in a fixed order. Inactive groups write
/// nothing; operators only accompany a non-empty value set; sort is always
/// written since it is never empty.
pub fn encode_query(filters: &FilterValues, sorts: &SortValues) -> String {
    let mut params: Vec<(&str, String)> = Vec::new();

    let join_list = |values: &[String]| -> String {
        values
            .iter()
            .map(|v| percent_encode(v))
            .collect::<Vec<_>>()
            .join(",")
    };

    if !filters.selected_languages.is_empty() {
        params.push(("languages", join_list(&filters.selected_languages)));
    }
    if !filters.selected_licenses.is_empty() {
        params.push(("licenses", join_list(&filters.selected_licenses)));
        params.push(("licensesOp", filters.licenses_operator.as_token().into()));
    }
    if !filters.selected_issue_languages.is_empty() {
        params.push((
            "issueLanguages",
            join_list(&filters.selected_issue_languages),
        ));
        params.push((
            "issueLanguagesOp",
            filters.issue_languages_operator.as_token().into(),
        ));
    }
    if let Some(stars) = filters.stars {
        params.push(("stars", stars.value.to_string()));
        params.push(("starsOp", stars.operator.as_token().into()));
    }
    let sort = sorts
        .orders()
        .iter()
        .map(|o| format!("{}:{}", percent_encode(&o.field), o.direction.as_token()))
        .collect::<Vec<_>>()
        .join(",");
    params.push(("sort", sort));

    params
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Splits a query string into decoded (key, value) pairs, keeping order.
pub fn parse_pairs(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut kv = part.splitn(2, '=');
            let key = percent_decode(kv.next().unwrap_or_default());
            let value = percent_decode(kv.next().unwrap_or_default());
            (key, value)
        })
        .collect()
}

/// Percent-encodes one component. Commas and colons stay literal so the
/// list and sort params remain readable; they are this codec's separators
/// and get re-split before individual components are decoded.
pub fn percent_encode(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for byte in component.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b',' | b':' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Inverse of [`percent_encode`]; also accepts `+` for space. Invalid
/// escapes pass through untouched instead of failing the whole parse.
pub fn percent_decode(component: &str) -> String {
    fn hex_val(byte: u8) -> Option<u8> {
        match byte {
            b'0'..=b'9' => Some(byte - b'0'),
            b'a'..=b'f' => Some(byte - b'a' + 10),
            b'A'..=b'F' => Some(byte - b'A' + 10),
            _ => None,
        }
    }

    let bytes = component.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi * 16 + lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
