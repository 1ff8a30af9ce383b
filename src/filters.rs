//! Filter store: one signal holding the canonical [`FilterValues`], plus
//! initial-value resolution. A shared link always beats a view's own
//! defaults, so resolution checks raw key presence in the query string,
//! not whether the decoded value happens to be non-empty.

use dioxus::prelude::*;

use crate::_const::DEFAULT_STARS_FILTER;
use crate::url_state::{
    decode_query, FilterValues, SetOperator, StarsFilter, StarsOperator, StarsParam, UrlState,
};
use crate::url_sync::UrlSync;

#[derive(Clone, Debug, PartialEq)]
pub struct UseFiltersParams {
    pub initial_languages: Option<Vec<String>>,
    pub initial_stars: Option<StarsFilter>,
}

impl Default for UseFiltersParams {
    fn default() -> Self {
        UseFiltersParams {
            initial_languages: None,
            initial_stars: Some(DEFAULT_STARS_FILTER),
        }
    }
}

/// Priority per field: present in the URL > caller-supplied initial >
/// built-in default. `StarsParam::Cleared` counts as present-and-off, so
/// the caller default must not resurrect the filter.
pub fn resolve_initial_filters(url: &UrlState, params: &UseFiltersParams) -> FilterValues {
    FilterValues {
        selected_languages: match &url.languages {
            Some(values) => values.clone(),
            None => params.initial_languages.clone().unwrap_or_default(),
        },
        selected_licenses: url.licenses.clone().unwrap_or_default(),
        licenses_operator: url.licenses_op.unwrap_or_default(),
        selected_issue_languages: url.issue_languages.clone().unwrap_or_default(),
        issue_languages_operator: url.issue_languages_op.unwrap_or_default(),
        stars: match url.stars {
            StarsParam::Set(filter) => Some(filter),
            StarsParam::Cleared => None,
            StarsParam::Unset => params.initial_stars,
        },
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct FiltersStore {
    values: Signal<FilterValues>,
}

impl FiltersStore {
    pub fn values(&self) -> ReadOnlySignal<FilterValues> {
        self.values.into()
    }

    pub fn toggle_language(&mut self, language: &str) {
        self.values.write().toggle_language(language);
    }

    pub fn set_languages(&mut self, languages: Vec<String>) {
        self.values.write().set_languages(languages);
    }

    pub fn reset_languages(&mut self) {
        self.values.write().reset_languages();
    }

    pub fn toggle_license(&mut self, license: &str) {
        self.values.write().toggle_license(license);
    }

    pub fn set_licenses_operator(&mut self, operator: SetOperator) {
        self.values.write().set_licenses_operator(operator);
    }

    pub fn reset_licenses(&mut self) {
        self.values.write().reset_licenses();
    }

    pub fn toggle_issue_language(&mut self, language: &str) {
        self.values.write().toggle_issue_language(language);
    }

    pub fn set_issue_languages_operator(&mut self, operator: SetOperator) {
        self.values.write().set_issue_languages_operator(operator);
    }

    pub fn reset_issue_languages(&mut self) {
        self.values.write().reset_issue_languages();
    }

    pub fn set_stars_value(&mut self, value: Option<u32>) {
        self.values.write().set_stars_value(value);
    }

    pub fn set_stars_operator(&mut self, operator: StarsOperator) {
        self.values.write().set_stars_operator(operator);
    }

    pub fn add_stars(&mut self, filter: StarsFilter) {
        self.values.write().add_stars(filter);
    }

    pub fn remove_stars(&mut self) {
        self.values.write().remove_stars();
    }

    pub fn reset_all(&mut self) {
        self.values.write().reset_all();
    }

    /// Adopts state decoded from an external URL change. Wholesale: absent
    /// params mean cleared here, caller defaults only apply at mount.
    /// Writes nothing when the state already matches, so the bridge's read
    /// path cannot ping-pong with its write path.
    pub fn adopt_url_state(&mut self, url: &UrlState) {
        let next = url.filter_values();
        if *self.values.peek() != next {
            self.values.set(next);
        }
    }
}

pub fn use_filters(params: UseFiltersParams) -> FiltersStore {
    let sync = use_context::<UrlSync>();
    let values = use_signal(move || {
        let url = decode_query(&sync.current_query());
        resolve_initial_filters(&url, &params)
    });
    FiltersStore { values }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller_params() -> UseFiltersParams {
        UseFiltersParams {
            initial_languages: Some(vec!["Rust".into()]),
            initial_stars: Some(DEFAULT_STARS_FILTER),
        }
    }

    #[test]
    fn url_presence_beats_caller_initial() {
        let url = decode_query("languages=Go,Zig");
        let resolved = resolve_initial_filters(&url, &caller_params());
        assert_eq!(
            resolved.selected_languages,
            vec!["Go".to_string(), "Zig".to_string()]
        );
    }

    #[test]
    fn empty_but_present_param_still_beats_caller_initial() {
        let url = decode_query("languages=");
        let resolved = resolve_initial_filters(&url, &caller_params());
        assert!(resolved.selected_languages.is_empty());
    }

    #[test]
    fn caller_initial_applies_when_key_absent() {
        let url = decode_query("");
        let resolved = resolve_initial_filters(&url, &caller_params());
        assert_eq!(resolved.selected_languages, vec!["Rust".to_string()]);
        assert_eq!(resolved.stars, Some(DEFAULT_STARS_FILTER));
    }

    #[test]
    fn builtin_defaults_when_nothing_supplied() {
        let url = decode_query("");
        let params = UseFiltersParams {
            initial_languages: None,
            initial_stars: None,
        };
        let resolved = resolve_initial_filters(&url, &params);
        assert_eq!(resolved, FilterValues::default());
    }

    #[test]
    fn stars_in_url_beat_caller_default() {
        let url = decode_query("stars=500&starsOp=LESS");
        let resolved = resolve_initial_filters(&url, &caller_params());
        assert_eq!(
            resolved.stars,
            Some(StarsFilter {
                value: 500,
                operator: StarsOperator::Less
            })
        );
    }

    #[test]
    fn cleared_stars_do_not_resurrect_the_default() {
        // params touched but unusable: somebody cleared or mangled them
        let url = decode_query("stars=&starsOp=GREATER");
        let resolved = resolve_initial_filters(&url, &caller_params());
        assert_eq!(resolved.stars, None);
    }
}
