//! Sort store. Same shape as the filter store; the one extra rule is the
//! non-empty invariant: there is always at least one sort order, and
//! removing the last one is refused rather than clamped.

use dioxus::prelude::*;

use crate::url_state::{decode_query, SortDirection, SortOrder, SortValues, UrlState};
use crate::url_sync::UrlSync;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UseSortingParams {
    pub initial_orders: Option<Vec<SortOrder>>,
}

/// URL > caller initial > built-in default, same as the filter fields.
pub fn resolve_initial_sorting(url: &UrlState, params: &UseSortingParams) -> SortValues {
    match &url.sort {
        Some(orders) => SortValues::from_orders(orders.clone()),
        None => params
            .initial_orders
            .clone()
            .map(SortValues::from_orders)
            .unwrap_or_default(),
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct SortingStore {
    values: Signal<SortValues>,
}

impl SortingStore {
    pub fn values(&self) -> ReadOnlySignal<SortValues> {
        self.values.into()
    }

    pub fn add_order(&mut self) {
        self.values.write().push_default();
    }

    pub fn remove_order(&mut self, index: usize) {
        // refused below one entry; nothing to report to the caller
        self.values.write().remove(index);
    }

    pub fn set_field(&mut self, index: usize, field: &str) {
        self.values.write().set_field(index, field);
    }

    pub fn set_direction(&mut self, index: usize, direction: SortDirection) {
        self.values.write().set_direction(index, direction);
    }

    /// See [`crate::filters::FiltersStore::adopt_url_state`].
    pub fn adopt_url_state(&mut self, url: &UrlState) {
        let next = url.sort_values();
        if *self.values.peek() != next {
            self.values.set(next);
        }
    }
}

pub fn use_sorting(params: UseSortingParams) -> SortingStore {
    let sync = use_context::<UrlSync>();
    let values = use_signal(move || {
        let url = decode_query(&sync.current_query());
        resolve_initial_sorting(&url, &params)
    });
    SortingStore { values }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller_params() -> UseSortingParams {
        UseSortingParams {
            initial_orders: Some(vec![SortOrder {
                field: "er.updated_at".into(),
                direction: SortDirection::Asc,
            }]),
        }
    }

    #[test]
    fn url_beats_caller_initial() {
        let url = decode_query("sort=er.stars:desc");
        let resolved = resolve_initial_sorting(&url, &caller_params());
        assert_eq!(resolved.orders()[0].field, "er.stars");
    }

    #[test]
    fn caller_initial_when_key_absent() {
        let url = decode_query("");
        let resolved = resolve_initial_sorting(&url, &caller_params());
        assert_eq!(resolved.orders()[0].field, "er.updated_at");
    }

    #[test]
    fn default_when_nothing_supplied() {
        let url = decode_query("");
        let resolved = resolve_initial_sorting(&url, &UseSortingParams::default());
        assert_eq!(resolved, SortValues::default());
    }

    #[test]
    fn garbage_sort_param_still_yields_one_order() {
        let url = decode_query("sort=,,");
        let resolved = resolve_initial_sorting(&url, &caller_params());
        assert_eq!(resolved.orders(), &[SortOrder::default_order()]);
    }
}
