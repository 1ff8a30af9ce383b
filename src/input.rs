//! Control side of the issues view: translates DOM events into store
//! mutations. Option lists come from the backend and the pickers degrade
//! to a short message while those load or fail.

use dioxus::prelude::*;

use crate::_const::{ADDED_STARS_VALUE, SORT_FIELDS};
use crate::filters::FiltersStore;
use crate::options::{use_issue_languages, use_languages, use_licenses};
use crate::sorting::SortingStore;
use crate::url_state::{SetOperator, SortDirection, StarsFilter, StarsOperator};

type Options = Option<Result<Vec<String>, String>>;

#[component]
pub fn FiltersSection(mut filters: FiltersStore) -> Element {
    let languages = use_languages();
    let licenses = use_licenses();
    let issue_languages = use_issue_languages();
    let values = filters.values();

    rsx! {
        div { id: "filters_section",
            FilterGroup {
                title: "Repository language",
                options: languages.read().clone(),
                selected: values.read().selected_languages.clone(),
                operator: None::<SetOperator>,
                on_toggle: move |value: String| filters.toggle_language(&value),
                on_operator: |_| {},
                on_reset: move |_| filters.reset_languages(),
            }
            FilterGroup {
                title: "License",
                options: licenses.read().clone(),
                selected: values.read().selected_licenses.clone(),
                operator: Some(values.read().licenses_operator),
                on_toggle: move |value: String| filters.toggle_license(&value),
                on_operator: move |operator| filters.set_licenses_operator(operator),
                on_reset: move |_| filters.reset_licenses(),
            }
            FilterGroup {
                title: "Issue language",
                options: issue_languages.read().clone(),
                selected: values.read().selected_issue_languages.clone(),
                operator: Some(values.read().issue_languages_operator),
                on_toggle: move |value: String| filters.toggle_issue_language(&value),
                on_operator: move |operator| filters.set_issue_languages_operator(operator),
                on_reset: move |_| filters.reset_issue_languages(),
            }
            button { onclick: move |_| filters.reset_all(), "Reset all filters" }
        }
    }
}

#[component]
fn FilterGroup(
    title: String,
    options: Options,
    selected: Vec<String>,
    operator: Option<SetOperator>,
    on_toggle: EventHandler<String>,
    on_operator: EventHandler<SetOperator>,
    on_reset: EventHandler<()>,
) -> Element {
    // selected values first, so entries carried in from a shared link stay
    // visible (and removable) even when the option list omits them
    let mut entries: Vec<String> = selected.clone();
    if let Some(Ok(list)) = &options {
        for option in list {
            if !entries.contains(option) {
                entries.push(option.clone());
            }
        }
    }

    rsx! {
        div { style: "margin-bottom:0.5rem;",
            b { "{title}" }
            {operator.map(|current| rsx! {
                span { style: "margin-left:0.5rem;",
                    button {
                        disabled: current == SetOperator::In,
                        onclick: move |_| on_operator.call(SetOperator::In),
                        "Include"
                    }
                    button {
                        disabled: current == SetOperator::NotIn,
                        onclick: move |_| on_operator.call(SetOperator::NotIn),
                        "Exclude"
                    }
                }
            })}
            if !selected.is_empty() {
                button { style: "margin-left:0.5rem;", onclick: move |_| on_reset.call(()), "Clear" }
            }
            div {
                {match &options {
                    None => rsx! { span { "Loading options..." } },
                    Some(Err(_)) => rsx! { span { "Options unavailable" } },
                    Some(Ok(_)) => rsx! {
                        for entry in entries.iter().cloned() {
                            OptionChip {
                                key: "opt_{entry}",
                                active: selected.contains(&entry),
                                entry: entry.clone(),
                                on_toggle,
                            }
                        }
                    },
                }}
            }
        }
    }
}

#[component]
fn OptionChip(entry: String, active: bool, on_toggle: EventHandler<String>) -> Element {
    let label = entry.clone();

    rsx! {
        button {
            style: if active {
                "margin:0.1rem;border:1px solid #46a;"
            } else {
                "margin:0.1rem;border:1px solid #ccc;"
            },
            onclick: move |_| on_toggle.call(entry.clone()),
            "{label}"
        }
    }
}

#[component]
pub fn StarsEditor(mut filters: FiltersStore) -> Element {
    let stars = filters.values().read().stars;

    rsx! {
        div { id: "stars_editor", style: "margin-bottom:0.5rem;",
            b { "Stars" }
            {match stars {
                None => rsx! {
                    button {
                        style: "margin-left:0.5rem;",
                        onclick: move |_| filters.add_stars(StarsFilter {
                            value: ADDED_STARS_VALUE,
                            operator: StarsOperator::Greater,
                        }),
                        "Add stars filter"
                    }
                },
                Some(filter) => rsx! {
                    select {
                        style: "margin-left:0.5rem;",
                        onchange: move |evt| {
                            let operator = StarsOperator::from_token(&evt.value())
                                .unwrap_or(StarsOperator::Greater);
                            filters.set_stars_operator(operator);
                        },
                        option {
                            value: "GREATER",
                            selected: filter.operator == StarsOperator::Greater,
                            "Greater than (>)"
                        }
                        option {
                            value: "LESS",
                            selected: filter.operator == StarsOperator::Less,
                            "Less than (<)"
                        }
                    }
                    input {
                        r#type: "number",
                        min: "0",
                        value: "{filter.value}",
                        oninput: move |evt| {
                            let raw = evt.value();
                            if raw.is_empty() {
                                filters.set_stars_value(None);
                            } else {
                                // anything unparseable clamps to 0
                                filters.set_stars_value(Some(raw.parse().unwrap_or(0)));
                            }
                        },
                    }
                    button { onclick: move |_| filters.remove_stars(), "Remove" }
                },
            }}
        }
    }
}

#[component]
pub fn SortSection(mut sorting: SortingStore) -> Element {
    let orders = sorting.values().read().orders().to_vec();
    let single = orders.len() == 1;

    rsx! {
        div { id: "sort_section", style: "margin-bottom:0.5rem;",
            b { "Sort" }
            for (index, order) in orders.into_iter().enumerate() {
                SortRow { key: "sort_row_{index}", index, order, single, sorting }
            }
            button { onclick: move |_| sorting.add_order(), "Add sort field" }
        }
    }
}

#[component]
fn SortRow(
    index: usize,
    order: crate::url_state::SortOrder,
    single: bool,
    mut sorting: SortingStore,
) -> Element {
    let known_field = SORT_FIELDS.iter().any(|(field, _)| *field == order.field);
    let custom_field = order.field.clone();

    rsx! {
        div {
            select {
                onchange: move |evt| sorting.set_field(index, &evt.value()),
                for (field, label) in SORT_FIELDS.iter() {
                    option { value: "{field}", selected: order.field == *field, "{label}" }
                }
                // a field carried in from the URL that the picker does not
                // know stays selectable instead of silently switching
                if !known_field {
                    option { value: "{custom_field}", selected: true, "{custom_field}" }
                }
            }
            select {
                onchange: move |evt| {
                    let direction = SortDirection::from_token(&evt.value())
                        .unwrap_or(SortDirection::Desc);
                    sorting.set_direction(index, direction);
                },
                option {
                    value: "desc",
                    selected: order.direction == SortDirection::Desc,
                    "Descending"
                }
                option {
                    value: "asc",
                    selected: order.direction == SortDirection::Asc,
                    "Ascending"
                }
            }
            button {
                disabled: single,
                onclick: move |_| sorting.remove_order(index),
                "Remove"
            }
        }
    }
}
