use dioxus::prelude::*;
use dioxus_logger::tracing::info;
use issue_scout::api::build_request;
use issue_scout::comp::{ActionButtons, IssuesPanel, SyncStatusLine};
use issue_scout::feed::FeedPage;
use issue_scout::filters::{use_filters, UseFiltersParams};
use issue_scout::input::{FiltersSection, SortSection, StarsEditor};
use issue_scout::issues_loader::use_infinite_issues;
use issue_scout::random_pick::use_random_issue;
use issue_scout::sorting::{use_sorting, UseSortingParams};
use issue_scout::url_sync::{platform_url_sync, use_url_sync};

fn main() {
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).expect("failed to init logger");
    info!("dioxus launch...");
    dioxus::launch(|| {
        rsx! {
            Router::<Route> {}
        }
    });
}

#[derive(Routable, Clone, Debug, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Issues {},
    #[route("/feed")]
    Feed {},
}

#[component]
fn Issues() -> Element {
    // one bridge per mounted view; children reach it through context
    use_context_provider(platform_url_sync);
    let filters = use_filters(UseFiltersParams::default());
    let sorting = use_sorting(UseSortingParams::default());
    use_url_sync(filters, sorting);

    let base_request =
        use_memo(move || build_request(&filters.values().read(), &sorting.values().read()));
    let issues = use_infinite_issues(base_request);
    let random = use_random_issue();

    rsx! {
        div { style: "max-width:48rem;margin:0 auto;padding:1rem;",
            h2 { "Find an issue to work on" }
            ActionButtons {
                picking: random.picking,
                notice: random.notice,
                on_pick: move |_| random.pick.call(base_request.peek().clone()),
            }
            FiltersSection { filters }
            StarsEditor { filters }
            SortSection { sorting }
            IssuesPanel {
                page: issues.page,
                on_load_more: move |_| issues.load_more.call(()),
            }
            SyncStatusLine {}
        }
    }
}

#[component]
fn Feed() -> Element {
    rsx! {
        FeedPage {}
    }
}
