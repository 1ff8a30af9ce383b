//! Read-only option data: the distinct value lists feeding the filter
//! pickers, and the backend sync status shown in the footer.

use std::time::Duration;

use dioxus::prelude::*;

use crate::_const::SYNC_REFRESH_SECS;
use crate::api::{self, SyncEvent};

pub type OptionsResource = Resource<Result<Vec<String>, String>>;

pub fn use_languages() -> OptionsResource {
    use_resource(|| async move { api::fetch_languages().await.map_err(|err| format!("{err:#}")) })
}

pub fn use_licenses() -> OptionsResource {
    use_resource(|| async move { api::fetch_licenses().await.map_err(|err| format!("{err:#}")) })
}

pub fn use_issue_languages() -> OptionsResource {
    use_resource(|| async move {
        api::fetch_issue_languages()
            .await
            .map_err(|err| format!("{err:#}"))
    })
}

/// Last-sync info per source, refreshed every five minutes.
pub fn use_sync_status() -> Resource<Result<Vec<SyncEvent>, String>> {
    let mut events = use_resource(|| async move {
        api::fetch_sync_events()
            .await
            .map_err(|err| format!("{err:#}"))
    });
    dioxus_sdk::utils::timing::use_interval(Duration::from_secs(SYNC_REFRESH_SECS), move || {
        events.restart();
    });
    events
}
