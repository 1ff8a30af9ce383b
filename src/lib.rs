//! Browser client for exploring open-source issues: filter and sort state
//! lives in signals, is mirrored into the address bar (shareable links,
//! back/forward aware) and drives an incrementally fetched issue list.

pub mod _const;
pub mod api;
pub mod comp;
pub mod feed;
pub mod filters;
pub mod input;
pub mod issues_loader;
pub mod options;
pub mod random_pick;
pub mod sorting;
pub mod url_state;
pub mod url_sync;
