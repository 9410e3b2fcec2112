//! Change-notification payload.

use serde::Serialize;

/// Fired through the host every time [`activate`] completes with a new index.
/// Serialized with camelCase keys so JS listeners read
/// `event.detail.tabId` / `panelId` / `index`.
///
/// [`activate`]: crate::controller::TabController::activate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabChange {
    pub tab_id: String,
    pub panel_id: String,
    pub index: usize,
}
