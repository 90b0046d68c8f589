// Central place for UI strings and other non-localized constants.
// Keep these out of gui.rs to reduce duplication and make tweaks safer.

// English UI strings (EN_ prefix to make future localization easier)
pub const EN_APP_TITLE: &str = "DM Shared Panel";

pub const EN_BTN_ADD: &str = "Add";
pub const EN_BTN_UPDATE: &str = "Update";
pub const EN_BTN_REMOVE: &str = "Remove";
pub const EN_BTN_REFRESH: &str = "Refresh";
pub const EN_BTN_CLOSE: &str = "Close";
pub const EN_BTN_EXPORT: &str = "Export...";
pub const EN_BTN_CANCEL: &str = "Cancel";
pub const EN_BTN_REOPEN: &str = "Reopen";

pub const EN_LABEL_SEARCH: &str = "Search:";
pub const EN_HINT_SEARCH: &str = "filter keys";
pub const EN_LABEL_FORMAT: &str = "Format";
pub const EN_LABEL_KEY: &str = "Key:";
pub const EN_LABEL_TABLE_KEY: &str = "Key (table key)";
pub const EN_HINT_TABLE_KEY: &str = "unique_key";
pub const EN_LIST_EMPTY: &str = "No entries.";

pub const EN_WINDOW_ADD_PREFIX: &str = "Add";
pub const EN_WINDOW_ADD_SUFFIX: &str = "entry";

pub const EN_STATUS_EDITING: &str = "Editing";
pub const EN_STATUS_READY: &str = "Ready";

pub const EN_HIDDEN_HEADING: &str = "Panel closed";
pub const EN_HIDDEN_INSTRUCTIONS: &str = "Waiting for the host to open the panel again.";

pub const EN_EXPORT_FILTER_JSON: &str = "JSON";
pub const EN_EXPORT_FILTER_LUA: &str = "Lua";
pub const EN_PREFIX_EXPORTED: &str = "Exported";
pub const EN_ERR_EXPORT: &str = "Export failed:";
