//! Panel controller: all UI state in one struct plus the transitions the view
//! triggers. Rendering lives in `gui`; nothing here touches egui so every
//! transition can be tested directly.

use crate::bridge::{Action, HostBridge, HostMessage, OutboundRequest, PerformRequest};
use crate::catalog::{Category, PanelData};
use crate::config::PanelConfig;
use crate::editor;
use crate::form::{EntryForm, FormError};
use crate::format::{NEW_KEY, TextFormat};
use crate::lua::{self, LuaParseError};
use crate::statics;
use crate::value::EntryValue;
use anyhow::Context;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("Key required")]
    KeyRequired,
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("JSON invalid")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Lua parse error: {0}")]
    Lua(#[from] LuaParseError),
    #[error("Host unreachable: {0:#}")]
    Bridge(anyhow::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub ok: bool,
    pub shown_at: Instant,
}

/// Text for the three status-bar slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub left: &'static str,
    pub center: &'static str,
    pub right: String,
}

#[derive(Debug)]
pub struct PanelState {
    pub tab: Category,
    pub data: PanelData,
    pub filter: String,
    pub selected_key: Option<String>,
    pub format: TextFormat,
    /// The key field above the editor. Actions read their key from here.
    pub key_text: String,
    pub editor_text: String,
    /// Cursor as a char index into `editor_text`.
    pub cursor: usize,
    pub visible: bool,
    pub add_form: Option<EntryForm>,
    pub toast: Option<Toast>,
    toast_duration: Duration,
}

impl PanelState {
    pub fn new(config: &PanelConfig) -> Self {
        let mut state = Self {
            tab: config.default_tab,
            data: PanelData::default(),
            filter: String::new(),
            selected_key: None,
            format: config.default_format,
            key_text: NEW_KEY.to_string(),
            editor_text: String::new(),
            cursor: 0,
            visible: false,
            add_form: None,
            toast: None,
            toast_duration: Duration::from_millis(config.toast_millis),
        };
        state.switch_tab(config.default_tab);
        state
    }

    pub fn switch_tab(&mut self, tab: Category) {
        tracing::debug!(tab = %tab, "switch tab");
        self.tab = tab;
        self.selected_key = None;
        self.key_text = NEW_KEY.to_string();
        self.set_editor_text(self.format.placeholder());
    }

    /// Keys of the active tab matching the filter, sorted.
    pub fn visible_keys(&self) -> Vec<String> {
        self.data.filter_keys(self.tab, &self.filter)
    }

    /// Loads `key` into the editor. A missing or `null` entry shows as `{}`.
    pub fn select(&mut self, key: &str) {
        let value = self.entry_or_empty(key);
        self.selected_key = Some(key.to_string());
        self.key_text = key.to_string();
        self.set_editor_text(self.format.render(&value, key));
    }

    /// Re-renders the selected entry in `format`, or the placeholder when
    /// nothing (or something that no longer exists) is selected.
    pub fn set_format(&mut self, format: TextFormat) {
        self.format = format;
        let text = match self.selected_key.as_deref() {
            Some(key) if self.data.entry(self.tab, key).is_some() => {
                format.render(&self.entry_or_empty(key), key)
            }
            _ => format.placeholder(),
        };
        self.set_editor_text(text);
    }

    fn entry_or_empty(&self, key: &str) -> EntryValue {
        self.data
            .entry(self.tab, key)
            .filter(|v| **v != EntryValue::Null)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_editor_text(&mut self, text: String) {
        self.editor_text = text;
        self.cursor = 0;
    }

    /// `items/weapon_pistol.lua` style header for the editor.
    pub fn file_label(&self) -> String {
        format!("{}/{}{}", self.tab, self.key_text, self.format.extension())
    }

    pub fn status(&self) -> StatusLine {
        StatusLine {
            left: self.format.label(),
            center: if self.selected_key.is_some() {
                statics::EN_STATUS_EDITING
            } else {
                statics::EN_STATUS_READY
            },
            right: editor::cursor_status(&self.editor_text, self.cursor),
        }
    }

    pub fn handle_message(
        &mut self,
        msg: HostMessage,
        bridge: &mut dyn HostBridge,
        now: Instant,
    ) -> Result<(), PanelError> {
        match msg {
            HostMessage::Open => {
                tracing::info!("panel opened by host");
                self.visible = true;
                self.request_refresh(bridge)
            }
            HostMessage::Populate(Some(data)) => {
                self.data = data;
                tracing::info!(entries = self.data.entry_count(), "snapshot replaced");
                Ok(())
            }
            HostMessage::Populate(None) => Ok(()),
            HostMessage::Result(result) => {
                tracing::info!(ok = result.ok, message = ?result.message, "action result");
                self.show_toast(result.display_text(), result.ok, now);
                Ok(())
            }
        }
    }

    pub fn request_refresh(&mut self, bridge: &mut dyn HostBridge) -> Result<(), PanelError> {
        bridge
            .send(&OutboundRequest::FetchAll)
            .map_err(PanelError::Bridge)
    }

    /// Hides the panel and tells the host. In-flight requests are left alone.
    pub fn close(&mut self, bridge: &mut dyn HostBridge) -> Result<(), PanelError> {
        self.visible = false;
        self.add_form = None;
        bridge.send(&OutboundRequest::Close).map_err(PanelError::Bridge)
    }

    pub fn open_add_form(&mut self) {
        self.add_form = Some(EntryForm::new(self.tab));
    }

    pub fn cancel_add_form(&mut self) {
        self.add_form = None;
    }

    /// Validates the add form, shows the new entry in the editor and sends `add`.
    pub fn submit_add_form(&mut self, bridge: &mut dyn HostBridge) -> Result<(), PanelError> {
        let Some(form) = self.add_form.as_ref() else {
            return Ok(());
        };
        let key = form.key.trim().to_string();
        if key.is_empty() {
            return Err(PanelError::KeyRequired);
        }
        let category = form.category;
        let value = form.collect()?;

        self.selected_key = Some(key.clone());
        self.key_text = key.clone();
        self.set_editor_text(self.format.render(&value, &key));

        self.perform(category, Action::Add, key, Some(value), bridge)?;
        self.add_form = None;
        Ok(())
    }

    /// Sends `action` for the key field, taking the value from the editor text.
    pub fn dispatch(
        &mut self,
        action: Action,
        bridge: &mut dyn HostBridge,
    ) -> Result<(), PanelError> {
        let mut key = self.key_text.trim().to_string();
        let reads_editor = action != Action::Remove;
        // Lua text can carry its own key, so defer the check until it is parsed.
        if key.is_empty() && !(reads_editor && self.format == TextFormat::Lua) {
            return Err(PanelError::KeyRequired);
        }

        let value = if reads_editor {
            let text = self.editor_text.trim();
            let text = if text.is_empty() {
                self.format.empty_entry(&key)
            } else {
                text.to_string()
            };
            let value = match self.format {
                TextFormat::Json => {
                    EntryValue::parse_json(&text).map_err(PanelError::InvalidJson)?
                }
                TextFormat::Lua => {
                    let parsed = lua::parse_lua_entry(&text)?;
                    if key.is_empty()
                        && let Some(k) = parsed.key
                    {
                        key = k;
                        self.key_text = key.clone();
                    }
                    parsed.value
                }
            };
            Some(value)
        } else {
            None
        };

        if key.is_empty() {
            return Err(PanelError::KeyRequired);
        }
        self.perform(self.tab, action, key, value, bridge)
    }

    fn perform(
        &mut self,
        entity: Category,
        action: Action,
        key: String,
        value: Option<EntryValue>,
        bridge: &mut dyn HostBridge,
    ) -> Result<(), PanelError> {
        tracing::info!(entity = %entity, action = action.as_str(), key = %key, "perform");
        let request = OutboundRequest::Perform(PerformRequest {
            entity,
            action,
            key,
            value,
        });
        bridge.send(&request).map_err(PanelError::Bridge)
    }

    /// Writes the editor buffer verbatim to `path`.
    pub fn export_editor_text(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, &self.editor_text).with_context(|| format!("writing {path:?}"))?;
        tracing::info!("Exported {}/{} to {:?}", self.tab, self.key_text, path);
        Ok(())
    }

    /// Surfaces a failed operation as an error toast. Successes are silent.
    pub fn report(&mut self, result: Result<(), PanelError>, now: Instant) {
        if let Err(err) = result {
            tracing::warn!("{err}");
            self.show_toast(err.to_string(), false, now);
        }
    }

    pub fn show_toast(&mut self, message: String, ok: bool, now: Instant) {
        self.toast = Some(Toast {
            message,
            ok,
            shown_at: now,
        });
    }

    /// Drops the toast once it has been up for the configured interval.
    /// Returns how long the current toast still has, if any.
    pub fn expire_toast(&mut self, now: Instant) -> Option<Duration> {
        let toast = self.toast.as_ref()?;
        let elapsed = now.saturating_duration_since(toast.shown_at);
        if elapsed >= self.toast_duration {
            self.toast = None;
            None
        } else {
            Some(self.toast_duration - elapsed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PanelError, PanelState};
    use crate::bridge::{Action, MemoryBridge, OutboundRequest};
    use crate::catalog::Category;
    use crate::config::PanelConfig;
    use crate::format::TextFormat;
    use crate::value::EntryValue;
    use std::time::{Duration, Instant};

    fn state() -> PanelState {
        PanelState::new(&PanelConfig::default())
    }

    #[test]
    fn starts_hidden_on_default_tab_with_placeholder() {
        let s = state();
        assert!(!s.visible);
        assert_eq!(s.tab, Category::Items);
        assert_eq!(s.key_text, "new_key");
        assert_eq!(s.editor_text, "{}");
        assert_eq!(s.file_label(), "items/new_key.json");
        assert_eq!(s.status().center, "Ready");
    }

    #[test]
    fn lua_default_format_uses_lua_placeholder() {
        let config = PanelConfig {
            default_format: TextFormat::Lua,
            default_tab: Category::Weapons,
            ..PanelConfig::default()
        };
        let s = PanelState::new(&config);
        assert_eq!(s.editor_text, "new_key = { }");
        assert_eq!(s.file_label(), "weapons/new_key.lua");
        assert_eq!(s.status().left, "LUA");
    }

    #[test]
    fn remove_with_blank_key_is_rejected_before_sending() {
        let mut s = state();
        let mut bridge = MemoryBridge::default();
        s.key_text = "   ".to_string();
        let err = s.dispatch(Action::Remove, &mut bridge).unwrap_err();
        assert!(matches!(err, PanelError::KeyRequired));
        assert!(bridge.sent.is_empty());
    }

    #[test]
    fn null_entry_selects_as_empty_object() {
        let mut s = state();
        s.data.items.insert("ghost".to_string(), EntryValue::Null);
        s.select("ghost");
        assert_eq!(s.editor_text, "{}");
        s.set_format(TextFormat::Lua);
        assert_eq!(s.editor_text, "ghost = {  }");
    }

    #[test]
    fn reselecting_active_tab_resets_editor() {
        let mut s = state();
        s.data.items.insert("water".to_string(), EntryValue::default());
        s.select("water");
        s.switch_tab(Category::Items);
        assert_eq!(s.selected_key, None);
        assert_eq!(s.key_text, "new_key");
        assert_eq!(s.editor_text, "{}");
    }

    #[test]
    fn toast_expires_after_interval() {
        let mut s = state();
        let t0 = Instant::now();
        s.show_toast("hi".to_string(), true, t0);
        assert_eq!(
            s.expire_toast(t0 + Duration::from_millis(200)),
            Some(Duration::from_millis(2000))
        );
        assert!(s.toast.is_some());
        assert_eq!(s.expire_toast(t0 + Duration::from_millis(2200)), None);
        assert!(s.toast.is_none());
    }

    #[test]
    fn close_hides_and_notifies_host() {
        let mut s = state();
        let mut bridge = MemoryBridge::default();
        s.visible = true;
        s.open_add_form();
        s.close(&mut bridge).unwrap();
        assert!(!s.visible);
        assert!(s.add_form.is_none());
        assert_eq!(bridge.sent, vec![OutboundRequest::Close]);
    }

    #[test]
    fn export_writes_editor_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new_key.lua");
        let mut s = state();
        s.set_format(TextFormat::Lua);
        s.export_editor_text(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new_key = { }");

        let missing = dir.path().join("no_such_dir").join("x.json");
        assert!(s.export_editor_text(&missing).is_err());
    }
}
