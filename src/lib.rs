//! Core library for the DM Shared Panel.
//! Browses and edits the host's game-data tables (items, jobs, gangs, vehicles, weapons)
//! as JSON or Lua literals, and talks to the host over a line-delimited JSON bridge.

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod editor;
pub mod form;
pub mod format;
mod gui;
pub mod lua;
pub mod panel;
pub mod statics;
mod value;

pub use bridge::{HostBridge, HostMessage, MemoryBridge, OutboundRequest, StdioBridge};
pub use catalog::{Category, PanelData};
pub use config::PanelConfig;
pub use format::TextFormat;
pub use gui::run_gui;
pub use lua::{LuaEntry, LuaParseError, format_as_lua, parse_lua_entry};
pub use panel::{PanelError, PanelState};
pub use value::{EntryNumber, EntryValue};
