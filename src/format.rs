use crate::lua;
use crate::value::EntryValue;
use serde::{Deserialize, Serialize};

/// Text representation used by the entry editor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Json,
    Lua,
}

/// Key shown in the editor before anything is selected.
pub const NEW_KEY: &str = "new_key";

impl TextFormat {
    pub const ALL: [TextFormat; 2] = [TextFormat::Json, TextFormat::Lua];

    pub fn label(self) -> &'static str {
        match self {
            TextFormat::Json => "JSON",
            TextFormat::Lua => "LUA",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            TextFormat::Json => ".json",
            TextFormat::Lua => ".lua",
        }
    }

    pub fn placeholder(self) -> String {
        match self {
            TextFormat::Json => "{}".to_string(),
            TextFormat::Lua => lua::placeholder(NEW_KEY),
        }
    }

    /// Fallback editor text when the buffer is blank at dispatch time.
    pub fn empty_entry(self, key: &str) -> String {
        match self {
            TextFormat::Json => "{}".to_string(),
            TextFormat::Lua => lua::placeholder(key),
        }
    }

    pub fn render(self, value: &EntryValue, key: &str) -> String {
        match self {
            TextFormat::Json => value.to_json_pretty(),
            TextFormat::Lua => lua::format_as_lua(value, key),
        }
    }
}
