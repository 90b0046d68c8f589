//! Lua table-literal text for entries: `key = { name = 'x', weight = 1 }`.
//!
//! Writing is a plain recursive encoder. Reading is not a Lua parser: the text
//! is rewritten into JSON with a single regex token pass and handed to
//! `serde_json`. Only the subset produced by [`format_as_lua`] is guaranteed to
//! come back unchanged; hand-written Lua may or may not parse.

use crate::value::{EntryValue, write_escaped_string};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, thiserror::Error)]
pub enum LuaParseError {
    #[error("nothing to parse")]
    Empty,
    #[error("unbalanced braces")]
    UnbalancedBraces,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("bad token pattern: {0}")]
    Pattern(regex::Error),
}

/// Result of reading an editor buffer in Lua form.
#[derive(Debug, Clone, PartialEq)]
pub struct LuaEntry {
    /// Leading `identifier =`, when present.
    pub key: Option<String>,
    pub value: EntryValue,
}

/// Shown in the editor when there is no entry to display.
pub fn placeholder(key: &str) -> String {
    format!("{key} = {{ }}")
}

pub fn format_as_lua(value: &EntryValue, key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 16);
    out.push_str(key);
    out.push_str(" = ");
    write_lua(value, &mut out);
    out
}

fn write_lua(value: &EntryValue, out: &mut String) {
    match value {
        EntryValue::Null => out.push_str("nil"),
        EntryValue::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
        EntryValue::Number(n) if n.is_finite() => n.write_literal(out),
        // NaN and infinities have no literal spelling here.
        EntryValue::Number(_) => out.push_str("nil"),
        EntryValue::String(s) => {
            out.push('\'');
            for ch in s.chars() {
                if ch == '\'' {
                    out.push_str("\\'");
                } else {
                    out.push(ch);
                }
            }
            out.push('\'');
        }
        // Empty tables come out as `{  }`.
        EntryValue::Array(values) => {
            out.push_str("{ ");
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_lua(v, out);
            }
            out.push_str(" }");
        }
        EntryValue::Object(map) => {
            out.push_str("{ ");
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(k);
                out.push_str(" = ");
                write_lua(v, out);
            }
            out.push_str(" }");
        }
    }
}

fn leading_key_re() -> Result<&'static Regex, LuaParseError> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\w+)\s*="))
        .as_ref()
        .map_err(|e| LuaParseError::Pattern(e.clone()))
}

fn token_re() -> Result<&'static Regex, LuaParseError> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)'(?P<str>(?:[^'\\]|\\.)*)'|\b(?P<key>\w+)\s*=\s*|\bnil\b|[{}]")
    })
    .as_ref()
    .map_err(|e| LuaParseError::Pattern(e.clone()))
}

pub fn parse_lua_entry(text: &str) -> Result<LuaEntry, LuaParseError> {
    let (key, rest) = match leading_key_re()?.captures(text) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0, |m| m.end());
            (caps.get(1).map(|m| m.as_str().to_string()), &text[whole..])
        }
        None => (None, after_plain_assignment(text)),
    };

    let body = isolate_body(rest);
    if body.is_empty() {
        return Err(LuaParseError::Empty);
    }

    let json = lua_body_to_json(body)?;
    let value = serde_json::from_str::<EntryValue>(&json)?;
    Ok(LuaEntry { key, value })
}

/// Text after an assignment whose target is not a bare identifier (`my-key = 5`).
/// An `=` inside the first table belongs to a field, so a key-less `{ a = 1 }`
/// is left whole.
fn after_plain_assignment(text: &str) -> &str {
    match (text.find('='), text.find('{')) {
        (Some(eq), Some(open)) if eq > open => text,
        (Some(eq), _) => &text[eq + 1..],
        (None, _) => text,
    }
}

/// Drops one trailing `,`/`;` and narrows to the outermost `{ ... }` when there is one.
fn isolate_body(rest: &str) -> &str {
    let body = rest.trim();
    let body = body
        .strip_suffix(',')
        .or_else(|| body.strip_suffix(';'))
        .unwrap_or(body)
        .trim_end();

    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    }
}

struct TableFrame {
    open_at: usize,
    keyed: bool,
}

/// Rewrites Lua literal syntax into JSON:
/// `name =` -> `"name":`, `'..'` -> `".."`, `nil` -> `null`, trailing commas
/// dropped, and key-less non-empty tables become arrays.
fn lua_body_to_json(body: &str) -> Result<String, LuaParseError> {
    let mut out = String::with_capacity(body.len() + 16);
    let mut frames: Vec<TableFrame> = Vec::new();
    let mut last = 0;

    for caps in token_re()?.captures_iter(body) {
        let Some(token) = caps.get(0) else {
            continue;
        };
        out.push_str(&body[last..token.start()]);
        last = token.end();

        if let Some(s) = caps.name("str") {
            push_json_string(&mut out, s.as_str());
            continue;
        }

        if let Some(k) = caps.name("key") {
            if let Some(frame) = frames.last_mut() {
                frame.keyed = true;
            }
            out.push('"');
            out.push_str(k.as_str());
            out.push_str("\": ");
            continue;
        }

        match token.as_str() {
            "{" => {
                frames.push(TableFrame {
                    open_at: out.len(),
                    keyed: false,
                });
                out.push('{');
            }
            "}" => {
                out.truncate(out.trim_end().len());
                if out.ends_with(',') {
                    out.pop();
                }
                let frame = frames.pop().ok_or(LuaParseError::UnbalancedBraces)?;
                let has_items = !out[frame.open_at + 1..].trim().is_empty();
                if has_items && !frame.keyed {
                    out.replace_range(frame.open_at..frame.open_at + 1, "[");
                    out.push(']');
                } else {
                    out.push('}');
                }
            }
            _ => out.push_str("null"),
        }
    }

    if !frames.is_empty() {
        return Err(LuaParseError::UnbalancedBraces);
    }
    out.push_str(&body[last..]);
    Ok(out)
}

fn push_json_string(out: &mut String, lua_inner: &str) {
    let mut unescaped = String::with_capacity(lua_inner.len());
    let mut chars = lua_inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'\'') {
            chars.next();
            unescaped.push('\'');
        } else {
            unescaped.push(c);
        }
    }
    write_escaped_string(out, &unescaped);
}

#[cfg(test)]
mod tests {
    use super::{LuaParseError, format_as_lua, lua_body_to_json, parse_lua_entry, placeholder};
    use crate::value::{EntryNumber, EntryValue};
    use indexmap::IndexMap;

    fn obj(pairs: &[(&str, EntryValue)]) -> EntryValue {
        let mut map = IndexMap::new();
        for (k, v) in pairs {
            map.insert((*k).to_string(), v.clone());
        }
        EntryValue::Object(map)
    }

    fn s(v: &str) -> EntryValue {
        EntryValue::String(v.to_string())
    }

    #[test]
    fn null_formats_as_nil() {
        assert_eq!(format_as_lua(&EntryValue::Null, "k"), "k = nil");
    }

    #[test]
    fn flat_mapping_formats_in_order() {
        let v = obj(&[("a", EntryValue::Number(EntryNumber::I64(1))), ("b", s("x"))]);
        assert_eq!(format_as_lua(&v, "k"), "k = { a = 1, b = 'x' }");
    }

    #[test]
    fn strings_escape_only_single_quotes() {
        let v = s("it's \"a\\b\"");
        assert_eq!(format_as_lua(&v, "k"), "k = 'it\\'s \"a\\b\"'");
    }

    #[test]
    fn lists_and_empty_tables() {
        let v = obj(&[
            ("tags", EntryValue::Array(vec![s("a"), EntryValue::Bool(true)])),
            ("empty", EntryValue::Array(Vec::new())),
            ("none", EntryValue::Object(IndexMap::new())),
        ]);
        assert_eq!(
            format_as_lua(&v, "k"),
            "k = { tags = { 'a', true }, empty = {  }, none = {  } }"
        );
    }

    #[test]
    fn non_finite_numbers_format_as_nil() {
        let v = EntryValue::Array(vec![
            EntryValue::Number(EntryNumber::F64(f64::NAN)),
            EntryValue::Number(EntryNumber::F64(f64::INFINITY)),
        ]);
        assert_eq!(format_as_lua(&v, "k"), "k = { nil, nil }");
    }

    #[test]
    fn non_identifier_target_still_reads_the_value() {
        let parsed = parse_lua_entry("my-key = 5").unwrap();
        assert_eq!(parsed.key, None);
        assert_eq!(parsed.value, EntryValue::Number(EntryNumber::I64(5)));

        let parsed = parse_lua_entry("['odd key'] = { label = 'x' }").unwrap();
        assert_eq!(parsed.key, None);
        assert_eq!(parsed.value, obj(&[("label", s("x"))]));

        let parsed = parse_lua_entry("{ a = 1 }").unwrap();
        assert_eq!(parsed.value, obj(&[("a", EntryValue::Number(EntryNumber::I64(1)))]));
    }

    #[test]
    fn placeholder_is_an_empty_table() {
        assert_eq!(placeholder("new_key"), "new_key = { }");
        let parsed = parse_lua_entry(&placeholder("new_key")).unwrap();
        assert_eq!(parsed.key.as_deref(), Some("new_key"));
        assert_eq!(parsed.value, EntryValue::Object(IndexMap::new()));
    }

    #[test]
    fn parses_weapon_example() {
        let parsed =
            parse_lua_entry("weapon_pistol = { name = 'weapon_pistol', label = 'Pistol' }")
                .unwrap();
        assert_eq!(parsed.key.as_deref(), Some("weapon_pistol"));
        assert_eq!(
            parsed.value,
            obj(&[("name", s("weapon_pistol")), ("label", s("Pistol"))])
        );
    }

    #[test]
    fn parses_without_leading_key() {
        let parsed = parse_lua_entry("{ price = 12000, brand = 'Karin' }").unwrap();
        assert_eq!(parsed.key, None);
        assert_eq!(
            parsed.value,
            obj(&[
                ("price", EntryValue::Number(EntryNumber::I64(12000))),
                ("brand", s("Karin"))
            ])
        );
    }

    #[test]
    fn tolerates_trailing_separators_and_commas() {
        let parsed = parse_lua_entry("sultan = { model = 'Sultan', price = 10, },;").unwrap();
        assert_eq!(parsed.key.as_deref(), Some("sultan"));
        assert_eq!(
            parsed.value,
            obj(&[
                ("model", s("Sultan")),
                ("price", EntryValue::Number(EntryNumber::I64(10)))
            ])
        );
    }

    #[test]
    fn scalar_bodies_parse() {
        assert_eq!(parse_lua_entry("k = nil").unwrap().value, EntryValue::Null);
        assert_eq!(parse_lua_entry("k = 'x'").unwrap().value, s("x"));
        assert_eq!(
            parse_lua_entry("k = 2.5").unwrap().value,
            EntryValue::Number(EntryNumber::F64(2.5))
        );
    }

    #[test]
    fn key_like_text_inside_strings_is_left_alone() {
        let json = lua_body_to_json("{ description = 'press x = use' }").unwrap();
        assert_eq!(json, "{ \"description\": \"press x = use\"}");
    }

    #[test]
    fn garbage_is_reported_not_panicked() {
        let err = parse_lua_entry("not valid {{{").unwrap_err();
        assert!(matches!(err, LuaParseError::UnbalancedBraces));
        assert!(!err.to_string().is_empty());

        let err = parse_lua_entry("k = { a = b }").unwrap_err();
        assert!(matches!(err, LuaParseError::Json(_)));
        assert!(!err.to_string().is_empty());

        assert!(matches!(parse_lua_entry("   "), Err(LuaParseError::Empty)));
        assert!(matches!(parse_lua_entry("k = "), Err(LuaParseError::Empty)));
    }
}
