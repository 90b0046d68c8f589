use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A number that keeps the distinction between I64, U64, and F64 so integers
/// render without a decimal point in both JSON and Lua output.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryNumber {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl EntryNumber {
    pub fn is_finite(&self) -> bool {
        match self {
            EntryNumber::F64(v) => v.is_finite(),
            _ => true,
        }
    }

    /// Parse a number typed into a form field. Integers stay integers.
    pub fn parse_lossy(text: &str) -> Option<EntryNumber> {
        let text = text.trim();
        if let Ok(v) = text.parse::<i64>() {
            return Some(EntryNumber::I64(v));
        }
        if let Ok(v) = text.parse::<u64>() {
            return Some(EntryNumber::U64(v));
        }
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(EntryNumber::F64)
    }

    /// Writes the literal form shared by JSON and Lua. Callers handle
    /// non-finite floats themselves since neither format has a spelling for them.
    pub(crate) fn write_literal(&self, out: &mut String) {
        match self {
            EntryNumber::I64(v) => out.push_str(&v.to_string()),
            EntryNumber::U64(v) => out.push_str(&v.to_string()),
            EntryNumber::F64(v) => {
                let mut buf = ryu::Buffer::new();
                out.push_str(buf.format(*v));
            }
        }
    }
}

impl Serialize for EntryNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EntryNumber::I64(v) => serializer.serialize_i64(*v),
            EntryNumber::U64(v) => serializer.serialize_u64(*v),
            EntryNumber::F64(v) => serializer.serialize_f64(*v),
        }
    }
}

/// One game-data record (an item definition, a job, a vehicle...) or any part of one.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    Null,
    Bool(bool),
    Number(EntryNumber),
    String(String),
    Array(Vec<EntryValue>),
    Object(IndexMap<String, EntryValue>),
}

impl Default for EntryValue {
    fn default() -> Self {
        EntryValue::Object(IndexMap::new())
    }
}

impl EntryValue {
    pub fn as_object(&self) -> Option<&IndexMap<String, EntryValue>> {
        match self {
            EntryValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            EntryValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&EntryValue> {
        self.as_object().and_then(|m| m.get(key))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            EntryValue::Null => "null",
            EntryValue::Bool(_) => "bool",
            EntryValue::Number(_) => "number",
            EntryValue::String(_) => "string",
            EntryValue::Array(_) => "array",
            EntryValue::Object(_) => "object",
        }
    }

    /// Strict JSON, as typed into the editor or a form's JSON field.
    pub fn parse_json(text: &str) -> Result<EntryValue, serde_json::Error> {
        serde_json::from_str::<EntryValue>(text)
    }

    /// Standard JSON with 2-space indentation, the editor's display form.
    pub fn to_json_pretty(&self) -> String {
        let mut out = String::new();
        self.write_json(&mut out, 0);
        out
    }

    fn write_json(&self, out: &mut String, indent: usize) {
        match self {
            EntryValue::Null => out.push_str("null"),
            EntryValue::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
            EntryValue::Number(n) if n.is_finite() => n.write_literal(out),
            EntryValue::Number(_) => out.push_str("null"),
            EntryValue::String(s) => write_escaped_string(out, s),
            EntryValue::Array(values) => {
                if values.is_empty() {
                    out.push_str("[]");
                    return;
                }
                out.push_str("[\n");
                for (i, v) in values.iter().enumerate() {
                    out.push_str(&" ".repeat(indent + 2));
                    v.write_json(out, indent + 2);
                    if i + 1 != values.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                out.push_str(&" ".repeat(indent));
                out.push(']');
            }
            EntryValue::Object(map) => {
                if map.is_empty() {
                    out.push_str("{}");
                    return;
                }
                out.push_str("{\n");
                for (i, (k, v)) in map.iter().enumerate() {
                    out.push_str(&" ".repeat(indent + 2));
                    write_escaped_string(out, k);
                    out.push_str(": ");
                    v.write_json(out, indent + 2);
                    if i + 1 != map.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                out.push_str(&" ".repeat(indent));
                out.push('}');
            }
        }
    }
}

pub(crate) fn write_escaped_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write as _;
                write!(out, "\\u{:04x}", c as u32).ok();
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

impl Serialize for EntryValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EntryValue::Null => serializer.serialize_unit(),
            EntryValue::Bool(v) => serializer.serialize_bool(*v),
            EntryValue::Number(n) => n.serialize(serializer),
            EntryValue::String(s) => serializer.serialize_str(s),
            EntryValue::Array(values) => values.serialize(serializer),
            EntryValue::Object(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for EntryValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> de::Visitor<'de> for ValueVisitor {
            type Value = EntryValue;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a JSON value")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(EntryValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(EntryValue::Null)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
                EntryValue::deserialize(d)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(EntryValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(EntryValue::Number(EntryNumber::I64(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                // Keep small unsigned values signed so `5` compares equal whichever
                // way it was produced.
                Ok(EntryValue::Number(match i64::try_from(v) {
                    Ok(v) => EntryNumber::I64(v),
                    Err(_) => EntryNumber::U64(v),
                }))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(EntryValue::Number(EntryNumber::F64(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(EntryValue::String(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(EntryValue::String(v))
            }

            fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut values = Vec::new();
                while let Some(value) = seq.next_element::<EntryValue>()? {
                    values.push(value);
                }
                Ok(EntryValue::Array(values))
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut values = IndexMap::new();
                while let Some((key, value)) = map.next_entry::<String, EntryValue>()? {
                    values.insert(key, value);
                }
                Ok(EntryValue::Object(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{EntryNumber, EntryValue};
    use indexmap::IndexMap;

    #[test]
    fn parse_json_keeps_integers_and_floats_apart() {
        let v = EntryValue::parse_json(r#"{ "a": 5, "b": 2.5, "c": -3 }"#).unwrap();
        assert_eq!(v.get("a"), Some(&EntryValue::Number(EntryNumber::I64(5))));
        assert_eq!(v.get("b"), Some(&EntryValue::Number(EntryNumber::F64(2.5))));
        assert_eq!(v.get("c"), Some(&EntryValue::Number(EntryNumber::I64(-3))));
    }

    #[test]
    fn parse_json_is_strict() {
        assert!(EntryValue::parse_json("{ a: 1 }").is_err());
        assert!(EntryValue::parse_json("{ \"a\": 1, }").is_err());
        assert!(EntryValue::parse_json("").is_err());
    }

    #[test]
    fn pretty_json_uses_two_space_indent() {
        let v = EntryValue::parse_json(r#"{"name":"sultan","tags":["fast",1],"extra":{}}"#)
            .unwrap();
        assert_eq!(
            v.to_json_pretty(),
            "{\n  \"name\": \"sultan\",\n  \"tags\": [\n    \"fast\",\n    1\n  ],\n  \"extra\": {}\n}"
        );
    }

    #[test]
    fn pretty_json_reparses_to_same_value() {
        let text = r#"{"label":"Say \"hi\"\n","n":null,"f":0.25,"list":[],"ok":false}"#;
        let v = EntryValue::parse_json(text).unwrap();
        assert_eq!(EntryValue::parse_json(&v.to_json_pretty()).unwrap(), v);
    }

    #[test]
    fn empty_value_defaults_to_object() {
        assert_eq!(EntryValue::default(), EntryValue::Object(IndexMap::new()));
        assert_eq!(EntryValue::default().to_json_pretty(), "{}");
    }

    #[test]
    fn parse_lossy_prefers_integers() {
        assert_eq!(EntryNumber::parse_lossy(" 42 "), Some(EntryNumber::I64(42)));
        assert_eq!(EntryNumber::parse_lossy("1.5"), Some(EntryNumber::F64(1.5)));
        assert_eq!(EntryNumber::parse_lossy("abc"), None);
        assert_eq!(EntryNumber::parse_lossy("inf"), None);
    }
}
