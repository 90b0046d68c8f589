//! The "Add entry" form: static field descriptors per category and the pass
//! that reads the inputs back into an entry value.

use crate::catalog::Category;
use crate::format::NEW_KEY;
use crate::value::{EntryNumber, EntryValue};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Checkbox,
    Multiline,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Text(&'static str),
    Number(i64),
    Flag(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<FieldDefault>,
    pub placeholder: &'static str,
    pub min: Option<f64>,
    pub step: Option<f64>,
}

impl FieldSpec {
    const fn new(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label: key,
            kind,
            required: false,
            default: None,
            placeholder: "",
            min: None,
            step: None,
        }
    }

    const fn text(key: &'static str) -> Self {
        Self::new(key, FieldKind::Text)
    }

    const fn number(key: &'static str) -> Self {
        Self::new(key, FieldKind::Number)
    }

    const fn checkbox(key: &'static str, default: bool) -> Self {
        Self::new(key, FieldKind::Checkbox).default(FieldDefault::Flag(default))
    }

    const fn multiline(key: &'static str) -> Self {
        Self::new(key, FieldKind::Multiline)
    }

    const fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    const fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    const fn range(mut self, min: f64, step: f64) -> Self {
        self.min = Some(min);
        self.step = Some(step);
        self
    }
}

const ITEM_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name").required().placeholder("advancedlockpick"),
    FieldSpec::text("label").required().placeholder("Advanced Lockpick"),
    FieldSpec::number("weight")
        .required()
        .range(0.0, 1.0)
        .default(FieldDefault::Number(0)),
    FieldSpec::text("type").required().default(FieldDefault::Text("item")),
    FieldSpec::text("image").placeholder("advancedlockpick.png"),
    FieldSpec::checkbox("unique", false),
    FieldSpec::checkbox("useable", true),
    FieldSpec::checkbox("shouldClose", true),
    FieldSpec::text("description").placeholder("..."),
];

const VEHICLE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name").required().placeholder("sultan"),
    FieldSpec::text("brand").placeholder("Karin"),
    FieldSpec::text("model").required().placeholder("Sultan"),
    FieldSpec::number("price").required().range(0.0, 1.0),
    FieldSpec::text("category").placeholder("sedans"),
    FieldSpec::text("hash").placeholder("-295689028"),
];

const WEAPON_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name").required().placeholder("weapon_pistol"),
    FieldSpec::text("label").required().placeholder("Pistol"),
    FieldSpec::text("weapontype").placeholder("WEAPON_TYPE_PISTOL"),
    FieldSpec::text("ammotype").placeholder("AMMO_PISTOL"),
    FieldSpec::text("damagereason").placeholder("shot"),
];

const JOB_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("label").required().placeholder("Police"),
    FieldSpec::checkbox("defaultDuty", true),
    FieldSpec::checkbox("offDutyPay", false),
    FieldSpec::text(JOB_NAME_FIELD)
        .label("name (optional)")
        .placeholder("police"),
    FieldSpec::multiline(JOB_GRADES_FIELD)
        .label("grades (JSON)")
        .required()
        .placeholder(
            "{\n  \"0\": { \"name\": \"recruit\", \"label\": \"Recruit\", \"payment\": 50 },\n  \"1\": { \"name\": \"officer\", \"label\": \"Officer\", \"payment\": 75 }\n}",
        ),
];

const GENERIC_FIELDS: &[FieldSpec] = &[FieldSpec::text("name"), FieldSpec::text("label")];

const JOB_NAME_FIELD: &str = "name";
const JOB_GRADES_FIELD: &str = "grades";

pub fn field_specs(category: Category) -> &'static [FieldSpec] {
    match category {
        Category::Items => ITEM_FIELDS,
        Category::Vehicles => VEHICLE_FIELDS,
        Category::Weapons => WEAPON_FIELDS,
        Category::Jobs => JOB_FIELDS,
        Category::Gangs => GENERIC_FIELDS,
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0} must be valid JSON")]
    InvalidJson(&'static str),
}

/// Widget state for one descriptor. Number fields keep their raw text so the
/// operator can type freely; coercion happens on collection.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Text(String),
    Checked(bool),
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub spec: &'static FieldSpec,
    pub input: FieldInput,
}

#[derive(Debug, Clone)]
pub struct EntryForm {
    pub category: Category,
    pub key: String,
    pub fields: Vec<FormField>,
}

impl EntryForm {
    pub fn new(category: Category) -> Self {
        let fields = field_specs(category)
            .iter()
            .map(|spec| FormField {
                spec,
                input: initial_input(spec),
            })
            .collect();
        Self {
            category,
            key: NEW_KEY.to_string(),
            fields,
        }
    }

    pub fn input_mut(&mut self, key: &str) -> Option<&mut FieldInput> {
        self.fields
            .iter_mut()
            .find(|f| f.spec.key == key)
            .map(|f| &mut f.input)
    }

    /// Sets a text/number field. Ignored for checkboxes and unknown keys.
    pub fn set_text(&mut self, key: &str, text: impl Into<String>) {
        if let Some(FieldInput::Text(s)) = self.input_mut(key) {
            *s = text.into();
        }
    }

    pub fn set_checked(&mut self, key: &str, checked: bool) {
        if let Some(FieldInput::Checked(b)) = self.input_mut(key) {
            *b = checked;
        }
    }

    /// Reads the inputs back into an entry value, validating required fields.
    pub fn collect(&self) -> Result<EntryValue, FormError> {
        let mut value = IndexMap::new();
        for field in &self.fields {
            let v = read_input(field);
            let blank = match &v {
                EntryValue::Null => true,
                EntryValue::String(s) => s.is_empty(),
                _ => false,
            };
            if field.spec.required && blank {
                return Err(FormError::MissingField(field.spec.label));
            }
            value.insert(field.spec.key.to_string(), v);
        }

        if self.category == Category::Jobs {
            if let Some(EntryValue::String(text)) = value.get(JOB_GRADES_FIELD) {
                let grades = EntryValue::parse_json(text)
                    .map_err(|_| FormError::InvalidJson(JOB_GRADES_FIELD))?;
                value.insert(JOB_GRADES_FIELD.to_string(), grades);
            }

            let name_blank = value
                .get(JOB_NAME_FIELD)
                .and_then(EntryValue::as_str)
                .is_none_or(|s| s.trim().is_empty());
            if name_blank {
                value.insert(
                    JOB_NAME_FIELD.to_string(),
                    EntryValue::String(self.key.trim().to_string()),
                );
            }
        }

        Ok(EntryValue::Object(value))
    }
}

fn initial_input(spec: &FieldSpec) -> FieldInput {
    match (spec.kind, spec.default) {
        (FieldKind::Checkbox, Some(FieldDefault::Flag(b))) => FieldInput::Checked(b),
        (FieldKind::Checkbox, _) => FieldInput::Checked(false),
        (_, Some(FieldDefault::Text(s))) => FieldInput::Text(s.to_string()),
        (_, Some(FieldDefault::Number(n))) => FieldInput::Text(n.to_string()),
        (_, Some(FieldDefault::Flag(b))) => FieldInput::Text(b.to_string()),
        (_, None) => FieldInput::Text(String::new()),
    }
}

fn read_input(field: &FormField) -> EntryValue {
    match (&field.input, field.spec.kind) {
        (FieldInput::Checked(b), _) => EntryValue::Bool(*b),
        (FieldInput::Text(text), FieldKind::Number) => {
            if text.trim().is_empty() {
                EntryValue::Null
            } else {
                // Non-numeric text becomes 0 rather than an error.
                EntryValue::Number(EntryNumber::parse_lossy(text).unwrap_or(EntryNumber::I64(0)))
            }
        }
        (FieldInput::Text(text), _) => EntryValue::String(text.clone()),
    }
}
