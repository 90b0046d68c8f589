use pretty_assertions::assert_eq;
use sharedpanel::{
    Category, EntryNumber, EntryValue, format_as_lua, form::EntryForm, parse_lua_entry,
};

fn assert_roundtrip(value: &EntryValue, key: &str) {
    let text = format_as_lua(value, key);
    let parsed = parse_lua_entry(&text)
        .unwrap_or_else(|e| panic!("failed to read back {text:?}: {e}"));
    assert_eq!(parsed.key.as_deref(), Some(key), "key of {text:?}");
    assert_eq!(&parsed.value, value, "value of {text:?}");
}

fn filled_form(category: Category) -> EntryForm {
    let mut form = EntryForm::new(category);
    form.key = format!("sample_{category}");
    match category {
        Category::Items => {
            form.set_text("name", "advancedlockpick");
            form.set_text("label", "Advanced Lockpick");
            form.set_text("weight", "1.5");
            form.set_text("image", "advancedlockpick.png");
            form.set_checked("unique", true);
            form.set_text("description", "Opens things. Don't ask how.");
        }
        Category::Jobs => {
            form.set_text("label", "Police");
            form.set_text(
                "grades",
                r#"{
                  "0": { "name": "recruit", "label": "Recruit", "payment": 50 },
                  "1": { "name": "officer", "label": "Officer", "payment": 75, "isboss": false }
                }"#,
            );
        }
        Category::Gangs => {
            form.set_text("name", "ballas");
            form.set_text("label", "Ballas");
        }
        Category::Vehicles => {
            form.set_text("name", "sultan");
            form.set_text("brand", "Karin");
            form.set_text("model", "Sultan");
            form.set_text("price", "12500");
            form.set_text("hash", "-295689028");
        }
        Category::Weapons => {
            form.set_text("name", "weapon_pistol");
            form.set_text("label", "Pistol");
            form.set_text("weapontype", "WEAPON_TYPE_PISTOL");
            form.set_text("ammotype", "AMMO_PISTOL");
            form.set_text("damagereason", "Pistoled / Blasted / Plugged");
        }
    }
    form
}

#[test]
fn form_values_roundtrip_for_every_category() {
    for category in Category::ALL {
        let form = filled_form(category);
        let value = form
            .collect()
            .unwrap_or_else(|e| panic!("{category}: {e}"));
        assert_roundtrip(&value, &form.key);
    }
}

#[test]
fn untouched_gang_form_roundtrips() {
    let form = EntryForm::new(Category::Gangs);
    let value = form.collect().unwrap();
    assert_roundtrip(&value, "new_key");
}

#[test]
fn awkward_string_contents_roundtrip() {
    let texts = [
        "it's",
        "''",
        "line one\nline two",
        "tabs\tand \"double quotes\"",
        "looks = like a key",
        "nil",
        "{ braces } inside",
        "trailing comma, }",
        "C:\\path\\to\\file.png",
        "\u{1F52B} emoji",
        "",
    ];
    for text in texts {
        let mut map = indexmap::IndexMap::new();
        map.insert("label".to_string(), EntryValue::String(text.to_string()));
        map.insert("count".to_string(), EntryValue::Number(EntryNumber::I64(3)));
        assert_roundtrip(&EntryValue::Object(map), "thing");
    }
}

#[test]
fn nested_lists_and_scalars_roundtrip() {
    let value = EntryValue::parse_json(
        r#"{
          "tags": ["a", "b'c"],
          "matrix": [[1, 2], [3, 4]],
          "nested": { "deep": { "flag": true, "none": null, "ratio": -0.25 } },
          "big": 9007199254740993
        }"#,
    )
    .unwrap();
    assert_roundtrip(&value, "weapon_pistol");
}

#[test]
fn documented_examples() {
    assert_eq!(format_as_lua(&EntryValue::Null, "k"), "k = nil");
    let value = EntryValue::parse_json(r#"{ "a": 1, "b": "x" }"#).unwrap();
    assert_eq!(format_as_lua(&value, "k"), "k = { a = 1, b = 'x' }");

    let parsed =
        parse_lua_entry("weapon_pistol = { name = 'weapon_pistol', label = 'Pistol' }").unwrap();
    assert_eq!(parsed.key.as_deref(), Some("weapon_pistol"));
    assert_eq!(
        parsed.value,
        EntryValue::parse_json(r#"{ "name": "weapon_pistol", "label": "Pistol" }"#).unwrap()
    );

    let err = parse_lua_entry("not valid {{{").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn empty_list_reads_back_as_empty_table() {
    let value = EntryValue::parse_json(r#"{ "tags": [] }"#).unwrap();
    let text = format_as_lua(&value, "k");
    assert_eq!(text, "k = { tags = {  } }");
    let parsed = parse_lua_entry(&text).unwrap();
    assert_eq!(
        parsed.value,
        EntryValue::parse_json(r#"{ "tags": {} }"#).unwrap()
    );
}

#[test]
fn job_grades_with_empty_list_come_back_as_empty_table() {
    let mut form = EntryForm::new(Category::Jobs);
    form.key = "police".to_string();
    form.set_text("label", "Police");
    form.set_text("grades", r#"{ "0": { "name": "recruit", "perks": [] } }"#);
    let value = form.collect().unwrap();

    let text = format_as_lua(&value, "police");
    assert!(text.contains("grades = { 0 = { name = 'recruit', perks = {  } } }"), "{text}");

    let parsed = parse_lua_entry(&text).unwrap();
    assert_eq!(parsed.key.as_deref(), Some("police"));
    let perks = parsed
        .value
        .get("grades")
        .and_then(|g| g.get("0"))
        .and_then(|g| g.get("perks"));
    assert_eq!(perks, Some(&EntryValue::parse_json("{}").unwrap()));
    assert_ne!(parsed.value, value);
}
