//! Property tests for the transformation laws
//!
//! - Round trip: querying a mutated draft gives the draft back
//! - Address lines: offsets 6 and 7 keep their meaning for every address type
//! - Country branching: state and district follow the address country
//! - Visibility: re-evaluating the same draft gives the same answer

mod common;

use common::{address, birth_engine, draft};
use proptest::prelude::*;
use regform::{EngineConfig, FormDefinition, FormEngine};
use serde_json::{json, Value};

fn text() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z '-]{0,15}"
}

fn country() -> impl Strategy<Value = String> {
    prop_oneof![Just("FAR".to_string()), "[A-Z]{3}"]
}

const ADDRESS_TYPES: [&str; 3] = ["PERMANENT", "CURRENT", "PLACE_OF_HERITAGE"];

/// One section with a chief and an urban/rural field per address type
fn address_lines_engine() -> FormEngine {
    let fields: Vec<Value> = ADDRESS_TYPES
        .iter()
        .flat_map(|t| {
            [
                json!({"name": format!("chief{}", t), "type": "TEXT",
                       "mapping": {"mutation": {"operation": "address", "parameters": [t, 6]}}}),
                json!({"name": format!("urbanOrRural{}", t), "type": "RADIO_GROUP",
                       "mapping": {"mutation": {"operation": "address", "parameters": [t, "7"]}}}),
            ]
        })
        .collect();
    let form = json!({
        "event": "birth",
        "sections": [{"id": "informant", "scope": "informant",
                      "groups": [{"id": "informant-address", "fields": fields}]}]
    });
    FormEngine::new(
        FormDefinition::from_json_str(&form.to_string()).unwrap(),
        EngineConfig::default(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn prop_address_lines_keep_their_offsets(
        chiefs in proptest::collection::vec(text(), 3),
        urban in proptest::collection::vec(prop_oneof![Just("URBAN"), Just("RURAL")], 3),
    ) {
        let engine = address_lines_engine();
        let mut values = serde_json::Map::new();
        for (i, t) in ADDRESS_TYPES.iter().enumerate() {
            values.insert(format!("chief{}", t), json!(chiefs[i]));
            values.insert(format!("urbanOrRural{}", t), json!(urban[i]));
        }
        let values = Value::Object(values);
        let draft = draft(json!({"informant": values.clone()}));

        let outcome = engine.mutate_section("informant", &draft).unwrap();
        prop_assert!(outcome.is_complete());
        let scoped = &outcome.fragment["informant"];
        for (i, t) in ADDRESS_TYPES.iter().enumerate() {
            let written = address(scoped, t);
            prop_assert_eq!(&written["line"][6], &json!(chiefs[i]));
            prop_assert_eq!(&written["line"][7], &json!(urban[i]));
            prop_assert_eq!(written["line"].as_array().map(Vec::len), Some(11));
        }

        let back = engine.query_section("informant", &outcome.fragment).unwrap();
        prop_assert_eq!(back.values, values);
    }

    #[test]
    fn prop_mother_details_round_trip(
        first in text(),
        family in text(),
        national_id in "[0-9]{10}",
        country in country(),
        state in text(),
        district in text(),
        chief in text(),
    ) {
        let engine = birth_engine();
        let local = country == "FAR";
        let mut mother = json!({
            "firstNamesEng": first,
            "familyNameEng": family,
            "iD": national_id,
            "nationality": country,
            "countryPermanent": country,
            "chiefPermanent": chief,
            "currentAddressSameAsPermanent": true,
        });
        if local {
            mother["statePermanent"] = json!(state);
            mother["districtPermanent"] = json!(district);
        } else {
            mother["internationalStatePermanent"] = json!(state);
            mother["internationalDistrictPermanent"] = json!(district);
        }

        let outcome = engine.mutate_section("mother", &draft(json!({"mother": mother.clone()}))).unwrap();
        prop_assert!(outcome.is_complete());

        let back = engine.query_section("mother", &outcome.fragment).unwrap();
        prop_assert!(back.warnings.is_empty());
        for (key, value) in mother.as_object().unwrap() {
            prop_assert_eq!(&back.values[key.as_str()], value, "field {}", key);
        }
    }

    #[test]
    fn prop_state_follows_country(country in country(), state in text()) {
        let engine = birth_engine();
        let draft = draft(json!({"mother": {
            "countryPermanent": country,
            "statePermanent": state,
            "internationalStatePermanent": state,
        }}));

        let outcome = engine.mutate_section("mother", &draft).unwrap();
        let permanent = address(&outcome.fragment["mother"], "PERMANENT");
        let local = country == "FAR";
        prop_assert_eq!(permanent.get("state").is_some(), local);
        prop_assert_eq!(permanent.get("internationalState").is_some(), !local);

        let back = engine.query_section("mother", &outcome.fragment).unwrap();
        prop_assert_eq!(back.values.get("statePermanent").is_some(), local);
        prop_assert_eq!(back.values.get("internationalStatePermanent").is_some(), !local);
    }

    #[test]
    fn prop_visibility_is_deterministic(
        present in prop_oneof![Just("BOTH_PARENTS"), Just("MOTHER"), Just("FATHER"), Just("OTHER")],
        country in country(),
        same in any::<bool>(),
    ) {
        let draft = draft(json!({
            "registration": {"presentAtBirthRegistration": present},
            "mother": {"countryPermanent": country, "currentAddressSameAsPermanent": same}
        }));

        let engine = birth_engine();
        for section in ["registration", "mother"] {
            let first = engine.get_visible_fields(section, &draft).unwrap();
            let again = engine.get_visible_fields(section, &draft).unwrap();
            let fresh = birth_engine().get_visible_fields(section, &draft).unwrap();
            prop_assert_eq!(&first, &again);
            prop_assert_eq!(&first, &fresh);
        }

        // The two informant groups are never shown together
        let registration = engine.get_visible_fields("registration", &draft).unwrap();
        let shown = |name: &str| registration.iter().any(|s| s.name == name && s.visible);
        prop_assert!(shown("informant") != shown("informantType"));
    }
}
