//! Hydration, name mapping and transformation through the public pipeline.

mod fixtures;

use datashape_core::prelude::*;
use fixtures::*;
use serde_json::{Value, json};

fn mapper_input() -> Value {
    json!({
        "cased_property": "We are the knights who say, ni!",
        "data_cased_property": {"string": "Bring us a, shrubbery!"},
        "data_collection_cased_property": [
            {"string": "These are the Knights who say, Ni!"},
            {"string": "The Knights Who Say Ni demand a sacrifice!"},
        ],
    })
}

fn song_input() -> Value {
    json!({
        "song_title": "Never gonna give you up",
        "year": 1987,
        "releasedAt": "1987-07-27T00:00:00+00:00",
        "label": null,
        "code": 7,
        "tracks": [{"string": "a"}, "b"],
    })
}

#[test]
fn class_mapper_reads_snake_case_input() {
    let pipeline = DataPipeline::new();

    let data = pipeline.from::<DataWithMapper>(mapper_input()).unwrap();

    assert_eq!(data.cased_property, "We are the knights who say, ni!");
    assert_eq!(data.data_cased_property, SimpleData::new("Bring us a, shrubbery!"));
    assert_eq!(data.data_collection_cased_property.len(), 2);
}

#[test]
fn class_mapper_round_trips() {
    let pipeline = DataPipeline::new();

    let data = pipeline.from::<DataWithMapper>(mapper_input()).unwrap();
    let output = pipeline.transform(&data).unwrap();

    assert_eq!(Value::Object(output), mapper_input());
}

#[test]
fn identity_mapping_round_trips() {
    let pipeline = DataPipeline::new();
    let input = json!({"string": "Hello"});

    let data = pipeline.from::<SimpleData>(input.clone()).unwrap();

    assert_eq!(Value::Object(pipeline.transform(&data).unwrap()), input);
}

#[test]
fn output_preserves_declaration_order() {
    let pipeline = DataPipeline::new();

    let data = pipeline.from::<DataWithMapper>(mapper_input()).unwrap();
    let output = pipeline.transform(&data).unwrap();

    let keys: Vec<_> = output.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "cased_property",
            "data_cased_property",
            "data_collection_cased_property"
        ]
    );
}

#[test]
fn property_names_are_accepted_when_mapped_keys_are_missing() {
    let pipeline = DataPipeline::new();

    let data = pipeline
        .from::<DataWithMapper>(json!({
            "casedProperty": "x",
            "dataCasedProperty": {"string": "y"},
            "dataCollectionCasedProperty": [],
        }))
        .unwrap();

    assert_eq!(data.cased_property, "x");
    assert_eq!(data.data_cased_property, SimpleData::new("y"));
    assert!(data.data_collection_cased_property.is_empty());
}

#[test]
fn mapped_key_wins_over_property_name() {
    let pipeline = DataPipeline::new();
    let mut input = mapper_input();
    input["casedProperty"] = json!("by property name");

    let data = pipeline.from::<DataWithMapper>(input).unwrap();

    assert_eq!(data.cased_property, "We are the knights who say, ni!");
}

#[test]
fn missing_required_property_is_named() {
    let pipeline = DataPipeline::new();

    let err = pipeline
        .from::<DataWithMapper>(json!({"cased_property": "x"}))
        .unwrap_err();

    assert!(matches!(
        err,
        DataError::MissingRequiredProperty { property, .. } if property == "dataCasedProperty"
    ));
}

#[test]
fn type_mismatch_names_property_and_types() {
    let pipeline = DataPipeline::new();
    let mut input = song_input();
    input["year"] = json!(true);

    let err = pipeline.from::<SongData>(input).unwrap_err();

    assert_eq!(
        err,
        DataError::TypeMismatch {
            property: "year".into(),
            expected: "int".into(),
            found: "bool".into(),
        }
    );
}

#[test]
fn null_on_non_nullable_is_a_mismatch() {
    let pipeline = DataPipeline::new();
    let mut input = song_input();
    input["year"] = Value::Null;

    let err = pipeline.from::<SongData>(input).unwrap_err();

    assert!(matches!(err, DataError::TypeMismatch { found, .. } if found == "null"));
}

#[test]
fn collection_element_failure_reports_index() {
    let pipeline = DataPipeline::new();
    let input = json!({
        "cased_property": "x",
        "data_cased_property": {"string": "y"},
        "data_collection_cased_property": [
            {"string": "first"},
            {"string": "second"},
            {"missing": true},
        ],
    });

    let err = pipeline.from::<DataWithMapper>(input).unwrap_err();

    match err {
        DataError::InvalidCollectionElement {
            property,
            index,
            source,
        } => {
            assert_eq!(property, "dataCollectionCasedProperty");
            assert_eq!(index, 2);
            assert!(matches!(*source, DataError::MissingRequiredProperty { .. }));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn defaults_optional_and_nullable_properties() {
    let pipeline = DataPipeline::new();

    let song = pipeline.from::<SongData>(song_input()).unwrap();

    assert_eq!(song.title, "Never gonna give you up");
    assert_eq!(song.rating, 0.0);
    assert_eq!(song.label, None);
    assert_eq!(song.notes, None);
    assert_eq!(
        song.tracks,
        Some(vec![SimpleData::new("a"), SimpleData::new("b")])
    );
}

#[test]
fn numeric_strings_are_coerced() {
    let pipeline = DataPipeline::new();
    let mut input = song_input();
    input["year"] = json!("1987");
    input["rating"] = json!(4);

    let song = pipeline.from::<SongData>(input).unwrap();

    assert_eq!(song.year, 1987);
    assert_eq!(song.rating, 4.0);
}

#[test]
fn coercion_can_be_disabled() {
    let mut config = DataConfig::default();
    config.coerce_numeric_strings = false;
    let pipeline = DataPipeline::builder().config(config).build();
    let mut input = song_input();
    input["year"] = json!("1987");

    assert!(matches!(
        pipeline.from::<SongData>(input),
        Err(DataError::TypeMismatch { property, .. }) if property == "year"
    ));
}

#[test]
fn union_prefers_exact_match_over_coercion() {
    let pipeline = DataPipeline::new();
    let mut input = song_input();
    input["code"] = json!("12");

    let song = pipeline.from::<SongData>(input).unwrap();

    assert_eq!(song.code, json!("12"));
}

#[test]
fn property_override_and_date_format_apply_on_output() {
    let pipeline = DataPipeline::builder()
        .config(DataConfig::default().with_date_format("%Y-%m-%d"))
        .build();

    let song = pipeline.from::<SongData>(song_input()).unwrap();
    let output = pipeline.transform(&song).unwrap();

    assert_eq!(output["song_title"], json!("Never gonna give you up"));
    assert_eq!(output["releasedAt"], json!("1987-07-27"));
    assert!(!output.contains_key("notes"), "absent optional is omitted");
    assert_eq!(output["label"], Value::Null);
}

#[test]
fn global_input_mapping_applies_to_unmapped_classes() {
    let pipeline = DataPipeline::builder()
        .config(DataConfig::default().with_input_mapping(Case::Kebab, Case::Snake))
        .build();

    let data = pipeline.from::<SimpleData>(json!({"string": "kebab"})).unwrap();
    let output = pipeline.to_json(&data).unwrap();

    assert_eq!(output, r#"{"string":"kebab"}"#);
}

#[test]
fn transform_collection_keeps_order() {
    let pipeline = DataPipeline::new();
    let items = vec![SimpleData::new("a"), SimpleData::new("b")];

    let output = pipeline.transform_collection(&items).unwrap();

    assert_eq!(output, vec![json!({"string": "a"}), json!({"string": "b"})]);
}
