use jsonschema::JSONSchema;
use serde_json::json;

fn compiled_schema() -> JSONSchema {
    let schema = include_str!("../schemas/dataset.v1.json");
    let schema_json: serde_json::Value = serde_json::from_str(schema).unwrap();
    let schema_static: &'static serde_json::Value = Box::leak(Box::new(schema_json));
    JSONSchema::options().compile(schema_static).unwrap()
}

#[test]
fn table_spec_example_is_valid() {
    let instance = include_str!("resources/dataset_model_input_table.json");
    let instance_json: serde_json::Value = serde_json::from_str(instance).unwrap();
    assert!(compiled_schema().is_valid(&instance_json));
}

#[test]
fn artifact_spec_example_is_valid() {
    let instance = include_str!("resources/dataset_price_histogram.json");
    let instance_json: serde_json::Value = serde_json::from_str(instance).unwrap();
    assert!(compiled_schema().is_valid(&instance_json));
}

#[test]
fn unknown_kind_is_rejected() {
    let mut invalid: serde_json::Value =
        serde_json::from_str(include_str!("resources/dataset_model_input_table.json")).unwrap();
    invalid["kind"] = json!("parquet_table");

    assert!(
        !compiled_schema().is_valid(&invalid),
        "kind enum should fail"
    );
}

#[test]
fn missing_location_is_rejected() {
    let mut invalid: serde_json::Value =
        serde_json::from_str(include_str!("resources/dataset_price_histogram.json")).unwrap();
    invalid.as_object_mut().unwrap().remove("location");

    assert!(!compiled_schema().is_valid(&invalid));
}

#[test]
fn unexpected_properties_are_rejected() {
    let mut invalid: serde_json::Value =
        serde_json::from_str(include_str!("resources/dataset_price_histogram.json")).unwrap();
    invalid["retries"] = json!(3);

    assert!(!compiled_schema().is_valid(&invalid));
}

#[test]
fn malformed_dataset_id_is_rejected() {
    let mut invalid: serde_json::Value =
        serde_json::from_str(include_str!("resources/dataset_model_input_table.json")).unwrap();
    invalid["dataset_id"] = json!("Model-Input-Table");

    assert!(!compiled_schema().is_valid(&invalid));
}
