//! iso14649_mapping.rs
//!
//! Maps a flat CAM operation record onto a machining workingstep using the
//! built-in catalog, then reads it back through the wire document.

use assert_matches::assert_matches;
use serde_json::{json, Value};

use stepmap_catalog::builtin::{iso14649, DEFAULT_CATALOG};
use stepmap_catalog::Catalog;
use stepmap_core::config::{BuildMode, WireConfig};
use stepmap_core::prelude::*;
use stepmap_core::query::evaluate_document;

fn mapping() -> Mapping {
    Mapping::from_json(&json!({
        "step": "its_id",
        "feature": "its_feature.PlanarFace.its_id",
        "depth": "its_feature.PlanarFace.depth",
        "op": "its_operation.PlaneRoughMilling.its_id",
        "speed": "its_operation.its_technology.MillingTechnology.feedrate",
        "ref": "its_operation.its_technology.feedrate_reference",
        "sync": "its_operation.its_technology.synchronize_spindle_with_feed",
        "tool.id": "its_operation.its_tool.MillingCuttingTool.its_id",
        "tool.diameter": "its_operation.its_tool.its_tool_body.Endmill.dimension.diameter",
        "coolant": "its_operation.its_machine_functions.MillingMachineFunctions.coolant",
        "cut": "its_operation.its_machining_strategy.ContourParallel.cutmode"
    }))
    .unwrap()
}

fn source() -> Value {
    json!({
        "step": "WS1",
        "feature": "F1",
        "depth": 2.5,
        "op": "OP1",
        "speed": 120.5,
        "ref": "TCP",
        "sync": true,
        "tool": {"id": "T1", "diameter": 12},
        "coolant": true,
        "cut": "both"
    })
}

#[test]
fn workingstep_round_trip() {
    let reg = iso14649().unwrap();
    let tree = TreeBuilder::new(reg)
        .build_checked(&source(), &mapping(), "MachiningWorkingstep")
        .unwrap();

    let op = tree.lookup("its_operation").unwrap().as_branch().unwrap();
    assert_eq!(op.discriminator(), Some("PlaneRoughMilling"));

    let doc = to_document(&tree, "MachiningWorkingstep", reg, &WireConfig::default());
    let ws = &doc["process_fragment"];
    assert_eq!(ws["its_operation"]["@xsi:type"], json!("plane_rough_milling"));
    assert_eq!(ws["its_feature"]["@xsi:type"], json!("planar_face"));
    assert_eq!(ws["its_operation"]["its_tool"]["its_tool_body"]["@xsi:type"], json!("endmill"));
    assert_eq!(ws["its_operation"]["its_machining_strategy"]["cutmode"], json!("climb"));

    let feed = evaluate_document(&doc, "/process_fragment/its_operation/its_technology/feedrate");
    assert_eq!(feed, json!({"feedrate": 120.5}));

    let tref = evaluate_document(
        &doc,
        "process_fragment/its_operation/its_technology/feedrate_reference",
    );
    assert_eq!(tref, json!({"feedrate_reference": "tcp"}));
}

#[test]
fn missing_values_are_collected_in_mapping_order() {
    let reg = iso14649().unwrap();
    let mut src = source();
    let obj = src.as_object_mut().unwrap();
    obj.remove("ref");
    obj.insert("tool".into(), json!({"id": "T1"}));

    let out = TreeBuilder::new(reg)
        .mode(BuildMode::Lenient)
        .build(&src, &mapping(), "MachiningWorkingstep")
        .unwrap();
    assert_eq!(
        out.missing,
        vec![
            "its_operation.its_technology.feedrate_reference".to_string(),
            "its_operation.its_tool.its_tool_body.dimension.diameter".to_string(),
        ]
    );

    let strict = TreeBuilder::new(reg).build(&src, &mapping(), "MachiningWorkingstep");
    assert_matches!(
        strict,
        Err(StepmapError::MissingRequiredField(p))
            if p == "its_operation.its_technology.feedrate_reference"
    );
}

#[test]
fn unknown_field_names_the_source_key() {
    let reg = iso14649().unwrap();
    let m = Mapping::from_pairs([("x", "its_operation.its_technology.spindle")]).unwrap();

    // `spindle` exists only on MillingTechnology, and nothing narrowed the technology.
    let err = TreeBuilder::new(reg)
        .build(&json!({"x": 1000}), &m, "MachiningWorkingstep")
        .unwrap_err();
    assert_matches!(
        err,
        StepmapError::UnknownField { ref field, ref source_key, .. }
            if field == "spindle" && source_key == "x"
    );
}

#[test]
fn builtin_catalog_lists_iso14649() {
    let c = Catalog::builtin().unwrap();
    let entry = c.resolve(DEFAULT_CATALOG).unwrap();
    assert!(entry.spec.roots.iter().any(|r| r == "Project"));
    assert_eq!(entry.registry.len(), iso14649().unwrap().len());
}
