//! Machining operations and milling strategies.

use stepmap_core::schema::{FallbackPolicy, FieldSpec, RegistryBuilder, SchemaType};

use super::enums::{CUTMODE_TYPE, ROT_DIRECTION};

/// Source systems often export "both" or "mixed" for strategies that cut
/// in either direction; the standard has no such member.
fn cutmode() -> FieldSpec {
    FieldSpec::enumeration(CUTMODE_TYPE).with_fallback(
        FallbackPolicy::new("climb")
            .synonym("both")
            .synonym("mixed")
            .synonym("any"),
    )
}

pub(super) fn declare(b: RegistryBuilder) -> RegistryBuilder {
    let b = b
        .record(
            SchemaType::new("MachiningOperation")
                .abstract_type()
                .field("its_id", FieldSpec::scalar().required())
                .field("retract_plane", FieldSpec::scalar())
                .field("start_point", FieldSpec::scalar())
                .field("its_tool", FieldSpec::record("MachiningTool").required())
                .field("its_technology", FieldSpec::record("Technology").required())
                .field("its_machine_functions", FieldSpec::record("MachineFunctions").required()),
        )
        .record(
            SchemaType::new("MillingMachiningOperation")
                .extends("MachiningOperation")
                .abstract_type()
                .field("overcut_length", FieldSpec::scalar()),
        )
        .record(
            SchemaType::new("MillingTypeOperation")
                .extends("MillingMachiningOperation")
                .abstract_type()
                .field("approach", FieldSpec::scalar())
                .field("retract", FieldSpec::scalar()),
        );

    let b = b
        .record(
            SchemaType::new("PlaneMilling")
                .extends("MillingTypeOperation")
                .abstract_type()
                .field("its_machining_strategy", FieldSpec::record("Two5DMillingStrategy"))
                .field("axial_cutting_depth", FieldSpec::scalar())
                .field("allowance_bottom", FieldSpec::scalar()),
        )
        .record(SchemaType::new("PlaneRoughMilling").extends("PlaneMilling"))
        .record(SchemaType::new("PlaneFinishMilling").extends("PlaneMilling"))
        .record(
            SchemaType::new("SideMilling")
                .extends("MillingTypeOperation")
                .abstract_type()
                .field("its_machining_strategy", FieldSpec::record("Two5DMillingStrategy"))
                .field("axial_cutting_depth", FieldSpec::scalar())
                .field("radial_cutting_depth", FieldSpec::scalar())
                .field("allowance_side", FieldSpec::scalar()),
        )
        .record(SchemaType::new("SideRoughMilling").extends("SideMilling"))
        .record(SchemaType::new("SideFinishMilling").extends("SideMilling"));

    let b = b
        .record(
            SchemaType::new("DrillingTypeOperation")
                .extends("MillingMachiningOperation")
                .abstract_type()
                .field("cutting_depth", FieldSpec::scalar())
                .field("previous_diameter", FieldSpec::scalar())
                .field("dwell_time_bottom", FieldSpec::scalar())
                .field("feed_on_retract", FieldSpec::scalar()),
        )
        .record(SchemaType::new("Drilling").extends("DrillingTypeOperation"))
        .record(SchemaType::new("CenterDrilling").extends("DrillingTypeOperation"))
        .record(
            SchemaType::new("MultistepDrilling")
                .extends("DrillingTypeOperation")
                .field("retract_distance", FieldSpec::scalar().required())
                .field("first_depth", FieldSpec::scalar().required())
                .field("depth_of_step", FieldSpec::scalar().required()),
        );

    b.record(
        SchemaType::new("Two5DMillingStrategy")
            .abstract_type()
            .field("overlap", FieldSpec::scalar())
            .field("allow_multiple_passes", FieldSpec::scalar())
            .field("cutmode", cutmode()),
    )
    .record(SchemaType::new("Unidirectional").extends("Two5DMillingStrategy"))
    .record(
        SchemaType::new("Bidirectional")
            .extends("Two5DMillingStrategy")
            .field("stepover_direction", FieldSpec::scalar()),
    )
    .record(
        SchemaType::new("ContourParallel")
            .extends("Two5DMillingStrategy")
            .field("rotation_direction", FieldSpec::enumeration(ROT_DIRECTION)),
    )
}
