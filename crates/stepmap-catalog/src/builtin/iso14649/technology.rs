//! Technology, machine functions and cutting tools.

use stepmap_core::schema::{FieldSpec, RegistryBuilder, SchemaType};

use super::enums::{FEEDRATE_REFERENCE, HAND};

pub(super) fn declare(b: RegistryBuilder) -> RegistryBuilder {
    let b = b
        .record(
            SchemaType::new("Technology")
                .abstract_type()
                .field("feedrate", FieldSpec::scalar())
                .field(
                    "feedrate_reference",
                    FieldSpec::enumeration(FEEDRATE_REFERENCE).required(),
                ),
        )
        .record(
            SchemaType::new("MillingTechnology")
                .extends("Technology")
                .field("cutspeed", FieldSpec::scalar())
                .field("spindle", FieldSpec::scalar())
                .field("feedrate_per_tooth", FieldSpec::scalar())
                .field("synchronize_spindle_with_feed", FieldSpec::scalar())
                .field("inhibit_feedrate_override", FieldSpec::scalar())
                .field("inhibit_spindle_override", FieldSpec::scalar())
                .field("its_adaptive_control", FieldSpec::scalar()),
        )
        .record(SchemaType::new("MachineFunctions").abstract_type())
        .record(
            SchemaType::new("MillingMachineFunctions")
                .extends("MachineFunctions")
                .field("coolant", FieldSpec::scalar())
                .field("coolant_pressure", FieldSpec::scalar())
                .field("mist", FieldSpec::scalar())
                .field("through_spindle_coolant", FieldSpec::scalar())
                .field("through_pressure", FieldSpec::scalar())
                .field("axis_clamping", FieldSpec::list_of_scalar())
                .field("chip_removal", FieldSpec::scalar()),
        );

    b.record(
        SchemaType::new("MachiningTool")
            .abstract_type()
            .field("its_id", FieldSpec::scalar().required()),
    )
    .record(
        SchemaType::new("MillingCuttingTool")
            .extends("MachiningTool")
            .field("its_tool_body", FieldSpec::record("MillingToolBody").required())
            .field("overall_assembly_length", FieldSpec::scalar())
            .field("directionality", FieldSpec::scalar()),
    )
    .record(
        SchemaType::new("MillingToolBody")
            .abstract_type()
            .field("dimension", FieldSpec::record("MillingToolDimension").required())
            .field("number_of_teeth", FieldSpec::scalar())
            .field("hand_of_cut", FieldSpec::enumeration(HAND))
            .field("coolant_through_tool", FieldSpec::scalar()),
    )
    .record(SchemaType::new("Endmill").extends("MillingToolBody"))
    .record(SchemaType::new("FacemillTool").extends("MillingToolBody"))
    .record(SchemaType::new("TwistDrill").extends("MillingToolBody"))
    .record(SchemaType::new("CenterDrill").extends("MillingToolBody"))
    .record(
        SchemaType::new("MillingToolDimension")
            .field("diameter", FieldSpec::scalar().required())
            .field("tool_top_angle", FieldSpec::scalar())
            .field("cutting_edge_length", FieldSpec::scalar())
            .field("edge_radius", FieldSpec::scalar()),
    )
}
