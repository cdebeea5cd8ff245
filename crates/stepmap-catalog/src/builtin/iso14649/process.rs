//! Program structure: projects, workplans, workingsteps and features.

use stepmap_core::schema::{FieldSpec, RegistryBuilder, SchemaType};

use super::enums::TOLERANCE_CLASS;

pub(super) fn declare(b: RegistryBuilder) -> RegistryBuilder {
    b.record(
        SchemaType::new("Project")
            .field("its_id", FieldSpec::scalar().required())
            .field("main_workplan", FieldSpec::record("Workplan").required())
            .field("its_workpieces", FieldSpec::list_of("Workpiece"))
            .field("its_owner", FieldSpec::scalar())
            .field("its_release", FieldSpec::scalar()),
    )
    .record(
        SchemaType::new("Workpiece")
            .field("its_id", FieldSpec::scalar().required())
            .field("its_material", FieldSpec::record("Material"))
            .field("global_tolerance", FieldSpec::scalar())
            .field("tolerance_class", FieldSpec::enumeration(TOLERANCE_CLASS))
            .field("its_rawpiece", FieldSpec::scalar()),
    )
    .record(
        SchemaType::new("Material")
            .field("standard_identifier", FieldSpec::scalar().required())
            .field("material_identifier", FieldSpec::scalar().required())
            .field("material_property", FieldSpec::list_of_scalar()),
    )
    .record(
        SchemaType::new("Executable")
            .abstract_type()
            .field("its_id", FieldSpec::scalar().required()),
    )
    .record(SchemaType::new("ProgramStructure").extends("Executable").abstract_type())
    .record(
        SchemaType::new("Workplan")
            .extends("ProgramStructure")
            .field("its_elements", FieldSpec::list_of("Executable"))
            .field("its_channel", FieldSpec::scalar())
            .field("its_setup", FieldSpec::record("Setup")),
    )
    .record(
        SchemaType::new("Setup")
            .field("its_id", FieldSpec::scalar().required())
            .field("its_origin", FieldSpec::scalar())
            .field("its_secplane", FieldSpec::scalar()),
    )
    .record(
        SchemaType::new("WorkingStep")
            .extends("Executable")
            .abstract_type()
            .field("its_secplane", FieldSpec::scalar()),
    )
    .record(
        SchemaType::new("MachiningWorkingstep")
            .extends("WorkingStep")
            .field("its_feature", FieldSpec::record("ManufacturingFeature").required())
            .field("its_operation", FieldSpec::record("MachiningOperation").required())
            .field("its_effect", FieldSpec::scalar()),
    )
    .record(
        SchemaType::new("RapidMovement")
            .extends("WorkingStep")
            .field("its_toolpath", FieldSpec::list_of_scalar()),
    )
    .record(
        SchemaType::new("ManufacturingFeature")
            .abstract_type()
            .field("its_id", FieldSpec::scalar().required())
            .field("its_workpiece", FieldSpec::scalar()),
    )
    .record(
        SchemaType::new("PlanarFace")
            .extends("ManufacturingFeature")
            .field("depth", FieldSpec::scalar().required())
            .field("course_of_travel", FieldSpec::scalar())
            .field("removal_boundary", FieldSpec::scalar()),
    )
    .record(
        SchemaType::new("Pocket")
            .extends("ManufacturingFeature")
            .abstract_type()
            .field("depth", FieldSpec::scalar().required())
            .field("planar_radius", FieldSpec::scalar())
            .field("orthogonal_radius", FieldSpec::scalar()),
    )
    .record(
        SchemaType::new("ClosedPocket")
            .extends("Pocket")
            .field("feature_boundary", FieldSpec::scalar()),
    )
    .record(
        SchemaType::new("OpenPocket")
            .extends("Pocket")
            .field("open_boundary", FieldSpec::scalar()),
    )
    .record(
        SchemaType::new("RoundHole")
            .extends("ManufacturingFeature")
            .field("diameter", FieldSpec::scalar().required())
            .field("depth", FieldSpec::scalar())
            .field("change_in_diameter", FieldSpec::scalar()),
    )
}
