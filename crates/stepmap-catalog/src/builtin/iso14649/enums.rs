//! Enumerations, as (member name, wire value) pairs.

use stepmap_core::schema::{EnumType, RegistryBuilder};

pub const FEEDRATE_REFERENCE: &str = "FeedrateReference";
pub const CUTMODE_TYPE: &str = "CutmodeType";
pub const ROT_DIRECTION: &str = "RotDirection";
pub const HAND: &str = "Hand";
pub const TOLERANCE_CLASS: &str = "ToleranceClass";

pub(super) fn declare(b: RegistryBuilder) -> RegistryBuilder {
    b.enumeration(EnumType::new(FEEDRATE_REFERENCE, [("TCP", "tcp"), ("CCP", "ccp")]))
        .enumeration(EnumType::new(
            CUTMODE_TYPE,
            [("CLIMB", "climb"), ("CONVENTIONAL", "conventional")],
        ))
        .enumeration(EnumType::new(ROT_DIRECTION, [("CW", "cw"), ("CCW", "ccw")]))
        .enumeration(EnumType::new(
            HAND,
            [("LEFT", "left"), ("RIGHT", "right"), ("NEUTRAL", "neutral")],
        ))
        .enumeration(EnumType::new(
            TOLERANCE_CLASS,
            [("ROUGH", "rough"), ("MEDIUM", "medium"), ("FINE", "fine")],
        ))
}
