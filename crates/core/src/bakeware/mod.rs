//! Bakeware: pan volumes and dough sizing

pub mod geometry;
pub mod magic_number;

pub use geometry::{scaling_factor, volume, PanConfig, PanFamily};
pub use magic_number::{
    AltitudeBreakpoint, MagicNumberOptions, MagicNumberTable, PanAllocation, PanMaterial,
    PanShare, ProductType,
};
