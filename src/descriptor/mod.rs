//! Model descriptor handling
//!
//! A descriptor is the `*.model3.json` manifest of one model package: the moc
//! reference, the ordered texture list, optional physics/pose references,
//! motion groups, expressions, parameter groups, and hit areas.
//!
//! Descriptors loaded from disk are treated as immutable templates; all
//! mutation happens on a clone (see [`crate::merge`]).

pub mod document;
pub mod fragments;

pub use document::{
    COMPAT_MANIFEST_NAME, ExpressionRef, FileReferences, HitArea, MANIFEST_SUFFIX, ModelDescriptor,
    MotionRef, ParameterGroup, find_manifest,
};
pub use fragments::{
    ExpressionDocument, ExpressionParameter, MotionCurve, MotionDocument, MotionMeta,
    PhysicsDocument, PhysicsOutput, PhysicsParticle, PhysicsSetting,
};
