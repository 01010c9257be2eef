//! Kairos Animation Core (engine-agnostic)
//!
//! Curves map a time to a typed value. Binders attach a curve to a setter
//! through an [`Updater`], which re-samples a binder only when its curve can
//! have changed between two updates. Each curve reports the regions where its
//! output is constant ([`Invariance`]); the updater indexes the complement of
//! those regions so that stepping time touches only curves that left a
//! constant region.

pub mod binder;
pub mod binding_block;
pub mod config;
pub mod curve;
pub mod error;
pub mod ids;
pub mod interval;
pub mod invariance;
pub mod time;
pub mod types;
pub mod updater;

// Re-exports for consumers (adapters)
pub use binder::Binder;
pub use binding_block::{BindingBlock, EasyBindingBlock, Parameter, TypeResolver};
pub use config::Config;
pub use curve::{
    search_key_frame, CompositeVectorCurve, ConstantCurve, Curve, CurveKind, KeyFrame,
    LinearCurve, SlerpCurve, StepCurve, ValueChangeListener,
};
pub use error::{AnimationError, Result};
pub use ids::{BinderId, CurveId, ListenerId};
pub use interval::Interval;
pub use invariance::Invariance;
pub use kairos_api_core::{Value, ValueKind};
pub use time::Time;
pub use types::{Type, TypeKind};
pub use updater::{Setter, Updater, VaryCurves};
