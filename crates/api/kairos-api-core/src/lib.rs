//! kairos-api-core: value tuples shared by the animation core (engine-agnostic)

pub mod blend;
pub mod coercion;
pub mod value;

pub use blend::{lerp_value, slerp_quat};
pub use value::{Value, ValueError, ValueKind};
