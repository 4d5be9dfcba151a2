pub mod config;
pub mod error;
pub mod frame;
pub mod physics;

pub use config::PhysicsConfig;
pub use error::{ConfigError, PhysicsError};
pub use frame::{Boundary, Frame};
pub use physics::{ParamSet, ParamValue, PhysicsEngine, StateCache};
