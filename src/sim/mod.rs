//! Deterministic tunnel generation
//!
//! Everything that decides what the tube looks like lives here:
//! - Fixed ring pool, recycled as the traveler moves
//! - Seeded RNG only; one stream per generator
//! - Stable iteration order (by ring handle)
//! - No rendering or platform dependencies

pub mod arc;
pub mod catalog;
pub mod collision;
pub mod color;
pub mod difficulty;
pub mod generator;
pub mod obstacle;
pub mod pattern;
pub mod pickup;
pub mod pool;
pub mod rng;
pub mod sdf;
pub mod state;

pub use arc::ArcSegment;
pub use catalog::{
    ArchetypeDescriptor, Catalog, PowerupKind, PowerupTable, PowerupWeight, RotationEntry,
    resolve_rotation,
};
pub use collision::{ClearanceResult, Footprint, Shape, probe_clearance};
pub use color::{ColorUpdater, Gradient, GradientStop, LinearGradient, RingPalette, TintBlock};
pub use difficulty::{Difficulty, DifficultyClock};
pub use generator::{DebugSnapshot, GeneratorStatus, TunnelGenerator};
pub use obstacle::{ContentLibrary, ObstacleBehavior, ObstacleContent, ObstacleKind, ObstacleTemplate};
pub use pattern::{PatternSelector, RunState};
pub use pickup::{PickupChainState, PickupEngine};
pub use pool::{Recycled, RingPool};
pub use rng::RandomSource;
pub use state::{Pickup, PickupKind, Ring, RingHandle, SurfacePart, Traveler, TunnelEvent};
