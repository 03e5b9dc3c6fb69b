//! Tabular temporal difference learning
//!
//! Agents keep a value estimate for every board they have reached and learn
//! from finished games by walking their trajectory backwards:
//!
//! ```text
//! V(s_t) ← V(s_t) + α (r_t − V(s_t)),    r_{t-1} = γ r_t
//! ```
//!
//! where `r` starts as the terminal reward of the most recent state.
//! α and γ are fixed for every update.

use rand::{SeedableRng, rngs::StdRng};

pub mod agent;
pub mod value_table;

pub use agent::Agent;
pub use value_table::ValueTable;

/// Step size α of the value update
pub const LEARNING_RATE: f64 = 0.1;

/// Discount γ applied to the reward for each step back through the trajectory
pub const DISCOUNT_FACTOR: f64 = 0.9;

/// Exploration rate of a freshly created self-play agent
pub const INITIAL_EPSILON: f64 = 1.0;

/// Exploration rate of a promoted (trained) agent
pub const TRAINED_EPSILON: f64 = 0.1;

/// Seeded generator when `seed` is given, otherwise one seeded from the
/// thread-local generator.
pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}
