//! Seeded random number generation.
//!
//! Every consumer of randomness names its generator family with
//! [`define_rng!`]. A [`SeedSource`] then hands out one independent generator
//! per (family, stream) pair, where the stream is typically a person id. Because
//! each stream's seed depends only on the base seed, the family name and the
//! stream number, results do not depend on the order in which streams are
//! consumed or on how work is split across threads.
mod macros;
mod sampling_algorithms;
mod streams;

pub use macros::define_rng;
pub use sampling_algorithms::sample_categorical;
pub use streams::SeedSource;

use crate::rand::SeedableRng;

pub trait RngId: Copy + Clone {
    type RngType: SeedableRng;
    fn get_name() -> &'static str;
}
