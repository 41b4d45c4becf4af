//! Synthetic per-person epidemic state timelines.
//!
//! A run turns a table of country demographics into a downsampled synthetic
//! population, gives every individual one row per calendar day, and walks each
//! individual through a discrete-state Markov chain with explicit holding
//! times:
//! * [`population`] builds individuals from the countries table, one group per
//!   (country, age group).
//! * [`timeline`] expands the population over an inclusive date range.
//! * [`simulator`] samples each person's next state whenever their holding
//!   time runs out, on a random stream of their own so results do not depend
//!   on thread scheduling.
//! * [`summary`] counts individuals per (date, country, state).
//!
//! The transition model ([`model::TransitionModel`]) maps each age group and
//! state to a categorical distribution over next states and each age group and
//! state to a holding time in days. [`runner`] wires the stages to a command
//! line and [`report`] writes the timeline and summary as CSV files.
pub mod demographics;
pub mod error;
pub mod hashing;
pub mod log;
pub mod model;
pub mod parameters;
pub mod population;
pub mod random;
pub mod report;
pub mod runner;
pub mod simulator;
pub mod summary;
pub mod timeline;

pub use crate::demographics::{CountryRecord, DemographicTable};
pub use crate::error::TimelineError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::model::{AgeGroup, State, TransitionDistribution, TransitionModel};
pub use crate::parameters::{Parameters, ParametersFile};
pub use crate::population::{synthesize_population, Individual, PersonId};
pub use crate::random::{RngId, SeedSource};
pub use crate::report::{Report, ReportOptions};
pub use crate::runner::{run_simulation, run_with_args, BaseArgs, SimulationOutput};
pub use crate::simulator::StateSimulator;
pub use crate::summary::{Summary, SummaryRow};
pub use crate::timeline::{initialize_timeline, DateRange, Timeline, TimelineRow};

// Re-exports for use by `define_rng!`.
pub use paste;
pub use rand;
