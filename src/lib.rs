//! Discrete Hidden Markov Models
//!
//! This crate provides a small engine for hidden Markov models with a finite
//! set of hidden states and a finite observation alphabet.
//!
//! ## Core operations
//! 1. Build a validated [`HmmModel`] from initial, transition and emission
//!    probabilities.
//! 2. Score a sequence with [`HmmModel::log_likelihood`] (forward algorithm).
//! 3. Decode the most likely state path with [`HmmModel::predict`] (Viterbi).
//! 4. Re-estimate the parameters with [`HmmModel::train`] (Baum-Welch).
//!
//! Transitions are column-stochastic: `transition[to][from]` is the
//! probability of moving to state `to` from state `from`.
//!
//! All recurrences run in log-space, so sequences of any length are scored
//! without underflow.
//!
//! ## Quick start
//! ```
//! use hmm_engine::{HmmModel, TrainConfig};
//!
//! let mut model = HmmModel::from_rows(
//!     vec![0.5, 0.5],
//!     vec![vec![0.8, 0.3], vec![0.2, 0.7]],
//!     vec![vec![0.9, 0.1], vec![0.2, 0.8]],
//! )
//! .unwrap();
//!
//! let obs = [0, 0, 1, 0, 1, 1];
//! assert_eq!(model.predict(&obs).unwrap(), vec![0, 0, 1, 1, 1, 1]);
//!
//! let before = model.log_likelihood(&obs).unwrap();
//! model.train(&[obs], &TrainConfig::default()).unwrap();
//! assert!(model.log_likelihood(&obs).unwrap() >= before);
//! ```
//!
//! ## Features
//! - `tracing` (default): spans and events around construction and training.
//! - `parallel`: run the Baum-Welch E-step across sequences on rayon.

pub mod algorithms;
pub mod builder;
pub mod config;
pub mod distribution;
pub mod error;
pub mod model;
pub mod sampling;
pub mod utils;

pub use crate::algorithms::baum_welch::TrainReport;
pub use crate::builder::TrainConfigBuilder;
pub use crate::config::TrainConfig;
pub use crate::distribution::DiscreteDistribution;
pub use crate::error::{HmmError, Result};
pub use crate::model::HmmModel;
