//! Inference and learning algorithms over an [`HmmModel`](crate::HmmModel).
//!
//! All three share one underflow strategy: every recurrence runs on natural
//! logs of the parameters, sums become log-sum-exp and products become
//! additions. Results are therefore directly comparable across modules.
//!
//! - [`forward`]    : forward/backward passes, log-likelihood, posteriors.
//! - [`viterbi`]    : most likely state path.
//! - [`baum_welch`] : EM re-estimation from observed sequences.

pub mod baum_welch;
pub mod forward;
pub mod viterbi;
