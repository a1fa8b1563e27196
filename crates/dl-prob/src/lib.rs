//! Probability building blocks for DiDLab.
//!
//! - normal and Student-t tail probabilities / quantiles for regression inference
//! - seeded normal draws for the panel simulator

pub mod normal;
pub mod student_t;
