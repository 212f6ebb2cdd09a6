//! Core domain logic for logwork.
//!
//! This crate contains the pure, I/O-free logic for:
//! - Allocation: spreading a week's remaining capacity across open tasks
//! - Estimate inference: copying the estimate of the most similar known task
//! - Similarity: title (Jaro-Winkler) and context (project/parent/labels) scores
//!
//! Talking to the tracker is left to implementations of [`Tracker`].

mod allocation;
pub mod estimate;
pub mod similarity;
mod task;
pub mod tracker;
pub mod week;

pub use allocation::{
    AllocationAction, AllocationConfig, AllocationPlan, SHIFT_CAPACITY_MINUTES, allocate,
};
pub use estimate::{EstimateConfig, EstimateEngine, EstimateMatch, Inference, extract_keywords};
pub use similarity::{ContextWeights, context_score, string_similarity};
pub use task::{DayCapacity, Task, TaskId, TaskStatus, ValidationError};
pub use tracker::{EstimateCommit, PauseOutcome, Tracker};
