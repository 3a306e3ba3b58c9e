//! DactyloAI Core - inference & analytics engines
//!
//! ```text
//!  image bytes ──▶ imaging::normalize ──▶ ImageTensor
//!                                            │
//!                     ┌──────────────────────┼──────────────────────┐
//!                     ▼                      ▼                      ▼
//!              ModelAdapter (effnet)  ModelAdapter (inception)  ModelAdapter (blood)
//!                     └──────────┬───────────┘                      │
//!                                ▼                                  ▼
//!                        ensemble::fuse                      ensemble::fuse
//!
//!  dataset.csv ──▶ dataset::ReferenceData ──▶ analytics::analyze ──▶ report::assemble
//! ```
//!
//! The HTTP surface lives in the `dactylo-api` crate; everything here is
//! synchronous and safe to call from blocking worker threads.

pub mod constants;
pub mod logic;

pub use logic::cancel::{CancelToken, Cancelled};
