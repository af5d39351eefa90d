//! Synthetic series generation for demos and tests.

mod sample;

pub use sample::{generate_sample, SyntheticData};
