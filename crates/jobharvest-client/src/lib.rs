pub mod jobspy;

pub use jobspy::{JobSpyApiFactory, JobSpyApiSource};
