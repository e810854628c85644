
pub mod config;
pub mod error;
pub mod inspector;
pub mod load;
pub mod memory;
pub mod postprocess;
pub mod region;
pub mod report;
pub mod stats;
pub mod synth;
pub mod trace;
pub mod tracker;

pub use config::*;
pub use error::*;
pub use inspector::*;
pub use load::*;
pub use memory::*;
pub use region::*;
pub use report::*;
pub use stats::*;
pub use trace::*;
pub use tracker::*;
