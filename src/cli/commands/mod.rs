//! CLI command implementations

pub mod utils;

pub mod backward;
pub mod completions;
pub mod iso;
pub mod pattern;
pub mod reference;
pub mod size;
pub mod stratify;
