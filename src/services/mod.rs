pub mod gpu;
pub mod process;
pub mod project;
pub mod python;
