pub mod bundle;
pub mod clean;
pub mod doctor;
pub mod setup;
