pub mod analysis;
pub mod clone;
pub mod github;
