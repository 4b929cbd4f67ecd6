pub mod demo;
pub mod error;
pub mod membership;
pub mod model;
pub mod store;
