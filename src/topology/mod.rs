pub mod controller;
pub mod scene;
pub mod session;
pub mod viewport;
