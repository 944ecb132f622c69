pub mod backend;
pub mod decode;
pub mod driver;
pub mod engine;
pub mod stats;
