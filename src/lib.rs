pub mod application;
pub mod packets;
pub mod report;
pub mod types;
