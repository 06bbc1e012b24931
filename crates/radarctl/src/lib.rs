pub mod geometry;
pub mod ipc;
pub mod macros;
pub mod sweep;
pub mod target;
