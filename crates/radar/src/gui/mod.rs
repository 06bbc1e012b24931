pub mod app;
pub mod driver;
pub mod radar;
pub mod surface;
pub mod theme;
