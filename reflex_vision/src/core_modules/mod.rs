pub mod color;
pub mod locator;
pub mod maintenance;
pub mod proximity;
pub mod region;
pub mod trigger;
