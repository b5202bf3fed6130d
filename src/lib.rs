pub mod draw;
pub mod gui;
pub mod logging;
