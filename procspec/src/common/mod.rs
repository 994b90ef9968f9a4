pub mod config;
pub mod validation;
pub mod xdg;
