pub mod common_nav;
pub mod components;
pub mod error_panel;
pub mod help;
pub mod layout;
pub mod style;
