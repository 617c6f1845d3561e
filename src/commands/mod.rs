pub mod countries;
pub mod submit;
