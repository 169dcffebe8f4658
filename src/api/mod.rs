pub mod api_handlers;
pub mod api_objects;
pub mod views;
