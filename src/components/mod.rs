pub mod app;
pub mod intro_view;
pub mod main_view;
