pub mod app;
pub mod book;
pub mod state;
pub mod ui;
