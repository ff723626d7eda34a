//! UI layer for the desktop front end.

pub mod app;

pub use app::ArtifyApp;
