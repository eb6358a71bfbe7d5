pub mod core;
pub mod error;
pub mod game;
pub mod games;
pub mod graphics;
pub mod host;
pub mod platform;
pub mod services;
