pub mod quad;

pub use quad::QuadGame;
