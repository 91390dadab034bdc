pub mod gemini;
pub mod logs;

pub use logs::*;
