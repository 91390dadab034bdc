pub mod credentials;
pub mod error;
pub mod evidence;
pub mod export;
pub mod grading;
pub mod pipeline;
pub mod roster;
pub mod settings;
pub mod utils;
