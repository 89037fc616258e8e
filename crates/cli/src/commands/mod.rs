pub mod args;
pub mod process;

pub use args::*;
pub use process::*;
