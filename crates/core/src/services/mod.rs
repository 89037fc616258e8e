pub mod archive;
pub mod backends;
pub mod copier;
pub mod fs;
pub mod pipeline;
