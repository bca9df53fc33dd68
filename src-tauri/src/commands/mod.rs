pub mod import;
pub mod windows;
pub mod workspace;
