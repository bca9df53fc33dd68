pub mod fs_ops;
pub mod layout;
pub mod settings;
