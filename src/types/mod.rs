// Shared type definitions
// Each submodule defines plain data types used across the shell.

pub mod errors;
pub mod navigation;
pub mod session;
pub mod settings;
pub mod tab;
pub mod video;
