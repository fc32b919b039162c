// Library crate for resx-translator
// Exposes modules for integration testing

pub mod azure;
pub mod config;
pub mod languages;
pub mod pipeline;
pub mod resx;
pub mod retry;
pub mod rewriter;
pub mod scaffold;
pub mod scanner;
pub mod translation;
