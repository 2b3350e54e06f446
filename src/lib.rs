pub mod catalog;
pub mod composer;
pub mod config;
pub mod gateway;
pub mod llm;
pub mod server;
pub mod story;
