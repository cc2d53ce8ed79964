// HTTP Server modules
pub mod auth;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sse;
pub mod state;

// Startup
pub mod config;
pub mod logging;

// Knowledge base and conversation storage
pub mod csv_import;
pub mod store;

// LLM abstraction layer and chat relay
pub mod llm;
pub mod relay;
