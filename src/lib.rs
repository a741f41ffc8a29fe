pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod documents;
pub mod errors;
pub mod financial;
pub mod git;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod reporting;
pub mod scanner;
pub mod utils;
