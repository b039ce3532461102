
mod api;
mod config;
