pub mod engine;
pub mod http;
pub mod poller;
