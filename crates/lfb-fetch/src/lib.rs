mod config;
pub use config::FetcherConfig;

mod http;
pub use http::HttpFetcher;
