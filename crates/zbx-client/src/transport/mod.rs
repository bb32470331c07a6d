//! Wire transports

mod http;

pub use http::HttpTransport;
