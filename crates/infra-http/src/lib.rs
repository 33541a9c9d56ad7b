// formsync Infrastructure - HTTP Adapter

pub mod transport;

pub use transport::HttpTransport;
