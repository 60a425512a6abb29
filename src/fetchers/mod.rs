mod request;

pub use self::request::{RequestFetcher, DEFAULT_USER_AGENT};
