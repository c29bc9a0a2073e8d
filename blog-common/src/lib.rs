pub mod posts;
#[cfg(feature = "http")]
pub mod request;
