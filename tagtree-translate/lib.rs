pub mod client;
pub mod error;
pub mod retry;

pub use client::DeeplProxyClient;
pub use error::TranslationError;
pub use retry::{
  RetryPolicy,
  with_retry,
};
