//! Wildberries feedbacks API client library.
//!
//! This crate provides a Rust client for the marketplace's feedbacks HTTP
//! API, bound to one account credential. It supports:
//!
//! - Listing feedbacks with the tri-state answered filter
//! - Submitting replies to feedbacks
//! - Tolerant photo-link extraction across the API's payload shapes
//! - Retry with exponential backoff, Retry-After handling, and
//!   no-retry-on-auth-failure semantics
//!
//! # Example
//!
//! ```no_run
//! use wb_api::{WbClient, WbConfig};
//!
//! # async fn example() -> Result<(), wb_api::WbError> {
//! let client = WbClient::new("account-api-key", WbConfig::default())?;
//!
//! // Poll: degrades to an empty list on any failure
//! for raw in client.fetch_unanswered().await {
//!     println!("feedback: {}", raw["id"]);
//! }
//!
//! // Reply: true only on confirmed remote success
//! let sent = client.send_reply("fb-1", "Спасибо за отзыв!").await;
//! println!("sent: {sent}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod photos;
pub mod types;

pub use client::{FeedbacksQuery, WbClient, DEFAULT_PAGE_SIZE};
pub use config::{RetryConfig, WbConfig, DEFAULT_BASE_URL};
pub use error::WbError;
pub use photos::extract_photo_links;
pub use types::{id_as_string, RawReview, SortOrder};
