//! Review ingestion reconciler and auto-reply engine.
//!
//! This crate is the core of Otvet's polling pipeline. A scheduled sweep
//! pulls each account's unanswered marketplace reviews, persists the
//! genuinely new ones, notifies the owner, and lets the auto-reply engine
//! answer qualifying reviews.
//!
//! # Architecture
//!
//! ```text
//! Timer (poller binary)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     RECONCILIATION SWEEP                    │
//! │                                                             │
//! │  per account with a credential:                             │
//! │  1. Fetch unanswered feedbacks (degrade-to-empty)           │
//! │         ↓                                                   │
//! │  2. Normalize payloads, drop content-less noise             │
//! │         ↓                                                   │
//! │  3. Insert unseen reviews, one commit per account           │
//! │         ↓                                                   │
//! │  4. Notify the owner about the delta                        │
//! │         ↓                                                   │
//! │  5. Auto-reply to qualifying reviews; mark answered         │
//! │     locally only after the remote confirmed the send        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures are contained at the smallest scope: a bad review is skipped,
//! a broken account is logged and passed over, and the sweep itself never
//! returns an error to its scheduler.
//!
//! The conversational front-end consumes the [`surface`] operations
//! (paginated unanswered listing, manual replies) and supplies a
//! [`Notifier`] implementation for its chat transport.

pub mod api;
pub mod autoreply;
pub mod backfill;
pub mod error;
pub mod ingest;
pub mod normalize;
pub mod notify;
pub mod surface;
pub mod sweep;

pub use api::{ApiConnector, ReviewApi, WbConnector};
pub use autoreply::{compose_reply, qualifies, run_auto_reply};
pub use backfill::run_backfill;
pub use error::{NotifyError, ReconcilerError};
pub use ingest::ingest_account;
pub use normalize::{has_content, normalize, NormalizedReview, NOT_SPECIFIED};
pub use notify::{new_reviews_message, LoggingNotifier, NoOpNotifier, Notifier};
pub use surface::{get_review, list_unanswered, send_reply, ReviewPage, REVIEWS_PER_PAGE};
pub use sweep::{run_sweep, SweepReport};

// Re-export commonly used types from dependencies
pub use database::{Database, DatabaseError};
pub use wb_api::{RawReview, WbClient, WbConfig, WbError};
