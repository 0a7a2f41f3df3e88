//! Client-side data-access core for the Reef network SDK.
//!
//! This crate turns the network's paginated query API and its persistent
//! push-notification socket into two safe abstractions:
//!
//! *   [`streamer::PaginationStreamer`]: a lazy, cancellable stream over an
//!     arbitrarily large paged result set, driven by an externally supplied
//!     [`streamer::Searcher`].
//! *   [`listener::Listener`]: a multiplexed real-time event subscription
//!     service keyed by account and channel, over any
//!     [`transport::MessageTransport`].
//!
//! The deterministic identifier derivation both of them reference lives in
//! [`ids`]. Transports, DTO mapping and transaction serialization are
//! external collaborators and stay outside this crate.

/// Configuration structures for the SDK core.
pub mod config;
/// Filter/ordering/pagination criteria for paged searches.
pub mod criteria;
/// The error taxonomy of the core.
pub mod error;
/// Wire frames of the notification socket and the typed events derived
/// from them.
pub mod events;
/// Deterministic 64-bit mosaic/namespace identifier derivation.
pub mod ids;
/// The real-time listener and its subscription registry.
pub mod listener;
/// Shared value objects (addresses, keys, transaction kinds).
pub mod model;
/// One page of a paged collection, plus legacy query params.
pub mod page;
/// The page-flattening streamer over a `Searcher`.
pub mod streamer;
/// The raw message-socket abstraction and its WebSocket implementation.
pub mod transport;
