// storefront_client/src/feed/mod.rs

//! Live order updates over server-sent events.

pub mod connector;
pub mod live;
pub mod sse;

pub use connector::{ByteStream, EventStreamConnector, ReqwestEventStream};
pub use live::{FeedConfig, FeedStatus, LiveOrderFeed, OrderEventKind, MANUAL_REFRESH_NOTICE};
pub use sse::{SseEvent, SseParser};
