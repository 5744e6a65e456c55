//! Cached proxy to the external news provider.

mod cache;
mod client;
mod error;
mod refresher;
mod service;

pub use cache::{NewsCache, NewsCacheEntry};
pub use client::{NewsClient, NewsQuery, SortBy};
pub use error::NewsError;
pub use refresher::{refresh_all, spawn_refresher, RefresherHandle};
pub use service::{preference_query, NewsService};
