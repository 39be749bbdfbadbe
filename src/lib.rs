pub mod client;
pub mod collection;
pub mod config;
pub mod normalize;
pub mod services;
pub mod session;

pub use client::{ApiClient, ApiError};
pub use collection::{
    CollectionController, CollectionSnapshot, FetchPhase, FilterSet, MergeMode, PageCursor,
    PageResult, PagedSource, ScrollMetrics,
};
pub use config::ClientConfig;
pub use session::{AdminProfile, SessionEvent, SessionStore};
