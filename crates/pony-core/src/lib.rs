//! Pony Core - the ponies search/list/delete screen
//!
//! Everything the screen does, independent of how it is rendered:
//! - A record service (search by name, delete by id) over an in-memory store
//! - A router owning the current location and its `query` parameter
//! - A search form that writes the trimmed query into the URL
//! - A result list that follows the query (switch-to-latest searches,
//!   exhaust-drop deletes, refresh after delete)
//! - A page tying form and list to one cancellation scope
//!
//! # Example
//!
//! ```rust,ignore
//! use pony_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let router = Router::at("/ponies?query=b")?;
//! let page = PoniesPage::mount(&router, Arc::new(InMemoryPonyService::new()));
//!
//! let state = page.list().settled().await;
//! println!("{} ponies", state.ponies().len());
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod form;
pub mod item;
pub mod list;
pub mod logging;
pub mod page;
pub mod router;
pub mod scope;
pub mod service;
pub mod types;

// Re-exports for convenience
pub use config::{AppConfig, BackendConfig, LoggingConfig, ServerConfig};
pub use error::{ConfigError, NavigationError, PonyError, ServiceError};
pub use form::SearchForm;
pub use item::{image_url, ItemAction, PonyItem};
pub use list::{DeleteOutcome, DeleteRequest, DeleteTicket, ListState, PonyList, SearchPhase};
pub use page::PoniesPage;
pub use router::{Location, QueryParams, Route, Router, QUERY_PARAM};
pub use scope::TaskScope;
pub use service::{InMemoryPonyService, PonyService, DEFAULT_LATENCY};
pub use types::{default_seed, Pony, PonyColor, PonyId, UnknownColor};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Pony Core
    pub use crate::{
        DeleteOutcome, DeleteRequest, InMemoryPonyService, ItemAction, ListState, Location,
        PoniesPage, Pony, PonyColor, PonyId, PonyList, PonyService, Route, Router, SearchForm,
        SearchPhase, ServiceError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
