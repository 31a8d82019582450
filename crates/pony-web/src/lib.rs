//! Pony Web - HTTP surface for the ponies screen
//!
//! Serves the screen as server-rendered HTML driven by a single browser
//! session, plus a small JSON API over the record service.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod render;
pub mod server;
pub mod session;

pub use error::{handle_rejection, WebError};
pub use render::{PoniesView, PonyRow, Renderer};
pub use server::{app, routes, serve, AppState};
pub use session::Session;
