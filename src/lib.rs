//! # Novelly
//!
//! Client core of the Novelly novel-reading application, shared by the
//! browser UI (`novelly-ui`), the terminal client and the SPA host.
//!
//! ## Modules
//!
//! - [`store`]: Persisted application state with subscriber notification
//! - [`router`]: Hash router with authentication and role guards
//! - [`client`]: REST client over a pluggable HTTP transport
//! - [`session`]: Login, registration and token verification
//! - [`reader`], [`catalog`], [`validation`]: Page logic independent of any UI
//! - [`server`]: SPA host with `/api` forwarding (native only)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use novelly::client::{ApiClient, ReqwestTransport};
//! use novelly::session::Session;
//! use novelly::store::{FileStorage, Store};
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::new(Rc::new(FileStorage::new(FileStorage::default_path())));
//!     let transport = Rc::new(ReqwestTransport::new(Duration::from_secs(30))?);
//!     let api = ApiClient::new("http://localhost:8080/api", transport, Rc::new(store.clone()));
//!     let session = Session::new(store, api.clone());
//!
//!     session.login("reader@example.com", "secret").await?;
//!     for novel in api.novels().list().await? {
//!         println!("{} by {}", novel.title, novel.author_or_unknown());
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod client;
pub mod models;
pub mod reader;
pub mod router;
pub mod session;
pub mod store;
pub mod validation;

#[cfg(feature = "native")]
pub mod config;
#[cfg(feature = "native")]
pub mod logging;
#[cfg(feature = "native")]
pub mod server;

pub use client::{ApiClient, ApiError, ApiResult};
pub use models::{Chapter, Novel, Role, User};
pub use router::{resolve, AuthContext, Page, Resolution};
pub use session::{Session, SessionError};
pub use store::{AppState, MemoryStorage, Storage, Store};
