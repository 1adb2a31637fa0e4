//! Credential resolution and authenticated API plumbing for Depot build clients.
//!
//! The crate covers four independent pieces:
//!
//! - [`auth`] resolves a bearer [`Credential`](auth::Credential) from an explicit value, the
//!   environment, the persisted user config, and finally the CI identity providers in
//!   [`provider`].
//! - [`api`] turns a method, URL, token, and payload into an authenticated JSON call and
//!   unwraps the server's `{ok, error}` envelope.
//! - [`interceptor`] stamps the client identifier on every outbound unary or streamed call.
//! - [`project`] walks the filesystem upward to discover which Depot project a build targets.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod env;
pub mod error;
pub mod interceptor;
pub mod obs;
pub mod project;
pub mod provider;
pub mod transport;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::{Path, PathBuf},
		pin::Pin,
		sync::{Arc, LazyLock},
	};

	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Method};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tempfile as _, tokio as _};
