//! WebDriver runtime - transport, command routing, and driver services
//!
//! This crate provides the layers beneath the high-level `wd` API:
//!
//! - **Transport**: HTTP exchange with retries, redirects, and proxies
//! - **Routing**: mapping named commands to W3C endpoints
//! - **Execution**: sending commands and classifying W3C and legacy responses
//! - **Services**: launching local driver executables
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │      wd      │  WebDriver, WebElement, waits
//! └──────┬───────┘
//!        │ CommandExecutor
//! ┌──────▼───────┐
//! │  wd-runtime  │  This crate
//! │  ┌────────┐  │
//! │  │ Exec   │  │  Response classification
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │ Router │  │  Command -> Request
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │ HTTP   │  │  Retries and redirects
//! │  └────────┘  │
//! └──────────────┘
//! ```

pub mod atoms;
pub mod command;
pub mod error;
pub mod executor;
pub mod http;
pub mod router;
pub mod service;
pub mod session;

pub use command::{Command, CommandName};
pub use error::{Error, ErrorKind, Result, WebDriverError};
pub use executor::{CommandExecutor, CommandResponse, ExecuteFuture, HttpExecutor};
pub use http::{HttpClient, HttpClientOptions, Method, Request, Response};
pub use router::Route;
pub use service::{DriverService, ServiceAddress, ServiceBuilder, ServiceOptions};
pub use session::Session;
