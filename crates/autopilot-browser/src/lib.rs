//! CDP transport for driving IDE workbench pages.
//!
//! The IDE embeds a Chromium engine; when launched with
//! `--remote-debugging-port` it exposes a CDP endpoint. This crate finds
//! those endpoints, attaches to workbench pages over one multiplexed
//! WebSocket, and implements the agent's DOM and overlay traits on top of an
//! injected page helper.

pub mod client;
pub mod discovery;
pub mod error;
pub mod helper;
pub mod page_dom;
pub mod protocol;
pub mod session;

pub use client::CdpClient;
pub use discovery::{discover, DebugEndpoint, PORT_RANGE};
pub use error::CdpError;
pub use page_dom::CdpDom;
pub use protocol::{BrowserVersion, PageInfo};
pub use session::PageSession;
