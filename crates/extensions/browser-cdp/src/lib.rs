//! Chrome DevTools Protocol frame channel for SmartFill.
//!
//! Connects to Chrome/Chromium started with remote debugging, attaches to
//! one tab and exposes its frames as a [`FrameChannel`](smartfill_protocols::FrameChannel).
//!
//! ## Usage
//!
//! 1. Start Chrome with remote debugging:
//!    ```bash
//!    chrome --remote-debugging-port=9222
//!    ```
//!
//! 2. Attach and fill:
//!    ```rust,ignore
//!    let page = CdpPage::connect("http://localhost:9222", None, FrameAgent::default()).await?;
//!    let outcome = autofill.prepare(Arc::new(page)).await?;
//!    ```
//!
//! Each request captures the frame's document in an isolated world, runs the
//! frame agent against the capture, then replays the resulting mutation
//! journal on the live elements.

mod client;
mod error;
mod page;
mod protocol;
mod scripts;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use page::CdpPage;
pub use protocol::*;
pub use session::PageSession;
