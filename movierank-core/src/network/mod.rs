//! TCP plumbing between the generator and the aggregation engine.
//!
//! The wire format is newline-delimited JSON, one [`RatingEvent`] per line.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, Split,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::SourceConfig;
use crate::types::RatingEvent;

mod codec;
mod server;
mod source;

pub use codec::*;
pub use server::*;
pub use source::*;

/// True once `shutdown` has been set or its sender dropped.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) -> bool {
    match shutdown.changed().await {
        Ok(()) => *shutdown.borrow(),
        Err(_) => true,
    }
}
