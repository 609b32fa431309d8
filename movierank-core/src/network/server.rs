use super::*;

/// Serves the generated stream to one consumer at a time.
///
/// Only one client is ever attached: the accept loop does not accept the
/// next connection until the current one has gone away. A client sees only
/// events generated after it was accepted; there is no replay. Broadcasting
/// to several clients would mean one writer task per connection instead of
/// this serial loop.
///
/// The server holds only a weak handle on the event channel. Once the
/// generator drops its sender the current session ends and the server stops.
pub struct StreamServer {
    listener: TcpListener,
    events: broadcast::WeakSender<RatingEvent>,
}

/// Why a client session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// A write to the client failed or its socket reported an error.
    Disconnected,
    /// The generator stopped.
    SourceClosed,
    /// Shutdown was requested.
    Shutdown,
}

impl StreamServer {
    /// Bind the listening socket. Failure here is fatal to the producer.
    pub async fn bind(addr: &str, events: &broadcast::Sender<RatingEvent>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("bind stream server on {addr}"))?;
        Ok(Self {
            listener,
            events: events.downgrade(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept and serve consumers one after another until shutdown.
    pub async fn serve(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!("stream server listening on {}", self.local_addr()?);
        loop {
            let (stream, peer) = tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        warn!("accept failed: {err}");
                        continue;
                    }
                },
                stop = shutdown_requested(&mut shutdown) => {
                    if stop {
                        break;
                    }
                    continue;
                }
            };

            let Some(sender) = self.events.upgrade() else {
                warn!("generator stopped, refusing consumer {peer}");
                break;
            };
            let events = sender.subscribe();
            drop(sender);

            info!("consumer connected from {peer}");
            let (end, sent) = serve_client(stream, events, &mut shutdown).await;
            info!("consumer {peer} finished after {sent} events: {end:?}");
            if matches!(end, SessionEnd::Shutdown | SessionEnd::SourceClosed) {
                break;
            }
        }
        info!("stream server stopped");
        Ok(())
    }
}

/// Forward events to one client until it goes away. Returns how the session
/// ended and how many events were written.
async fn serve_client(
    stream: TcpStream,
    mut events: broadcast::Receiver<RatingEvent>,
    shutdown: &mut watch::Receiver<bool>,
) -> (SessionEnd, u64) {
    let (mut read_half, mut write_half) = stream.into_split();
    let mut scratch = [0u8; 512];
    let mut sent = 0u64;
    let mut read_open = true;

    loop {
        tokio::select! {
            biased;
            stop = shutdown_requested(shutdown) => {
                if stop {
                    return (SessionEnd::Shutdown, sent);
                }
            }
            // Consumers never send anything. EOF only closes their send side;
            // the session lasts until a write fails.
            read = read_half.read(&mut scratch), if read_open => match read {
                Ok(0) => {
                    debug!("consumer half-closed its connection");
                    read_open = false;
                }
                Ok(_) => {}
                Err(err) => {
                    debug!("read from consumer failed: {err}");
                    return (SessionEnd::Disconnected, sent);
                }
            },
            received = events.recv() => match received {
                Ok(event) => {
                    if let Err(err) = write_event(&mut write_half, &event).await {
                        debug!("write to consumer failed: {err}");
                        return (SessionEnd::Disconnected, sent);
                    }
                    sent += 1;
                    debug!(
                        user_id = event.user_id,
                        movie_id = event.movie_id,
                        rating = event.rating,
                        "sent rating"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("consumer too slow, skipped {skipped} events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return (SessionEnd::SourceClosed, sent);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/server_tests.rs"]
mod tests;
