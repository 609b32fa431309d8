use super::*;

/// Engine-side TCP client: reads stream lines and forwards them to the
/// engine worker, reconnecting whenever the stream drops.
pub struct StreamSource {
    addr: String,
    reconnect_delay: Duration,
}

enum PumpEnd {
    Disconnected,
    EngineGone,
    Shutdown,
}

impl StreamSource {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            addr: config.addr(),
            reconnect_delay: config.reconnect_delay,
        }
    }

    /// Forward lines into `lines` until shutdown or until the engine stops
    /// receiving.
    pub async fn run(self, lines: mpsc::Sender<Vec<u8>>, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        loop {
            let connected = tokio::select! {
                connected = TcpStream::connect(&self.addr) => connected,
                stop = shutdown_requested(&mut shutdown) => {
                    if stop {
                        return Ok(());
                    }
                    continue;
                }
            };

            match connected {
                Ok(stream) => {
                    info!("connected to stream at {}", self.addr);
                    match pump(stream, &lines, &mut shutdown).await {
                        PumpEnd::Shutdown | PumpEnd::EngineGone => return Ok(()),
                        PumpEnd::Disconnected => {
                            warn!(
                                "stream at {} closed, reconnecting in {:?}",
                                self.addr, self.reconnect_delay
                            );
                        }
                    }
                }
                Err(err) => {
                    warn!(
                        "connect to {} failed: {err}; retrying in {:?}",
                        self.addr, self.reconnect_delay
                    );
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.reconnect_delay) => {}
                stop = shutdown_requested(&mut shutdown) => {
                    if stop {
                        return Ok(());
                    }
                }
            }
        }
    }
}

async fn pump(
    stream: TcpStream,
    lines: &mpsc::Sender<Vec<u8>>,
    shutdown: &mut watch::Receiver<bool>,
) -> PumpEnd {
    let mut reader = LineReader::new(BufReader::new(stream));
    loop {
        tokio::select! {
            biased;
            stop = shutdown_requested(shutdown) => {
                if stop {
                    return PumpEnd::Shutdown;
                }
            }
            line = reader.next_line() => match line {
                Ok(Some(line)) => {
                    if lines.send(line).await.is_err() {
                        return PumpEnd::EngineGone;
                    }
                }
                Ok(None) => return PumpEnd::Disconnected,
                Err(err) => {
                    debug!("stream read failed: {err}");
                    return PumpEnd::Disconnected;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
