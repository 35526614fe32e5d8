//! gpsd-backed position source

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use waymark_api::PositionSample;
use waymark_source::{PositionSource, SourceError, SourceResult, SubscribeOptions};

use crate::geo::haversine_meters;
use crate::protocol::{WATCH_ENABLE, parse_tpv_line};

/// Position source reading TPV reports from a gpsd instance.
///
/// Each subscription opens its own connection and WATCH; unsubscribing tears
/// the connection down by aborting the reader task.
pub struct GpsdSource {
    addr: String,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl GpsdSource {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            addr: format!("{host}:{port}"),
            reader: Mutex::new(None),
        }
    }
}

#[async_trait]
impl PositionSource for GpsdSource {
    async fn subscribe(
        &self,
        options: SubscribeOptions,
    ) -> SourceResult<mpsc::UnboundedReceiver<PositionSample>> {
        let stream = TcpStream::connect(&self.addr).await.map_err(|e| {
            SourceError::Connection(format!("gpsd at {}: {e}", self.addr))
        })?;
        let (read_half, mut write_half) = stream.into_split();
        write_half.write_all(WATCH_ENABLE.as_bytes()).await?;

        info!(addr = %self.addr, "watching gpsd");

        let (tx, rx) = mpsc::unbounded_channel();
        let addr = self.addr.clone();
        let handle = tokio::spawn(async move {
            let mut lines = BufReader::new(read_half).lines();
            let mut gate = DeliveryGate::new(options);
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if let Some(sample) = parse_tpv_line(&line)
                            && gate.accept(&sample)
                            && tx.send(sample).is_err()
                        {
                            // Receiver dropped
                            break;
                        }
                    }
                    Ok(None) => {
                        warn!(addr = %addr, "gpsd closed the connection");
                        break;
                    }
                    Err(e) => {
                        warn!(addr = %addr, error = %e, "gpsd read failed");
                        break;
                    }
                }
            }
            // Keep the write half open for the lifetime of the WATCH
            drop(write_half);
        });

        if let Some(old) = self.reader.lock().unwrap().replace(handle) {
            debug!("replacing a previous gpsd subscription");
            old.abort();
        }
        Ok(rx)
    }

    async fn unsubscribe(&self) -> SourceResult<()> {
        match self.reader.lock().unwrap().take() {
            Some(handle) => {
                // Aborting drops the sender, which closes the channel
                handle.abort();
                info!(addr = %self.addr, "stopped watching gpsd");
                Ok(())
            }
            None => Err(SourceError::NotSubscribed),
        }
    }

    fn is_healthy(&self) -> bool {
        match self.reader.lock() {
            Ok(guard) => guard.as_ref().is_none_or(|h| !h.is_finished()),
            Err(_) => false,
        }
    }
}

/// Applies the subscription's min-time/min-distance filter to a fix stream.
struct DeliveryGate {
    options: SubscribeOptions,
    last: Option<(Instant, f64, f64)>,
}

impl DeliveryGate {
    fn new(options: SubscribeOptions) -> Self {
        Self {
            options,
            last: None,
        }
    }

    fn accept(&mut self, sample: &PositionSample) -> bool {
        self.accept_at(sample, Instant::now())
    }

    fn accept_at(&mut self, sample: &PositionSample, now: Instant) -> bool {
        let pass = match self.last {
            None => true,
            Some((at, lat, lon)) => {
                now.duration_since(at) >= self.options.min_time
                    && haversine_meters(lat, lon, sample.latitude, sample.longitude)
                        >= self.options.min_distance
            }
        };
        if pass {
            self.last = Some((now, sample.latitude, sample.longitude));
        }
        pass
    }
}
