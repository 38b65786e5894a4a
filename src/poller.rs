//! Periodic state refresh for a set of lights.

use std::pin::pin;
use std::sync::Arc;

use futures::future::{self, Either};
use log::{debug, info, warn};
use serde::Serialize;

use crate::client::GoveeClient;
use crate::errors::Error;
use crate::light::Light;

type Result<T> = std::result::Result<T, Error>;

/// Outcome of one polling cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollReport {
    pub updated: usize,
    pub failed: usize,
    /// Lights not queried because the quota ran out mid-cycle.
    pub skipped: usize,
}

impl PollReport {
    pub fn total(&self) -> usize {
        self.updated + self.failed + self.skipped
    }
}

/// Refreshes every light on the cadence the quota tracker allows.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use govee_lights_rs::{ClientConfig, GoveeClient, Poller};
///
/// # async fn run() -> Result<(), govee_lights_rs::Error> {
/// let client = Arc::new(GoveeClient::new(ClientConfig::new("my-api-key"))?);
/// let mut poller = Poller::new(client);
/// poller.discover().await?;
/// poller.run_until(async { tokio::signal::ctrl_c().await.ok(); }).await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Poller {
    client: Arc<GoveeClient>,
    lights: Vec<Light>,
}

impl Poller {
    pub fn new(client: Arc<GoveeClient>) -> Self {
        Self::with_lights(client, Vec::new())
    }

    pub fn with_lights(client: Arc<GoveeClient>, lights: Vec<Light>) -> Self {
        Poller { client, lights }
    }

    pub fn client(&self) -> &Arc<GoveeClient> {
        &self.client
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn light(&self, id: &str) -> Option<&Light> {
        self.lights.iter().find(|l| l.id() == id)
    }

    pub fn light_mut(&mut self, id: &str) -> Option<&mut Light> {
        self.lights.iter_mut().find(|l| l.id() == id)
    }

    /// Replace the light set with the devices currently on the account.
    ///
    /// Lights that are still present keep their cached state.
    pub async fn discover(&mut self) -> Result<usize> {
        let devices = self.client.devices().await?;
        let previous = std::mem::take(&mut self.lights);

        self.lights = devices
            .into_iter()
            .map(|device| {
                let cached = previous
                    .iter()
                    .find(|l| l.id() == device.id)
                    .and_then(|l| l.state().cloned());
                let mut light = Light::new(device);
                if let Some(state) = cached {
                    light.set_state(state);
                }
                light
            })
            .collect();

        info!("Discovered {} Govee lights", self.lights.len());
        Ok(self.lights.len())
    }

    /// Refresh every light once, in order.
    ///
    /// Failures are counted, not returned. Once the local quota or the
    /// vendor refuses a call, the remaining lights are skipped.
    pub async fn poll_once(&mut self) -> PollReport {
        let mut report = PollReport::default();
        let total = self.lights.len();

        for (i, light) in self.lights.iter_mut().enumerate() {
            match light.refresh(&self.client).await {
                Ok(_) => report.updated += 1,
                Err(e @ (Error::QuotaExhausted | Error::VendorRateLimited { .. })) => {
                    report.skipped = total - i;
                    info!("{}, skipping {} remaining lights", e, report.skipped);
                    break;
                }
                Err(e) => {
                    warn!("Failed to update {}: {}", light.id(), e);
                    report.failed += 1;
                }
            }
        }

        debug!("Poll finished: {:?}", report);
        report
    }

    /// Poll, sleep for the client's current interval, and repeat until
    /// `shutdown` resolves. Returns the number of cycles run.
    pub async fn run_until<F>(&mut self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let mut shutdown = pin!(shutdown);
        let mut cycles = 0;

        loop {
            self.poll_once().await;
            cycles += 1;

            let interval = self.client.polling_interval();
            debug!("Next poll in {}s", interval.as_secs());
            let sleep = pin!(tokio::time::sleep(interval));
            if let Either::Left(_) = future::select(shutdown.as_mut(), sleep).await {
                info!("Polling stopped after {} cycles", cycles);
                return cycles;
            }
        }
    }
}
