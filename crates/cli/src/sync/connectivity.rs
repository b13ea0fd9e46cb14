// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity monitor.
//!
//! Every call probes the network again; nothing is cached between calls.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::task::JoinSet;

/// Reports whether the device can reach the network and the API.
pub trait Connectivity: Send + Sync {
    /// True when at least one probe URL answers.
    fn is_online(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;

    /// True when the API health endpoint answers with a 2xx.
    fn api_available(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

/// HTTP probe: HEAD against well-known URLs, GET against the API health path.
pub struct HttpProbe {
    client: reqwest::Client,
    probe_urls: Vec<String>,
    health_url: String,
}

impl HttpProbe {
    pub fn new(
        probe_urls: Vec<String>,
        api_base_url: &str,
        health_path: &str,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpProbe {
            client,
            probe_urls,
            health_url: format!("{}{}", api_base_url.trim_end_matches('/'), health_path),
        })
    }
}

impl Connectivity for HttpProbe {
    fn is_online(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            let mut probes = JoinSet::new();
            for url in &self.probe_urls {
                let request = self.client.head(url);
                let url = url.clone();
                probes.spawn(async move {
                    match request.send().await {
                        Ok(resp) => resp.status().is_success(),
                        Err(e) => {
                            tracing::debug!(url = %url, error = %e, "probe failed");
                            false
                        }
                    }
                });
            }

            while let Some(result) = probes.join_next().await {
                if matches!(result, Ok(true)) {
                    probes.abort_all();
                    return true;
                }
            }
            tracing::debug!(probes = self.probe_urls.len(), "all connectivity probes failed");
            false
        })
    }

    fn api_available(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            match self.client.get(&self.health_url).send().await {
                Ok(resp) => resp.status().is_success(),
                Err(e) => {
                    tracing::debug!(url = %self.health_url, error = %e, "api health check failed");
                    false
                }
            }
        })
    }
}
