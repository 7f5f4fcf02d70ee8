//! StartUpLens MongoDB Connection Manager
//!
//! This module owns the single handle to the backing document store. The
//! handle is created lazily on the first acquire, verified with a `ping`
//! against the `admin` database, and then cached for the lifetime of the
//! process: subsequent acquires return the cached handle without re-probing,
//! so a mid-session outage surfaces as store-level query errors rather than
//! a fresh handshake failure.
//!
//! Connection failures never abort the process; they come back as
//! [`LensError::Configuration`] or [`LensError::Connectivity`] diagnostics
//! for the presentation layer to render.

use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::{ClientOptions, Tls, TlsOptions};
use mongodb::{Client, Database};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info};

use startuplens_core::config::StoreSettings;
use startuplens_core::error::LensError;

/// Connection lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No connection attempt has been made yet
    Disconnected,
    /// The liveness probe succeeded and the handle is cached
    Connected,
    /// The last connection attempt failed
    Failed,
}

/// MongoDB connection manager with a process-lifetime cached handle.
pub struct MongoManager {
    /// Resolved connection settings
    settings: StoreSettings,
    /// Cached database handle; written once on first successful acquire
    handle: RwLock<Option<Database>>,
    /// Connection status
    status: RwLock<ConnectionStatus>,
}

impl MongoManager {
    /// Create a manager from resolved settings. No connection is attempted
    /// until the first [`MongoManager::acquire`].
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            handle: RwLock::new(None),
            status: RwLock::new(ConnectionStatus::Disconnected),
        }
    }

    /// Get the database handle, connecting on first use.
    ///
    /// Returns [`LensError::Configuration`] when no connection string was
    /// resolved, and [`LensError::Connectivity`] when the connect or the
    /// liveness probe fails. Both carry operator-facing guidance.
    pub async fn acquire(&self) -> Result<Database, LensError> {
        if let Some(db) = self.handle.read().await.as_ref() {
            return Ok(db.clone());
        }

        let mut guard = self.handle.write().await;
        // Another task may have connected while we waited for the lock
        if let Some(db) = guard.as_ref() {
            return Ok(db.clone());
        }

        let uri = self
            .settings
            .uri
            .clone()
            .ok_or_else(LensError::missing_connection_string)?;

        info!(
            "Connecting to MongoDB as {} (database: {})",
            self.settings.app_name, self.settings.database
        );

        match self.connect(&uri).await {
            Ok(db) => {
                *guard = Some(db.clone());
                *self.status.write().await = ConnectionStatus::Connected;
                info!("MongoDB connection verified");
                Ok(db)
            }
            Err(e) => {
                *self.status.write().await = ConnectionStatus::Failed;
                error!("MongoDB connection failed: {e}");
                Err(e)
            }
        }
    }

    /// Open a client and verify reachability with an admin `ping`.
    async fn connect(&self, uri: &str) -> Result<Database, LensError> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| LensError::connectivity(e))?;

        options.app_name = Some(self.settings.app_name.clone());
        options.server_selection_timeout = Some(Duration::from_secs(
            self.settings.server_selection_timeout_secs,
        ));
        options.connect_timeout = Some(Duration::from_secs(self.settings.connect_timeout_secs));

        if let Some(ca_file) = &self.settings.tls_ca_file {
            let mut tls_options = TlsOptions::default();
            tls_options.ca_file_path = Some(ca_file.clone());
            options.tls = Some(Tls::Enabled(tls_options));
        }

        let client = Client::with_options(options).map_err(|e| LensError::connectivity(e))?;

        // Verify TLS/network before handing the handle out
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| LensError::connectivity(e))?;

        Ok(client.database(&self.settings.database))
    }

    /// Current connection status.
    pub async fn status(&self) -> ConnectionStatus {
        self.status.read().await.clone()
    }

    /// True once a handle has been created and verified.
    pub async fn is_connected(&self) -> bool {
        *self.status.read().await == ConnectionStatus::Connected
    }

    /// The settings this manager was constructed with.
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }
}
