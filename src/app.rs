use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::catalog::StationCatalog;
use crate::config::Config;
use crate::services::ReportService;

/// Running HTTP service
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Application {
    /// Load the station catalog, wire the report service into the router and
    /// spawn the server
    ///
    /// A catalog that fails to load (alias chains, duplicate stations) stops
    /// startup before the listener is bound.
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let catalog = StationCatalog::load(config.station_catalog_path.as_deref())?;

        let app_state = AppState {
            report_service: ReportService::new(Arc::new(catalog)),
            defaults: config.threshold_defaults(),
        };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self { server_handle })
    }

    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
