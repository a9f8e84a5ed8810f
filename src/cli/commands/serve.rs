//! cli::commands::serve
//!
//! Run the HTTP service until Ctrl-C.
//!
//! # Example
//!
//! ```bash
//! AZURE_STORAGE_ACCOUNT=myaccount AZURE_SAS_TOKEN='sv=...' blobvault serve
//! blobvault serve --backend memory --bind 127.0.0.1:8080
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;

use super::open_vault;
use crate::cli::Context;
use crate::core::config::Config;
use crate::store::StoreBackend;
use crate::ui::output;

/// Serve the vault over HTTP.
pub fn serve(
    ctx: &Context,
    bind: Option<SocketAddr>,
    backend: Option<StoreBackend>,
) -> Result<()> {
    let config = Config::load()?.with_overrides(bind, backend)?;
    if let Some(path) = config.source() {
        output::debug(format!("config: {}", path.display()), ctx.verbosity);
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let vault = Arc::new(open_vault(&config).await?);
        if !vault.is_bootstrapped() {
            output::warn(
                format!(
                    "container '{}' is not confirmed yet; it will be retried on first use",
                    vault.container()
                ),
                ctx.verbosity,
            );
        }
        crate::server::serve(vault, config.bind).await
    })
}
