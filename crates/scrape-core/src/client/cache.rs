use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tracing::debug;

use super::{ClientBuilder, ClientContext, MonitorClient, MonitorClientFactory};
use crate::error::ScrapeError;

/// Process-wide client cache keyed by tenant and subscription.
///
/// Entries are never evicted.
pub struct MonitorClientCache {
    builder: Arc<dyn ClientBuilder>,
    clients: Mutex<HashMap<(String, String), Arc<dyn MonitorClient>>>,
}

impl MonitorClientCache {
    pub fn new(builder: Arc<dyn ClientBuilder>) -> Self {
        Self {
            builder,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.clients.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MonitorClientFactory for MonitorClientCache {
    fn get_or_create(&self, ctx: &ClientContext<'_>) -> Result<Arc<dyn MonitorClient>, ScrapeError> {
        let key = (ctx.tenant_id.to_string(), ctx.subscription_id.to_string());
        let mut clients = self.clients.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        let client = self.builder.build(ctx)?;
        debug!(
            tenant = ctx.tenant_id,
            subscription = ctx.subscription_id,
            use_azure_monitor_sdk = ctx.config.azure_monitor.integration.use_azure_monitor_sdk,
            "created monitor client"
        );
        clients.insert(key, client.clone());
        Ok(client)
    }
}
