//! Serializes access to the generation device.

use super::{GenerationRequest, Generator};
use crate::error::{Result, ShopliteError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Wraps a generator so at most `slots` generations run at once.
///
/// Retrieval does not pass through here and stays fully concurrent.
pub struct DeviceGate {
    inner: Arc<dyn Generator>,
    permits: Semaphore,
    slots: usize,
}

impl DeviceGate {
    pub fn new(inner: Arc<dyn Generator>, slots: usize) -> Self {
        let slots = slots.max(1);
        Self {
            inner,
            permits: Semaphore::new(slots),
            slots,
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }
}

#[async_trait]
impl Generator for DeviceGate {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| ShopliteError::Generation(format!("device gate closed: {}", e)))?;

        debug!(
            available = self.permits.available_permits(),
            "Acquired generation slot"
        );
        self.inner.generate(request).await
    }

    fn echoes_prompt(&self) -> bool {
        self.inner.echoes_prompt()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}
