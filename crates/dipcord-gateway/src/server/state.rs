//! Gateway application state

use std::sync::Arc;

use dipcord_common::AppConfig;
use dipcord_service::ServiceContext;

use crate::broadcast::EventDispatcher;
use crate::connection::ConnectionManager;

/// Shared dependencies of every socket task
#[derive(Clone)]
pub struct GatewayState {
    service_context: Arc<ServiceContext>,
    event_dispatcher: Arc<EventDispatcher>,
    config: Arc<AppConfig>,
}

impl GatewayState {
    pub fn new(
        service_context: ServiceContext,
        event_dispatcher: Arc<EventDispatcher>,
        config: AppConfig,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            event_dispatcher,
            config: Arc::new(config),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Connection indexes, owned by the dispatcher
    pub fn connection_manager(&self) -> &ConnectionManager {
        self.event_dispatcher.connection_manager()
    }

    pub fn event_dispatcher(&self) -> &EventDispatcher {
        &self.event_dispatcher
    }

    /// Owned handle, for stopping the dispatcher after the server exits
    pub fn event_dispatcher_handle(&self) -> Arc<EventDispatcher> {
        Arc::clone(&self.event_dispatcher)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("event_dispatcher", &self.event_dispatcher)
            .field("config", &"AppConfig")
            .finish()
    }
}
