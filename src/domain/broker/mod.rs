use crate::domain::resource_manager::ResourceManager;

pub mod actor;
pub mod broker_handle;
pub mod broker_message;
pub mod handler;

pub use broker_handle::BrokerHandle;

/// Actor owning the resource manager.
///
/// Every request is a message handled to completion before the next one starts,
/// so no caller can observe (or act on) a half-applied mutation.
pub struct ResourceBroker {
    manager: ResourceManager,
}

impl ResourceBroker {
    pub fn new(manager: ResourceManager) -> Self {
        Self { manager }
    }
}
