use resara_pricing::Optimizer;
use std::sync::Arc;

/// Shared application state: the optimizer holds the immutable pricing
/// config and the injected model handle for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    pub optimizer: Arc<Optimizer>,
}
