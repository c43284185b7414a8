use merchant_ledger::workflows::merchants::MerchantNormalizer;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Normalizer shared by every request handler.
pub(crate) type SharedNormalizer = Arc<MerchantNormalizer>;
