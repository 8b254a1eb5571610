use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::OtpDelivery;

/// Channel that gets an issued code to the phone's owner.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    /// Delivers `code`. Returns the code only when the channel is the
    /// HTTP response itself.
    async fn deliver(&self, phone: &str, code: &str) -> anyhow::Result<Option<String>>;
}

/// Demo channel: the caller receives the code in the response body.
#[derive(Clone, Default)]
pub struct EchoNotifier;

#[async_trait]
impl OtpNotifier for EchoNotifier {
    async fn deliver(&self, phone: &str, code: &str) -> anyhow::Result<Option<String>> {
        info!(%phone, "otp echoed to caller");
        Ok(Some(code.to_string()))
    }
}

/// Out-of-band stand-in for SMS: the code goes to the operator log and
/// is withheld from the response.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl OtpNotifier for LogNotifier {
    async fn deliver(&self, phone: &str, code: &str) -> anyhow::Result<Option<String>> {
        info!(target: "otp_delivery", %phone, %code, "otp dispatched");
        Ok(None)
    }
}

pub fn notifier_for(delivery: OtpDelivery) -> Arc<dyn OtpNotifier> {
    match delivery {
        OtpDelivery::Echo => Arc::new(EchoNotifier),
        OtpDelivery::Log => Arc::new(LogNotifier),
    }
}
