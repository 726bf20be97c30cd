use crate::domain::errors::DispatchError;
use crate::domain::ports::{NotificationDispatcher, OrderSummary};

/// Backend-mediated dispatch stand-in: records the notification in the
/// server log instead of calling a provider. Keeps provider credentials
/// out of buyer-reachable code; a real adapter would implement the same
/// port against an email/SMS gateway.
pub struct LogNotifier;

impl NotificationDispatcher for LogNotifier {
    fn send_code(&self, destination: &str, code: &str) -> Result<(), DispatchError> {
        log::info!("[notify] one-time code {code} for {destination}");
        Ok(())
    }

    fn send_order_confirmation(
        &self,
        destination: &str,
        summary: &OrderSummary,
    ) -> Result<(), DispatchError> {
        log::info!(
            "[notify] order {} confirmed for {} ({} items, total {}) -> {destination}",
            summary.order_id,
            summary.customer_name,
            summary.item_count,
            summary.amount
        );
        Ok(())
    }
}
