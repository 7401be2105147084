//! Refresh driver - re-renders tracked room lists after mutations

use std::sync::Arc;
use std::time::Duration;

use mafia_core::{ChatGateway, GatewayError, ModeratorService, RefreshNotifier};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::render;

/// Tick every `period` until `shutdown` fires
pub async fn run(
    service: Arc<ModeratorService>,
    notifier: Arc<RefreshNotifier>,
    gateway: Arc<dyn ChatGateway>,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!(period_ms = period.as_millis() as u64, "Refresh driver started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let (service, notifier, gateway) = (service.clone(), notifier.clone(), gateway.clone());
        let edited = tokio::task::spawn_blocking(move || refresh_once(&service, &notifier, gateway.as_ref())).await;
        if let Err(e) = edited {
            tracing::error!(error = %e, "Refresh task failed");
        }
    }

    tracing::info!("Refresh driver stopped");
}

/// Re-edit every tracked message if the view is stale. Returns the number
/// of messages edited.
pub fn refresh_once(service: &ModeratorService, notifier: &RefreshNotifier, gateway: &dyn ChatGateway) -> usize {
    if !notifier.consume() {
        return 0;
    }

    let (text, markup) = render::room_list(&render::rooms_with_games(service));
    let mut edited = 0;
    for message in notifier.tracked() {
        match gateway.edit_message(&message, &text, Some(&markup)) {
            Ok(()) => edited += 1,
            Err(GatewayError::MessageGone(_)) => {
                // A newer list may have been tracked for the chat meanwhile
                if let Some(current) = notifier.untrack(message.chat_id) {
                    if current != message {
                        notifier.track(current);
                    }
                }
                tracing::debug!(chat_id = message.chat_id, "Tracked message gone, untracked");
            }
            Err(e) => {
                tracing::warn!(chat_id = message.chat_id, error = %e, "Failed to refresh room list");
            }
        }
    }
    tracing::debug!(edited, "Room lists refreshed");
    edited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::tests::SharedBuffer;
    use crate::gateway::ConsoleGateway;
    use mafia_core::{MessageRef, SendOptions, Stores, User};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup() -> (Arc<ModeratorService>, Arc<RefreshNotifier>, Arc<ConsoleGateway>, SharedBuffer) {
        let output = SharedBuffer::default();
        let gateway = Arc::new(ConsoleGateway::new(Box::new(output.clone())));
        let notifier = Arc::new(RefreshNotifier::new());
        let service = Arc::new(ModeratorService::new(
            Arc::new(Stores::new()),
            Box::new(ChaCha8Rng::seed_from_u64(3)),
            gateway.clone(),
            notifier.clone(),
        ));
        (service, notifier, gateway, output)
    }

    fn admin() -> User {
        User {
            admin: true,
            ..User::new(1, "Admin")
        }
    }

    #[test]
    fn test_edits_only_when_stale() {
        let (service, notifier, gateway, output) = setup();
        let message = gateway.send_private(5, "Rooms", &SendOptions::default()).unwrap();
        notifier.track(message);

        assert_eq!(refresh_once(&service, &notifier, gateway.as_ref()), 0);

        service.create_room(&admin(), "Lobby").unwrap();
        assert_eq!(refresh_once(&service, &notifier, gateway.as_ref()), 1);
        assert!(output.contents().contains("(edited)"));
        assert_eq!(refresh_once(&service, &notifier, gateway.as_ref()), 0);
    }

    #[test]
    fn test_gone_messages_are_untracked() {
        let (service, notifier, gateway, _) = setup();
        notifier.track(MessageRef { chat_id: 8, message_id: 99 });
        service.create_room(&admin(), "Lobby").unwrap();

        assert_eq!(refresh_once(&service, &notifier, gateway.as_ref()), 0);
        assert!(notifier.tracked().is_empty());
    }

    #[tokio::test]
    async fn test_driver_stops_on_shutdown() {
        let (service, notifier, gateway, _) = setup();
        let shutdown = CancellationToken::new();
        let driver = tokio::spawn(run(
            service,
            notifier,
            gateway,
            Duration::from_millis(10),
            shutdown.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(35)).await;
        shutdown.cancel();
        driver.await.unwrap();
    }
}
