//! Translation of platform message events into canonical messages

use crate::base::InboundSender;
use crate::slack::api::SlackApi;
use crate::slack::directory::Directory;
use crate::slack::events::MessageEvent;
use chatrelay_core::bus::Message;
use tracing::{debug, error, warn};

/// Convert a raw message event into a canonical [`Message`]
///
/// Sender identity resolves through the directory cache when possible and
/// falls back to a live `users.info` call as the authoritative source (the
/// cache may be stale). Returns `None` when the event carries no sender or
/// the lookup fails; a dropped message never reaches the bot core and is
/// not retried.
pub async fn translate(
    adapter_name: &str,
    api: &SlackApi,
    directory: &Directory,
    event: MessageEvent,
) -> Option<Message> {
    let Some(sender_id) = event.user.clone() else {
        debug!(
            "Ignoring message event without a sender (subtype {:?})",
            event.subtype
        );
        return None;
    };

    let user = match directory.user_by_id(&sender_id) {
        Some(user) => user.clone(),
        None => match api.user_info(&sender_id).await {
            Ok(user) => user,
            Err(e) => {
                error!(
                    "Identity lookup for {} failed, dropping message: {}",
                    sender_id, e
                );
                return None;
            }
        },
    };

    Some(Message::new(adapter_name, event.text, event.channel).with_user(user))
}

/// Translate an event and forward the result to the bot core
pub async fn translate_and_forward(
    adapter_name: &str,
    api: &SlackApi,
    directory: &Directory,
    inbound_tx: &InboundSender,
    event: MessageEvent,
) {
    if let Some(message) = translate(adapter_name, api, directory, event).await {
        if inbound_tx.send(message).is_err() {
            warn!("Bot core inbound channel closed, discarding message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_core::bus::User;
    use mockito::Matcher;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn message_event(user: Option<&str>) -> MessageEvent {
        MessageEvent {
            channel: "C1".to_string(),
            user: user.map(ToString::to_string),
            text: "hello there".to_string(),
            ts: "1700000000.000100".to_string(),
            subtype: None,
        }
    }

    fn unroutable_api() -> SlackApi {
        // Any request against this client is a test bug
        SlackApi::new("http://127.0.0.1:1", "xoxb-test").unwrap()
    }

    #[tokio::test]
    async fn test_translate_resolves_sender_from_cache() {
        let directory = Directory::from_parts(
            vec![],
            vec![User::new("U1", "alice").with_full_name("Alice Example")],
        );

        let message = translate("slack", &unroutable_api(), &directory, message_event(Some("U1")))
            .await
            .expect("cache hit translates");

        assert_eq!(message.source_adapter, "slack");
        assert_eq!(message.text, "hello there");
        assert_eq!(message.reply_context.channel_id, "C1");
        assert_eq!(message.from_user.unwrap().name, "alice");
    }

    #[tokio::test]
    async fn test_translate_falls_back_to_live_lookup() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users.info")
            .match_query(Matcher::Any)
            .with_body(
                json!({
                    "ok": true,
                    "user": {"id": "U9", "name": "carol", "profile": {}},
                })
                .to_string(),
            )
            .create_async()
            .await;

        let api = SlackApi::new(&server.url(), "xoxb-test").unwrap();
        let directory = Directory::from_parts(vec![], vec![]);

        let message = translate("slack", &api, &directory, message_event(Some("U9")))
            .await
            .expect("live lookup translates");

        assert_eq!(message.from_user.unwrap().id, "U9");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_translate_drops_message_when_lookup_fails() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/users.info")
            .match_query(Matcher::Any)
            .with_body(json!({"ok": false, "error": "user_not_found"}).to_string())
            .create_async()
            .await;

        let api = SlackApi::new(&server.url(), "xoxb-test").unwrap();
        let directory = Directory::from_parts(vec![], vec![]);

        let message = translate("slack", &api, &directory, message_event(Some("U404"))).await;
        assert!(message.is_none());
    }

    #[tokio::test]
    async fn test_translate_ignores_events_without_a_sender() {
        let directory = Directory::from_parts(vec![], vec![]);

        let message =
            translate("slack", &unroutable_api(), &directory, message_event(None)).await;
        assert!(message.is_none());
    }

    #[tokio::test]
    async fn test_forward_reaches_bot_core_exactly_once() {
        let directory = Directory::from_parts(vec![], vec![User::new("U1", "alice")]);
        let (tx, mut rx) = mpsc::unbounded_channel();

        translate_and_forward(
            "slack",
            &unroutable_api(),
            &directory,
            &tx,
            message_event(Some("U1")),
        )
        .await;

        let message = rx.try_recv().expect("one message forwarded");
        assert_eq!(message.from_user.unwrap().id, "U1");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_forward_skips_dropped_messages() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/users.info")
            .match_query(Matcher::Any)
            .with_body(json!({"ok": false, "error": "user_not_found"}).to_string())
            .create_async()
            .await;

        let api = SlackApi::new(&server.url(), "xoxb-test").unwrap();
        let directory = Directory::from_parts(vec![], vec![]);
        let (tx, mut rx) = mpsc::unbounded_channel();

        translate_and_forward("slack", &api, &directory, &tx, message_event(Some("U404"))).await;

        assert!(rx.try_recv().is_err());
    }
}
