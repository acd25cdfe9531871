// Integration tests for the Telegram Bot API client against a mock HTTP server.

use mockito::Matcher;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use lumber_bot::ingress::{Messenger, TelegramClient, TelegramError};

const TOKEN: &str = "123:XYZ";

fn client(base: &str) -> TelegramClient {
    TelegramClient::new(reqwest::Client::new(), TOKEN.to_string()).with_api_base(base)
}

#[tokio::test]
async fn test_get_updates() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/bot123:XYZ/getUpdates")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("offset".into(), "17".into()),
            Matcher::UrlEncoded("timeout".into(), "20".into()),
            Matcher::UrlEncoded("allowed_updates".into(), r#"["message"]"#.into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "ok": true,
                "result": [
                    {"update_id": 17, "message": {"message_id": 7, "date": 0, "chat": {"id": 42, "type": "group"}, "text": "/get"}},
                    {"update_id": 18, "edited_message": {"message_id": 8}}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let updates = client(&server.url()).get_updates(17, 20).await.unwrap();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].update_id, 17);

    let events: Vec<_> = updates.into_iter().filter_map(|u| u.into_event()).collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].chat_id, 42);
    assert_eq!(events[0].reply_target_id, 7);
    assert_eq!(events[0].text, "/get");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_updates_rejected() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/bot123:XYZ/getUpdates")
        .match_query(Matcher::Any)
        .with_status(409)
        .with_body(r#"{"ok": false, "error_code": 409, "description": "Conflict: can't use getUpdates method while webhook is active"}"#)
        .create_async()
        .await;

    let err = client(&server.url()).get_updates(0, 20).await.unwrap_err();
    match err {
        TelegramError::Rejected {
            method,
            description,
        } => {
            assert_eq!(method, "getUpdates");
            assert!(description.contains("webhook is active"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_send_message_as_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/bot123:XYZ/sendMessage")
        .match_body(Matcher::Json(json!({
            "chat_id": 42,
            "text": "/r/earthporn: T1 u1",
            "reply_to_message_id": 7
        })))
        .with_status(200)
        .with_body(r#"{"ok": true, "result": {"message_id": 8}}"#)
        .create_async()
        .await;

    client(&server.url())
        .send_message(42, "/r/earthporn: T1 u1", 7)
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_message_rejected() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/bot123:XYZ/sendMessage")
        .with_status(400)
        .with_body(r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#)
        .create_async()
        .await;

    let err = client(&server.url())
        .send_message(1, "hi", 2)
        .await
        .unwrap_err();
    assert!(matches!(err, TelegramError::Rejected { method: "sendMessage", .. }));
    assert!(err.to_string().contains("chat not found"));
}

#[tokio::test]
async fn test_non_json_response_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/bot123:XYZ/sendMessage")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let err = client(&server.url())
        .send_message(1, "hi", 2)
        .await
        .unwrap_err();
    assert!(matches!(err, TelegramError::Decode(_)));
}

#[tokio::test]
async fn test_set_webhook_uploads_certificate() {
    let mut cert = NamedTempFile::new().unwrap();
    write!(cert, "-----BEGIN CERTIFICATE-----\nMIIBfake\n-----END CERTIFICATE-----\n").unwrap();

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/bot123:XYZ/setWebhook")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r"name=.certificate.".into()),
            Matcher::Regex("MIIBfake".into()),
            Matcher::Regex(r"https://bot\.example\.com/123:XYZ".into()),
            Matcher::Regex(r#"\["message"\]"#.into()),
        ]))
        .with_status(200)
        .with_body(r#"{"ok": true, "result": true, "description": "Webhook was set"}"#)
        .create_async()
        .await;

    client(&server.url())
        .set_webhook("https://bot.example.com/123:XYZ", cert.path())
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_set_webhook_missing_certificate() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/bot123:XYZ/setWebhook")
        .expect(0)
        .create_async()
        .await;

    let err = client(&server.url())
        .set_webhook(
            "https://bot.example.com/123:XYZ",
            Path::new("/nonexistent/cert.pem"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TelegramError::Certificate(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_telegram_is_transport_error() {
    let err = client("http://127.0.0.1:1")
        .get_updates(0, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, TelegramError::Transport(_)));
}
