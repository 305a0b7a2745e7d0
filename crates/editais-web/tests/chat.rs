mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use common::{app, app_with, get, post_form};
use editais_client::models::{ChatOption, ChatReply};
use editais_common::EditaisConfig;
use editais_test_utils::{sample_records, ApiCall, FakeApi};

#[tokio::test]
async fn test_scoped_chat_then_exit() {
    let api = Arc::new(FakeApi::new().with_records(sample_records()));
    let app = app(api.clone());

    let opened = get(&app, "/chat?edital=1", None).await;
    assert_eq!(opened.status, StatusCode::OK);
    assert!(opened.body.contains("Conversando sobre: <strong>Inovação Tech</strong>"));
    let session = opened.cookie("editais_chat_session").unwrap();

    post_form(&app, "/chat/send", "message=qual+o+prazo%3F", Some(&session)).await;
    let exit = post_form(&app, "/chat/send", "message=sair", Some(&session)).await;
    assert_eq!(exit.status, StatusCode::SEE_OTHER);
    post_form(&app, "/chat/send", "message=e+agora%3F", Some(&session)).await;

    let chat_calls: Vec<ApiCall> = api
        .calls()
        .into_iter()
        .filter(|c| matches!(c, ApiCall::Chat { .. } | ApiCall::ChatAbout { .. }))
        .collect();
    assert_eq!(
        chat_calls,
        vec![
            ApiCall::ChatAbout { id: "1".into(), message: "qual o prazo?".into() },
            ApiCall::Chat { message: "e agora?".into() },
        ]
    );

    let page = get(&app, "/chat", Some(&session)).await;
    assert!(!page.body.contains("Conversando sobre"));
    assert!(page.body.contains("Você saiu do edital"));
}

#[tokio::test]
async fn test_option_selection_scopes_next_message() {
    let api = Arc::new(FakeApi::new().with_chat_reply(ChatReply {
        reply: "Encontrei:".into(),
        options: vec![ChatOption { id: "3".into(), titulo: "Fundo Inovador".into() }],
    }));
    let app = app(api.clone());

    let opened = get(&app, "/chat", None).await;
    let session = opened.cookie("editais_chat_session").unwrap();

    post_form(&app, "/chat/send", "message=fundos", Some(&session)).await;
    let page = get(&app, "/chat", Some(&session)).await;
    assert!(page.body.contains(r#"name="option_id" value="3""#));

    post_form(&app, "/chat/select", "option_id=3", Some(&session)).await;
    post_form(&app, "/chat/send", "message=prazo", Some(&session)).await;
    assert_eq!(
        api.calls().last(),
        Some(&ApiCall::ChatAbout { id: "3".into(), message: "prazo".into() })
    );
}

#[tokio::test]
async fn test_blank_message_sends_nothing() {
    let api = Arc::new(FakeApi::new());
    let app = app(api.clone());

    let opened = get(&app, "/chat", None).await;
    let session = opened.cookie("editais_chat_session").unwrap();
    post_form(&app, "/chat/send", "message=+++", Some(&session)).await;

    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_failure_appends_apology() {
    let api = Arc::new(FakeApi::new().failing_chat(500, "boom"));
    let app = app(api);

    let opened = get(&app, "/chat", None).await;
    let session = opened.cookie("editais_chat_session").unwrap();
    post_form(&app, "/chat/send", "message=oi", Some(&session)).await;

    let page = get(&app, "/chat", Some(&session)).await;
    assert!(page.body.contains("Desculpe, não consegui responder agora."));
    assert!(!page.body.contains("chat-entry bot pending"));
}

#[tokio::test]
async fn test_dropped_send_still_releases_widget() {
    let mut config = EditaisConfig::default();
    config.api.timeout_secs = 1;
    let api = Arc::new(FakeApi::new().hanging_chat());
    let app = app_with(config, api.clone());
    let session = "editais_chat_session=4a6f2c1e-9d3b-4f5a-8e7c-1b2d3e4f5a6b";

    // The client gives up long before the backend would answer.
    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        post_form(&app, "/chat/send", "message=oi", Some(session)),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(api.calls(), vec![ApiCall::Chat { message: "oi".into() }]);

    let mut released = false;
    for _ in 0..40 {
        let page = get(&app, "/chat", Some(session)).await;
        if !page.body.contains("autocomplete=\"off\" disabled") {
            assert!(page.body.contains("Desculpe, não consegui responder agora."));
            released = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(released, "widget stayed busy after the request was dropped");
}
