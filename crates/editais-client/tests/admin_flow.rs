use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use editais_client::admin::{self, AuthDecision, NoticeForm, SubmitOutcome};
use editais_client::ClientError;
use editais_test_utils::{
    raw_notice, sample_records, ApiCall, FakeApi, ADMIN_EMAIL, ADMIN_PASSWORD, VALID_TOKEN,
};

#[tokio::test]
async fn test_empty_id_issues_create() {
    let api = FakeApi::new();
    let form = NoticeForm { titulo: "Novo edital".into(), ..Default::default() };

    let outcome = assert_ok!(admin::submit(&api, VALID_TOKEN, &form).await);
    assert!(matches!(outcome, SubmitOutcome::Created { .. }));
    assert!(matches!(api.calls().as_slice(), [ApiCall::Create { .. }]));
}

#[tokio::test]
async fn test_id_42_issues_update_targeting_42() {
    let api = FakeApi::new().with_records(vec![raw_notice(42, "Antigo", json!({}))]);
    let form = NoticeForm { id: "42".into(), titulo: "Atualizado".into(), ..Default::default() };

    let outcome = assert_ok!(admin::submit(&api, VALID_TOKEN, &form).await);
    assert_eq!(outcome, SubmitOutcome::Updated { id: "42".into() });
    match api.calls().as_slice() {
        [ApiCall::Update { id, payload, .. }] => {
            assert_eq!(id, "42");
            assert_eq!(payload["titulo"], "Atualizado");
        }
        other => panic!("unexpected calls: {other:?}"),
    }

    let report = assert_ok!(admin::list_for_admin(&api, VALID_TOKEN).await);
    assert_eq!(report.notices[0].title, "Atualizado");
}

#[tokio::test]
async fn test_write_failure_surfaces_detail() {
    let api = FakeApi::new().failing_writes(422, "Campo titulo obrigatório");
    let form = NoticeForm::default();

    let err = assert_err!(admin::submit(&api, VALID_TOKEN, &form).await);
    assert!(!err.is_auth_failure());
    assert!(err.user_message().contains("Campo titulo obrigatório"));
}

#[tokio::test]
async fn test_rejected_token_is_an_auth_failure() {
    let api = FakeApi::new();
    let form = NoticeForm::default();
    let err = assert_err!(admin::submit(&api, "expirado", &form).await);
    assert!(matches!(err, ClientError::Unauthorized { status: 401, .. }));
}

#[tokio::test]
async fn test_verify_session() {
    let api = FakeApi::new();
    assert!(admin::verify_session(&api, Some(VALID_TOKEN)).await.is_granted());
    assert!(matches!(
        admin::verify_session(&api, Some("outro")).await,
        AuthDecision::Denied { .. }
    ));
    assert!(!admin::verify_session(&api, None).await.is_granted());
    // A missing token never reaches the API.
    assert_eq!(api.calls().len(), 2);
}

#[tokio::test]
async fn test_login_returns_token() {
    let api = FakeApi::new().with_records(sample_records());
    let token = admin::login(&api, ADMIN_EMAIL, &SecretString::from(ADMIN_PASSWORD.to_string()))
        .await
        .unwrap();
    assert_eq!(token, VALID_TOKEN);

    let err = admin::login(&api, ADMIN_EMAIL, &SecretString::from("errada".to_string()))
        .await
        .unwrap_err();
    assert!(err.user_message().contains("Credenciais inválidas"));
}
