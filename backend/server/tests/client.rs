use std::net::SocketAddr;

use reqwest::Client;
use serde_json::{Value, json};
use server::{
    build_router,
    config::{Config, Environment},
    state::State,
};
use survey::{
    Input, LocalCache, MemoryForm, Outcome, SubmissionClient, SurveyController, Transition,
    controller::Key,
};
use tempfile::tempdir;
use tokio::net::TcpListener;

async fn spawn(config: Config) -> String {
    let state = State::new(config).await.expect("state");
    let app = build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("serve");
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn test_client_record_is_accepted_by_server() {
    let store = tempdir().expect("tempdir");
    let base = spawn(Config {
        environment: Environment::Testing,
        host: "127.0.0.1".to_string(),
        port: 0,
        responses_dir: store.path().to_path_buf(),
        ..Config::default()
    })
    .await;

    let local = tempdir().expect("tempdir");
    let cache_path = local.path().join("pending.json");
    let client = SubmissionClient::new(&base, LocalCache::new(&cache_path)).expect("client");

    let mut form = MemoryForm::new();
    form.select("q1", "1_6_meses").expect("q1");
    form.type_text("q2", "  buen servicio ").expect("q2");
    form.rate("q6", 4).expect("q6");
    form.toggle_tag("q9_tags", "cercana").expect("q9_tags");

    let mut controller = SurveyController::new();
    controller.start().expect("start");

    let outcome = loop {
        match controller.handle(Input::Key(Key::Enter), &form, &client).await {
            Ok(Some(Transition::Submitted(outcome))) => break outcome,
            Ok(_) => {}
            Err(e) => panic!("navigation failed: {e}"),
        }
    };

    let Outcome::Sent { id } = outcome else {
        panic!("expected the server to accept the record, got {outcome:?}");
    };
    assert!(!cache_path.exists());

    let listing: Value = Client::new()
        .get(format!("{base}/api/responses"))
        .send()
        .await
        .expect("list")
        .json()
        .await
        .expect("json");

    assert_eq!(listing["total"], 1);
    let stored = &listing["responses"][0];
    assert_eq!(stored["id"], id.as_str());
    assert_eq!(stored["q1"], "1_6_meses");
    assert_eq!(stored["q2"], "buen servicio");
    assert_eq!(stored["q2_tags"], json!([]));
    assert_eq!(stored["q8_tags"], json!([]));
    assert_eq!(stored["q9_tags"], json!(["cercana"]));
    assert_eq!(stored["q4"], json!([]));
    assert_eq!(stored["q6"], 4);
    assert_eq!(stored["q7_slider"], 3);
    assert!(stored.get("q10_trust").is_none());
    assert!(stored["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));
}
