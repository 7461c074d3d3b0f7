//! Integration tests for the chat client using wiremock.

use chatstream::bootstrap::{self, SessionArgs};
use chatstream::{ChatClient, ChatSession};
use chatstream_core::{ClientConfig, Error, HeadlessView, Role, SessionIdentity};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HELLO: &str = "{\"role\":\"user\",\"content\":\"Hello\",\"timestamp\":\"1\"}\n";
const HI: &str = "{\"role\":\"model\",\"content\":\"Hi there\",\"timestamp\":\"2\"}\n";

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        server_url: server.uri(),
        ..ClientConfig::default()
    }
}

fn identity() -> SessionIdentity {
    SessionIdentity::new(Some("ana maria"), Some("s/1"), "/").expect("valid identity")
}

#[tokio::test]
async fn submit_renders_streamed_messages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/"))
        .and(body_string_contains("prompt=Hello"))
        .and(body_string_contains("username=ana+maria"))
        .and(body_string_contains("sessionId=s%2F1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("{}{}", HELLO, HI)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ChatClient::from_config(&config_for(&mock_server));
    let mut session = ChatSession::new(identity(), HeadlessView::default());

    let result = session.submit(&client, "Hello").await;
    assert!(result.is_ok(), "expected Ok, got: {:?}", result.err());

    let view = session.view();
    assert_eq!(view.titles(), vec!["user at 1", "model at 2"]);
    assert_eq!(view.nodes[1].role, Role::Model);
    assert!(view.input_enabled);
    assert!(!view.error_visible);
}

#[tokio::test]
async fn server_error_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;

    let client = ChatClient::from_config(&config_for(&mock_server));
    let mut session = ChatSession::new(identity(), HeadlessView::default());

    let err = session
        .submit(&client, "Hello")
        .await
        .expect_err("should fail");

    match err {
        Error::Transport { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal error");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let view = session.view();
    assert!(view.error_visible);
    assert!(!view.busy);
    assert!(view.input_enabled);
    assert!(view.nodes.is_empty());
}

#[tokio::test]
async fn history_without_trailing_newline() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat/"))
        .and(query_param("username", "ana maria"))
        .and(query_param("sessionId", "s/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("{}{}", HELLO, HI.trim_end())))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ChatClient::from_config(&config_for(&mock_server));
    let mut session = ChatSession::new(identity(), HeadlessView::default());

    session.load_history(&client).await.expect("history should load");

    assert_eq!(session.renderer().len(), 2);
    assert_eq!(session.renderer().get("2").expect("model node").content, "Hi there");
}

#[tokio::test]
async fn history_then_submit_reuses_nodes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HELLO))
        .mount(&mock_server)
        .await;

    let reply = "{\"role\":\"user\",\"content\":\"More\",\"timestamp\":\"3\"}\n\
                 {\"role\":\"model\",\"content\":\"Sure\",\"timestamp\":\"4\"}\n\
                 {\"role\":\"model\",\"content\":\"Sure thing\",\"timestamp\":\"4\"}\n";
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(reply))
        .mount(&mock_server)
        .await;

    let client = ChatClient::from_config(&config_for(&mock_server));
    let mut session = ChatSession::new(identity(), HeadlessView::default());

    session.load_history(&client).await.expect("history");
    session.submit(&client, "More").await.expect("submit");

    assert_eq!(
        session.view().titles(),
        vec!["user at 1", "user at 3", "model at 4"]
    );
    assert_eq!(session.view().nodes[2].content, "Sure thing");
}

#[tokio::test]
async fn malformed_record_surfaces_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("{}{{broken\n", HELLO)))
        .mount(&mock_server)
        .await;

    let client = ChatClient::from_config(&config_for(&mock_server));
    let mut session = ChatSession::new(identity(), HeadlessView::default());

    let err = session.submit(&client, "Hello").await.expect_err("should fail");
    assert!(matches!(err, Error::Decode { .. }));
    assert!(session.view().error_visible);
    assert!(session.view().input_enabled);
}

#[tokio::test]
async fn missing_session_id_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HELLO))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server);
    let client = ChatClient::from_config(&config);
    let args = SessionArgs {
        page_url: Some(format!("{}/chat/?username=ana", mock_server.uri())),
        ..SessionArgs::default()
    };
    let mut view = HeadlessView::default();

    let err = bootstrap::open_chat(&args, &config, &client, &mut view)
        .await
        .err()
        .expect("should redirect");

    assert!(matches!(err, Error::Precondition { missing: "sessionId", .. }));
    assert_eq!(view.redirected_to, Some(format!("{}/", mock_server.uri())));
    assert!(view.nodes.is_empty());
}

#[tokio::test]
async fn open_chat_loads_history() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat/"))
        .and(query_param("username", "ana"))
        .and(query_param("sessionId", "s1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HELLO))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server);
    let client = ChatClient::from_config(&config);
    let args = SessionArgs {
        page_url: Some(format!("{}/chat/?username=ana&sessionId=s1", mock_server.uri())),
        ..SessionArgs::default()
    };

    let session = bootstrap::open_chat(&args, &config, &client, HeadlessView::default())
        .await
        .expect("session should open");

    assert_eq!(session.view().titles(), vec!["user at 1"]);
    assert_eq!(session.view().redirected_to, None);
    assert!(session.view().input_enabled);
}

#[tokio::test]
async fn open_chat_survives_failed_history() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server);
    let client = ChatClient::from_config(&config);
    let args = SessionArgs {
        username: Some("ana".into()),
        session_id: Some("s1".into()),
        ..SessionArgs::default()
    };

    let session = bootstrap::open_chat(&args, &config, &client, HeadlessView::default())
        .await
        .expect("session should open");

    assert!(session.view().error_visible);
    assert!(session.view().input_enabled);
    assert!(session.view().nodes.is_empty());
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let client = ChatClient::new("http://127.0.0.1:9/chat/");
    let mut session = ChatSession::new(identity(), HeadlessView::default());

    let err = session.submit(&client, "Hello").await.expect_err("should fail");
    assert!(matches!(err, Error::Network(_)));
    assert!(session.view().error_visible);
    assert!(session.view().input_enabled);
}

#[tokio::test]
async fn blank_prompt_is_not_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = ChatClient::from_config(&config_for(&mock_server));
    let mut session = ChatSession::new(identity(), HeadlessView::default());

    session.submit(&client, "   ").await.expect("no-op");
    assert!(session.view().nodes.is_empty());
}
