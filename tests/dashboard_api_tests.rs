// Integration tests for the /api/invoke dashboard commands
// The copilot is replaced by a canned transport so chat turns are deterministic.

#[cfg(test)]
mod dashboard_api_tests {
    use futures_util::{future::BoxFuture, stream, FutureExt, StreamExt};
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use sprint_pilot_lib::chat::{AssistantTransport, DeltaStream, TransportError};
    use sprint_pilot_lib::config::GatewayConfig;
    use sprint_pilot_lib::server::{build_router, InvokeResponse, ServerAppState};
    use sprint_pilot_lib::shutdown::ShutdownState;
    use sprint_pilot_lib::CopilotRequest;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;

    const BREAKDOWN_REPLY: [&str; 3] = [
        "The \"Improve UX\" story is too vague. ",
        "Here's a split:\n```action\n{\"type\":\"breakdown\",\"storyId\":\"story-5\",",
        "\"newStories\":[{\"title\":\"Audit signup\",\"storyPoints\":3,\"priority\":\"high\"},{\"title\":\"Polish errors\",\"storyPoints\":2}]}\n```",
    ];

    struct CannedTransport {
        deltas: Vec<String>,
    }

    impl AssistantTransport for CannedTransport {
        fn stream_reply<'a>(
            &'a self,
            _request: &'a CopilotRequest,
        ) -> BoxFuture<'a, Result<DeltaStream, TransportError>> {
            let deltas: Vec<Result<String, TransportError>> =
                self.deltas.iter().cloned().map(Ok).collect();
            async move { Ok(stream::iter(deltas).boxed()) }.boxed()
        }
    }

    /// Opens a reply that never finishes, so the turn stays in progress
    struct StalledTransport;

    impl AssistantTransport for StalledTransport {
        fn stream_reply<'a>(
            &'a self,
            _request: &'a CopilotRequest,
        ) -> BoxFuture<'a, Result<DeltaStream, TransportError>> {
            async move { Ok(stream::pending::<Result<String, TransportError>>().boxed()) }.boxed()
        }
    }

    async fn spawn_app(deltas: &[&str]) -> (SocketAddr, ServerAppState) {
        spawn_with_transport(Arc::new(CannedTransport {
            deltas: deltas.iter().map(|d| d.to_string()).collect(),
        }))
        .await
    }

    async fn spawn_with_transport(
        transport: Arc<dyn AssistantTransport>,
    ) -> (SocketAddr, ServerAppState) {
        let state = ServerAppState::new(GatewayConfig::default(), transport, ShutdownState::new());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(state.clone(), None);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, state)
    }

    async fn invoke(addr: SocketAddr, cmd: &str, args: Value) -> (StatusCode, InvokeResponse) {
        let response = reqwest::Client::new()
            .post(format!("http://{}/api/invoke", addr))
            .json(&json!({ "cmd": cmd, "args": args }))
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn invoke_ok(addr: SocketAddr, cmd: &str, args: Value) -> Value {
        let (status, body) = invoke(addr, cmd, args).await;
        assert_eq!(status, StatusCode::OK, "{} failed: {:?}", cmd, body.error);
        assert!(body.success);
        body.data.unwrap_or(Value::Null)
    }

    /// Poll until the background chat turn has finished
    async fn wait_until_idle(addr: SocketAddr) -> Value {
        for _ in 0..100 {
            let chat = invoke_ok(addr, "get_chat_messages", json!({})).await;
            if chat["isTyping"] == false && chat["messages"].as_array().unwrap().len() > 1 {
                return chat;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("chat turn did not finish");
    }

    #[tokio::test]
    async fn test_dashboard_snapshot() {
        let (addr, _state) = spawn_app(&[]).await;

        let dashboard = invoke_ok(addr, "get_dashboard", json!({})).await;
        assert_eq!(dashboard["sprintName"], "User Onboarding");
        assert_eq!(dashboard["stories"].as_array().unwrap().len(), 7);
        assert_eq!(dashboard["metrics"]["committedPoints"], 37);
        assert_eq!(dashboard["metrics"]["riskScore"], 35);
        assert_eq!(dashboard["remainingCapacity"], 3);
        assert_eq!(dashboard["suggestedPrompts"][1], "Am I overloaded?");
        assert_eq!(dashboard["riskBurndown"].as_array().unwrap().len(), 14);
    }

    #[tokio::test]
    async fn test_invalid_commands_return_bad_request() {
        let (addr, _state) = spawn_app(&[]).await;

        let (status, body) = invoke(addr, "launch_rockets", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("Unknown command: launch_rockets"));

        let (status, body) = invoke(addr, "remove_story", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.as_deref(), Some("Missing argument: id"));

        let (status, body) = invoke(addr, "remove_story", json!({ "id": "story-99" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.unwrap().contains("story-99"));
    }

    #[tokio::test]
    async fn test_board_mutation_broadcasts_and_recalculates() {
        let (addr, state) = spawn_app(&[]).await;
        let mut events = state.broadcaster.subscribe();

        let removed = invoke_ok(addr, "remove_story", json!({ "id": "story-7" })).await;
        assert_eq!(removed["id"], "story-7");

        let stories_event = events.recv().await.unwrap();
        assert_eq!(stories_event.event, "board:stories_changed");
        assert_eq!(stories_event.payload["stories"].as_array().unwrap().len(), 6);
        let metrics_event = events.recv().await.unwrap();
        assert_eq!(metrics_event.event, "board:metrics_changed");
        assert_eq!(metrics_event.payload["metrics"]["committedPoints"], 32);

        let metrics = invoke_ok(addr, "get_metrics", json!({})).await;
        assert_eq!(metrics["committedPoints"], 32);
    }

    #[tokio::test]
    async fn test_update_and_reorder_story() {
        let (addr, _state) = spawn_app(&[]).await;

        let updated = invoke_ok(
            addr,
            "update_story",
            json!({ "id": "story-1", "updates": { "storyPoints": 5 } }),
        )
        .await;
        assert_eq!(updated["storyPoints"], 5);
        let metrics = invoke_ok(addr, "get_metrics", json!({})).await;
        assert_eq!(metrics["committedPoints"], 39);

        invoke_ok(addr, "reorder_story", json!({ "id": "story-1", "toIndex": 6 })).await;
        let stories = invoke_ok(addr, "get_stories", json!({})).await;
        assert_eq!(stories[6]["id"], "story-1");
    }

    #[tokio::test]
    async fn test_chat_turn_and_breakdown_via_invoke() {
        let (addr, state) = spawn_app(&BREAKDOWN_REPLY).await;
        let mut events = state.broadcaster.subscribe();

        let sent = invoke_ok(
            addr,
            "send_chat_message",
            json!({ "content": "Review the 'Improve UX' story" }),
        )
        .await;
        assert_eq!(sent["accepted"], true);

        let chat = wait_until_idle(addr).await;
        let messages = chat["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1]["role"], "user");
        let reply = &messages[2];
        assert_eq!(
            reply["content"],
            "The \"Improve UX\" story is too vague. Here's a split:"
        );
        assert_eq!(reply["action"]["targetStoryId"], "story-5");
        assert!(reply["id"].as_str().unwrap().starts_with("msg-"));

        // user message, typing on, provisional reply, then its updates
        let first = events.recv().await.unwrap();
        assert_eq!(first.event, "chat:message_appended");
        assert_eq!(first.payload["message"]["role"], "user");
        let typing = events.recv().await.unwrap();
        assert_eq!(typing.event, "chat:typing_changed");
        assert_eq!(typing.payload["isTyping"], true);

        let applied = invoke_ok(
            addr,
            "apply_breakdown",
            json!({ "messageId": reply["id"].clone() }),
        )
        .await;
        assert_eq!(applied["removed"]["id"], "story-5");
        assert_eq!(applied["added"].as_array().unwrap().len(), 2);
        assert!(applied["confirmation"]["content"]
            .as_str()
            .unwrap()
            .starts_with("✅ **Breakdown Applied!**"));

        let metrics = invoke_ok(addr, "get_metrics", json!({})).await;
        assert_eq!(metrics["committedPoints"], 34);
        assert_eq!(metrics["riskScore"], 0);
    }

    #[tokio::test]
    async fn test_blank_message_not_accepted() {
        let (addr, _state) = spawn_app(&["unused"]).await;

        let sent = invoke_ok(addr, "send_chat_message", json!({ "content": "   " })).await;
        assert_eq!(sent["accepted"], false);

        let chat = invoke_ok(addr, "get_chat_messages", json!({})).await;
        assert_eq!(chat["messages"].as_array().unwrap().len(), 1);
        assert_eq!(chat["messages"][0]["id"], "initial");
    }

    #[tokio::test]
    async fn test_concurrent_sends_accept_exactly_one() {
        let (addr, _state) = spawn_with_transport(Arc::new(StalledTransport)).await;

        let (a, b) = tokio::join!(
            invoke_ok(addr, "send_chat_message", json!({ "content": "first" })),
            invoke_ok(addr, "send_chat_message", json!({ "content": "second" })),
        );
        let accepted = [&a, &b].iter().filter(|v| v["accepted"] == true).count();
        assert_eq!(accepted, 1);

        let chat = invoke_ok(addr, "get_chat_messages", json!({})).await;
        assert_eq!(chat["isTyping"], true);
        let users = chat["messages"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|m| m["role"] == "user")
            .count();
        assert_eq!(users, 1);
    }

    #[tokio::test]
    async fn test_health_and_version() {
        let (addr, _state) = spawn_app(&[]).await;

        let health = reqwest::get(format!("http://{}/health", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(health, "OK");

        let version: Value = reqwest::get(format!("http://{}/api/version", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(version["name"], "sprint-pilot");
    }
}
