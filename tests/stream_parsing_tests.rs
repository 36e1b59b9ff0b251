// Integration tests for the reply pipeline: SSE frames in, chat text and actions out

#[cfg(test)]
mod stream_parsing_tests {
    use futures_util::{stream, StreamExt};
    use sprint_pilot_lib::backlog::{seed, SprintBoard};
    use sprint_pilot_lib::chat::{apply_breakdown, ChatSession};
    use sprint_pilot_lib::{Priority, UserStory};
    use sprint_pilot_lib::parsers::{decode_chunks, decode_stream, display_filter, provisional_filter};

    fn frame(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    #[test]
    fn test_frames_split_mid_line_decode_in_order() {
        let body = format!("{}: keep-alive\n\n{}data: [DONE]\n\n", frame("Hel"), frame("lo"));
        let bytes = body.as_bytes();
        let chunks: Vec<&[u8]> = vec![&bytes[..7], &bytes[7..40], &bytes[40..]];

        assert_eq!(decode_chunks(chunks), vec!["Hel", "lo"]);
    }

    #[test]
    fn test_session_never_shows_partial_action_block() {
        let reply = "Split it.\n```action\n{\"type\":\"breakdown\",\"storyId\":\"story-5\",\"newStories\":[{\"title\":\"A\",\"storyPoints\":2}]}\n```";
        let mut session = ChatSession::default();
        session.try_begin_turn("split story-5").unwrap();

        // Feed the reply one character at a time and watch the provisional text
        for ch in reply.chars() {
            session.append_delta(&ch.to_string());
            let shown = &session.messages().last().unwrap().content;
            assert!(!shown.contains("```"), "leaked fence: {:?}", shown);
            assert!("Split it.".starts_with(shown.as_str()));
        }

        let finished = session.finish_turn().unwrap();
        assert_eq!(finished.content, "Split it.");
        assert_eq!(finished.action.unwrap().replacement_stories[0].story_points, Some(2));
    }

    #[test]
    fn test_filters_agree_on_complete_text() {
        let text = "Intro\n```action\n{\"type\":\"breakdown\"}\n```\nOutro";
        assert_eq!(display_filter(text), "Intro\n\nOutro");
        assert_eq!(provisional_filter(text), display_filter(text));
    }

    #[tokio::test]
    async fn test_stream_stops_at_done_sentinel() {
        let body = format!("{}data: [DONE]\n\n{}", frame("only"), frame("ignored"));
        let chunks = stream::iter(vec![Ok::<_, std::io::Error>(body.into_bytes())]);

        let deltas: Vec<String> = decode_stream(chunks)
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(deltas, vec!["only"]);
    }

    #[test]
    fn test_breakdown_scenario_end_to_end() {
        let vague: UserStory = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "title": "Make it better",
            "storyPoints": 8
        }))
        .unwrap();
        let mut board = SprintBoard::new(
            vec![vague],
            seed::team_members(),
            seed::sprint_metrics(),
            seed::risk_burndown(),
        );
        let mut session = ChatSession::default();

        session.try_begin_turn("Can you split s1?").unwrap();
        session.append_delta("That story is vague.\n");
        session.append_delta(
            "```action\n{\"type\":\"breakdown\",\"storyId\":\"s1\",\"newStories\":[{\"title\":\"A\",\"storyPoints\":2}]}\n```",
        );
        let reply = session.finish_turn().unwrap();
        assert_eq!(reply.content, "That story is vague.");

        let action = reply.action.unwrap();
        assert_eq!(action.target_story_id, "s1");
        assert_eq!(action.replacement_stories.len(), 1);
        assert_eq!(action.replacement_stories[0].title.as_deref(), Some("A"));
        assert_eq!(action.replacement_stories[0].priority, Some(Priority::Medium));

        let history_before = session.messages().len();
        apply_breakdown(&mut board, &mut session, &action).unwrap();

        assert!(board.story("s1").is_none());
        assert_eq!(board.stories().len(), 1);
        assert_eq!(board.stories()[0].title, "A");
        assert_eq!(board.metrics().committed_points, 2);
        assert_eq!(session.messages().len(), history_before + 1);
    }
}
