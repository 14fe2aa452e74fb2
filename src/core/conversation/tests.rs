use super::*;
use crate::core::realtime::{FunctionCall, WebSource};
use serde_json::json;

fn web(uri: &str) -> GroundingChunk {
    GroundingChunk {
        web: Some(WebSource {
            uri: uri.to_string(),
            title: uri.to_string(),
        }),
    }
}

#[test]
fn test_update_last_turn_on_empty_log_is_noop() {
    let mut log = ConversationLog::new();
    log.update_last_turn(TurnUpdate::text("x"));
    assert!(log.is_empty());
}

#[test]
fn test_update_only_touches_last_turn() {
    let mut log = ConversationLog::new();
    log.add_turn(NewTurn::user("A", true));
    log.add_turn(NewTurn::agent("B", false));
    let first = log.turns()[0].clone();
    let second_stamp = log.turns()[1].timestamp;

    log.update_last_turn(TurnUpdate::text("x"));

    assert_eq!(log.len(), 2);
    assert_eq!(log.turns()[0], first);
    assert_eq!(log.turns()[1].text, "x");
    assert_eq!(log.turns()[1].timestamp, second_stamp);
    assert!(!log.turns()[1].is_final);
}

#[test]
fn test_update_sets_and_clears_payloads() {
    let mut log = ConversationLog::new();
    log.add_turn(NewTurn::system("Ferramenta").with_tool_request(LiveServerToolCall {
        function_calls: vec![FunctionCall {
            id: Some("call-1".to_string()),
            name: "search_reference".to_string(),
            args: None,
        }],
    }));

    log.update_last_turn(TurnUpdate {
        grounding_chunks: Some(Some(vec![web("https://a.example")])),
        ..Default::default()
    });
    assert!(log.turns()[0].tool_use_request.is_some());
    assert_eq!(log.turns()[0].grounding_chunks.as_ref().map(Vec::len), Some(1));

    log.update_last_turn(TurnUpdate {
        tool_use_request: Some(None),
        grounding_chunks: Some(None),
        ..Default::default()
    });
    let turn = &log.turns()[0];
    assert!(turn.tool_use_request.is_none());
    assert!(turn.grounding_chunks.is_none());
    assert_eq!(turn.text, "Ferramenta");
}

#[test]
fn test_turns_keep_creation_order_and_stamps() {
    let mut log = ConversationLog::new();
    log.add_turn(NewTurn::user("one", true));
    log.add_turn(NewTurn::user("two", true));
    log.add_turn(NewTurn::system("three"));

    let texts: Vec<&str> = log.turns().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
    assert!(log.turns()[0].timestamp <= log.turns()[2].timestamp);
}

#[test]
fn test_clear_empties_log() {
    let mut log = ConversationLog::new();
    log.add_turn(NewTurn::user("hello", true));
    log.clear();
    assert!(log.is_empty());
    assert!(log.last().is_none());
}

#[test]
fn test_fold_transcript_extends_open_turn() {
    let mut log = ConversationLog::new();
    log.fold_transcript(Role::User, "Hel", false);
    log.fold_transcript(Role::User, "lo", true);
    log.fold_transcript(Role::User, "Again", false);

    assert_eq!(log.len(), 2);
    assert_eq!(log.turns()[0].text, "Hello");
    assert!(log.turns()[0].is_final);
    assert_eq!(log.turns()[1].text, "Again");
}

#[test]
fn test_fold_transcript_switches_role() {
    let mut log = ConversationLog::new();
    log.fold_transcript(Role::User, "Where to?", false);
    log.fold_transcript(Role::Agent, "Lisbon", false);

    assert_eq!(log.len(), 2);
    assert_eq!(log.turns()[1].role, Role::Agent);

    log.finalize_last_turn();
    assert!(log.turns()[1].is_final);
    assert!(!log.turns()[0].is_final);
}

#[test]
fn test_grounding_attaches_to_agent_turn_only() {
    let mut log = ConversationLog::new();
    log.add_turn(NewTurn::user("q", true));
    log.attach_grounding(vec![web("https://a")]);
    assert!(log.turns()[0].grounding_chunks.is_none());

    log.add_turn(NewTurn::agent("answer", false));
    log.attach_grounding(vec![web("https://a")]);
    log.attach_grounding(vec![web("https://b")]);
    assert_eq!(log.turns()[1].grounding_chunks.as_ref().map(Vec::len), Some(2));
}

#[test]
fn test_turn_serialization_shape() {
    let mut log = ConversationLog::new();
    log.add_turn(
        NewTurn::system("").with_tool_request(LiveServerToolCall {
            function_calls: vec![FunctionCall {
                id: Some("1".to_string()),
                name: "find_route".to_string(),
                args: Some(json!({"destination": "Porto"})),
            }],
        }),
    );

    let value = serde_json::to_value(&log.turns()[0]).unwrap();
    assert_eq!(value["role"], "system");
    assert_eq!(value["isFinal"], true);
    assert_eq!(value["toolUseRequest"]["functionCalls"][0]["name"], "find_route");
    assert!(value.get("toolUseResponse").is_none());
    assert!(value.get("groundingChunks").is_none());

    let stamp = value["timestamp"].as_str().unwrap();
    assert_eq!(stamp.len(), "2025-01-01T00:00:00.000Z".len());
    assert!(stamp.ends_with('Z'));
}

#[test]
fn test_shared_log_handle() {
    let shared = ConversationLog::new().into_shared();
    shared.write().add_turn(NewTurn::agent("hi", true));
    assert_eq!(shared.read().len(), 1);
}
