//! Remote provider tests against a throwaway HTTP server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use dice_gym::core::{Character, GameAction};
use dice_gym::error::{GymError, ProviderError};
use dice_gym::state::{RemoteProvider, StateProvider, Visibility};

const STATE: &str = r#"{
    "status": "Active",
    "content": {
        "gameData": { "level": 1, "currentPhase": "PlayerPlanning" },
        "scene": [
            { "entityType": "Giant", "x": 2, "y": 3, "health": 3, "actionPoints": 4 },
            { "entityType": "shrine", "x": 7, "y": 1, "character": "Giant" }
        ]
    }
}"#;

/// Serve one canned `(status, body)` response per connection, in order.
/// Returns the URL template and a handle yielding each request's
/// `(path, body)`.
fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<(String, String)>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let template = format!("http://{}/{{}}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let path = request_line
                .split_whitespace()
                .nth(1)
                .unwrap_or_default()
                .to_string();

            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();
            seen.push((path, String::from_utf8(request_body).unwrap()));

            let response = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
        seen
    });
    (template, handle)
}

#[test]
fn test_get_state_and_execute_action() {
    let (template, server) = serve(vec![(200, STATE), (200, STATE)]);
    let mut provider = RemoteProvider::new(template).unwrap();

    let state = provider.get_state(Character::Giant, Visibility::Fow).unwrap();
    let giant = state.player(Character::Giant).unwrap();
    assert_eq!(giant.position().map(|p| (p.x, p.y)), Some((2, 3)));

    provider
        .execute_action(Character::Giant, GameAction::PingB)
        .unwrap();

    let seen = server.join().unwrap();
    assert_eq!(seen[0].0, "/giant");
    let body: serde_json::Value = serde_json::from_str(&seen[0].1).unwrap();
    assert_eq!(body, serde_json::json!({ "command": "get_state", "version": "fow" }));
    let body: serde_json::Value = serde_json::from_str(&seen[1].1).unwrap();
    assert_eq!(body, serde_json::json!({ "command": "execute_action", "action": "pingb" }));
}

#[test]
fn test_error_status_is_state_unavailable() {
    let (template, server) = serve(vec![(500, r#"{"error": "boom"}"#)]);
    let mut provider = RemoteProvider::new(template).unwrap();

    let err = provider
        .get_state(Character::Dwarf, Visibility::Full)
        .unwrap_err();
    match err {
        GymError::StateUnavailable(ProviderError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("unexpected error: {other}"),
    }
    server.join().unwrap();
}

#[test]
fn test_undecodable_body() {
    let (template, server) = serve(vec![(200, "not json")]);
    let mut provider = RemoteProvider::new(template).unwrap();
    let err = provider
        .execute_action(Character::Human, GameAction::Wait)
        .unwrap_err();
    assert!(matches!(
        err,
        GymError::StateUnavailable(ProviderError::Decode(_))
    ));
    server.join().unwrap();
}

/// A well-formed response that lacks required structure is a malformed
/// state, not a transport fault.
#[test]
fn test_malformed_document() {
    let (template, server) = serve(vec![(200, r#"{"status": "Active"}"#)]);
    let mut provider = RemoteProvider::new(template).unwrap();
    let err = provider
        .get_state(Character::Human, Visibility::Player)
        .unwrap_err();
    assert!(matches!(err, GymError::MalformedState(_)));
    server.join().unwrap();
}
