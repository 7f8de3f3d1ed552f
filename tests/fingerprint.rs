//! Fingerprint determinism and sensitivity.

use llm_api_interface::cache::{fingerprint, Fingerprint};
use llm_api_interface::{Message, MessageRole};
use serde_json::json;

fn sample() -> Vec<Message> {
    vec![
        Message::system("You are terse."),
        Message::user("What is 2 + 2?"),
        Message::assistant("4"),
        Message::user("And 3 + 3?"),
    ]
}

#[test]
fn same_request_same_fingerprint() {
    let a = fingerprint("gpt-4o", &sample());
    let b = fingerprint("gpt-4o", &sample());
    assert_eq!(a, b);
    assert_eq!(a.as_str().len(), 64);
    let lower_hex = |c: char| c.is_ascii_hexdigit() && !c.is_ascii_uppercase();
    assert!(a.as_str().chars().all(lower_hex));
}

#[test]
fn fingerprint_is_stable_across_processes() {
    // Pinned digest: any change here invalidates every cache on disk.
    let key = fingerprint("gpt-4o", &[Message::user("hi")]);
    assert_eq!(
        key.as_str(),
        "f6ba5028679eb60d0565209bd47356058dc9001b52bef518c77f9115949c479f"
    );
    let again = Fingerprint::from_json(&json!({
        "messages": [{"content": "hi", "role": "user"}],
        "model": "gpt-4o"
    }));
    assert_eq!(key, again);
    assert_eq!(Fingerprint::parse(key.as_str()), Some(key.clone()));
}

#[test]
fn every_field_changes_the_fingerprint() {
    let base = fingerprint("gpt-4o", &sample());

    assert_ne!(base, fingerprint("o1-preview", &sample()));

    let mut role = sample();
    role[2].role = MessageRole::User;
    assert_ne!(base, fingerprint("gpt-4o", &role));

    let mut content = sample();
    content[3].content.push('!');
    assert_ne!(base, fingerprint("gpt-4o", &content));

    let mut order = sample();
    order.swap(1, 3);
    assert_ne!(base, fingerprint("gpt-4o", &order));

    let mut shorter = sample();
    shorter.pop();
    assert_ne!(base, fingerprint("gpt-4o", &shorter));
}

#[test]
fn key_order_in_raw_payload_does_not_matter() {
    let a = Fingerprint::from_json(&json!({
        "model": "gpt-4o",
        "messages": [{"role": "user", "content": "hello"}],
    }));
    let b = Fingerprint::from_json(&json!({
        "messages": [{"content": "hello", "role": "user"}],
        "model": "gpt-4o",
        "temperature": 0.2,
    }));
    assert_eq!(a, b);
    assert_eq!(a, fingerprint("gpt-4o", &[Message::user("hello")]));
}

#[test]
fn empty_inputs_are_valid() {
    let empty = fingerprint("", &[]);
    assert_eq!(empty, fingerprint("", &[]));
    assert_ne!(empty, fingerprint("gpt-4o", &[]));
    assert_ne!(empty, fingerprint("", &[Message::user("")]));
}

#[test]
fn boundary_between_fields_is_unambiguous() {
    let a = fingerprint("gpt-4o", &[Message::user("ab"), Message::user("c")]);
    let b = fingerprint("gpt-4o", &[Message::user("a"), Message::user("bc")]);
    assert_ne!(a, b);
}

#[test]
fn file_name_round_trips() {
    let key = fingerprint("claude-3-5-sonnet-20241022", &sample());
    let name = key.file_name();
    assert!(name.ends_with(".json"));
    assert_eq!(Fingerprint::from_file_name(&name), Some(key));
    assert_eq!(Fingerprint::from_file_name("notes.json"), None);
    assert_eq!(Fingerprint::parse(&"A".repeat(64)), None);
}
