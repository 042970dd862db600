use crate::RedactedSecret;

/// **VALUE**: Verifies that neither Debug nor Display leaks the secret.
///
/// **WHY THIS MATTERS**: `ClientProperties` derives Debug and is logged at start-up.
/// A leaking Debug impl would write basic-auth passwords into every log file.
///
/// **BUG THIS CATCHES**: Would catch someone replacing the manual impls with derives.
#[test]
fn given_secret_when_formatted_then_value_never_appears() {
    // GIVEN: A secret
    let secret = RedactedSecret::new("hunter2");

    // WHEN: Formatting both ways
    let debug = format!("{:?}", secret);
    let display = format!("{}", secret);

    // THEN: The value is hidden but still reachable explicitly
    assert!(!debug.contains("hunter2"));
    assert!(!display.contains("hunter2"));
    assert_eq!(secret.expose(), "hunter2");
    assert_eq!(secret.len(), 7);
}

/// **VALUE**: Verifies secrets deserialize from plain strings but refuse to serialize.
///
/// **WHY THIS MATTERS**: Passwords are bound from TOML/env, yet must never be echoed
/// back out (e.g. into a dumped configuration).
///
/// **BUG THIS CATCHES**: Would catch a derived `Serialize` sneaking in.
#[test]
fn given_secret_when_round_tripped_through_serde_then_only_deserialize_succeeds() {
    // GIVEN: A JSON string
    let secret: RedactedSecret = serde_json::from_str("\"s3cret\"").unwrap();

    // WHEN: Serializing it back
    let result = serde_json::to_string(&secret);

    // THEN: Deserialize worked, serialize refused
    assert_eq!(secret.expose(), "s3cret");
    assert!(result.is_err(), "Secrets must not serialize");
}
