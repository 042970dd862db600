use crate::ErrorLocation;
use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::from()` captures file, line, and column.
///
/// **WHY THIS MATTERS**: Every invoker error carries a location. If capture breaks,
/// a transport failure and a configuration failure become indistinguishable in logs.
///
/// **BUG THIS CATCHES**: Would catch if `Location::caller()` stops being propagated
/// or the file path extraction breaks.
#[test]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN/WHEN: Capturing the current location
    let location = ErrorLocation::from(Location::caller());

    // THEN: Should point at this file with a real line and column
    assert!(
        location.file.contains("error_location.rs"),
        "Should capture file path"
    );
    assert!(location.line > 0, "Should capture line number");
    assert!(location.column > 0, "Should capture column number");
}

/// **VALUE**: Verifies the `[file:line:column]` rendering used in every error message.
///
/// **WHY THIS MATTERS**: Log parsers split error messages on the bracketed suffix.
///
/// **BUG THIS CATCHES**: Would catch a Display change that drops brackets or a field.
#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    // GIVEN: An ErrorLocation
    let location = ErrorLocation::from(Location::caller());

    // WHEN: Formatting as string
    let formatted = location.to_string();

    // THEN: Should produce "[file:line:column]"
    assert!(formatted.starts_with('['), "Should start with '['");
    assert!(formatted.ends_with(']'), "Should end with ']'");
    assert!(formatted.contains(&format!(":{}:", location.line)));
    assert_eq!(formatted.matches(':').count(), 2, "Should have exactly 2 colons");
}

/// **VALUE**: Verifies that `ErrorLocation::caller()` honours `#[track_caller]`.
///
/// **WHY THIS MATTERS**: Error constructors are `#[track_caller]` helpers; without
/// propagation every error would point at the constructor instead of the failure site.
///
/// **BUG THIS CATCHES**: Would catch removal of `#[track_caller]` from `caller()`.
#[test]
fn given_multiple_call_sites_when_capturing_location_then_each_has_unique_line() {
    // GIVEN: A helper that captures its caller's location
    #[track_caller]
    fn capture_location() -> ErrorLocation {
        ErrorLocation::caller()
    }

    // WHEN: Capturing from two consecutive lines
    let first = capture_location();
    let second = capture_location();

    // THEN: Same file, sequential lines
    assert_eq!(first.file, second.file, "Should have same file");
    assert_eq!(first.line + 1, second.line, "Lines should be sequential");
}
