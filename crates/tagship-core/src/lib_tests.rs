#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

// LogLevel tests

#[test]
fn LogLevel___ordering___trace_is_most_verbose() {
    assert!(LogLevel::Trace < LogLevel::Debug);
    assert!(LogLevel::Debug < LogLevel::Info);
    assert!(LogLevel::Info < LogLevel::Warn);
    assert!(LogLevel::Warn < LogLevel::Error);
    assert!(LogLevel::Error < LogLevel::Off);
}

#[test_case("info", Some(LogLevel::Info))]
#[test_case("WARN", Some(LogLevel::Warn))]
#[test_case("warning", Some(LogLevel::Warn))]
#[test_case("Debug", Some(LogLevel::Debug))]
#[test_case("verbose", None)]
fn LogLevel___parse___accepts_names_case_insensitively(input: &str, expected: Option<LogLevel>) {
    assert_eq!(LogLevel::parse(input), expected);
}

#[test]
fn LogLevel___display___uppercase_names() {
    assert_eq!(LogLevel::Info.to_string(), "INFO");
    assert_eq!(LogLevel::Off.to_string(), "OFF");
}
