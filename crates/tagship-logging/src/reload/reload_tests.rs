#![allow(non_snake_case)]

use super::*;
use tracing_subscriber::prelude::*;

#[test]
fn ReloadHandle___reload_level___errors_before_initialization() {
    let handle = ReloadHandle::new();

    let result = handle.reload_level(LogLevel::Debug);

    assert_eq!(result.unwrap_err(), "Reload handle not initialized");
}

#[test]
fn apply_level___without_filter___leaves_logging_alone() {
    let handle = ReloadHandle::new();

    assert_eq!(apply_level_to(&handle, LogLevel::Error), Ok(false));
    assert!(!handle.is_initialized());
}

#[test]
fn apply_level___registered_filter___switches_console_level() {
    let (layer, inner) = reload::Layer::new(LevelFilter::INFO);
    let subscriber = tracing_subscriber::registry().with(layer);
    let handle = ReloadHandle::new();
    handle.set_handle(inner.clone());

    tracing::subscriber::with_default(subscriber, || {
        assert_eq!(apply_level_to(&handle, LogLevel::Error), Ok(true));
        assert_eq!(inner.clone_current(), Some(LevelFilter::ERROR));
    });
}

#[test]
fn level_filter___maps_every_level() {
    assert_eq!(level_filter(LogLevel::Trace), LevelFilter::TRACE);
    assert_eq!(level_filter(LogLevel::Debug), LevelFilter::DEBUG);
    assert_eq!(level_filter(LogLevel::Info), LevelFilter::INFO);
    assert_eq!(level_filter(LogLevel::Warn), LevelFilter::WARN);
    assert_eq!(level_filter(LogLevel::Error), LevelFilter::ERROR);
    assert_eq!(level_filter(LogLevel::Off), LevelFilter::OFF);
}
