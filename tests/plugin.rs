use std::sync::Arc;

use anyhow::Result;
use lodash_resolver_rs::core::core_table;
use lodash_resolver_rs::plugin::{Plugin, UnknownSourceError, VariableSource, LODASH_SOURCE};
use lodash_resolver_rs::resolver::{ResolutionRequest, ResolutionResult, Resolver};
use lodash_resolver_rs::trace::{CaptureSink, NullSink};
use lodash_resolver_rs::value::Value;

struct EchoSource;

impl VariableSource for EchoSource {
    fn resolve(&self, request: ResolutionRequest) -> Result<ResolutionResult> {
        Ok(ResolutionResult {
            value: Value::from(request.address),
        })
    }
}

#[test]
fn lodash_source_is_registered_by_default() -> Result<()> {
    let plugin = Plugin::new(core_table());
    assert_eq!(plugin.source_names(), vec![LODASH_SOURCE]);

    let result = plugin.resolve(
        LODASH_SOURCE,
        ResolutionRequest::new("kebabCase", vec![Value::from("Foo Bar")]),
    )?;
    assert_eq!(result.value, Value::from("foo-bar"));
    Ok(())
}

#[test]
fn extra_sources_can_be_registered() -> Result<()> {
    let mut plugin = Plugin::new(core_table());
    plugin.register_source("echo", Arc::new(EchoSource));
    assert_eq!(plugin.source_names(), vec!["echo", LODASH_SOURCE]);

    let result = plugin.resolve("echo", ResolutionRequest::new("anything", vec![]))?;
    assert_eq!(result.value, Value::from("anything"));
    Ok(())
}

#[test]
fn unknown_sources_are_reported() {
    let plugin = Plugin::new(core_table());
    let err = plugin
        .resolve("env", ResolutionRequest::new("HOME", vec![]))
        .unwrap_err();
    let unknown = err
        .downcast_ref::<UnknownSourceError>()
        .expect("unknown source error");
    assert_eq!(unknown.source_name(), "env");
}

#[test]
fn default_lodash_source_is_traced() -> Result<()> {
    let plugin = Plugin::new(core_table());
    let lodash = plugin.source(LODASH_SOURCE).expect("lodash source");
    assert!(lodash.is_traced());

    let mut silent = Plugin::with_resolver(Resolver::new(core_table()).with_sink(Arc::new(NullSink)));
    silent.register_source("echo", Arc::new(EchoSource));
    assert!(!silent.source(LODASH_SOURCE).expect("lodash source").is_traced());
    assert!(!silent.source("echo").expect("echo source").is_traced());
    Ok(())
}

#[test]
fn plugin_resolutions_reach_the_sink() -> Result<()> {
    let sink = Arc::new(CaptureSink::new());
    let plugin = Plugin::with_resolver(Resolver::new(core_table()).with_sink(sink.clone()));
    plugin.resolve(
        LODASH_SOURCE,
        ResolutionRequest::new("toUpper", vec![Value::from("bar")]),
    )?;

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].address, "toUpper");
    assert_eq!(records[0].value, Value::from("BAR"));
    Ok(())
}
