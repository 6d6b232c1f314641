use std::sync::Arc;

use crate::config::TomlConfigParser;
use crate::plugin::{PluginRegistry, ReturnCode};
use crate::stack::builder::{build_stack, parse_stack_spec};
use crate::stack::dispatch::{clean_results, dispatch_from};
use crate::stack::tests::fixtures::*;

#[tokio::test]
async fn propagate_carries_the_source_value_to_the_sink() {
    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(SourcePlugin)).unwrap();
    registry.register(Arc::new(PassthroughPlugin)).unwrap();
    registry.register(Arc::new(RecordingSinkPlugin)).unwrap();

    let specs = parse_stack_spec("a:SRC,b:PASS,c:SINK").unwrap();
    let parser = TomlConfigParser::from_str("").unwrap();
    let mut stack = build_stack(&registry, &specs, &parser).await.unwrap();

    let outcome = dispatch_from(&mut stack, 0).await;
    assert_eq!(outcome, ReturnCode::Ok);

    let sink = stack.find_by_id("c").unwrap();
    let recorder = sink.private_state().unwrap().downcast_ref::<Recorder>().unwrap();
    assert_eq!(&*recorder.lock().unwrap(), &vec![42]);
}

#[tokio::test]
async fn stop_halts_propagation_before_the_sink() {
    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(SourcePlugin)).unwrap();
    registry.register(Arc::new(StopPlugin)).unwrap();

    let specs = parse_stack_spec("a:SRC,b:STOPPER").unwrap();
    let parser = TomlConfigParser::from_str("").unwrap();
    let mut stack = build_stack(&registry, &specs, &parser).await.unwrap();

    let outcome = dispatch_from(&mut stack, 0).await;
    assert_eq!(outcome, ReturnCode::Stop);
}

#[tokio::test]
async fn clean_results_releases_owned_output_values_after_dispatch() {
    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(SourcePlugin)).unwrap();
    registry.register(Arc::new(PassthroughPlugin)).unwrap();
    registry.register(Arc::new(RecordingSinkPlugin)).unwrap();

    let specs = parse_stack_spec("a:SRC,b:PASS,c:SINK").unwrap();
    let parser = TomlConfigParser::from_str("").unwrap();
    let mut stack = build_stack(&registry, &specs, &parser).await.unwrap();

    dispatch_from(&mut stack, 0).await;
    assert!(stack.stages()[0].output_keys()[0].is_valid());

    clean_results(&mut stack);
    assert!(!stack.stages()[0].output_keys()[0].is_valid());
}

#[tokio::test]
async fn dispatch_from_does_not_re_invoke_the_origin() {
    let source = Arc::new(CountingSourcePlugin::default());
    let mut registry = PluginRegistry::new();
    registry.register(source.clone()).unwrap();
    registry.register(Arc::new(RecordingSinkPlugin)).unwrap();

    let specs = parse_stack_spec("a:COUNTING_SRC,b:SINK").unwrap();
    let parser = TomlConfigParser::from_str("").unwrap();
    let mut stack = build_stack(&registry, &specs, &parser).await.unwrap();

    dispatch_from(&mut stack, 0).await;
    assert_eq!(source.calls.load(std::sync::atomic::Ordering::SeqCst), 1, "origin runs once, via dispatch_from");
}
