use parking_lot::Mutex;
use pubsub_core::{Diagnostic, MemorySink, Registry, DEFAULT_EVENT};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Calls = Arc<Mutex<Vec<(String, Value)>>>;

fn setup() -> (Arc<Registry<Value>>, MemorySink, Calls) {
    let sink = MemorySink::new();
    let registry = Arc::new(Registry::with_sink(Arc::new(sink.clone())));
    (registry, sink, Arc::new(Mutex::new(Vec::new())))
}

fn record(calls: &Calls, label: &str) -> impl Fn(&Value) + Send + Sync + 'static {
    let calls = calls.clone();
    let label = label.to_string();
    move |data: &Value| calls.lock().push((label.clone(), data.clone()))
}

#[test]
fn test_publish_then_unsubscribe_scenario() {
    let (registry, sink, calls) = setup();

    registry.subscribe("test", "obs1".to_string(), record(&calls, "fn1"));
    registry.subscribe("test", "obs2".to_string(), record(&calls, "fn2"));
    registry.publish("test", &json!({"x": 1}));

    assert_eq!(
        *calls.lock(),
        vec![
            ("fn1".to_string(), json!({"x": 1})),
            ("fn2".to_string(), json!({"x": 1})),
        ]
    );

    calls.lock().clear();
    registry.unsubscribe("test", "obs1");
    registry.publish("test", &json!({"x": 2}));

    assert_eq!(*calls.lock(), vec![("fn2".to_string(), json!({"x": 2}))]);
    assert!(sink.is_empty());
}

#[test]
fn test_each_publish_invokes_callback_once() {
    let (registry, _sink, _calls) = setup();
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();

    registry.subscribe("tick", "counter".to_string(), move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    for _ in 0..3 {
        registry.publish("tick", &Value::Null);
    }

    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn test_empty_event_name_creates_nothing() {
    let (registry, sink, calls) = setup();

    registry.subscribe("", "obs".to_string(), record(&calls, "fn"));

    assert!(!registry.is_subscribed(""));
    assert_eq!(registry.event_names(), vec![DEFAULT_EVENT.to_string()]);
    assert_eq!(sink.len(), 1);
    assert!(matches!(
        &sink.entries()[0],
        Diagnostic::InvalidEventName { known_events, .. } if known_events == &vec![DEFAULT_EVENT.to_string()]
    ));
}

#[test]
fn test_duplicate_observer_second_survives() {
    let (registry, _sink, calls) = setup();

    registry.subscribe("e", "obs".to_string(), record(&calls, "first"));
    registry.subscribe("e", "obs".to_string(), record(&calls, "second"));
    registry.unsubscribe("e", "obs");

    assert_eq!(registry.snapshot().get("e"), Some(&["obs".to_string()][..]));

    registry.publish("e", &json!("payload"));
    assert_eq!(
        *calls.lock(),
        vec![("second".to_string(), json!("payload"))]
    );
}

#[test]
fn test_unsubscribe_absent_observer_then_publish() {
    let (registry, sink, calls) = setup();

    registry.subscribe("e", "present".to_string(), record(&calls, "present"));
    registry.unsubscribe("e", "absent");
    registry.publish("e", &json!(1));

    assert_eq!(*calls.lock(), vec![("present".to_string(), json!(1))]);
    assert!(sink.is_empty());
}

#[test]
fn test_failure_in_first_callback_still_runs_second() {
    let (registry, sink, calls) = setup();

    registry.subscribe("e", "a".to_string(), |data: &Value| {
        if data.get("fail").is_some() {
            Err(format!("cannot handle {data}"))
        } else {
            Ok(())
        }
    });
    registry.subscribe("e", "b".to_string(), record(&calls, "b"));

    registry.publish("e", &json!({"fail": true}));

    assert_eq!(*calls.lock(), vec![("b".to_string(), json!({"fail": true}))]);
    assert_eq!(
        sink.entries(),
        vec![Diagnostic::CallbackFailure {
            event: "e".to_string(),
            observer: "\"a\"".to_string(),
            position: 0,
            message: "cannot handle {\"fail\":true}".to_string(),
        }]
    );
}

#[test]
fn test_reset_leaves_events_known_but_empty() {
    let (registry, _sink, calls) = setup();
    registry.subscribe("signin", "obs".to_string(), record(&calls, "signin"));
    registry.subscribe(DEFAULT_EVENT, "obs".to_string(), record(&calls, "default"));

    registry.reset();

    assert!(!registry.is_subscribed(DEFAULT_EVENT));
    assert!(!registry.is_subscribed("signin"));
    assert!(registry.is_known("signin"));

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.subscription_count(), 0);

    registry.publish("signin", &Value::Null);
    assert!(calls.lock().is_empty());
}

#[test]
fn test_subscribe_during_publish_waits_for_next_publish() {
    let (registry, _sink, calls) = setup();

    let inner = registry.clone();
    let late_calls = calls.clone();
    registry.subscribe("e", "spawner".to_string(), move |_| {
        let late_calls = late_calls.clone();
        inner.subscribe("e", "late".to_string(), move |data: &Value| {
            late_calls.lock().push(("late".to_string(), data.clone()));
        });
    });

    registry.publish("e", &json!(1));
    assert!(calls.lock().is_empty());
    assert_eq!(registry.subscriber_count("e"), 2);

    registry.publish("e", &json!(2));
    assert_eq!(*calls.lock(), vec![("late".to_string(), json!(2))]);
}

#[test]
fn test_unsubscribe_during_publish_keeps_current_dispatch() {
    let (registry, _sink, calls) = setup();

    let inner = registry.clone();
    registry.subscribe("e", "remover".to_string(), move |_| {
        inner.unsubscribe("e", "victim");
    });
    registry.subscribe("e", "victim".to_string(), record(&calls, "victim"));

    registry.publish("e", &json!(1));
    assert_eq!(*calls.lock(), vec![("victim".to_string(), json!(1))]);

    registry.publish("e", &json!(2));
    assert_eq!(calls.lock().len(), 1);
    assert_eq!(registry.snapshot().get("e"), Some(&["remover".to_string()][..]));
}

#[test]
fn test_snapshot_serializes_in_insertion_order() {
    let (registry, _sink, calls) = setup();
    registry.subscribe("signout", "b".to_string(), record(&calls, "b"));
    registry.subscribe("signin", "a".to_string(), record(&calls, "a"));

    let rendered = serde_json::to_string(&registry.snapshot()).unwrap();
    assert_eq!(rendered, r#"{"default":[],"signout":["b"],"signin":["a"]}"#);
}

#[test]
fn test_numeric_observer_identity() {
    let sink = MemorySink::new();
    let registry: Registry<u8, u32> = Registry::with_sink(Arc::new(sink.clone()));

    registry.subscribe("e", 7, |_| {});
    registry.subscribe("e", 9, |_| {});
    registry.unsubscribe("e", &7_u32);

    assert_eq!(registry.snapshot().get("e"), Some(&[9][..]));
    assert!(sink.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publishers_and_subscribers() {
    let (registry, sink, _calls) = setup();
    let count = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for i in 0..8 {
        let registry = registry.clone();
        let count = count.clone();
        handles.push(tokio::spawn(async move {
            registry.subscribe("shared", format!("obs{i}"), move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            });
            registry.publish("shared", &json!(i));
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(registry.subscriber_count("shared"), 8);
    count.store(0, Ordering::SeqCst);
    registry.publish("shared", &Value::Null);
    assert_eq!(count.load(Ordering::SeqCst), 8);
    assert!(sink.is_empty());
}
