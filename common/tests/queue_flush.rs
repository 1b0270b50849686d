mod support;

use common::submission::flusher::{FlushOutcome, FlushReport, QueueFlusher};
use common::submission::gateway::GatewayError;
use common::submission::store::{MemorySlot, SlotStore, SubmissionStore};
use std::rc::Rc;
use support::{payload, RecordingGateway};

fn store_with(entities: &[&str]) -> SlotStore<MemorySlot> {
    let store = SlotStore::new(MemorySlot::new());
    for entity in entities {
        store.enqueue("tpl", payload(entity), None).unwrap();
    }
    store
}

#[tokio::test]
async fn successful_flush_empties_the_queue() {
    let store = store_with(&["a", "b", "c"]);
    let gateway = RecordingGateway::accepting();

    let outcome = QueueFlusher::new().flush(&store, &gateway).await.unwrap();

    assert_eq!(
        outcome,
        FlushOutcome::Completed(FlushReport {
            successes: 3,
            failures: 0,
            rejected: 0,
        })
    );
    assert!(store.peek().is_empty());
    assert_eq!(gateway.entity_ids(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn only_the_failed_item_is_retained() {
    let store = store_with(&["first", "second", "third"]);
    let second = store.peek()[1].clone();
    let gateway = RecordingGateway::failing(|req| {
        (req.payload.entity_id == "second").then(|| GatewayError::Network("timeout".into()))
    });

    let report = QueueFlusher::new()
        .flush(&store, &gateway)
        .await
        .unwrap()
        .report()
        .unwrap();

    assert_eq!(report.successes, 2);
    assert_eq!(report.failures, 1);
    assert_eq!(store.peek(), vec![second]);
    assert_eq!(gateway.entity_ids(), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn retained_items_keep_their_relative_order() {
    let store = store_with(&["a", "b", "c", "d", "e"]);
    let gateway = RecordingGateway::failing(|req| {
        matches!(req.payload.entity_id.as_str(), "b" | "d")
            .then(|| GatewayError::Server {
                status: 500,
                message: "boom".into(),
            })
    });

    QueueFlusher::new().flush(&store, &gateway).await.unwrap();

    let kept: Vec<String> = store.peek().into_iter().map(|i| i.payload.entity_id).collect();
    assert_eq!(kept, vec!["b", "d"]);
}

#[tokio::test]
async fn total_failure_leaves_the_queue_untouched() {
    let store = store_with(&["a", "b"]);
    let before = store.peek();

    let outcome = QueueFlusher::new()
        .flush(&store, &RecordingGateway::unreachable())
        .await
        .unwrap();

    assert_eq!(outcome.report().unwrap().failures, 2);
    assert_eq!(store.peek(), before);
}

#[tokio::test]
async fn refused_items_are_kept_and_counted_apart() {
    let store = store_with(&["ok", "invalid", "gone", "flaky"]);
    let gateway = RecordingGateway::failing(|req| match req.payload.entity_id.as_str() {
        "invalid" => Some(GatewayError::Rejected(
            [("name".to_string(), "Name is required".to_string())].into(),
        )),
        "gone" => Some(GatewayError::Server {
            status: 404,
            message: "Template tpl not found".into(),
        }),
        "flaky" => Some(GatewayError::Server {
            status: 503,
            message: "busy".into(),
        }),
        _ => None,
    });

    let report = QueueFlusher::new()
        .flush(&store, &gateway)
        .await
        .unwrap()
        .report()
        .unwrap();

    assert_eq!(
        report,
        FlushReport {
            successes: 1,
            failures: 3,
            rejected: 2,
        }
    );
    let kept: Vec<String> = store.peek().into_iter().map(|i| i.payload.entity_id).collect();
    assert_eq!(kept, vec!["invalid", "gone", "flaky"]);
}

#[tokio::test]
async fn queue_ids_are_forwarded_for_idempotency() {
    let store = store_with(&["a"]);
    let id = store.peek()[0].id.clone();
    let gateway = RecordingGateway::accepting();

    QueueFlusher::new().flush(&store, &gateway).await.unwrap();

    assert_eq!(
        gateway.requests.borrow()[0].client_submission_id.as_deref(),
        Some(id.as_str())
    );
}

#[tokio::test]
async fn submissions_enqueued_during_a_flush_survive_it() {
    let store = Rc::new(store_with(&["a", "b"]));
    let late_store = Rc::clone(&store);
    let gateway = RecordingGateway::accepting().with_hook(move |req| {
        if req.payload.entity_id == "a" {
            late_store.enqueue("tpl", payload("late"), None).unwrap();
        }
    });

    QueueFlusher::new().flush(&*store, &gateway).await.unwrap();

    let kept: Vec<String> = store.peek().into_iter().map(|i| i.payload.entity_id).collect();
    assert_eq!(kept, vec!["late"]);
    assert_eq!(gateway.entity_ids(), vec!["a", "b"]);
}

#[tokio::test]
async fn concurrent_flush_requests_collapse_into_one() {
    let store = store_with(&["a", "b"]);
    let gateway = RecordingGateway::accepting();
    let flusher = QueueFlusher::new();

    let (first, second) = tokio::join!(
        flusher.flush(&store, &gateway),
        flusher.flush(&store, &gateway)
    );

    assert_eq!(first.unwrap().report().unwrap().successes, 2);
    assert_eq!(second.unwrap(), FlushOutcome::AlreadyRunning);
    assert_eq!(gateway.calls(), 2);
    assert!(!flusher.is_running());
}

#[tokio::test]
async fn flusher_can_run_again_after_a_pass() {
    let store = store_with(&["a"]);
    let flusher = QueueFlusher::new();

    flusher
        .flush(&store, &RecordingGateway::unreachable())
        .await
        .unwrap();
    assert_eq!(store.len(), 1);

    let outcome = flusher
        .flush(&store, &RecordingGateway::accepting())
        .await
        .unwrap();
    assert_eq!(outcome.report().unwrap().successes, 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn empty_queue_makes_no_requests() {
    let store = SlotStore::new(MemorySlot::with_content("{corrupt"));
    let gateway = RecordingGateway::accepting();

    let outcome = QueueFlusher::new().flush(&store, &gateway).await.unwrap();

    assert_eq!(outcome, FlushOutcome::Completed(FlushReport::default()));
    assert_eq!(gateway.calls(), 0);
}
