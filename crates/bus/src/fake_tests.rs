use super::*;
use futures_util::StreamExt;
use gobw_core::Header;

fn envelope() -> Envelope {
    Envelope::new(Header {
        jobid: Some("job-1".into()),
        ..Default::default()
    })
}

#[tokio::test]
async fn publish_then_consume_routes_by_pattern() {
    let bus = FakeMessageBus::new();
    bus.bind("jobstep_result", "import.result");
    bus.bind("workflow", "workflow.#");

    bus.publish("workflow", "import.result", &envelope()).await.unwrap();
    bus.publish("workflow", "workflow.request", &envelope()).await.unwrap();

    let mut stream = bus.consume("jobstep_result").await.unwrap();
    let delivery = stream.next().await.unwrap().unwrap();
    assert_eq!(delivery.envelope.header.jobid.as_deref(), Some("job-1"));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn ack_and_nack_are_recorded() {
    let bus = FakeMessageBus::new();
    bus.bind("workflow", "workflow.#");
    bus.publish("workflow", "workflow.request", &envelope()).await.unwrap();
    bus.publish("workflow", "workflow.request", &envelope()).await.unwrap();

    let mut stream = bus.consume("workflow").await.unwrap();
    let first = stream.next().await.unwrap().unwrap();
    let second = stream.next().await.unwrap().unwrap();

    bus.ack(first).await.unwrap();
    bus.nack(second).await.unwrap();

    assert_eq!(bus.acked_count(), 1);
    assert_eq!(bus.nacked_count(), 1);
}
