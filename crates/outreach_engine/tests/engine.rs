use std::time::Duration;

use outreach_engine::{
    ApiSettings, EngineCommand, EngineEvent, EngineHandle, JobStatusKind, Phase,
    ResearchStartRequest,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(5);

fn next_event(engine: &EngineHandle) -> EngineEvent {
    engine.recv_timeout(WAIT).expect("engine event")
}

fn engine(server: &MockServer) -> EngineHandle {
    let settings = ApiSettings::new(Url::parse(&server.uri()).unwrap());
    EngineHandle::new(settings, Duration::from_millis(10)).unwrap()
}

/// The handle blocks on its event channel, so drive it off the async workers.
async fn blocking<R: Send + 'static>(f: impl FnOnce() -> R + Send + 'static) -> R {
    tokio::task::spawn_blocking(f).await.unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn start_then_poll_until_done() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/research/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"job_id": "r-1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/research/status/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": "r-1", "status": "running", "progress": 0.5,
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/research/status/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": "r-1", "status": "done", "progress": 1.0, "results": [],
        })))
        .mount(&server)
        .await;

    let engine = engine(&server);
    blocking(move || {
        engine.submit(EngineCommand::StartResearch(ResearchStartRequest {
            keyword: "garden".to_string(),
            max_results: 10,
        }));
        match next_event(&engine) {
            EngineEvent::Started { phase, result } => {
                assert_eq!(phase, Phase::Research);
                assert_eq!(result.unwrap(), "r-1");
            }
            other => panic!("unexpected event {other:?}"),
        }

        engine.submit(EngineCommand::Poll {
            phase: Phase::Research,
            job_id: "r-1".to_string(),
        });
        let mut seen = Vec::new();
        for _ in 0..2 {
            match next_event(&engine) {
                EngineEvent::ResearchStatus { job_id, result } => {
                    assert_eq!(job_id, "r-1");
                    seen.push(result.unwrap().status);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(seen, vec![JobStatusKind::Running, JobStatusKind::Done]);
        assert_eq!(engine.recv_timeout(Duration::from_millis(100)), None);
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_start_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/research/start"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let engine = engine(&server);
    blocking(move || {
        engine.submit(EngineCommand::StartResearch(ResearchStartRequest {
            keyword: "garden".to_string(),
            max_results: 10,
        }));
        match next_event(&engine) {
            EngineEvent::Started { phase, result } => {
                assert_eq!(phase, Phase::Research);
                assert_eq!(
                    result.unwrap_err().to_string(),
                    "Internal Server Error (500): boom"
                );
            }
            other => panic!("unexpected event {other:?}"),
        }
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn cancel_stops_event_flow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/send/status/s-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"job_id": "s-1", "status": "running", "progress": 0.2}))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let engine = engine(&server);
    let event = blocking(move || {
        engine.submit(EngineCommand::Poll {
            phase: Phase::Send,
            job_id: "s-1".to_string(),
        });
        engine.submit(EngineCommand::Cancel { phase: Phase::Send });
        engine.recv_timeout(Duration::from_millis(500))
    })
    .await;
    assert_eq!(event, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn health_answers_with_health_event() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let engine = engine(&server);
    let event = blocking(move || {
        engine.submit(EngineCommand::Health);
        next_event(&engine)
    })
    .await;
    assert_eq!(event, EngineEvent::Health { result: Ok(()) });
}
