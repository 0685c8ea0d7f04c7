use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use super::config::NvcfConfig;
use super::credentials::Credential;
use super::error::NvcfError;
use super::progress::{Progress, ProgressReporter};
use super::transport::{RequestBody, Transport, TransportRequest, TransportResponse};
use crate::core::models::job::{JobHandle, JobState};
use crate::core::models::request::PredictionRequest;
use crate::core::models::result::PredictionResult;

const TASK_ID_HEADER: &str = "nvcf-reqid";

/// Submit-and-poll client for NVIDIA Cloud Functions endpoints.
///
/// One [`call`](NvcfClient::call) drives a single request from submission to
/// exactly one terminal outcome. The client keeps no state between calls, so a
/// shared instance can serve any number of concurrent requests.
#[derive(Clone)]
pub struct NvcfClient {
    transport: Arc<dyn Transport>,
    config: NvcfConfig,
    credential: Option<Credential>,
}

impl NvcfClient {
    /// A missing credential is only reported when [`call`](Self::call) runs.
    pub fn new(
        transport: Arc<dyn Transport>,
        config: NvcfConfig,
        credential: Option<Credential>,
    ) -> Self {
        Self {
            transport,
            config,
            credential,
        }
    }

    pub fn config(&self) -> &NvcfConfig {
        &self.config
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    pub async fn call(
        &self,
        endpoint: &str,
        request: &PredictionRequest,
        reporter: &ProgressReporter<'_>,
    ) -> Result<PredictionResult, NvcfError> {
        let credential = self.credential.as_ref().ok_or_else(|| {
            NvcfError::Configuration("no NVCF API key configured".to_string())
        })?;
        let headers = vec![
            ("Authorization".to_string(), credential.bearer()),
            (
                "NVCF-POLL-SECONDS".to_string(),
                self.config.poll_seconds.to_string(),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];

        let mut state = JobState::default();
        loop {
            match state.clone() {
                JobState::NotSubmitted => {
                    let response = self.submit(endpoint, request, &headers, reporter).await?;
                    match response.status {
                        200 => {
                            debug!("Request completed synchronously");
                            state.resolve();
                            return parse_body(&response);
                        }
                        202 => {
                            let handle = task_handle(&response)?;
                            info!(task_id = handle.task_id(), "Job accepted, polling for result");
                            reporter.report(Progress::JobAccepted {
                                task_id: handle.task_id().to_string(),
                            });
                            state.accept(handle);
                        }
                        status => {
                            warn!(status, "Submission rejected");
                            state.resolve();
                            return Err(NvcfError::Service {
                                status,
                                body: response.body,
                            });
                        }
                    }
                }
                JobState::Pending(handle) => {
                    let outcome = self.poll(&handle, &headers, reporter).await;
                    state.resolve();
                    return outcome;
                }
                JobState::Resolved => {
                    return Err(NvcfError::Protocol("job was already resolved".to_string()));
                }
            }
        }
    }

    async fn submit(
        &self,
        endpoint: &str,
        request: &PredictionRequest,
        headers: &[(String, String)],
        reporter: &ProgressReporter<'_>,
    ) -> Result<TransportResponse, NvcfError> {
        reporter.report(Progress::PhaseStart {
            name: "Submitting job",
        });
        info!(
            endpoint,
            poll_seconds = self.config.poll_seconds,
            "Submitting prediction request"
        );
        let submit = TransportRequest::post(
            endpoint,
            RequestBody::Json(request.as_json().clone()),
            self.config.timeout,
        )
        .with_headers(headers);
        let response = self.transport.send(submit).await?;
        reporter.report(Progress::PhaseFinish);
        Ok(response)
    }

    async fn poll(
        &self,
        handle: &JobHandle,
        headers: &[(String, String)],
        reporter: &ProgressReporter<'_>,
    ) -> Result<PredictionResult, NvcfError> {
        let url = self.config.status_url_for(handle.task_id());
        let started = Instant::now();
        // `None` when the budget lies beyond what the clock can represent.
        let deadline = started.checked_add(self.config.max_wait);
        let mut attempt: u32 = 0;

        reporter.report(Progress::PhaseStart {
            name: "Waiting for result",
        });
        loop {
            attempt += 1;
            let poll = TransportRequest::get(&url, self.config.timeout).with_headers(headers);
            let response = self.transport.send(poll).await?;
            debug!(attempt, status = response.status, "Polled job status");
            reporter.report(Progress::PollAttempt {
                attempt,
                status: response.status,
            });

            if response.status == 200 {
                reporter.report(Progress::PhaseFinish);
                info!(task_id = handle.task_id(), attempt, "Job finished");
                return parse_body(&response);
            }
            if self.config.status_policy.is_terminal_failure(response.status) {
                reporter.report(Progress::PhaseFinish);
                warn!(
                    task_id = handle.task_id(),
                    status = response.status,
                    "Job failed"
                );
                return Err(NvcfError::Service {
                    status: response.status,
                    body: response.body,
                });
            }

            if budget_exhausted(deadline, self.config.poll_interval) {
                reporter.report(Progress::PhaseFinish);
                return Err(NvcfError::PollBudgetExhausted {
                    task_id: handle.task_id().to_string(),
                    waited: started.elapsed(),
                });
            }
            sleep(self.config.poll_interval).await;
        }
    }
}

fn budget_exhausted(deadline: Option<Instant>, poll_interval: Duration) -> bool {
    let Some(deadline) = deadline else {
        return false;
    };
    Instant::now()
        .checked_add(poll_interval)
        .is_none_or(|next| next > deadline)
}

fn task_handle(response: &TransportResponse) -> Result<JobHandle, NvcfError> {
    response
        .header(TASK_ID_HEADER)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(JobHandle::new)
        .ok_or_else(|| NvcfError::Protocol("Missing nvcf-reqid header".to_string()))
}

fn parse_body(response: &TransportResponse) -> Result<PredictionResult, NvcfError> {
    serde_json::from_str::<Value>(&response.body)
        .map(PredictionResult::new)
        .map_err(|e| NvcfError::Protocol(format!("response body is not valid JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{NvcfConfigBuilder, StatusPolicy};
    use crate::engine::transport::mock::ScriptedTransport;
    use crate::engine::transport::{Method, TransportError, TransportErrorKind};
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    const ENDPOINT: &str = "https://health.example/v1/predict";

    fn config() -> NvcfConfig {
        NvcfConfigBuilder::new()
            .poll_seconds(300)
            .timeout(Duration::from_secs(400))
            .build()
            .unwrap()
    }

    fn client_with(transport: Arc<ScriptedTransport>, config: NvcfConfig) -> NvcfClient {
        NvcfClient::new(transport, config, Credential::new("nvapi-test"))
    }

    fn accepted(task_id: &str) -> TransportResponse {
        TransportResponse::new(202, "").with_header("NVCF-REQID", task_id)
    }

    fn payload() -> PredictionRequest {
        PredictionRequest::new(json!({"polymers": [{"id": "A", "sequence": "MKT"}]}))
    }

    #[tokio::test(start_paused = true)]
    async fn synchronous_200_returns_body_without_polling() {
        let body = json!({"structures": [{"structure": "ATOM"}], "confidence_scores": [0.9]});
        let transport =
            Arc::new(ScriptedTransport::new().respond(TransportResponse::new(200, body.to_string())));
        let client = client_with(transport.clone(), config());

        let result = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap();

        assert_eq!(result.into_json(), body);
        assert_eq!(transport.count(Method::Get), 0);
        assert_eq!(transport.count(Method::Post), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn submission_carries_auth_poll_and_content_headers() {
        let transport =
            Arc::new(ScriptedTransport::new().respond(TransportResponse::new(200, "{}")));
        let client = client_with(transport.clone(), config());
        client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.url, ENDPOINT);
        assert_eq!(sent.header("authorization"), Some("Bearer nvapi-test"));
        assert_eq!(sent.header("nvcf-poll-seconds"), Some("300"));
        assert_eq!(sent.header("content-type"), Some("application/json"));
        assert_eq!(sent.timeout, Duration::from_secs(400));
        assert_eq!(sent.body, Some(RequestBody::Json(payload().as_json().clone())));
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_job_is_polled_until_success() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted("abc123"))
                .respond(TransportResponse::new(202, ""))
                .respond(TransportResponse::new(202, ""))
                .respond(TransportResponse::new(200, r#"{"structures": []}"#)),
        );
        let client = client_with(transport.clone(), config());

        let result = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap();

        assert_eq!(result.as_json(), &json!({"structures": []}));
        let gets: Vec<_> = transport
            .requests()
            .into_iter()
            .filter(|r| r.method == Method::Get)
            .collect();
        assert_eq!(gets.len(), 3);
        for get in &gets {
            assert!(get.url.contains("abc123"));
            assert_eq!(get.header("authorization"), Some("Bearer nvapi-test"));
            assert_eq!(get.timeout, Duration::from_secs(400));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn missing_task_id_header_is_protocol_error_without_polling() {
        let transport =
            Arc::new(ScriptedTransport::new().respond(TransportResponse::new(202, "")));
        let client = client_with(transport.clone(), config());

        let err = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap_err();

        assert!(matches!(err, NvcfError::Protocol(msg) if msg.contains("nvcf-reqid")));
        assert_eq!(transport.count(Method::Get), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_task_id_header_counts_as_missing() {
        let transport = Arc::new(ScriptedTransport::new().respond(accepted("  ")));
        let client = client_with(transport.clone(), config());

        let err = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap_err();

        assert!(matches!(err, NvcfError::Protocol(_)));
        assert_eq!(transport.count(Method::Get), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_500_is_service_error_and_stops_polling() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted("t-500"))
                .respond(TransportResponse::new(500, "internal failure"))
                .otherwise(TransportResponse::new(200, "{}")),
        );
        let client = client_with(transport.clone(), config());

        let err = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap_err();

        match err {
            NvcfError::Service { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal failure");
            }
            other => panic!("expected service error, got {other:?}"),
        }
        assert_eq!(transport.count(Method::Get), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn every_default_failure_status_is_terminal() {
        for status in [400, 401, 404, 422, 500] {
            let transport = Arc::new(
                ScriptedTransport::new()
                    .respond(accepted("t"))
                    .respond(TransportResponse::new(status, "nope")),
            );
            let client = client_with(transport.clone(), config());
            let err = client
                .call(ENDPOINT, &payload(), &ProgressReporter::new())
                .await
                .unwrap_err();
            assert_eq!(err.status(), Some(status));
            assert_eq!(transport.count(Method::Get), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn poll_503_keeps_polling() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted("t-503"))
                .respond(TransportResponse::new(503, "busy"))
                .respond(TransportResponse::new(503, "busy"))
                .respond(TransportResponse::new(200, r#"{"ok": true}"#)),
        );
        let client = client_with(transport.clone(), config());

        let result = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap();

        assert_eq!(result.as_json(), &json!({"ok": true}));
        assert_eq!(transport.count(Method::Get), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_policy_makes_503_terminal() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted("t"))
                .respond(TransportResponse::new(503, "down")),
        );
        let mut config = config();
        config.status_policy = StatusPolicy::new([503]);
        let client = client_with(transport.clone(), config);

        let err = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_credential_fails_before_any_request() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = NvcfClient::new(transport.clone(), config(), None);

        let err = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap_err();

        assert!(matches!(err, NvcfError::Configuration(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_body_round_trips_unmodified() {
        let body = json!({
            "structures": [{"structure": "ATOM  1", "source": "a.pdb", "meta": {"x": [1, {"y": null}]}}],
            "confidence_scores": [0.9]
        });
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted("rt"))
                .respond(TransportResponse::new(200, body.to_string())),
        );
        let client = client_with(transport, config());

        let result = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap();
        assert_eq!(result.into_json(), body);
    }

    #[tokio::test(start_paused = true)]
    async fn non_json_terminal_body_is_protocol_error() {
        let transport = Arc::new(
            ScriptedTransport::new().respond(TransportResponse::new(200, "<html>oops</html>")),
        );
        let client = client_with(transport, config());

        let err = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap_err();
        assert!(matches!(err, NvcfError::Protocol(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_submission_is_service_error() {
        let transport = Arc::new(
            ScriptedTransport::new().respond(TransportResponse::new(403, "forbidden")),
        );
        let client = client_with(transport.clone(), config());

        let err = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(transport.count(Method::Get), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_is_distinct_from_service_error() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted("t"))
                .fail(TransportError::new(TransportErrorKind::Timeout, "poll timed out")),
        );
        let client = client_with(transport, config());

        let err = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap_err();
        assert!(matches!(err, NvcfError::Transport(e) if e.is_timeout()));
    }

    #[tokio::test(start_paused = true)]
    async fn endless_pending_exhausts_poll_budget() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted("slow"))
                .otherwise(TransportResponse::new(202, "")),
        );
        let mut config = config();
        config.max_wait = Duration::from_secs(10);
        config.poll_interval = Duration::from_secs(1);
        let client = client_with(transport.clone(), config);

        let err = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap_err();

        match err {
            NvcfError::PollBudgetExhausted { task_id, waited } => {
                assert_eq!(task_id, "slow");
                assert!(waited <= Duration::from_secs(10));
            }
            other => panic!("expected budget exhaustion, got {other:?}"),
        }
        assert_eq!(transport.count(Method::Get), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn budget_beyond_clock_range_polls_without_overflow() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted("abc123"))
                .respond(TransportResponse::new(202, ""))
                .respond(TransportResponse::new(200, "{}")),
        );
        let mut config = config();
        config.max_wait = Duration::from_secs(u64::MAX);
        let client = client_with(transport.clone(), config);

        let result = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap();

        assert_eq!(result.as_json(), &json!({}));
        assert_eq!(transport.count(Method::Get), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn huge_poll_interval_ends_budget_instead_of_overflowing() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted("abc123"))
                .otherwise(TransportResponse::new(202, "")),
        );
        let mut config = config();
        config.poll_interval = Duration::from_secs(u64::MAX);
        let client = client_with(transport.clone(), config);

        let err = client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap_err();

        assert!(matches!(err, NvcfError::PollBudgetExhausted { .. }));
        assert_eq!(transport.count(Method::Get), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_job_polls_the_accepted_task_only_once_resolved() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted("t-7"))
                .respond(TransportResponse::new(503, "busy"))
                .respond(TransportResponse::new(200, "{\"ok\": true}")),
        );
        let client = client_with(transport.clone(), config());

        client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(transport.count(Method::Post), 1);
        assert!(requests[1..].iter().all(|r| r.url.ends_with("/t-7")));
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn status_url_template_is_honored() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted("xyz"))
                .respond(TransportResponse::new(200, "{}")),
        );
        let mut config = config();
        config.status_url = "http://localhost:9000/jobs/{task_id}/status".to_string();
        let client = client_with(transport.clone(), config);

        client
            .call(ENDPOINT, &payload(), &ProgressReporter::new())
            .await
            .unwrap();
        assert_eq!(
            transport.requests()[1].url,
            "http://localhost:9000/jobs/xyz/status"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn progress_reports_acceptance_and_poll_attempts() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted("p1"))
                .respond(TransportResponse::new(202, ""))
                .respond(TransportResponse::new(200, "{}")),
        );
        let client = client_with(transport, config());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));

        client.call(ENDPOINT, &payload(), &reporter).await.unwrap();

        let events = events.lock().unwrap();
        assert!(events.iter().any(
            |e| matches!(e, Progress::JobAccepted { task_id } if task_id == "p1")
        ));
        let attempts: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Progress::PollAttempt { attempt, status } => Some((*attempt, *status)),
                _ => None,
            })
            .collect();
        assert_eq!(attempts, vec![(1, 202), (2, 200)]);
    }
}
