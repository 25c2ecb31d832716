//! Failure handling: local validation, poll budgets, aborted jobs.

use std::time::{Duration, Instant};

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use hopper_sf_api::bulk::{
    ConcurrencyMode, ContentType, ErrorKind, Job, JobState, Operation,
};
use hopper_sf_api::{ChunkPolicy, PollPolicy, Table};

use crate::common::{batch_list_doc, job_doc, MockOrg, JOB_ID};

fn open_job() -> Job {
    Job {
        id: JOB_ID.to_string(),
        object_type: "Account".to_string(),
        operation: Operation::Insert,
        content_type: ContentType::Csv,
        concurrency_mode: ConcurrencyMode::Parallel,
        state: JobState::Open,
        external_id_field_name: None,
    }
}

#[tokio::test]
async fn query_without_from_clause_never_reaches_the_org() {
    let org = MockOrg::start().await;
    let client = org.client();

    let err = client
        .run_query("SELECT Id, Name LIMIT 10")
        .await
        .expect_err("no FROM clause");

    assert!(matches!(err.kind, ErrorKind::InvalidOperation(_)));
    let requests = org.server.received_requests().await.expect("recording on");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn oversized_row_fails_before_any_upload() {
    let org = MockOrg::start().await;
    let client = org
        .client()
        .with_chunk_policy(ChunkPolicy::new().with_max_bytes(8));

    let mut table = Table::new(vec!["Name".to_string()]);
    table.push_row(vec!["A name far larger than the payload cap".to_string()]);

    let err = client
        .submit_table(&open_job(), &table)
        .await
        .expect_err("row exceeds byte cap");

    assert!(matches!(
        err.kind,
        ErrorKind::ChunkTooLarge { limit: 8, .. }
    ));
    let requests = org.server.received_requests().await.expect("recording on");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn poll_budget_exhaustion_reports_attempt_count() {
    let org = MockOrg::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_doc("insert", "Closed")))
        .expect(3)
        .mount(&org.server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}/batch")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(batch_list_doc(&[("751xx000000000AAA", "InProgress")])),
        )
        .expect(3)
        .mount(&org.server)
        .await;

    let interval = Duration::from_millis(30);
    let client = org.client().with_poll_policy(PollPolicy::new(interval, 3));

    let started = Instant::now();
    let err = client
        .await_completion(JOB_ID)
        .await
        .expect_err("batches never finish");

    match err.kind {
        ErrorKind::PollTimeout { job_id, attempts } => {
            assert_eq!(job_id, JOB_ID);
            assert_eq!(attempts, 3);
        }
        other => panic!("expected poll timeout, got {other:?}"),
    }
    // Two sleeps between the three polls.
    assert!(started.elapsed() >= interval * 2);
}

#[tokio::test]
async fn aborted_job_fails_fast_without_reading_batches() {
    let org = MockOrg::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_doc("insert", "Aborted")))
        .expect(1)
        .mount(&org.server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}/batch")))
        .respond_with(ResponseTemplate::new(200).set_body_string(batch_list_doc(&[])))
        .expect(0)
        .mount(&org.server)
        .await;

    let client = org.client();
    let err = client
        .await_completion(JOB_ID)
        .await
        .expect_err("aborted job cannot complete");

    match err.kind {
        ErrorKind::JobFailed { job_id, state } => {
            assert_eq!(job_id, JOB_ID);
            assert_eq!(state, JobState::Aborted);
        }
        other => panic!("expected job failure, got {other:?}"),
    }
}
