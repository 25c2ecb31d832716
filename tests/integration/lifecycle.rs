//! End-to-end ingest: create, chunked submit, close, poll, results.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, Request, ResponseTemplate};

use hopper_sf_api::bulk::{BatchState, ErrorKind, JobState};
use hopper_sf_api::{ChunkPolicy, JobSpec, PollPolicy, Table};

use crate::common::{batch_doc, batch_list_doc, job_doc, result_page, MockOrg, JOB_ID, SESSION_TOKEN};

fn account_table(rows: usize) -> Table {
    let mut table = Table::new(vec!["Name".to_string(), "Industry".to_string()]);
    for i in 0..rows {
        table.push_row(vec![format!("Account {i}"), "Technology".to_string()]);
    }
    table
}

async fn mount_ingest_org(org: &MockOrg, batch_lists: Vec<String>) {
    // Job creation.
    Mock::given(method("POST"))
        .and(path("/services/async/62.0/job"))
        .and(header("X-SFDC-Session", SESSION_TOKEN))
        .and(body_string_contains("<operation>insert</operation>"))
        .respond_with(ResponseTemplate::new(201).set_body_string(job_doc("insert", "Open")))
        .expect(1)
        .mount(&org.server)
        .await;

    // Batch submission, handing out sequential batch ids.
    let submissions = Arc::new(AtomicU32::new(0));
    Mock::given(method("POST"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}/batch")))
        .and(header("Content-Type", "text/csv; charset=UTF-8"))
        .respond_with(move |_: &Request| {
            let n = submissions.fetch_add(1, Ordering::SeqCst);
            ResponseTemplate::new(201)
                .set_body_string(batch_doc(&format!("751xx00000000{n}AAA"), "Queued"))
        })
        .mount(&org.server)
        .await;

    // Close.
    Mock::given(method("POST"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}")))
        .and(body_string_contains("<state>Closed</state>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_doc("insert", "Closed")))
        .expect(1)
        .mount(&org.server)
        .await;

    // Job status during polling.
    Mock::given(method("GET"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_doc("insert", "Closed")))
        .mount(&org.server)
        .await;

    // Batch list walks through the given bodies and stays on the last one.
    let polls = Arc::new(AtomicU32::new(0));
    Mock::given(method("GET"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}/batch")))
        .respond_with(move |_: &Request| {
            let n = polls.fetch_add(1, Ordering::SeqCst) as usize;
            let body = batch_lists[n.min(batch_lists.len() - 1)].clone();
            ResponseTemplate::new(200).set_body_string(body)
        })
        .mount(&org.server)
        .await;
}

async fn mount_result(org: &MockOrg, batch_id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/services/async/62.0/job/{JOB_ID}/batch/{batch_id}/result"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&org.server)
        .await;
}

#[tokio::test]
async fn load_splits_polls_and_returns_one_row_per_input_row() {
    let org = MockOrg::start().await;
    mount_ingest_org(
        &org,
        vec![
            batch_list_doc(&[
                ("751xx000000000AAA", "Completed"),
                ("751xx000000001AAA", "InProgress"),
                ("751xx000000002AAA", "Queued"),
            ]),
            batch_list_doc(&[
                ("751xx000000000AAA", "Completed"),
                ("751xx000000001AAA", "Completed"),
                ("751xx000000002AAA", "Completed"),
            ]),
        ],
    )
    .await;
    mount_result(&org, "751xx000000000AAA", result_page(10)).await;
    mount_result(&org, "751xx000000001AAA", result_page(10)).await;
    mount_result(&org, "751xx000000002AAA", result_page(5)).await;

    let client = org
        .client()
        .with_chunk_policy(ChunkPolicy::new().with_max_rows(10))
        .with_poll_policy(PollPolicy::new(Duration::from_millis(20), 10));

    let outcome = client
        .run_load(&JobSpec::insert("Account"), &account_table(25))
        .await
        .expect("full load");

    assert_eq!(outcome.job.state, JobState::Closed);
    assert_eq!(outcome.batches.len(), 3);
    assert!(outcome
        .batches
        .iter()
        .all(|b| b.state == BatchState::Completed));
    // One result row per input row.
    assert_eq!(outcome.results.row_count(), 25);

    let outcomes = outcome.results.outcomes().expect("ingest outcome columns");
    assert!(outcomes.iter().all(|row| row.success && row.created));
}

#[tokio::test]
async fn load_of_empty_table_completes_without_submitting_batches() {
    let org = MockOrg::start().await;
    // No batch-submission mock is mounted: a POST to the batch path would
    // hit the fallthrough 404 and fail the load.
    Mock::given(method("POST"))
        .and(path("/services/async/62.0/job"))
        .and(body_string_contains("<operation>insert</operation>"))
        .respond_with(ResponseTemplate::new(201).set_body_string(job_doc("insert", "Open")))
        .expect(1)
        .mount(&org.server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}")))
        .and(body_string_contains("<state>Closed</state>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_doc("insert", "Closed")))
        .expect(1)
        .mount(&org.server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_doc("insert", "Closed")))
        .mount(&org.server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}/batch")))
        .respond_with(ResponseTemplate::new(200).set_body_string(batch_list_doc(&[])))
        .expect(1)
        .mount(&org.server)
        .await;

    let client = org
        .client()
        .with_poll_policy(PollPolicy::new(Duration::from_millis(20), 3));
    let outcome = client
        .run_load(&JobSpec::insert("Account"), &account_table(0))
        .await
        .expect("empty load");

    // The empty load finishes on the first poll instead of timing out.
    assert_eq!(outcome.job.state, JobState::Closed);
    assert!(outcome.batches.is_empty());
    assert_eq!(outcome.results.row_count(), 0);
}

#[tokio::test]
async fn load_with_failed_batch_returns_recovered_rows_and_gap() {
    let org = MockOrg::start().await;
    mount_ingest_org(
        &org,
        vec![batch_list_doc(&[
            ("751xx000000000AAA", "Completed"),
            ("751xx000000001AAA", "Failed"),
            ("751xx000000002AAA", "Completed"),
        ])],
    )
    .await;
    mount_result(&org, "751xx000000000AAA", result_page(10)).await;
    mount_result(&org, "751xx000000002AAA", result_page(5)).await;

    let client = org
        .client()
        .with_chunk_policy(ChunkPolicy::new().with_max_rows(10))
        .with_poll_policy(PollPolicy::new(Duration::from_millis(20), 10));

    let err = client
        .run_load(&JobSpec::insert("Account"), &account_table(25))
        .await
        .expect_err("failed batch must not vanish");

    let partial = err.into_partial_result().expect("partial result attached");
    assert_eq!(partial.recovered.row_count(), 15);
    assert_eq!(partial.gaps.len(), 1);
    assert_eq!(partial.gaps[0].batch_id, "751xx000000001AAA");
    assert_eq!(partial.gaps[0].state, BatchState::Failed);
}

#[tokio::test]
async fn submitting_to_closed_job_is_rejected_locally() {
    let org = MockOrg::start().await;
    mount_ingest_org(
        &org,
        vec![batch_list_doc(&[("751xx000000000AAA", "Completed")])],
    )
    .await;
    mount_result(&org, "751xx000000000AAA", result_page(3)).await;

    let client = org
        .client()
        .with_poll_policy(PollPolicy::new(Duration::from_millis(20), 10));
    let outcome = client
        .run_load(&JobSpec::insert("Account"), &account_table(3))
        .await
        .expect("load");

    // The job came back closed; trying to add more batches fails before
    // any request is made.
    let err = client
        .submit_table(&outcome.job, &account_table(1))
        .await
        .expect_err("closed job accepts no batches");
    assert!(matches!(err.kind, ErrorKind::InvalidOperation(_)));
}
