//! Query round trip: job, SOQL batch, result-id list, paged CSV download.

use std::time::Duration;

use wiremock::matchers::{body_string, body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use hopper_sf_api::PollPolicy;

use crate::common::{batch_doc, csv_page, job_doc, MockOrg, JOB_ID};

const BATCH_ID: &str = "751xx000000000AAA";
const SOQL: &str = "SELECT Id, Name FROM Account";

fn result_list_doc(page_ids: &[&str]) -> String {
    let body: String = page_ids
        .iter()
        .map(|id| format!("<result>{id}</result>"))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<result-list xmlns=\"http://www.force.com/2009/06/asyncapi/dataload\">{body}</result-list>"
    )
}

async fn mount_query_org(org: &MockOrg, pages: Vec<(&str, String)>) {
    Mock::given(method("POST"))
        .and(path("/services/async/62.0/job"))
        .and(body_string_contains("<operation>query</operation>"))
        .and(body_string_contains("<object>Account</object>"))
        .respond_with(ResponseTemplate::new(201).set_body_string(job_doc("query", "Open")))
        .expect(1)
        .mount(&org.server)
        .await;

    // The SOQL text itself is the batch payload.
    Mock::given(method("POST"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}/batch")))
        .and(header("Content-Type", "text/csv; charset=UTF-8"))
        .and(body_string(SOQL))
        .respond_with(ResponseTemplate::new(201).set_body_string(batch_doc(BATCH_ID, "Queued")))
        .expect(1)
        .mount(&org.server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}")))
        .and(body_string_contains("<state>Closed</state>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_doc("query", "Closed")))
        .expect(1)
        .mount(&org.server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/services/async/62.0/job/{JOB_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_doc("query", "Closed")))
        .mount(&org.server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/services/async/62.0/job/{JOB_ID}/batch/{BATCH_ID}"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_string(batch_doc(BATCH_ID, "Completed")))
        .mount(&org.server)
        .await;

    let page_ids: Vec<&str> = pages.iter().map(|(id, _)| *id).collect();
    Mock::given(method("GET"))
        .and(path(format!(
            "/services/async/62.0/job/{JOB_ID}/batch/{BATCH_ID}/result"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_string(result_list_doc(&page_ids)))
        .expect(1)
        .mount(&org.server)
        .await;

    for (page_id, body) in pages {
        Mock::given(method("GET"))
            .and(path(format!(
                "/services/async/62.0/job/{JOB_ID}/batch/{BATCH_ID}/result/{page_id}"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&org.server)
            .await;
    }
}

#[tokio::test]
async fn query_merges_pages_in_order() {
    let org = MockOrg::start().await;
    mount_query_org(
        &org,
        vec![
            ("752xx000000000AAA", csv_page(0, 1000)),
            ("752xx000000001AAA", csv_page(1000, 1000)),
        ],
    )
    .await;

    let client = org
        .client()
        .with_poll_policy(PollPolicy::new(Duration::from_millis(20), 10));
    let table = client.run_query(SOQL).await.expect("query");

    assert_eq!(table.columns(), ["Id", "Name"]);
    assert_eq!(table.row_count(), 2000);
    // First record of page one, then page two exactly where page one ends.
    assert_eq!(table.rows()[0][0], "001xx000000000000");
    assert_eq!(table.rows()[999][1], "Account 999");
    assert_eq!(table.rows()[1000][1], "Account 1000");
}

#[tokio::test]
async fn query_with_no_matches_returns_headers_only() {
    let org = MockOrg::start().await;
    mount_query_org(&org, vec![("752xx000000000AAA", csv_page(0, 0))]).await;

    let client = org
        .client()
        .with_poll_policy(PollPolicy::new(Duration::from_millis(20), 10));
    let table = client.run_query(SOQL).await.expect("query");

    assert_eq!(table.columns(), ["Id", "Name"]);
    assert!(table.is_empty());
}
