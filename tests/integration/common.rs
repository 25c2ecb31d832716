//! Shared fixture: a mock org serving the async API endpoints, plus a fake
//! session provider pointing at it.

use hopper_sf_api::{BulkClient, SessionProvider};
use wiremock::MockServer;

pub const SESSION_TOKEN: &str = "00Dxx0000001gPL!test.session.token";
pub const JOB_ID: &str = "750xx000000001AAA";

/// A fake org behind a mock server.
pub struct MockOrg {
    pub server: MockServer,
}

impl MockOrg {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn provider(&self) -> FakeProvider {
        FakeProvider {
            host: self.server.uri(),
            token: SESSION_TOKEN.to_string(),
        }
    }

    pub fn client(&self) -> BulkClient {
        BulkClient::new(&self.provider()).expect("client from mock org session")
    }
}

/// Hands out a fixed session, the way an externally managed login would.
pub struct FakeProvider {
    host: String,
    token: String,
}

impl SessionProvider for FakeProvider {
    fn session_id(&self) -> &str {
        &self.token
    }

    fn instance_host(&self) -> &str {
        &self.host
    }

    fn api_version(&self) -> &str {
        "62.0"
    }
}

pub fn job_doc(operation: &str, state: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<jobInfo xmlns="http://www.force.com/2009/06/asyncapi/dataload">
 <id>{JOB_ID}</id>
 <operation>{operation}</operation>
 <object>Account</object>
 <state>{state}</state>
 <concurrencyMode>Parallel</concurrencyMode>
 <contentType>CSV</contentType>
</jobInfo>"#
    )
}

pub fn batch_doc(batch_id: &str, state: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<batchInfo xmlns="http://www.force.com/2009/06/asyncapi/dataload">
 <id>{batch_id}</id>
 <jobId>{JOB_ID}</jobId>
 <state>{state}</state>
</batchInfo>"#
    )
}

pub fn batch_list_doc(entries: &[(&str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(batch_id, state)| {
            format!(
                " <batchInfo><id>{batch_id}</id><jobId>{JOB_ID}</jobId><state>{state}</state></batchInfo>\n"
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<batchInfoList xmlns=\"http://www.force.com/2009/06/asyncapi/dataload\">\n{body}</batchInfoList>"
    )
}

/// Build a CSV query page of `count` Id/Name records starting at `start`.
pub fn csv_page(start: usize, count: usize) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Id", "Name"]).expect("write header");
    for i in start..start + count {
        writer
            .write_record([format!("001xx{i:012}"), format!("Account {i}")])
            .expect("write record");
    }
    String::from_utf8(writer.into_inner().expect("flush csv")).expect("utf8 csv")
}

/// Build an ingest result body of `count` successful rows.
pub fn result_page(count: usize) -> String {
    let mut body = String::from("\"Id\",\"Success\",\"Created\",\"Error\"\n");
    for i in 0..count {
        body.push_str(&format!("\"001xx{i:012}\",\"true\",\"true\",\"\"\n"));
    }
    body
}
