//! In-memory collaborators for facade tests

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use mailup_common::time::MockClock;
use mailup_domain::{Credentials, MailUpError, ResourceClient, Result};
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::{MailUpService, ServiceSettings};
use crate::ports::{
    AuthenticationHeader, CachedToken, ExchangeTrace, HttpVerb, ProcedureTransport,
    ResourceAuthorizer, ResourceEndpoint, ResourceTransport, ServiceName, TokenStore,
};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub service: ServiceName,
    pub method: String,
    pub args: Vec<(String, Value)>,
    pub header: Option<AuthenticationHeader>,
}

impl RecordedCall {
    pub fn arg(&self, name: &str) -> Option<Value> {
        self.args.iter().find(|(key, _)| key == name).map(|(_, value)| value.clone())
    }
}

/// Scripted procedure transport. The last reply queued for a method is
/// repeated once the queue runs dry.
#[derive(Default)]
pub struct FakeProcedure {
    replies: Mutex<HashMap<String, VecDeque<Value>>>,
    calls: Mutex<Vec<RecordedCall>>,
    traces: Mutex<HashMap<ServiceName, ExchangeTrace>>,
}

impl FakeProcedure {
    pub fn reply(&self, method: &str, reply: Value) {
        self.replies.lock().entry(method.to_string()).or_default().push_back(reply);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.method.clone()).collect()
    }
}

impl ProcedureTransport for FakeProcedure {
    fn invoke(
        &self,
        service: ServiceName,
        method: &str,
        args: &[(&str, Value)],
        header: Option<&AuthenticationHeader>,
    ) -> Result<Value> {
        self.calls.lock().push(RecordedCall {
            service,
            method: method.to_string(),
            args: args.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect(),
            header: header.cloned(),
        });

        let reply = {
            let mut replies = self.replies.lock();
            let queue = replies.get_mut(method);
            match queue {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        let reply = reply
            .ok_or_else(|| MailUpError::Transport(format!("No scripted reply for {method}")))?;

        self.traces.lock().insert(
            service,
            ExchangeTrace {
                request_headers: format!("POST /{service}"),
                request_body: format!("<{method}/>"),
                response_headers: "HTTP/1.1 200 OK".into(),
                response_body: reply.to_string(),
            },
        );
        Ok(reply)
    }

    fn last_exchange(&self, service: ServiceName) -> Option<ExchangeTrace> {
        self.traces.lock().get(&service).cloned()
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub endpoint: ResourceEndpoint,
    pub path: String,
    pub verb: HttpVerb,
    pub body: Option<Value>,
    pub bearer: String,
}

/// Scripted resource transport keyed by path (query string excluded)
#[derive(Default)]
pub struct FakeResource {
    replies: Mutex<HashMap<String, VecDeque<Result<Value>>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeResource {
    pub fn reply(&self, path: &str, reply: Result<Value>) {
        self.replies.lock().entry(path.to_string()).or_default().push_back(reply);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

impl ResourceTransport for FakeResource {
    fn request(
        &self,
        endpoint: ResourceEndpoint,
        path: &str,
        verb: HttpVerb,
        body: Option<&Value>,
        bearer: &str,
    ) -> Result<Value> {
        self.requests.lock().push(RecordedRequest {
            endpoint,
            path: path.to_string(),
            verb,
            body: body.cloned(),
            bearer: bearer.to_string(),
        });

        let key = path.split('?').next().unwrap_or(path);
        self.replies
            .lock()
            .get_mut(key)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(MailUpError::NotFound(format!("No scripted reply for {key}"))))
    }
}

/// Issues `bearer-1`, `bearer-2`, ...
#[derive(Default)]
pub struct FakeAuthorizer {
    grants: Mutex<u32>,
}

impl FakeAuthorizer {
    pub fn grants(&self) -> u32 {
        *self.grants.lock()
    }
}

impl ResourceAuthorizer for FakeAuthorizer {
    fn password_grant(&self, client: &ResourceClient, username: &str, _password: &str) -> Result<String> {
        assert_eq!(client.client_id, "cid");
        assert_eq!(username, "a1234");
        let mut grants = self.grants.lock();
        *grants += 1;
        Ok(format!("bearer-{grants}"))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, CachedToken>>,
}

impl MemoryStore {
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl TokenStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<CachedToken>> {
        Ok(self.records.lock().get(key).cloned())
    }

    fn save(&self, key: &str, token: &CachedToken) -> Result<()> {
        self.records.lock().insert(key.to_string(), token.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.records.lock().remove(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.records.lock().contains_key(key)
    }
}

pub struct Fixture {
    pub service: MailUpService,
    pub procedure: Arc<FakeProcedure>,
    pub resource: Arc<FakeResource>,
    pub authorizer: Arc<FakeAuthorizer>,
    pub store: Arc<MemoryStore>,
    pub clock: MockClock,
}

fn build(settings: ServiceSettings, with_resource: bool) -> Fixture {
    let procedure = Arc::new(FakeProcedure::default());
    let resource = Arc::new(FakeResource::default());
    let authorizer = Arc::new(FakeAuthorizer::default());
    let store = Arc::new(MemoryStore::default());
    let clock = MockClock::at(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());

    let mut credentials = Credentials::new("a1234", "secret", "https://console.example.com/", None).unwrap();
    if with_resource {
        credentials = credentials.with_resource_client("cid", "csecret");
    }

    let procedure_port: Arc<dyn ProcedureTransport> = procedure.clone();
    let store_port: Arc<dyn TokenStore> = store.clone();
    let mut service = MailUpService::new(
        credentials,
        procedure_port,
        Some(store_port),
        Arc::new(clock.clone()),
        settings,
    );
    if with_resource {
        let resource_port: Arc<dyn ResourceTransport> = resource.clone();
        let authorizer_port: Arc<dyn ResourceAuthorizer> = authorizer.clone();
        service = service.with_resource(resource_port, authorizer_port);
    }

    Fixture { service, procedure, resource, authorizer, store, clock }
}

pub fn fixture() -> Fixture {
    build(ServiceSettings::default(), true)
}

pub fn debug_fixture() -> Fixture {
    build(ServiceSettings { debug: true, ..ServiceSettings::default() }, true)
}

pub fn fixture_without_resource() -> Fixture {
    build(ServiceSettings::default(), false)
}

pub fn login_reply(key: &str) -> Value {
    json!({"errorCode": "0", "errorDescription": {}, "accessKey": key})
}

/// Successful send/report reply carrying `body`'s fields.
pub fn ok_reply(body: Value) -> Value {
    let mut reply = json!({"errorCode": "0", "errorDescription": {}});
    if let (Some(reply), Value::Object(fields)) = (reply.as_object_mut(), body) {
        reply.extend(fields);
    }
    reply
}

/// Import reply with `ReturnCode` set to `code`.
pub fn import_reply(code: i64, body: Value) -> Value {
    let mut inner = json!({"ReturnCode": code.to_string()});
    if let (Some(inner), Value::Object(fields)) = (inner.as_object_mut(), body) {
        inner.extend(fields);
    }
    json!({"mailupBody": inner})
}

/// `GetNlLists` reply: list 10 with groups 1, 2, 3 and list 20 without groups.
pub fn nl_lists_reply() -> Value {
    import_reply(
        0,
        json!({
            "Lists": {
                "List": [
                    {
                        "@attributes": {"idList": "10", "listGUID": "guid-10", "listName": "Newsletter"},
                        "Groups": {
                            "Group": [
                                {"@attributes": {"idGroup": "1", "groupName": "Customers"}},
                                {"@attributes": {"idGroup": "2", "groupName": "Prospects"}},
                                {"@attributes": {"idGroup": "3", "groupName": "Partners"}}
                            ]
                        }
                    },
                    {
                        "@attributes": {"idList": "20", "listGUID": "guid-20", "listName": "Alerts"},
                        "Groups": {}
                    }
                ]
            }
        }),
    )
}
