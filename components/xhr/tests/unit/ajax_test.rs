//! Unit tests for the request helper

use async_runtime::{EventLoop, PromiseState};
use core_types::{JsError, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use xhr::{ajax, DataType, Method, Request, RequestOptions, Response, Transport, TransportError};

/// Replies with a canned outcome and remembers every request it saw.
struct CannedTransport {
    reply: Result<Response, TransportError>,
    seen: RefCell<Vec<Request>>,
}

impl CannedTransport {
    fn new(reply: Result<Response, TransportError>) -> Rc<Self> {
        let _ = env_logger::builder().is_test(true).try_init();
        Rc::new(Self {
            reply,
            seen: RefCell::new(Vec::new()),
        })
    }

    fn ok(body: &str) -> Rc<Self> {
        Self::new(Ok(Response::new(200, "OK", body)))
    }
}

impl Transport for CannedTransport {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        self.seen.borrow_mut().push(request.clone());
        self.reply.clone()
    }

    fn location(&self) -> String {
        "http://localhost/current".to_string()
    }
}

fn outcome_log() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> Box<dyn FnOnce(Value)>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = log.clone();
    (log, move |name: &'static str| -> Box<dyn FnOnce(Value)> {
        let l = l.clone();
        Box::new(move |v: Value| l.borrow_mut().push(format!("{} {}", name, v)))
    })
}

#[test]
fn success_resolves_with_body() {
    let event_loop = EventLoop::new();
    let transport = CannedTransport::ok("hello");
    let (log, cb) = outcome_log();

    ajax(&event_loop, transport.clone(), RequestOptions::new("/greeting"))
        .done(cb("done"))
        .always(cb("always"));
    event_loop.run_until_done().unwrap();

    assert_eq!(*log.borrow(), vec!["done hello", "always hello"]);
    assert_eq!(
        *transport.seen.borrow(),
        vec![Request {
            method: Method::Get,
            url: "/greeting".to_string(),
            body: None,
        }]
    );
}

#[test]
fn error_status_rejects_with_status_text() {
    let event_loop = EventLoop::new();
    let transport = CannedTransport::new(Ok(Response::new(404, "Not Found", "missing")));
    let reasons = Rc::new(RefCell::new(Vec::new()));
    let (log, cb) = outcome_log();

    let r = reasons.clone();
    let deferred = ajax(&event_loop, transport, RequestOptions::new("/nope"));
    deferred
        .done(cb("done"))
        .fail(move |reason| {
            r.borrow_mut().push(reason.clone());
            Ok(reason)
        });
    event_loop.run_until_done().unwrap();

    assert!(log.borrow().is_empty());
    assert_eq!(
        *reasons.borrow(),
        vec![Value::Error(JsError::error("Not Found"))]
    );
}

#[test]
fn transport_failure_rejects() {
    let event_loop = EventLoop::new();
    let transport = CannedTransport::new(Err(TransportError::Network("refused".to_string())));
    let (log, cb) = outcome_log();

    let deferred = ajax(&event_loop, transport, RequestOptions::new("/down"));
    deferred.always(cb("always"));
    event_loop.run_until_done().unwrap();

    assert_eq!(*log.borrow(), vec!["always Error: network error: refused"]);
    assert_eq!(deferred.state(), PromiseState::Rejected);
}

#[test]
fn async_request_waits_for_the_event_loop() {
    let event_loop = EventLoop::new();
    let transport = CannedTransport::ok("later");

    let deferred = ajax(&event_loop, transport.clone(), RequestOptions::new("/slow"));
    assert!(transport.seen.borrow().is_empty());
    assert!(!deferred.is_settled());
    assert!(!event_loop.is_task_queue_empty());

    event_loop.run_until_done().unwrap();
    assert!(deferred.is_settled());
    assert_eq!(transport.seen.borrow().len(), 1);
}

#[test]
fn sync_request_settles_before_returning() {
    let event_loop = EventLoop::new();
    let transport = CannedTransport::ok("now");
    let (log, cb) = outcome_log();

    let deferred = ajax(
        &event_loop,
        transport,
        RequestOptions::new("/fast").synchronous(),
    );
    assert!(deferred.is_settled());
    assert!(event_loop.is_task_queue_empty());

    // too late for done
    deferred.done(cb("done"));
    event_loop.run_until_done().unwrap();

    assert!(log.borrow().is_empty());
    assert_eq!(deferred.promise().result(), Some(Value::from("now")));
}

#[test]
fn missing_url_uses_transport_location() {
    let event_loop = EventLoop::new();
    let transport = CannedTransport::ok("");

    ajax(&event_loop, transport.clone(), RequestOptions::default());
    event_loop.run_until_done().unwrap();

    assert_eq!(transport.seen.borrow()[0].url, "http://localhost/current");
}

#[test]
fn options_record_drives_request() {
    let event_loop = EventLoop::new();
    let transport = CannedTransport::ok(r#"{"id": 3, "name": "widget"}"#);
    let (log, cb) = outcome_log();

    let options = RequestOptions::from_json(
        r#"{ "url": "/items", "type": "POST", "dataType": "json", "data": "name=widget" }"#,
    )
    .unwrap();
    let deferred = ajax(&event_loop, transport.clone(), options);
    deferred.done(cb("done"));
    event_loop.run_until_done().unwrap();

    let seen = transport.seen.borrow();
    let sent = &seen[0];
    assert_eq!(sent.method, Method::Post);
    assert_eq!(sent.body.as_deref(), Some("name=widget"));

    let mut expected = BTreeMap::new();
    expected.insert("id".to_string(), Value::Smi(3));
    expected.insert("name".to_string(), Value::from("widget"));
    assert_eq!(deferred.promise().result(), Some(Value::Object(expected)));
    assert_eq!(*log.borrow(), vec!["done [object Object]"]);
}

#[test]
fn then_chain_transforms_response() {
    let event_loop = EventLoop::new();
    let transport = CannedTransport::ok("[1, 2, 3]");
    let (log, cb) = outcome_log();

    ajax(
        &event_loop,
        transport,
        RequestOptions::new("/numbers").data_type(DataType::Json),
    )
    .then(|v| match v {
        Value::Array(items) => Ok(Value::Smi(items.len() as i32)),
        other => Err(JsError::type_error(format!("expected array, got {}", other))),
    })
    .done(cb("count"));
    event_loop.run_until_done().unwrap();

    assert_eq!(*log.borrow(), vec!["count 3"]);
}
