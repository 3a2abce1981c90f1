//! End-to-end scenarios across core_types, async_runtime and xhr.

use async_runtime::{is_promise, EventLoop, PromiseState, Task};
use core_types::{JsError, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use xhr::{ajax, Request, RequestOptions, Response, Transport, TransportError};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

type Log = Rc<RefCell<Vec<String>>>;

fn push(log: &Log, name: &'static str) -> impl FnOnce(Value) + 'static {
    let log = log.clone();
    move |v| log.borrow_mut().push(format!("{}({})", name, v))
}

/// Serves fixed bodies by path; everything else is a 404.
struct Routes(HashMap<&'static str, &'static str>);

impl Transport for Routes {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        match self.0.get(request.url.as_str()) {
            Some(body) => Ok(Response::new(200, "OK", *body)),
            None if request.url.starts_with('/') => Ok(Response::new(404, "Not Found", "")),
            None => Err(TransportError::InvalidUrl(request.url.clone())),
        }
    }
}

fn routes() -> Rc<Routes> {
    let mut table = HashMap::new();
    table.insert("/user", r#"{"id": 1, "next": "/posts"}"#);
    table.insert("/posts", r#"["a", "b"]"#);
    Rc::new(Routes(table))
}

#[test]
fn done_done_always_resolve_ok() {
    init_logging();
    let event_loop = EventLoop::new();
    let log: Log = Rc::default();
    let deferred = event_loop.deferred();

    deferred
        .done(push(&log, "f1"))
        .done(push(&log, "f2"))
        .always(push(&log, "g"));
    deferred.resolve("ok");
    event_loop.run_until_done().unwrap();

    assert_eq!(*log.borrow(), vec!["f1(ok)", "f2(ok)", "g(ok)"]);
}

#[test]
fn fail_then_reject_then_late_done() {
    init_logging();
    let event_loop = EventLoop::new();
    let log: Log = Rc::default();
    let deferred = event_loop.deferred();

    let l = log.clone();
    deferred.fail(move |reason| {
        l.borrow_mut().push(format!("h({})", reason));
        Ok(Value::Undefined)
    });
    deferred.reject(JsError::error("bad"));
    deferred.done(push(&log, "late"));
    event_loop.run_until_done().unwrap();

    assert_eq!(*log.borrow(), vec!["h(Error: bad)"]);
}

#[test]
fn producer_task_settles_deferred_later() {
    init_logging();
    let event_loop = EventLoop::new();
    let log: Log = Rc::default();
    let deferred = event_loop.deferred();

    let producer = deferred.clone();
    event_loop.enqueue_task(Task::new(move || {
        producer.resolve(10);
        Ok(())
    }));

    // chaining done after the producer was scheduled still counts
    deferred
        .then(|v| match v {
            Value::Smi(n) => Ok(Value::Smi(n * 3)),
            other => Ok(other),
        })
        .done(push(&log, "f"))
        .always(push(&log, "g"));
    event_loop.run_until_done().unwrap();

    assert_eq!(*log.borrow(), vec!["f(30)", "g(30)"]);
}

#[test]
fn dependent_requests_flatten_through_then() {
    init_logging();
    let event_loop = Rc::new(EventLoop::new());
    let transport = routes();
    let log: Log = Rc::default();

    let el = event_loop.clone();
    let t = transport.clone();
    let first = ajax(
        &event_loop,
        transport,
        RequestOptions::new("/user").data_type(xhr::DataType::Json),
    );
    first
        .then(move |user| {
            let Value::Object(fields) = user else {
                return Err(JsError::type_error("user is not an object"));
            };
            let next = fields
                .get("next")
                .and_then(Value::as_str)
                .unwrap_or("/missing")
                .to_string();
            let second = ajax(&el, t, RequestOptions::new(next).data_type(xhr::DataType::Json));
            let pending = Value::from(second);
            assert!(is_promise(&pending));
            Ok(pending)
        })
        .done(push(&log, "posts"));
    event_loop.run_until_done().unwrap();

    assert_eq!(*log.borrow(), vec!["posts(a,b)"]);
    assert_eq!(first.state(), PromiseState::Fulfilled);
}

#[test]
fn missing_route_reaches_always_with_status_text() {
    init_logging();
    let event_loop = EventLoop::new();
    let log: Log = Rc::default();

    let deferred = ajax(&event_loop, routes(), RequestOptions::new("/nowhere"));
    deferred.done(push(&log, "done")).always(push(&log, "always"));
    event_loop.run_until_done().unwrap();

    assert_eq!(*log.borrow(), vec!["always(Error: Not Found)"]);
}

#[test]
fn invalid_url_rejects_with_transport_error() {
    init_logging();
    let event_loop = EventLoop::new();
    let log: Log = Rc::default();

    let deferred = ajax(&event_loop, routes(), RequestOptions::new("ftp://x"));
    let l = log.clone();
    deferred.fail(move |reason| {
        l.borrow_mut().push(reason.to_string());
        Ok(reason)
    });
    event_loop.run_until_done().unwrap();

    assert_eq!(*log.borrow(), vec!["Error: invalid url: ftp://x"]);
    assert_eq!(
        deferred.promise().result(),
        Some(Value::Error(JsError::error("invalid url: ftp://x")))
    );
}
