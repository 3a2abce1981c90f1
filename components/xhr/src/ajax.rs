//! The request helper.

use crate::options::{DataType, RequestOptions};
use crate::transport::{Request, Response, Transport, TransportError};
use async_runtime::{Deferred, EventLoop, Task};
use core_types::JsError;
use log::debug;
use std::rc::Rc;

/// Sends a request described by `options` and returns a Deferred for its
/// outcome.
///
/// With `is_async` set (the default) the transport is called from a task on
/// `event_loop`, so callbacks registered right after this call are in place
/// before the Deferred settles. Otherwise the transport is called before
/// this function returns and the Deferred is already settled: `done` and
/// `always` callbacks registered on it afterwards never run.
///
/// A 2xx response resolves with the body interpreted per
/// [`RequestOptions::data_type`]. Any other status rejects with
/// `Error(status_text)`; a transport failure rejects with `Error(<failure>)`.
pub fn ajax(
    event_loop: &EventLoop,
    transport: Rc<dyn Transport>,
    options: RequestOptions,
) -> Deferred {
    let deferred = event_loop.deferred();
    let request = Request {
        method: options.method,
        url: options.url.unwrap_or_else(|| transport.location()),
        body: options.data,
    };
    let data_type = options.data_type;

    debug!(
        "{} {} ({})",
        request.method,
        request.url,
        if options.is_async { "async" } else { "sync" }
    );

    let producer = deferred.clone();
    let send = move || {
        let outcome = transport.send(&request);
        settle(&producer, &request, outcome, data_type);
    };

    if options.is_async {
        event_loop.enqueue_task(Task::new(move || {
            send();
            Ok(())
        }));
    } else {
        send();
    }

    deferred
}

fn settle(
    deferred: &Deferred,
    request: &Request,
    outcome: Result<Response, TransportError>,
    data_type: DataType,
) {
    match outcome {
        Ok(response) if response.is_success() => {
            debug!("{} {} -> {}", request.method, request.url, response.status);
            deferred.resolve(data_type.interpret(response.body));
        }
        Ok(response) => {
            debug!(
                "{} {} -> {} {}",
                request.method, request.url, response.status, response.status_text
            );
            deferred.reject(JsError::error(response.status_text));
        }
        Err(e) => {
            debug!("{} {} failed: {}", request.method, request.url, e);
            deferred.reject(JsError::error(e.to_string()));
        }
    }
}
