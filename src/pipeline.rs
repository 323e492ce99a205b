//! The per-request lifecycle.
//!
//! ```text
//!  slash-redirect entry?  → 301 to the slashed URL, nothing else runs
//!  factory                → fresh handler
//!  handler.setup()
//!  middleware preprocess  → may answer the request
//!  handler.prepare()      → may answer the request
//!  method dispatch        → HEAD falls back to GET
//!  middleware postprocess
//!  handler.finish()       → if prepare returned
//!  handler.teardown()     → if setup returned
//! ```
//!
//! A panic anywhere after the handler is built is caught, logged and turned
//! into the handler's `error_handler` response. `finish` and `teardown`
//! still run.
use crate::handler::{Handler, HandlerFactory};
use crate::middleware::{self, Middleware};
use crate::redirect;
use crate::request::Request;
use crate::response::Response;
use crate::router::PatternEntry;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures_util::FutureExt;
use hyper::StatusCode;

#[derive(Default)]
struct Progress {
    response: Response,
    set_up: bool,
    prepared: bool,
}

/// Runs the lifecycle of `req` against the handler behind `entry`.
pub(crate) async fn process(
    entry: &PatternEntry,
    mut req: Request,
    middleware: &[Arc<dyn Middleware>],
) -> Response {
    if entry.is_slash_redirect() {
        return redirect::permanent(&req, &slash_target(&req));
    }

    let built = panic::catch_unwind(AssertUnwindSafe(|| entry.factory().new_handler()));
    let mut handler = match built {
        Ok(handler) => handler,
        Err(payload) => {
            tracing::error!(
                pattern = entry.pattern(),
                fault = %describe(&*payload),
                "panic recovered while building handler"
            );
            return Response::server_error();
        }
    };

    let mut progress = Progress::default();
    let outcome = AssertUnwindSafe(run(&mut *handler, &mut req, middleware, &mut progress))
        .catch_unwind()
        .await;
    let mut fault = outcome.err().map(|payload| describe(&*payload));

    if progress.prepared {
        let finished = AssertUnwindSafe(handler.finish(&req, &progress.response))
            .catch_unwind()
            .await;
        if let Err(payload) = finished {
            fault.get_or_insert_with(|| describe(&*payload));
        }
    }

    if progress.set_up {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler.teardown())) {
            fault.get_or_insert_with(|| describe(&*payload));
        }
    }

    let fault = match fault {
        Some(fault) => fault,
        None => return progress.response,
    };

    tracing::error!(
        method = %req.method(),
        path = req.path(),
        fault = %fault,
        "panic recovered"
    );

    panic::catch_unwind(AssertUnwindSafe(|| handler.error_handler(&fault))).unwrap_or_else(
        |payload| {
            tracing::error!(fault = %describe(&*payload), "panic recovered in error handler");
            Response::server_error()
        },
    )
}

async fn run(
    handler: &mut dyn Handler,
    req: &mut Request,
    middleware: &[Arc<dyn Middleware>],
    progress: &mut Progress,
) {
    handler.setup();
    progress.set_up = true;

    let mut finished = false;

    if let Some(res) = middleware::run_preprocess(middleware, req).await {
        progress.response = res;
        finished = true;
    }

    // Only a request the middleware let through reaches the handler.
    if !finished {
        let prepared = handler.prepare(req).await;
        progress.prepared = true;

        if let Some(res) = prepared {
            progress.response = res;
            finished = true;
        }
    }

    if !finished {
        progress.response = dispatch(handler, req).await;
    }

    middleware::run_postprocess(middleware, req, &mut progress.response).await;
}

async fn dispatch(handler: &mut dyn Handler, req: &mut Request) -> Response {
    let method = req.method().as_str().to_ascii_uppercase();

    match method.as_str() {
        "HEAD" => {
            let res = handler.head(req).await;
            if res.status != StatusCode::METHOD_NOT_ALLOWED {
                return res;
            }

            // No HEAD implementation: answer with the headers of a GET.
            let mut get = handler.get(req).await;
            if get.status == StatusCode::OK {
                get.body.clear();
                return get;
            }
            res
        }
        "GET" => handler.get(req).await,
        "POST" => handler.post(req).await,
        "PUT" => handler.put(req).await,
        "PATCH" => handler.patch(req).await,
        "DELETE" => handler.delete(req).await,
        "OPTIONS" => handler.options(req).await,
        _ => handler.error_handler(&format!("unsupported HTTP method: {}", req.method())),
    }
}

/// The request URL with a `/` appended to its path.
fn slash_target(req: &Request) -> String {
    let mut target = format!("{}/", req.path());

    if !req.query_pairs().is_empty() {
        target.push('?');
        target.push_str(req.raw_query());
    }

    if let Some(fragment) = req.fragment().filter(|f| !f.is_empty()) {
        target.push('#');
        target.push_str(fragment);
    }

    target
}

fn describe(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
