//! Middleware call-in points around handler dispatch.
use crate::request::Request;
use crate::response::Response;

use std::sync::Arc;

use async_trait::async_trait;

/// Hooks that run around every routed request.
///
/// `preprocess` runs after the handler's [`setup`](crate::Handler::setup) and
/// before its own `prepare`. Returning a response there ends the request
/// early. `postprocess` sees the final response of every request that did not
/// fail, and may change it.
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn preprocess(&self, _req: &mut Request) -> Option<Response> {
        None
    }

    async fn postprocess(&self, _req: &Request, _res: &mut Response) {}
}

/// Runs `preprocess` on each middleware in order, stopping at the first one
/// that answers the request.
pub(crate) async fn run_preprocess(
    middleware: &[Arc<dyn Middleware>],
    req: &mut Request,
) -> Option<Response> {
    for m in middleware {
        if let Some(res) = m.preprocess(req).await {
            return Some(res);
        }
    }
    None
}

pub(crate) async fn run_postprocess(
    middleware: &[Arc<dyn Middleware>],
    req: &Request,
    res: &mut Response,
) {
    for m in middleware {
        m.postprocess(req, res).await;
    }
}
