// src/server/handler.rs
use hyper::header::HeaderValue;
use hyper::{Body, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::metrics::{MetricsCollector, Timer};
use crate::proxy::{ApiResponse, DistroProxy};
use crate::server::routes::{resolve, route_label};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct RequestHandler {
    proxy: Arc<DistroProxy>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RequestHandler {
    pub fn new(proxy: Arc<DistroProxy>, metrics: Option<Arc<MetricsCollector>>) -> Self {
        Self { proxy, metrics }
    }
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let proxy = self.proxy.clone();
        let metrics = self.metrics.clone();
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "request",
            %request_id,
            method = %req.method(),
            path = %req.uri().path()
        );

        Box::pin(
            async move {
                let timer = Timer::new();
                let resolved = resolve(req.method(), req.uri());
                let route = route_label(&resolved);

                let api = match resolved {
                    Ok(operation) => proxy.execute(operation).await,
                    Err(e) => {
                        warn!(%e, "rejected request");
                        ApiResponse::from(e)
                    }
                };

                let status = api.status.as_u16();
                debug!(status, elapsed = ?timer.elapsed(), "request complete");
                if let Some(metrics) = &metrics {
                    metrics.record_request(route, status, timer.elapsed());
                }

                let mut response: Response<Body> = api.into();
                if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                Ok(response)
            }
            .instrument(span),
        )
    }
}
