use std::time::Instant;

use tide::{Middleware, Next, Request};
use tracing::Instrument;

/// Runs every request inside an `http_request` span and logs its outcome.
#[derive(Clone, Debug, Default)]
pub struct RequestTracing;

#[tide::utils::async_trait]
impl<State: Clone + Send + Sync + 'static> Middleware<State> for RequestTracing {
    async fn handle(&self, req: Request<State>, next: Next<'_, State>) -> tide::Result {
        let span = tracing::info_span!(
            "http_request",
            method = %req.method(),
            path = %req.url().path(),
            status = tracing::field::Empty,
        );

        async move {
            let start = Instant::now();
            let res = next.run(req).await;

            let status = u16::from(res.status());
            tracing::Span::current().record("status", &status);
            if let Some(err) = res.error() {
                tracing::error!(error = %err, "request failed");
            }
            tracing::info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                "request finished"
            );

            Ok(res)
        }
        .instrument(span)
        .await
    }
}
