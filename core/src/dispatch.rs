//! The single "issue one request" step shared by both client forms.

use std::future::Future;
use std::pin::pin;

use futures::future::{self, BoxFuture, Either, FutureExt};
use tracing::{debug, warn};

use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, TransportError};

/// Future that resolves when the caller wants the in-flight request dropped.
pub type CancelSignal = BoxFuture<'static, ()>;

/// Box any `()` future as a [`CancelSignal`].
pub fn cancel_signal<F>(signal: F) -> CancelSignal
where
    F: Future<Output = ()> + Send + 'static,
{
    signal.boxed()
}

/// Send `request` exactly once.
///
/// Never fails: a transport error, or `cancel` resolving first, yields
/// [`HttpResponse::transport_failure`] instead.
pub async fn dispatch<T: Transport>(
    transport: &T,
    request: HttpRequest,
    cancel: Option<CancelSignal>,
) -> HttpResponse {
    let method = request.method;
    let url = request.url.clone();
    debug!(%method, %url, "dispatching request");

    let send = pin!(transport.send(request));
    let outcome = match cancel {
        None => send.await,
        Some(cancel) => match future::select(send, cancel).await {
            Either::Left((outcome, _)) => outcome,
            Either::Right(((), _)) => Err(TransportError::Cancelled),
        },
    };

    match outcome {
        Ok(response) => {
            debug!(%method, %url, status = response.status, "response received");
            response
        }
        Err(error) => {
            warn!(%method, %url, %error, "transport failed, substituting status 400");
            HttpResponse::transport_failure()
        }
    }
}
