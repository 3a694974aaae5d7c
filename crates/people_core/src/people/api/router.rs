//! HTTP routing and response rendering.
//!
//! The route table is static and matches method and path exactly:
//!
//! | Method | Path          | Operation  |
//! |--------|---------------|------------|
//! | GET    | `{base}`      | findAll    |
//! | GET    | `{base}/{id}` | findById   |
//! | DELETE | `{base}/{id}` | deleteById |
//! | POST   | `{base}`      | create     |
//! | PUT    | `{base}/{id}` | update     |
//!
//! Anything else is answered with 404 without invoking the handler. Handler
//! failures are translated into a status code and JSON error body here, once,
//! so the router itself never fails.

use std::{convert::Infallible, future::Future, pin::Pin, task::Poll};

use bytes::Bytes;
use futures::{StreamExt, TryStreamExt, stream};
use http::{
    HeaderValue, Method, Request, Response, StatusCode,
    header::{CONTENT_TYPE, LOCATION},
};
use http_body_util::{BodyExt, Full, Limited, StreamBody, combinators::UnsyncBoxBody};
use hyper::body::{Body, Frame};
use serde::Serialize;
use tower::{Service, ServiceExt};
use tracing::{debug, info, warn};

use crate::people::{
    api::types::{Payload, PeopleRequest, PeopleResponse, PersonStream},
    error::PeopleError,
    infrastructure::config::PeopleConfig,
};

/// Largest request body read for create and update.
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Response body produced by the router.
pub type PeopleBody = UnsyncBoxBody<Bytes, PeopleError>;

fn application_json() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Path shape relative to the API base.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    /// `{base}`
    Collection,
    /// `{base}/{id}`, percent-decoded
    Item(String),
}

impl Target {
    fn parse(api_base: &str, path: &str) -> Option<Self> {
        let rest = path.strip_prefix(api_base)?;
        if rest.is_empty() {
            return Some(Self::Collection);
        }
        let segment = rest.strip_prefix('/')?;
        if segment.is_empty() || segment.contains('/') {
            return None;
        }
        urlencoding::decode(segment).ok().map(|id| Self::Item(id.into_owned()))
    }
}

/// Router service in front of a handler `H`.
#[derive(Debug, Clone)]
pub struct PeopleRouter<H> {
    handler: H,
    config: PeopleConfig,
}

impl<H> PeopleRouter<H> {
    pub fn new(handler: H, config: PeopleConfig) -> Self {
        Self { handler, config }
    }
}

/// Resolves a route; the body is only read for operations that need it.
async fn dispatch<B>(
    config: &PeopleConfig,
    request: Request<B>,
) -> Result<PeopleRequest, PeopleError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let (parts, body) = request.into_parts();
    let no_route = || PeopleError::NoRoute {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
    };
    let target = Target::parse(config.api_base(), parts.uri.path()).ok_or_else(no_route)?;
    match (&parts.method, target) {
        (&Method::GET, Target::Collection) => Ok(PeopleRequest::FindAll),
        (&Method::GET, Target::Item(id)) => Ok(PeopleRequest::FindById(id)),
        (&Method::DELETE, Target::Item(id)) => Ok(PeopleRequest::DeleteById(id)),
        (&Method::POST, Target::Collection) => Ok(PeopleRequest::Create(read(body).await)),
        (&Method::PUT, Target::Item(id)) => {
            Ok(PeopleRequest::Update { id, payload: read(body).await })
        }
        _ => Err(no_route()),
    }
}

/// Collects at most [`MAX_PAYLOAD_BYTES`]; read failures surface on decode.
async fn read<B>(body: B) -> Payload
where
    B: Body,
    B::Error: Into<BoxError>,
{
    match Limited::new(body, MAX_PAYLOAD_BYTES).collect().await {
        Ok(collected) => Payload::new(collected.to_bytes()),
        Err(e) => {
            debug!("[router] unreadable body: {}", e);
            Payload::unreadable(e.to_string())
        }
    }
}

fn full(bytes: impl Into<Bytes>) -> PeopleBody {
    Full::new(bytes.into()).map_err(|never| match never {}).boxed_unsync()
}

fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<PeopleBody>, PeopleError> {
    let bytes = serde_json::to_vec(value).map_err(|_| PeopleError::InternalPeopleError)?;
    let mut response = Response::new(full(bytes));
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, application_json());
    Ok(response)
}

/// Emits `[`, the people separated by `,`, then `]` as they arrive.
fn json_array(people: PersonStream) -> PeopleBody {
    let items = people.enumerate().map(|(index, person)| -> Result<Bytes, PeopleError> {
        let person = person?;
        let mut chunk = if index == 0 { Vec::new() } else { vec![b','] };
        serde_json::to_writer(&mut chunk, &person)
            .map_err(|_| PeopleError::InternalPeopleError)?;
        Ok(Bytes::from(chunk))
    });
    let frames = stream::once(async { Ok::<_, PeopleError>(Bytes::from_static(b"[")) })
        .chain(items)
        .chain(stream::once(async { Ok(Bytes::from_static(b"]")) }))
        .map_ok(Frame::data);
    StreamBody::new(frames).boxed_unsync()
}

fn render(response: PeopleResponse) -> Result<Response<PeopleBody>, PeopleError> {
    match response {
        PeopleResponse::All(people) => {
            let mut response = Response::new(json_array(people));
            response.headers_mut().insert(CONTENT_TYPE, application_json());
            Ok(response)
        }
        PeopleResponse::Found(person) | PeopleResponse::Updated(person) => {
            json(StatusCode::OK, &person)
        }
        PeopleResponse::Deleted(message) => json(StatusCode::OK, &message),
        PeopleResponse::Created { location, person } => {
            let location = HeaderValue::try_from(location)
                .map_err(|_| PeopleError::InternalPeopleError)?;
            let mut response = json(StatusCode::CREATED, &person)?;
            response.headers_mut().insert(LOCATION, location);
            Ok(response)
        }
    }
}

/// Renders a failure as `{"status", "error", "message"}` plus `violations`
/// for validation failures.
pub fn render_error(error: &PeopleError) -> Response<PeopleBody> {
    let status = error.status();
    let mut body = serde_json::json!({
        "status": status.as_u16(),
        "error": status.canonical_reason().unwrap_or_default(),
        "message": error.to_string(),
    });
    if !error.violations().is_empty() {
        body["violations"] = serde_json::json!(error.violations());
    }
    let mut response = Response::new(full(body.to_string()));
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, application_json());
    response
}

impl<H, B> Service<Request<B>> for PeopleRouter<H>
where
    H: Service<PeopleRequest, Response = PeopleResponse, Error = PeopleError>
        + Clone
        + Send
        + 'static,
    H::Future: Send,
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = Response<PeopleBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let config = self.config.clone();
        let mut handler = self.handler.clone();
        Box::pin(async move {
            let method = request.method().clone();
            let path = request.uri().path().to_string();
            info!("[router] {} {}", method, path);
            let outcome = match dispatch(&config, request).await {
                Ok(request) => match handler.ready().await {
                    Ok(handler) => handler.call(request).await.and_then(render),
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            };
            Ok(outcome.unwrap_or_else(|error| {
                if error.status().is_server_error() {
                    warn!("[router] {} {} failed: {}", method, path, error);
                } else {
                    debug!("[router] {} {} rejected: {}", method, path, error);
                }
                render_error(&error)
            }))
        })
    }
}
