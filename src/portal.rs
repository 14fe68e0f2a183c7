//! `org.freedesktop.portal.Screenshot.PickColor` over the session bus.
//!
//! The portal answers asynchronously: `PickColor` returns a request object
//! path right away and the actual color arrives later as a
//! `org.freedesktop.portal.Request.Response` signal on that path. The wait is
//! bounded by a timeout and can be abandoned through a cancellation token.

use std::collections::HashMap;
use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};
use zbus::{Connection, Message, Proxy};

use crate::color::{ColorSample, PortalColor};
use crate::error::BackendError;
use crate::picker::Backend;

const BACKEND: &str = "portal";

const PORTAL_DESTINATION: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";
const SCREENSHOT_INTERFACE: &str = "org.freedesktop.portal.Screenshot";
const REQUEST_INTERFACE: &str = "org.freedesktop.portal.Request";

pub struct PortalBackend {
    timeout: Duration,
    cancel: CancellationToken,
}

impl PortalBackend {
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }
}

impl Backend for PortalBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn attempt(&self) -> Result<ColorSample, BackendError> {
        pick_via_portal(self.timeout, &self.cancel)
    }
}

/// Blocks until the portal answers, `timeout` elapses or `cancel` fires.
///
/// Must be called from a blocking context: either outside any tokio runtime
/// or from a `spawn_blocking` thread.
pub fn pick_via_portal(
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<ColorSample, BackendError> {
    block_on(pick_color(timeout, cancel.clone()))
}

fn block_on<F>(future: F) -> Result<ColorSample, BackendError>
where
    F: Future<Output = Result<ColorSample, BackendError>>,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle.block_on(future),
        Err(_) => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| BackendError::unavailable(BACKEND, format!("runtime: {err}")))?
            .block_on(future),
    }
}

async fn pick_color(
    timeout: Duration,
    cancel: CancellationToken,
) -> Result<ColorSample, BackendError> {
    let connection = Connection::session()
        .await
        .map_err(|err| BackendError::unavailable(BACKEND, format!("session bus: {err}")))?;

    let screenshot = Proxy::new(
        &connection,
        PORTAL_DESTINATION,
        PORTAL_PATH,
        SCREENSHOT_INTERFACE,
    )
    .await
    .map_err(|err| BackendError::unavailable(BACKEND, err))?;

    let token = handle_token();
    let options: HashMap<&str, Value<'_>> = HashMap::new();
    let handle: OwnedObjectPath = screenshot
        .call("PickColor", &(token.as_str(), options))
        .await
        .map_err(|err| BackendError::unavailable(BACKEND, format!("PickColor: {err}")))?;

    tracing::info!(handle = handle.as_str(), token, "portal request pending");

    // Subscribing through a proxy registers the bus match rule
    // type='signal',sender='org.freedesktop.portal.Desktop',path='<handle>'.
    let request = Proxy::new(
        &connection,
        PORTAL_DESTINATION,
        handle.as_str(),
        REQUEST_INTERFACE,
    )
    .await
    .map_err(|err| BackendError::unavailable(BACKEND, err))?;
    let responses = request
        .receive_signal("Response")
        .await
        .map_err(|err| BackendError::unavailable(BACKEND, format!("subscribe: {err}")))?;

    let outcome = await_response(responses, handle.as_str(), timeout, &cancel).await;
    if dismisses_dialog(&outcome) {
        if let Err(err) = request.call_method("Close", &()).await {
            tracing::debug!(%err, "closing portal request failed");
        }
    }

    outcome
}

/// Waits for the `Response` signal on `handle`, skipping anything else the
/// stream yields, until `timeout` elapses or `cancel` fires.
pub(crate) async fn await_response<S>(
    responses: S,
    handle: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<ColorSample, BackendError>
where
    S: Stream<Item = Message>,
{
    let wait = async {
        let mut responses = pin!(responses);
        while let Some(message) = responses.next().await {
            let header = message.header();
            let on_request = header.path().is_some_and(|path| path.as_str() == handle);
            let is_response = header
                .member()
                .is_some_and(|member| member.as_str() == "Response");
            if !on_request || !is_response {
                tracing::trace!(path = ?header.path(), member = ?header.member(), "ignoring signal");
                continue;
            }

            let body = message.body();
            let (status, results): (u32, HashMap<String, OwnedValue>) = body
                .deserialize()
                .map_err(|err| BackendError::malformed(BACKEND, err))?;
            return decode_response(status, results.get("color").map(|v| &**v));
        }
        Err(BackendError::unavailable(
            BACKEND,
            "signal stream closed before a response arrived",
        ))
    };

    tokio::select! {
        result = tokio::time::timeout(timeout, wait) => {
            result.unwrap_or(Err(BackendError::Timeout { backend: BACKEND, timeout }))
        }
        _ = cancel.cancelled() => Err(BackendError::UserCancelled { backend: BACKEND }),
    }
}

/// Whether the portal dialog may still be up and should be closed.
fn dismisses_dialog(outcome: &Result<ColorSample, BackendError>) -> bool {
    matches!(
        outcome,
        Err(BackendError::Timeout { .. } | BackendError::UserCancelled { .. })
    )
}

/// Interprets a `Request.Response` body.
pub fn decode_response(
    status: u32,
    color: Option<&Value<'_>>,
) -> Result<ColorSample, BackendError> {
    if status != 0 {
        tracing::info!(status, "portal request refused or cancelled");
        return Err(BackendError::UserCancelled { backend: BACKEND });
    }
    let color = color.ok_or_else(|| BackendError::malformed(BACKEND, "no color in results"))?;
    decode_color(color).map(PortalColor::to_sample)
}

/// Dispatches on the D-Bus signature of the `color` entry.
pub fn decode_color(value: &Value<'_>) -> Result<PortalColor, BackendError> {
    let signature = value.value_signature().to_string();
    match (signature.as_str(), value) {
        ("u", Value::U32(packed)) => Ok(PortalColor::Packed(*packed)),
        ("(ddd)", Value::Structure(fields)) => match fields.fields() {
            [Value::F64(r), Value::F64(g), Value::F64(b)] => {
                Ok(PortalColor::Normalized(*r, *g, *b))
            }
            _ => Err(BackendError::malformed(BACKEND, "bad (ddd) structure")),
        },
        ("v", Value::Value(inner)) => decode_color(inner),
        _ => Err(BackendError::malformed(
            BACKEND,
            format!("unexpected color signature {signature}"),
        )),
    }
}

fn handle_token() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("wayland_color_picker_{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_color() {
        let value = Value::U32(0xFF8040);
        assert_eq!(decode_color(&value).unwrap(), PortalColor::Packed(0xFF8040));
        assert_eq!(
            decode_response(0, Some(&value)).unwrap(),
            ColorSample::new(255, 128, 64)
        );
    }

    #[test]
    fn normalized_color() {
        let value = Value::from((1.0f64, 0.5f64, 0.25f64));
        assert_eq!(
            decode_color(&value).unwrap(),
            PortalColor::Normalized(1.0, 0.5, 0.25)
        );
        assert_eq!(
            decode_response(0, Some(&value)).unwrap(),
            ColorSample::new(255, 127, 63)
        );
    }

    #[test]
    fn other_shapes_are_malformed() {
        for value in [
            Value::from("red"),
            Value::from((1.0f64, 0.5f64)),
            Value::I32(0xFF),
            Value::from((1u32, 2u32, 3u32)),
        ] {
            assert!(
                matches!(
                    decode_response(0, Some(&value)),
                    Err(BackendError::MalformedResponse { .. })
                ),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn missing_color_is_malformed() {
        assert!(matches!(
            decode_response(0, None),
            Err(BackendError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn non_zero_status_is_cancellation() {
        let value = Value::U32(0xFF8040);
        for status in [1, 2] {
            assert!(matches!(
                decode_response(status, Some(&value)),
                Err(BackendError::UserCancelled { .. })
            ));
        }
    }

    const HANDLE: &str = "/org/freedesktop/portal/desktop/request/1_42/wayland_color_picker_abc";

    fn signal(path: &str, member: &str, status: u32, color: Value<'_>) -> Message {
        let results = HashMap::from([("color", color)]);
        Message::signal(path, REQUEST_INTERFACE, member)
            .unwrap()
            .build(&(status, results))
            .unwrap()
    }

    async fn wait_for(
        messages: Vec<Message>,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<ColorSample, BackendError> {
        await_response(futures::stream::iter(messages), HANDLE, timeout, cancel).await
    }

    #[tokio::test]
    async fn response_on_the_request_path() {
        let result = wait_for(
            vec![signal(HANDLE, "Response", 0, Value::U32(0x102030))],
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(result.unwrap(), ColorSample::new(0x10, 0x20, 0x30));
    }

    #[tokio::test]
    async fn signals_on_other_paths_are_skipped() {
        let other = "/org/freedesktop/portal/desktop/request/1_42/someone_else";
        let result = wait_for(
            vec![
                signal(other, "Response", 0, Value::U32(0xFFFFFF)),
                signal(HANDLE, "Response", 0, Value::U32(0x000001)),
            ],
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(result.unwrap(), ColorSample::new(0, 0, 1));
    }

    #[tokio::test]
    async fn other_members_are_skipped() {
        let result = wait_for(
            vec![
                signal(HANDLE, "Closed", 0, Value::U32(0xFFFFFF)),
                signal(HANDLE, "Response", 0, Value::from((0.0f64, 0.0f64, 1.0f64))),
            ],
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(result.unwrap(), ColorSample::new(0, 0, 255));
    }

    #[tokio::test]
    async fn closed_stream_is_unavailable() {
        let result = wait_for(
            vec![signal("/elsewhere", "Response", 0, Value::U32(1))],
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(BackendError::Unavailable { .. })), "{result:?}");
    }

    #[tokio::test]
    async fn undecodable_body_is_malformed() {
        let message = Message::signal(HANDLE, REQUEST_INTERFACE, "Response")
            .unwrap()
            .build(&("not a response",))
            .unwrap();
        let result = wait_for(vec![message], Duration::from_secs(5), &CancellationToken::new()).await;
        assert!(matches!(result, Err(BackendError::MalformedResponse { .. })), "{result:?}");
    }

    #[tokio::test]
    async fn silent_portal_times_out() {
        let timeout = Duration::from_millis(10);
        let result = await_response(
            futures::stream::pending::<Message>(),
            HANDLE,
            timeout,
            &CancellationToken::new(),
        )
        .await;
        assert!(
            matches!(result, Err(BackendError::Timeout { timeout: t, .. }) if t == timeout),
            "{result:?}"
        );
        assert!(dismisses_dialog(&result));
    }

    #[tokio::test]
    async fn cancellation_abandons_the_wait() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = await_response(
            futures::stream::pending::<Message>(),
            HANDLE,
            Duration::from_secs(60),
            &cancel,
        )
        .await;
        assert!(matches!(result, Err(BackendError::UserCancelled { .. })), "{result:?}");
        assert!(dismisses_dialog(&result));
    }

    #[test]
    fn answered_requests_are_left_alone() {
        assert!(!dismisses_dialog(&Ok(ColorSample::new(1, 2, 3))));
        assert!(!dismisses_dialog(&Err(BackendError::malformed(BACKEND, "x"))));
        assert!(!dismisses_dialog(&Err(BackendError::unavailable(BACKEND, "x"))));
    }

    #[test]
    fn tokens_are_valid_path_elements() {
        let token = handle_token();
        assert!(token.starts_with("wayland_color_picker_"));
        assert!(token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'));
        assert_ne!(token, handle_token());
    }
}
