// Chunked snapshot streaming: 4-byte length prefix + JSON (optionally Brotli) frames
use crate::application::fleet_engine::FleetSnapshot;
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;
use tokio::sync::broadcast;

pub const FRAME_CONTENT_TYPE: &str = "application/x-fleet-frames";

/// Create a chunked frame streaming response
pub fn chunked_json_stream<S>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = FleetSnapshot> + Send + 'static,
{
    let byte_stream =
        stream.then(move |snapshot| async move { encode_frame(&snapshot, compress).await });

    // Frames are compressed individually, so no Content-Encoding header.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, FRAME_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(byte_stream))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn encode_frame(snapshot: &FleetSnapshot, compress: bool) -> std::io::Result<Bytes> {
    let json = serde_json::to_vec(snapshot).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let mut frame = BytesMut::with_capacity(4 + payload.len());
    frame.put_u32(payload.len() as u32);
    frame.put_slice(&payload);
    Ok(frame.freeze())
}

/// Stream the current snapshot, then every published one until the client
/// goes away. Slow readers skip what they missed.
pub fn stream_from_broadcast(
    initial: FleetSnapshot,
    mut rx: broadcast::Receiver<FleetSnapshot>,
    compress: bool,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        yield initial;
        loop {
            match rx.recv().await {
                Ok(snapshot) => yield snapshot,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Stream subscriber lagged, skipped {} snapshots", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    match chunked_json_stream(stream, compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
