// ABOUTME: HTTP request handling for the deploy history dashboard.
// ABOUTME: Maps /<channel>?since=<RFC 3339> to a plain-text rendered history.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, Response, StatusCode, Uri};

use crate::store::Repository;
use crate::types::ChannelId;

use super::render::Renderer;

pub const MALFORMED_SINCE: &str = "Malformed time in `since` parameter";

const TEXT_PLAIN: &str = "text/plain";
const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Serves rendered deploy history from a [`Repository`].
#[derive(Debug)]
pub struct Dashboard<R> {
    repo: R,
    renderer: Renderer,
}

impl<R: Repository> Dashboard<R> {
    pub fn new(repo: R, renderer: Renderer) -> Self {
        Self { repo, renderer }
    }

    /// Answer one dashboard request.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>> {
        let (parts, _body) = req.into_parts();

        if parts.method != Method::GET && parts.method != Method::HEAD {
            return plain_error(StatusCode::METHOD_NOT_ALLOWED);
        }

        let Some(channel) = channel_id_from_uri(&parts.uri) else {
            tracing::debug!("No channel in dashboard request {}", parts.uri);
            return plain_error(StatusCode::NOT_FOUND);
        };

        let since = match since_from_query(parts.uri.query()) {
            Ok(since) => since,
            Err(MalformedSince) => {
                return text_response(StatusCode::BAD_REQUEST, TEXT_PLAIN_UTF8, MALFORMED_SINCE);
            }
        };

        let history = match since {
            Some(since) => self.repo.since(&channel, since).await,
            None => self.repo.all(&channel).await,
        };

        match history {
            Ok(deploys) => {
                tracing::debug!("Rendering {} deploys for {}", deploys.len(), channel);
                text_response(StatusCode::OK, TEXT_PLAIN, self.renderer.render(&deploys))
            }
            Err(e) => {
                tracing::error!("Failed to load deploy history for {}: {}", channel, e);
                plain_error(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// First path segment with any file extension removed; empty if none.
pub fn channel_segment(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    let segment = path.split('/').next().unwrap_or_default();
    match segment.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => segment,
    }
}

/// The channel addressed by a dashboard URI, if it names a valid one.
pub fn channel_id_from_uri(uri: &Uri) -> Option<ChannelId> {
    let segment = channel_segment(uri.path());
    if segment.is_empty() {
        return None;
    }
    ChannelId::new(segment).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedSince;

/// Parse the optional `since` query parameter. An empty value counts as absent.
pub fn since_from_query(query: Option<&str>) -> Result<Option<DateTime<Utc>>, MalformedSince> {
    let Some(raw) = query.and_then(|q| query_param(q, "since")) else {
        return Ok(None);
    };
    let value = raw.map_err(|_| MalformedSince)?;
    if value.is_empty() {
        return Ok(None);
    }

    DateTime::parse_from_rfc3339(&value)
        .map(|t| Some(t.with_timezone(&Utc)))
        .map_err(|_| MalformedSince)
}

/// First value of `key` in a form-encoded query string.
fn query_param(query: &str, key: &str) -> Option<Result<String, std::string::FromUtf8Error>> {
    query.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        (form_decode(name).ok()? == key).then(|| form_decode(value))
    })
}

fn form_decode(value: &str) -> Result<String, std::string::FromUtf8Error> {
    urlencoding::decode(&value.replace('+', " ")).map(|decoded| decoded.into_owned())
}

fn text_response(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn plain_error(status: StatusCode) -> Response<Full<Bytes>> {
    let reason = status.canonical_reason().unwrap_or("Error");
    text_response(status, TEXT_PLAIN_UTF8, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn channel_segment_examples() {
        let examples = [
            ("/channel1", "channel1"),
            ("/channel2?key=val", "channel2"),
            ("/channel3/hello", "channel3"),
            ("/channel4/hello/world/", "channel4"),
            ("/channel5/hello/world/?key=val", "channel5"),
            ("/channel6/notchannel.txt", "channel6"),
            ("/channel7/notchannel.txt?key=val", "channel7"),
            ("/channel8.txt", "channel8"),
            ("/", ""),
            ("/?key=val", ""),
        ];

        for (uri, expected) in examples {
            let uri: Uri = uri.parse().unwrap();
            assert_eq!(channel_segment(uri.path()), expected, "uri {uri}");
        }
    }

    #[test]
    fn invalid_channel_is_none() {
        let uri: Uri = "/bad%20channel".parse().unwrap();
        assert!(channel_id_from_uri(&uri).is_none());
        let uri: Uri = "/".parse().unwrap();
        assert!(channel_id_from_uri(&uri).is_none());
    }

    #[test]
    fn since_absent_or_empty() {
        assert_eq!(since_from_query(None), Ok(None));
        assert_eq!(since_from_query(Some("other=1")), Ok(None));
        assert_eq!(since_from_query(Some("since=")), Ok(None));
    }

    #[test]
    fn since_parses_encoded_rfc3339() {
        let expected = Utc.with_ymd_and_hms(2016, 8, 4, 7, 23, 0).unwrap();
        assert_eq!(
            since_from_query(Some("since=2016-08-04T09%3A23%3A00%2B02%3A00")),
            Ok(Some(expected))
        );
        assert_eq!(
            since_from_query(Some("x=y&since=2016-08-04T07:23:00Z")),
            Ok(Some(expected))
        );
    }

    #[test]
    fn since_rejects_other_layouts() {
        assert_eq!(
            since_from_query(Some("since=04+Aug+16+09%3A23+CEST")),
            Err(MalformedSince)
        );
        assert_eq!(since_from_query(Some("since=%FF")), Err(MalformedSince));
    }
}
