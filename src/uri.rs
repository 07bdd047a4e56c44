//! Final request URI composition.
//!
//! [`compose`] joins a base endpoint and a resource template, fills `{name}`
//! segments from [`UrlSegment`](ParameterKind::UrlSegment) parameters and
//! appends the query string. The base endpoint is validated first so a
//! malformed endpoint is reported before anything touches the network.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::{ParseError, Url};

use crate::error::{Result, SteamError};
use crate::parameter::{Parameter, ParameterKind, ParameterSet};
use crate::request::{DataFormat, Method};

/// Everything except RFC 3986 unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a single name or value.
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

/// Check that `endpoint` is a well-formed absolute or relative URI reference.
///
/// Characters outside the RFC 3986 set (spaces, quotes, `<>`, …) and stray
/// `%` signs are rejected rather than silently escaped.
pub fn validate_endpoint(endpoint: &str) -> Result<()> {
    let malformed = || SteamError::MalformedEndpoint(endpoint.to_string());

    let bytes = endpoint.as_bytes();
    let mut i = 0;
    while let Some(&b) = bytes.get(i) {
        if b == b'%' {
            let hex = |offset: usize| bytes.get(i + offset).is_some_and(u8::is_ascii_hexdigit);
            if !(hex(1) && hex(2)) {
                return Err(malformed());
            }
            i += 3;
            continue;
        }
        if !is_uri_char(b) {
            return Err(malformed());
        }
        i += 1;
    }

    match Url::parse(endpoint) {
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => Ok(()),
        Err(_) => Err(malformed()),
    }
}

fn is_uri_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-._~:/?#[]@!$&'()*+,;=".contains(&b)
}

/// Compose the final URI for a request.
///
/// Slash normalization between `base` and `resource` is idempotent: a trailing
/// slash on the base and a leading slash on the resource are both optional.
/// For POST/PUT with a non-raw body only [`QueryString`](ParameterKind::QueryString)
/// parameters go on the query string; otherwise
/// [`FormOrQuery`](ParameterKind::FormOrQuery) parameters join them.
///
/// # Errors
///
/// Returns [`SteamError::MalformedEndpoint`] if `base` is not a well-formed URI.
///
/// # Example
///
/// ```
/// use steam_chat_client::parameter::ParameterSet;
/// use steam_chat_client::request::{DataFormat, Method};
/// use steam_chat_client::uri::compose;
///
/// let uri = compose(
///     "http://steamapiurl.com/",
///     "/resource",
///     &ParameterSet::new(),
///     Method::Get,
///     DataFormat::FormUrlEncoded,
/// )
/// .unwrap();
/// assert_eq!(uri, "http://steamapiurl.com/resource");
/// ```
pub fn compose(
    base: &str,
    resource: &str,
    parameters: &ParameterSet,
    method: Method,
    format: DataFormat,
) -> Result<String> {
    validate_endpoint(base)?;

    let base = base.trim_end_matches('/');
    let resource = resource.trim_start_matches('/');

    let mut uri = if resource.is_empty() {
        base.to_string()
    } else if base.is_empty() {
        resource.to_string()
    } else {
        format!("{base}/{resource}")
    };

    for segment in parameters.of_kind(ParameterKind::UrlSegment) {
        let placeholder = format!("{{{}}}", segment.name);
        uri = uri.replace(&placeholder, &segment.value_text());
    }

    let query_only = method.has_body() && format != DataFormat::Raw;
    let query: Vec<&Parameter> = parameters
        .iter()
        .filter(|p| match p.kind {
            ParameterKind::QueryString => true,
            ParameterKind::FormOrQuery => !query_only,
            _ => false,
        })
        .collect();

    if !query.is_empty() {
        uri.push(if uri.contains('?') { '&' } else { '?' });
        uri.push_str(&encode_pairs(query));
    }

    Ok(uri)
}

/// `name=value&...` for the given parameters, honoring `pre_encoded`.
pub(crate) fn encode_pairs<'a>(params: impl IntoIterator<Item = &'a Parameter>) -> String {
    params
        .into_iter()
        .map(|p| {
            if p.pre_encoded {
                format!("{}={}", p.name, p.value_text())
            } else {
                format!(
                    "{}={}",
                    encode_component(&p.name),
                    encode_component(&p.value_text())
                )
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}
