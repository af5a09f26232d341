//! XML response handling and error classification.

use crate::error::{ApiError, AwsErrorKind, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt::Display;
use tracing::{debug, warn};

/// An `<Error>` entry reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

/// A structurally valid XML response.
///
/// The payload stays opaque; text content is reachable by the local-name
/// path of its element relative to the root, e.g. `Items/Item/ASIN`.
#[derive(Debug, Clone)]
pub struct XmlResponse {
    body: String,
    root: String,
    namespace: Option<String>,
    nodes: Vec<(String, String)>,
    errors: Vec<ProviderError>,
}

impl XmlResponse {
    /// Parses a response body. Fails on malformed XML or a missing root.
    pub fn parse(body: &str) -> Result<Self> {
        let mut reader = Reader::from_str(body);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<String> = Vec::new();
        let mut root: Option<String> = None;
        let mut namespace = None;
        let mut nodes = Vec::new();
        let mut errors = Vec::new();
        let mut code: Option<String> = None;
        let mut message: Option<String> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = local_name(&e);
                    if root.is_none() {
                        namespace = default_namespace(&e)?;
                        root = Some(name.clone());
                    }
                    stack.push(name);
                }
                Ok(Event::Empty(e)) => {
                    if root.is_none() {
                        namespace = default_namespace(&e)?;
                        root = Some(local_name(&e));
                    }
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(malformed)?.into_owned();
                    record_text(&stack, text, &mut nodes, &mut code, &mut message);
                }
                Ok(Event::CData(c)) => {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    record_text(&stack, text, &mut nodes, &mut code, &mut message);
                }
                Ok(Event::End(_)) => {
                    if stack.pop().as_deref() == Some("Error") {
                        if let Some(code) = code.take() {
                            let message = message.take().unwrap_or_default();
                            errors.push(ProviderError { code, message });
                        }
                        message = None;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(malformed(e)),
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(ApiError::MalformedResponse(format!("unclosed element <{}>", stack.join("/"))));
        }
        let root = root.ok_or_else(|| malformed("document has no root element"))?;

        Ok(Self { body: body.to_string(), root, namespace, nodes, errors })
    }

    /// Local name of the root element (`ItemSearchResponse`, ...).
    pub fn root_name(&self) -> &str {
        &self.root
    }

    /// Default namespace declared on the root element.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// API version the provider answered with, taken from the last segment
    /// of the namespace (`.../AWSECommerceService/2011-08-01`).
    pub fn api_version(&self) -> Option<&str> {
        self.namespace()?.rsplit('/').find(|segment| !segment.is_empty())
    }

    /// Text of the first element at `path`.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.nodes.iter().find(|(p, _)| p == path).map(|(_, text)| text.as_str())
    }

    /// Text of every element at `path`, in document order.
    pub fn texts(&self, path: &str) -> Vec<&str> {
        self.nodes.iter().filter(|(p, _)| p == path).map(|(_, text)| text.as_str()).collect()
    }

    /// True if any `Request/IsValid` element reads `True`.
    pub fn is_valid(&self) -> bool {
        self.nodes
            .iter()
            .any(|(p, text)| (p == "Request/IsValid" || p.ends_with("/Request/IsValid")) && text == "True")
    }

    /// Error entries found anywhere in the document.
    pub fn errors(&self) -> &[ProviderError] {
        &self.errors
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn default_namespace(e: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(malformed)?;
        if attr.key.as_ref() == b"xmlns" {
            return Ok(Some(attr.unescape_value().map_err(malformed)?.into_owned()));
        }
    }
    Ok(None)
}

fn record_text(
    stack: &[String],
    text: String,
    nodes: &mut Vec<(String, String)>,
    code: &mut Option<String>,
    message: &mut Option<String>,
) {
    if stack.is_empty() {
        return;
    }

    let len = stack.len();
    if len >= 2 && stack[len - 2] == "Error" {
        match stack[len - 1].as_str() {
            "Code" => *code = Some(text.clone()),
            "Message" => *message = Some(text.clone()),
            _ => {}
        }
    }

    nodes.push((stack[1..].join("/"), text));
}

fn malformed(e: impl Display) -> ApiError {
    ApiError::MalformedResponse(e.to_string())
}

/// Turns a response into a parsed document or a typed error.
///
/// An error code in the body wins over the HTTP status. Without one, 503 is
/// throttling and any other non-2xx status is a generic HTTP error.
pub fn classify(status: u16, body: String) -> Result<XmlResponse> {
    let parsed = XmlResponse::parse(&body);

    if let Ok(document) = &parsed {
        if let Some(error) = document.errors().first() {
            debug!("Provider error {} (HTTP {})", error.code, status);
            return Err(error_for_code(&error.code, &error.message));
        }
    }

    if status == 503 {
        warn!("Throttled by provider (HTTP 503)");
        return Err(ApiError::TooManyRequests { message: format!("HTTP {}", status) });
    }

    if !(200..300).contains(&status) {
        return Err(ApiError::Http { status, body });
    }

    parsed
}

/// Maps a provider error code to its typed error.
pub fn error_for_code(code: &str, message: &str) -> ApiError {
    let kind = match code {
        "InvalidClientTokenId" => {
            warn!("Provider rejected the access key");
            return ApiError::InvalidClientTokenId { message: message.to_string() };
        }
        "RequestThrottled" | "AWS.RequestThrottled" => {
            warn!("Throttled by provider: {}", message);
            return ApiError::TooManyRequests { message: message.to_string() };
        }
        "SignatureDoesNotMatch" => AwsErrorKind::InvalidSignature,
        "AWS.InvalidParameterValue" => AwsErrorKind::InvalidParameterValue,
        "AWS.InvalidEnumeratedParameter" => AwsErrorKind::InvalidSearchIndex,
        "AWS.InvalidResponseGroup" => AwsErrorKind::InvalidResponseGroup,
        "AWS.InvalidParameterCombination" | "AWS.RestrictedParameterValueCombination" => {
            AwsErrorKind::InvalidParameterCombination
        }
        "AWS.MissingParameters" => AwsErrorKind::NotEnoughParameters,
        "AWS.ECommerceService.NoExactMatches" => AwsErrorKind::NoExactMatchesFound,
        "AWS.ECommerceService.NoSimilarities" => AwsErrorKind::NoSimilarityForAsin,
        "AWS.ECommerceService.ItemNotAccessible" => AwsErrorKind::ItemNotAccessible,
        "AWS.ECommerceService.CartInfoMismatch" => AwsErrorKind::CartInfoMismatch,
        "AWS.ECommerceService.ItemAlreadyInCart" => AwsErrorKind::ItemAlreadyInCart,
        _ => AwsErrorKind::Other,
    };

    ApiError::Aws { kind, code: code.to_string(), message: message.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM_LOOKUP: &str = r#"<?xml version="1.0" ?>
<ItemLookupResponse xmlns="http://webservices.amazon.com/AWSECommerceService/2011-08-01">
  <OperationRequest><RequestId>abc</RequestId></OperationRequest>
  <Items>
    <Request><IsValid>True</IsValid></Request>
    <Item><ASIN>0747532745</ASIN><ItemAttributes><Title>Harry Potter &amp; the Philosopher's Stone</Title></ItemAttributes></Item>
    <Item><ASIN>0747538492</ASIN></Item>
  </Items>
</ItemLookupResponse>"#;

    const WRONG_KEY: &str = r#"<?xml version="1.0"?>
<ItemLookupErrorResponse xmlns="http://ecs.amazonaws.com/doc/2011-08-01/"><Error><Code>InvalidClientTokenId</Code><Message>The AWS Access Key Id you provided does not exist in our records.</Message></Error><RequestId>1</RequestId></ItemLookupErrorResponse>"#;

    const NO_MATCHES: &str = r#"<?xml version="1.0"?>
<ItemSearchResponse xmlns="http://webservices.amazon.com/AWSECommerceService/2011-08-01">
  <Items><Request><IsValid>True</IsValid>
    <Errors><Error><Code>AWS.ECommerceService.NoExactMatches</Code><Message>We did not find any matches for your request.</Message></Error></Errors>
  </Request><TotalResults>0</TotalResults></Items>
</ItemSearchResponse>"#;

    #[test]
    fn test_parse_success_document() {
        let doc = XmlResponse::parse(ITEM_LOOKUP).unwrap();
        assert_eq!(doc.root_name(), "ItemLookupResponse");
        assert_eq!(doc.namespace(), Some("http://webservices.amazon.com/AWSECommerceService/2011-08-01"));
        assert_eq!(doc.api_version(), Some("2011-08-01"));
        assert_eq!(doc.texts("Items/Item/ASIN"), vec!["0747532745", "0747538492"]);
        assert_eq!(
            doc.text("Items/Item/ItemAttributes/Title"),
            Some("Harry Potter & the Philosopher's Stone")
        );
        assert!(doc.is_valid());
        assert!(doc.errors().is_empty());
        assert_eq!(doc.text("Items/Missing"), None);
    }

    #[test]
    fn test_api_version_with_trailing_slash() {
        let doc = XmlResponse::parse(WRONG_KEY).unwrap();
        assert_eq!(doc.api_version(), Some("2011-08-01"));
    }

    #[test]
    fn test_parse_collects_errors() {
        let doc = XmlResponse::parse(NO_MATCHES).unwrap();
        assert_eq!(
            doc.errors(),
            &[ProviderError {
                code: "AWS.ECommerceService.NoExactMatches".to_string(),
                message: "We did not find any matches for your request.".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(XmlResponse::parse(""), Err(ApiError::MalformedResponse(_))));
        assert!(matches!(XmlResponse::parse("<a><b></a>"), Err(ApiError::MalformedResponse(_))));
        assert!(matches!(XmlResponse::parse("<a><b>"), Err(ApiError::MalformedResponse(_))));
    }

    #[test]
    fn test_classify_success() {
        let doc = classify(200, ITEM_LOOKUP.to_string()).unwrap();
        assert_eq!(doc.body(), ITEM_LOOKUP);
    }

    #[test]
    fn test_classify_invalid_client_token() {
        let err = classify(403, WRONG_KEY.to_string()).unwrap_err();
        match err {
            ApiError::InvalidClientTokenId { message } => assert!(message.contains("does not exist")),
            other => panic!("expected InvalidClientTokenId, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_throttled_by_code_and_status() {
        let body = r#"<ItemLookupErrorResponse><Error><Code>RequestThrottled</Code><Message>slow down</Message></Error></ItemLookupErrorResponse>"#;
        assert!(matches!(classify(503, body.to_string()), Err(ApiError::TooManyRequests { .. })));

        // Bare 503 without a body marker
        assert!(matches!(classify(503, String::new()), Err(ApiError::TooManyRequests { .. })));
    }

    #[test]
    fn test_body_code_wins_over_status() {
        // A throttling code on a 403 is still throttling
        let body = r#"<ErrorResponse><Error><Code>RequestThrottled</Code><Message>m</Message></Error></ErrorResponse>"#;
        assert!(matches!(classify(403, body.to_string()), Err(ApiError::TooManyRequests { .. })));

        // A credential code on a 503 is still a credential error
        assert!(matches!(classify(503, WRONG_KEY.to_string()), Err(ApiError::InvalidClientTokenId { .. })));
    }

    #[test]
    fn test_classify_error_in_success_body() {
        let err = classify(200, NO_MATCHES.to_string()).unwrap_err();
        assert_eq!(err.kind(), Some(AwsErrorKind::NoExactMatchesFound));
        assert_eq!(err.code(), Some("AWS.ECommerceService.NoExactMatches"));
    }

    #[test]
    fn test_classify_generic_http_error() {
        let err = classify(500, "<html>Internal Error</html>".to_string()).unwrap_err();
        match err {
            ApiError::Http { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("Internal Error"));
            }
            other => panic!("expected Http error, got {:?}", other),
        }

        let err = classify(403, "Forbidden".to_string()).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 403, .. }));
    }

    #[test]
    fn test_classify_malformed_success() {
        assert!(matches!(classify(200, "not xml <".to_string()), Err(ApiError::MalformedResponse(_))));
    }

    #[test]
    fn test_error_code_table() {
        let cases = [
            ("SignatureDoesNotMatch", AwsErrorKind::InvalidSignature),
            ("AWS.InvalidParameterValue", AwsErrorKind::InvalidParameterValue),
            ("AWS.InvalidEnumeratedParameter", AwsErrorKind::InvalidSearchIndex),
            ("AWS.InvalidResponseGroup", AwsErrorKind::InvalidResponseGroup),
            ("AWS.InvalidParameterCombination", AwsErrorKind::InvalidParameterCombination),
            ("AWS.RestrictedParameterValueCombination", AwsErrorKind::InvalidParameterCombination),
            ("AWS.MissingParameters", AwsErrorKind::NotEnoughParameters),
            ("AWS.ECommerceService.NoSimilarities", AwsErrorKind::NoSimilarityForAsin),
            ("AWS.ECommerceService.ItemNotAccessible", AwsErrorKind::ItemNotAccessible),
            ("AWS.ECommerceService.CartInfoMismatch", AwsErrorKind::CartInfoMismatch),
            ("AWS.ECommerceService.ItemAlreadyInCart", AwsErrorKind::ItemAlreadyInCart),
            ("AWS.MinimumParameterRequirement", AwsErrorKind::Other),
        ];

        for (code, kind) in cases {
            let err = error_for_code(code, "message");
            assert_eq!(err.kind(), Some(kind), "code {}", code);
            assert_eq!(err.code(), Some(code));
        }
    }
}
