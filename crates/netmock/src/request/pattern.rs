//! Mock requests matched against a `:name` URL pattern.

use super::incoming::IncomingRequest;
use super::types::{MockRequest, RemovalPolicy};
use crate::error::MockError;
use crate::responder::{Responder, SharedResponder};
use http::Method;
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};
use url::Url;

/// Placeholder name to decoded segment value, in pattern order.
pub type PathParams = IndexMap<String, String>;

type ResponderGenerator =
    dyn Fn(&IncomingRequest, &PathParams) -> Option<SharedResponder> + Send + Sync;
type RequestPredicate = dyn Fn(&IncomingRequest, &PathParams) -> bool + Send + Sync;

/// Compiled URL pattern such as `/users/:id/posts/:postId`.
///
/// A pattern that contains `://` is matched against the whole URL without its
/// query and fragment; any other pattern is matched against the path alone.
/// Each `:name` placeholder spans exactly one non-empty path segment.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    source: String,
    regex: Regex,
    names: Vec<String>,
    full_url: bool,
}

impl UrlPattern {
    pub fn compile(pattern: &str) -> Result<Self, MockError> {
        let invalid = |reason: &str| MockError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if pattern.is_empty() {
            return Err(invalid("pattern must not be empty"));
        }
        if pattern.contains('?') || pattern.contains('#') {
            return Err(invalid("pattern must not contain a query or fragment"));
        }

        let (prefix, path, full_url) = match pattern.find("://") {
            Some(scheme_end) => {
                let authority_start = scheme_end + 3;
                let path_start = pattern[authority_start..]
                    .find('/')
                    .map_or(pattern.len(), |i| authority_start + i);
                let (origin, path) = pattern.split_at(path_start);
                let path = if path.is_empty() { "/" } else { path };
                let origin =
                    normalize_origin(origin).ok_or_else(|| invalid("origin is not a valid URL"))?;
                (origin, path, true)
            }
            None if pattern.starts_with('/') => (String::new(), pattern, false),
            None => return Err(invalid("pattern must start with '/' or a scheme")),
        };

        let mut names: Vec<String> = Vec::new();
        let mut segments = Vec::new();
        for segment in path.split('/') {
            match segment.strip_prefix(':') {
                Some(name) => {
                    if name.is_empty() {
                        return Err(invalid("placeholder has no name"));
                    }
                    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(invalid(
                            "placeholder names may only contain letters, digits and '_'",
                        ));
                    }
                    if names.iter().any(|existing| existing == name) {
                        return Err(invalid("placeholder names must be unique"));
                    }
                    names.push(name.to_string());
                    segments.push("([^/]+)".to_string());
                }
                None => segments.push(regex::escape(segment)),
            }
        }

        let expression = format!("^{}{}$", regex::escape(&prefix), segments.join("/"));
        let regex = Regex::new(&expression).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            names,
            full_url,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn placeholder_names(&self) -> &[String] {
        &self.names
    }

    /// Match `url` and extract placeholder values, or `None` if it does not match.
    pub fn extract(&self, url: &Url) -> Option<PathParams> {
        let target = if self.full_url {
            let mut stripped = url.clone();
            stripped.set_query(None);
            stripped.set_fragment(None);
            stripped.to_string()
        } else {
            url.path().to_string()
        };

        let captures = self.regex.captures(&target)?;
        let params = self
            .names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                let raw = captures.get(i + 1)?.as_str();
                let value = urlencoding::decode(raw)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| raw.to_string());
                Some((name.clone(), value))
            })
            .collect();
        Some(params)
    }
}

/// Serialize `origin` the way parsed request URLs are: lowercase scheme and
/// host, default port dropped.
fn normalize_origin(origin: &str) -> Option<String> {
    let parsed = Url::parse(origin).ok()?;
    if parsed.cannot_be_a_base() {
        return None;
    }
    let serialized = parsed.as_str();
    Some(serialized.strip_suffix('/').unwrap_or(serialized).to_string())
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A mock request that matches any URL fitting a pattern and builds a fresh
/// responder for each dispatch.
///
/// Pattern requests stay registered after servicing unless
/// [`PatternRequest::removes_after_servicing`] opts in.
pub struct PatternRequest {
    pattern: UrlPattern,
    methods: Option<HashSet<Method>>,
    generator: Box<ResponderGenerator>,
    predicate: Option<Box<RequestPredicate>>,
    remove_after_servicing: bool,
}

impl PatternRequest {
    /// Create a pattern request answering every HTTP method.
    ///
    /// `generator` runs once per dispatch. Returning `None` is a configuration
    /// error that fails the dispatch.
    pub fn new<F, R>(pattern: &str, generator: F) -> Result<Self, MockError>
    where
        F: Fn(&IncomingRequest, &PathParams) -> Option<R> + Send + Sync + 'static,
        R: Responder + 'static,
    {
        Ok(Self {
            pattern: UrlPattern::compile(pattern)?,
            methods: None,
            generator: Box::new(move |request: &IncomingRequest, params: &PathParams| {
                generator(request, params).map(|responder| Arc::new(responder) as SharedResponder)
            }),
            predicate: None,
            remove_after_servicing: false,
        })
    }

    /// Restrict matching to `methods`.
    pub fn with_methods<I>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        self.methods = Some(methods.into_iter().collect());
        self
    }

    /// Require `predicate` to accept the request and its extracted parameters.
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&IncomingRequest, &PathParams) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn removes_after_servicing(mut self, remove: bool) -> Self {
        self.remove_after_servicing = remove;
        self
    }

    pub fn pattern(&self) -> &UrlPattern {
        &self.pattern
    }

    pub fn methods(&self) -> Option<&HashSet<Method>> {
        self.methods.as_ref()
    }
}

impl fmt::Debug for PatternRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRequest")
            .field("pattern", &self.pattern.as_str())
            .field("methods", &self.methods)
            .field("has_predicate", &self.predicate.is_some())
            .field("remove_after_servicing", &self.remove_after_servicing)
            .finish()
    }
}

impl MockRequest for PatternRequest {
    fn matches(&self, request: &IncomingRequest) -> bool {
        let Some(params) = self.pattern.extract(request.url()) else {
            return false;
        };
        if let Some(methods) = &self.methods {
            if !methods.contains(request.method()) {
                return false;
            }
        }
        match &self.predicate {
            Some(predicate) => predicate(request, &params),
            None => true,
        }
    }

    fn responder_for(&self, request: &IncomingRequest) -> Result<SharedResponder, MockError> {
        let params = self.pattern.extract(request.url()).unwrap_or_default();
        debug!(
            "Generating responder for {} from pattern '{}' with {:?}",
            request, self.pattern, params
        );
        (self.generator)(request, &params).ok_or_else(|| {
            error!(
                "Responder generator for pattern '{}' returned no responder for {}",
                self.pattern, request
            );
            MockError::MissingResponder(self.describe())
        })
    }

    fn removal_policy(&self) -> RemovalPolicy {
        if self.remove_after_servicing {
            RemovalPolicy::AfterServicing
        } else {
            RemovalPolicy::Never
        }
    }

    fn describe(&self) -> String {
        match &self.methods {
            Some(methods) => {
                let mut methods: Vec<&str> = methods.iter().map(Method::as_str).collect();
                methods.sort_unstable();
                format!("{} {}", methods.join("|"), self.pattern)
            }
            None => format!("* {}", self.pattern),
        }
    }
}
