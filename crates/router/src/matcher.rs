//! Path matching
//!
//! Turns a path such as `/case/42?tab=notes` into a [`Location`] and back.

use crate::error::RouterError;
use crate::routes::{ROOT_PATH, ROUTES, RouteMeta, WILDCARD, route};
use counsel_core::{Location, RouteName};
use std::collections::BTreeMap;
use url::form_urlencoded;

/// Parameter holding the unmatched path on the catch-all route
pub const PATH_MATCH_PARAM: &str = "pathMatch";

/// A path matched against the route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub meta: &'static RouteMeta,
    pub location: Location,
}

/// Match `path` against the route table. Unknown paths resolve to the
/// catch-all route; the root path resolves to the user dashboard.
pub fn resolve(path: &str) -> ResolvedRoute {
    let path = path.split('#').next().unwrap_or_default();
    let (path, query) = path.split_once('?').unwrap_or((path, ""));

    let path = match path.trim_end_matches('/') {
        "" => ROOT_PATH,
        trimmed => trimmed,
    };

    let (meta, params) = if path == ROOT_PATH {
        (route(RouteName::Dashboard), BTreeMap::new())
    } else {
        ROUTES
            .iter()
            .find_map(|meta| match_pattern(meta.path, path).map(|params| (meta, params)))
            .unwrap_or_else(|| {
                let mut params = BTreeMap::new();
                params.insert(PATH_MATCH_PARAM.to_string(), path.to_string());
                (route(RouteName::NotFound), params)
            })
    };

    let location = Location {
        name: meta.name,
        params,
        query: form_urlencoded::parse(query.as_bytes()).into_owned().collect(),
    };

    ResolvedRoute { meta, location }
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    if pattern == WILDCARD {
        return None;
    }

    let mut expected = pattern.split('/');
    let mut actual = path.split('/');
    let mut params = BTreeMap::new();

    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return Some(params),
            (Some(segment), Some(value)) => {
                if let Some(name) = segment.strip_prefix(':') {
                    if value.is_empty() {
                        return None;
                    }
                    params.insert(name.to_string(), value.to_string());
                } else if segment != value {
                    return None;
                }
            }
            _ => return None,
        }
    }
}

/// Full path (with query) for a location
pub fn href(location: &Location) -> Result<String, RouterError> {
    let meta = route(location.name);

    let mut path = if meta.path == WILDCARD {
        location
            .params
            .get(PATH_MATCH_PARAM)
            .cloned()
            .unwrap_or_else(|| "/not-found".to_string())
    } else {
        let mut segments = Vec::new();
        for segment in meta.path.split('/') {
            match segment.strip_prefix(':') {
                Some(name) => {
                    let value = location.params.get(name).ok_or_else(|| {
                        RouterError::MissingParam {
                            path: meta.path,
                            param: name.to_string(),
                        }
                    })?;
                    segments.push(value.as_str());
                }
                None => segments.push(segment),
            }
        }
        segments.join("/")
    };

    if !location.query.is_empty() {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&location.query)
            .finish();
        path.push('?');
        path.push_str(&query);
    }

    Ok(path)
}
