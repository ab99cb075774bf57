use std::collections::HashMap;

use once_cell::sync::Lazy;
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::Campaign;

/// The viewer-side input the audience filters are evaluated against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// Resolved country code of the viewer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Tags of the community the viewer is seeing the ad in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// The viewer's configured language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// A campaign's reference to a registered filter with its targeting data.
///
/// `name` must match a registered filter; unknown names are skipped during
/// evaluation (no opinion), not treated as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCall {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<String>,
}

/// The closed set of registered audience filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr)]
#[display(style = "lowercase")]
pub enum FilterKind {
    Countries,
    Tags,
    Languages,
}

type Handler = fn(&[String], &Input) -> bool;

/// Name to predicate mapping, resolved once at startup.
static REGISTRY: Lazy<HashMap<FilterKind, Handler>> = Lazy::new(|| {
    [
        (FilterKind::Countries, countries as Handler),
        (FilterKind::Tags, tags as Handler),
        (FilterKind::Languages, languages as Handler),
    ]
    .into_iter()
    .collect()
});

/// The viewer's resolved country must be in the supplied list.
/// Fails closed when the country could not be resolved.
fn countries(allowed: &[String], input: &Input) -> bool {
    match &input.country {
        Some(country) => allowed.iter().any(|candidate| candidate == country),
        None => false,
    }
}

/// The viewer's community must share at least one tag with the supplied list.
fn tags(required: &[String], input: &Input) -> bool {
    input
        .tags
        .iter()
        .any(|tag| required.iter().any(|candidate| candidate == tag))
}

/// The viewer's configured language must be in the supplied list.
/// Fails closed when no language is configured.
fn languages(allowed: &[String], input: &Input) -> bool {
    match &input.language {
        Some(language) => allowed.iter().any(|candidate| candidate == language),
        None => false,
    }
}

/// AND over all of the campaign's filter calls, short-circuiting on the
/// first `false`. An absent or empty filter list matches every viewer,
/// and calls whose name does not resolve contribute `true`.
pub fn eval_all(campaign: &Campaign, input: &Input) -> bool {
    let calls = match &campaign.filters {
        Some(calls) => calls,
        None => return true,
    };

    for call in calls {
        let kind = match call.name.parse::<FilterKind>() {
            Ok(kind) => kind,
            Err(_unknown) => continue,
        };

        let handler = match REGISTRY.get(&kind) {
            Some(handler) => handler,
            None => continue,
        };

        if !handler(&call.data, input) {
            return false;
        }
    }

    true
}
