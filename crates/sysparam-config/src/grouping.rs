//! Tag grouping read model.
//!
//! Views are rebuilt from a fresh repository fetch on every call and are
//! never persisted.

use indexmap::IndexMap;
use serde::Serialize;
use sysparam_storage::{Parameter, Tag};

/// Tag code assigned to parameters without one.
pub const UNGROUPED: &str = "UNGROUPED";

/// Blank or absent codes become [`UNGROUPED`]; anything else is trimmed.
pub fn normalize_tag_code(code: Option<&str>) -> String {
    match code.map(str::trim) {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => UNGROUPED.to_string(),
    }
}

/// Parameters of one tag together with the tag's display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagGroupView {
    pub tag_code: String,
    pub tag_name: String,
    pub description: Option<String>,
    /// Absent sorts last.
    pub priority: Option<i32>,
    /// Sorted by display priority (absent last), then key.
    pub params: Vec<Parameter>,
}

impl TagGroupView {
    fn from_tag(code: String, tag: &Tag) -> Self {
        Self {
            tag_name: tag.tag_name.clone().unwrap_or_else(|| code.clone()),
            tag_code: code,
            description: tag.description.clone(),
            priority: tag.priority,
            params: Vec::new(),
        }
    }

    /// A group for a code that has parameters but no declared metadata.
    fn synthesized(code: String) -> Self {
        Self {
            tag_name: code.clone(),
            tag_code: code,
            description: None,
            priority: None,
            params: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Keys of the grouped parameters, in display order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.key.as_str())
    }
}

/// Groups every parameter under its tag.
///
/// Declared tags seed the groups in the order given (blank codes skipped);
/// parameters whose code has no declared tag get a synthesized group. Groups
/// are stably sorted by priority, so ties keep seeding order.
pub fn group_by_tag(tags: Vec<Tag>, params: Vec<Parameter>) -> Vec<TagGroupView> {
    let mut groups: IndexMap<String, TagGroupView> = IndexMap::new();

    for tag in &tags {
        let code = tag.tag_code.trim();
        if code.is_empty() {
            continue;
        }
        groups.insert(code.to_string(), TagGroupView::from_tag(code.to_string(), tag));
    }

    for param in params {
        let code = normalize_tag_code(param.tag_code.as_deref());
        groups
            .entry(code)
            .or_insert_with_key(|code| TagGroupView::synthesized(code.clone()))
            .params
            .push(param);
    }

    let mut out: Vec<TagGroupView> = groups.into_values().collect();
    out.sort_by_key(|g| nulls_last(g.priority));
    for group in &mut out {
        sort_params(&mut group.params);
    }
    out
}

/// Builds the view of a single tag, or `None` when neither metadata nor any
/// parameter carries the code.
pub fn select_tag(code: &str, tags: &[Tag], params: Vec<Parameter>) -> Option<TagGroupView> {
    let normalized = normalize_tag_code(Some(code));

    let meta = tags
        .iter()
        .find(|t| normalize_tag_code(Some(&t.tag_code)) == normalized);

    let mut collected: Vec<Parameter> = params
        .into_iter()
        .filter(|p| normalize_tag_code(p.tag_code.as_deref()) == normalized)
        .collect();

    if meta.is_none() && collected.is_empty() {
        return None;
    }

    let mut view = match meta {
        Some(tag) => TagGroupView::from_tag(normalized, tag),
        None => TagGroupView::synthesized(normalized),
    };
    sort_params(&mut collected);
    view.params = collected;
    Some(view)
}

fn sort_params(params: &mut [Parameter]) {
    params.sort_by(|a, b| {
        nulls_last(a.display_priority)
            .cmp(&nulls_last(b.display_priority))
            .then_with(|| a.key.cmp(&b.key))
    });
}

fn nulls_last(priority: Option<i32>) -> (bool, i32) {
    (priority.is_none(), priority.unwrap_or_default())
}
