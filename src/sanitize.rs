use ammonia::Builder;
use std::collections::{HashMap, HashSet};

const ALLOWED_TAGS: [&str; 5] = ["a", "br", "strong", "em", "code"];
const LINK_ATTRIBUTES: [&str; 3] = ["href", "target", "rel"];

/// Clean a portfolio description down to a handful of inline tags.
///
/// Only `a, br, strong, em, code` survive, and only `href`, `target` and
/// `rel` on links. Script and style elements are removed with their content.
pub fn sanitize_description(html: &str) -> String {
    let tag_attributes = HashMap::from([("a", HashSet::from(LINK_ATTRIBUTES))]);

    Builder::default()
        .tags(HashSet::from(ALLOWED_TAGS))
        .tag_attributes(tag_attributes)
        .generic_attributes(HashSet::new())
        // rel is allowed through as authored, so ammonia must not manage it
        .link_rel(None)
        .clean(html)
        .to_string()
}
