use std::collections::BTreeSet;

/// Distinct tag labels across a set of contacts.
pub type TagSet = BTreeSet<String>;

/// Split a comma-separated tags field into trimmed, non-empty labels.
pub fn parse_tags(tags: &str) -> impl Iterator<Item = &str> {
    tags.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Collect the distinct labels of many tags fields.
pub fn collect_tags<'a, I>(fields: I) -> TagSet
where
    I: IntoIterator<Item = &'a str>,
{
    fields
        .into_iter()
        .flat_map(parse_tags)
        .map(str::to_string)
        .collect()
}
