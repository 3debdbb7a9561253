use crate::config::IndexConfig;
use crate::utils::to_lookup_key;

/// Maps free-text like "bank nifty" or "/scan midcap" onto a configured ticker list.
///
/// Exact name wins, then an exact keyword, then the longest keyword contained in the input.
pub fn resolve_index<'a>(input: &str, indices: &'a [IndexConfig]) -> Option<&'a IndexConfig> {
    let key = to_lookup_key(input);
    if key.is_empty() {
        return None;
    }

    if let Some(index) = indices.iter().find(|i| to_lookup_key(&i.name) == key) {
        return Some(index);
    }

    let keywords = || {
        indices.iter().flat_map(|index| {
            index
                .match_keywords
                .iter()
                .map(move |kw| (to_lookup_key(kw), index))
        })
    };

    if let Some((_, index)) = keywords().find(|(kw, _)| *kw == key) {
        return Some(index);
    }

    keywords()
        .filter(|(kw, _)| !kw.is_empty() && key.contains(kw.as_str()))
        .max_by_key(|(kw, _)| kw.len())
        .map(|(_, index)| index)
}
