//! String list normalization.

use conform_core::{Context, ValidationError};

/// Normalize a list of strings, failing on the first duplicate.
///
/// `None` and an empty list both normalize to `None`. Entries are trimmed,
/// null and blank entries are dropped, and a duplicate of an earlier entry
/// fails at `ctx.child_element(field, i)` where `i` is the duplicate's
/// position in the input.
pub fn string_list<C, I, S>(
    ctx: &C,
    field: &str,
    value: Option<I>,
) -> Result<Option<Vec<String>>, ValidationError>
where
    C: Context,
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let Some(items) = value else {
        return Ok(None);
    };

    let mut normalized: Vec<String> = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        let Some(entry) = item.as_ref().map(|s| AsRef::<str>::as_ref(s).trim()) else {
            continue;
        };
        if entry.is_empty() {
            continue;
        }
        if normalized.iter().any(|seen| seen == entry) {
            return Err(ctx
                .child_element(field, index)
                .fail(format!("duplicate entry '{entry}'")));
        }
        normalized.push(entry.to_string());
    }

    Ok((!normalized.is_empty()).then_some(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_core::PathContext;
    use proptest::prelude::*;

    fn ctx() -> PathContext {
        PathContext::root("profile")
    }

    fn raw(items: &[Option<&str>]) -> Vec<Option<String>> {
        items.iter().map(|i| i.map(str::to_string)).collect()
    }

    #[test]
    fn test_trims_and_drops_blank_entries() {
        let input = raw(&[
            Some("key1   "),
            None,
            Some("   key2"),
            Some(""),
            Some("key3"),
            Some("   "),
        ]);
        let out = string_list(&ctx(), "keys", Some(input)).unwrap();
        assert_eq!(out, Some(vec!["key1".into(), "key2".into(), "key3".into()]));
    }

    #[test]
    fn test_duplicate_reports_input_index() {
        let input = raw(&[
            Some("key1   "),
            None,
            Some("   key2"),
            Some(""),
            Some("key3"),
            Some("   "),
            Some("key3"),
        ]);
        let err = string_list(&ctx(), "keys", Some(input)).unwrap_err();
        assert_eq!(err.code(), "profile.keys[6]");
        assert!(err.message().contains("key3"));
    }

    #[test]
    fn test_duplicate_detected_after_trim() {
        let err = string_list(&ctx(), "keys", Some(vec![Some("a"), Some(" a ")])).unwrap_err();
        assert_eq!(err.code(), "profile.keys[1]");
    }

    #[test]
    fn test_null_and_empty_normalize_to_none() {
        assert_eq!(string_list::<_, Vec<Option<String>>, _>(&ctx(), "keys", None).unwrap(), None);
        assert_eq!(string_list(&ctx(), "keys", Some(Vec::<Option<String>>::new())).unwrap(), None);
        assert_eq!(string_list(&ctx(), "keys", Some(vec![Some(" "), None])).unwrap(), None);
    }

    proptest! {
        #[test]
        fn prop_output_is_trimmed_nonblank_and_distinct(
            items in proptest::collection::vec(proptest::option::of("[ a-c]{0,3}"), 0..12)
        ) {
            if let Ok(Some(out)) = string_list(&ctx(), "keys", Some(items.clone())) {
                for (i, entry) in out.iter().enumerate() {
                    prop_assert_eq!(entry.trim(), entry.as_str());
                    prop_assert!(!entry.is_empty());
                    prop_assert!(!out[..i].contains(entry));
                }
            }
        }
    }
}
