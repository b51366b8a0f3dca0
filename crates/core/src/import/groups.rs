//! List and group resolution
//!
//! Runs against a freshly fetched list catalog, before any call that would
//! change remote state.

use mailup_domain::{GroupSelection, List, MailUpError, Result};

/// The list with `list_id`.
///
/// # Errors
/// `Validation` naming the id when the list does not exist.
pub fn find_list(lists: &[List], list_id: i64) -> Result<&List> {
    lists
        .iter()
        .find(|list| list.id == list_id)
        .ok_or_else(|| MailUpError::validation(format!("Unable to find the list with id {list_id}")))
}

/// Validate a group selection against `list`, dropping duplicates.
///
/// # Errors
/// `Validation` naming the first id that is malformed, not positive, or not
/// a group of the list.
pub fn resolve_groups(list: &List, selection: &GroupSelection) -> Result<Vec<i64>> {
    let candidates: Vec<(String, Option<i64>)> = match selection {
        GroupSelection::Ids(ids) => ids.iter().map(|id| (id.to_string(), Some(*id))).collect(),
        GroupSelection::Csv(csv) => csv
            .split(',')
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| (raw.to_string(), raw.parse::<i64>().ok()))
            .collect(),
    };

    let mut resolved = Vec::with_capacity(candidates.len());
    for (raw, parsed) in candidates {
        let id = parsed
            .filter(|id| *id > 0)
            .ok_or_else(|| MailUpError::validation(format!("Invalid group id: {raw}")))?;
        if resolved.contains(&id) {
            continue;
        }
        if list.group(id).is_none() {
            return Err(MailUpError::validation(format!("Invalid group id: {id}")));
        }
        resolved.push(id);
    }
    Ok(resolved)
}

/// Comma-joined ids, as sent to the import service.
pub fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use mailup_domain::Group;

    use super::*;

    fn list() -> List {
        List {
            id: 10,
            guid: "g-10".into(),
            name: "Main".into(),
            groups: (1..=3).map(|id| Group { id, name: format!("Group {id}") }).collect(),
        }
    }

    #[test]
    fn unknown_group_is_named() {
        let err = resolve_groups(&list(), &GroupSelection::from(7)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid group id: 7");
    }

    #[test]
    fn csv_selection_is_trimmed_and_deduplicated() {
        let ids = resolve_groups(&list(), &GroupSelection::from(" 3, 1,,3 ")).unwrap();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(join_ids(&ids), "3,1");
    }

    #[test]
    fn malformed_and_non_positive_ids_are_rejected() {
        let err = resolve_groups(&list(), &GroupSelection::from("1,abc")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid group id: abc");

        let err = resolve_groups(&list(), &GroupSelection::from(vec![0])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid group id: 0");
    }

    #[test]
    fn empty_selection_is_allowed() {
        assert!(resolve_groups(&list(), &GroupSelection::default()).unwrap().is_empty());
        assert!(resolve_groups(&list(), &GroupSelection::from("")).unwrap().is_empty());
    }

    #[test]
    fn missing_list_is_named() {
        let lists = vec![list()];
        assert_eq!(find_list(&lists, 10).unwrap().guid, "g-10");
        let err = find_list(&lists, 99).unwrap_err();
        assert_eq!(err.to_string(), "Unable to find the list with id 99");
    }
}
