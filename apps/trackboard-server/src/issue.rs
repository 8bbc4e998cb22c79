//! Presentation helpers for the host's Issue entity.
//!
//! The host supplies the facts; these are pure functions over them, with no
//! storage or HTTP involvement. Exported for host-side rendering.

use trackboard_storage::{GroupId, PrincipalRef, UserId};

/// Host-supplied facts about an issue, as far as presentation cares.
#[derive(Clone, Debug, Default)]
pub struct IssueFacts {
    pub id: u64,
    /// Externally-assigned issue key, if the host tracks one.
    pub external_key: Option<String>,
    /// Board-level abbreviation used to build display keys like `BRD-12`.
    pub board_abbreviation: Option<String>,
    pub closed: bool,
    pub overdue: bool,
    pub child: bool,
    pub leaf: bool,
    pub private: bool,
    pub author_id: Option<UserId>,
    pub assigned_to: Option<PrincipalRef>,
}

/// The actor looking at the issue, with their group memberships expanded.
#[derive(Clone, Debug)]
pub struct Viewer {
    pub user_id: UserId,
    pub group_ids: Vec<GroupId>,
}

/// Display key for an issue: external key if present, else `ABBR-n` when the
/// board defines an abbreviation, else `#n`.
pub fn display_id(facts: &IssueFacts) -> String {
    if let Some(key) = &facts.external_key {
        return key.clone();
    }
    match &facts.board_abbreviation {
        Some(abbr) if !abbr.is_empty() => format!("{}-{}", abbr, facts.id),
        _ => format!("#{}", facts.id),
    }
}

/// Space-prefixed CSS class list for an issue row.
///
/// Anonymous viewers only get the state classes; the relationship classes
/// need a logged-in viewer.
pub fn css_classes(facts: &IssueFacts, viewer: Option<&Viewer>) -> String {
    let mut s = String::new();
    if facts.closed {
        s.push_str(" closed");
    }
    if facts.overdue {
        s.push_str(" overdue");
    }
    if facts.child {
        s.push_str(" child");
    }
    if !facts.leaf {
        s.push_str(" parent");
    }
    if facts.private {
        s.push_str(" private");
    }
    if let Some(viewer) = viewer {
        if facts.author_id.as_ref() == Some(&viewer.user_id) {
            s.push_str(" created-by-me");
        }
        match &facts.assigned_to {
            Some(PrincipalRef::User(id)) if *id == viewer.user_id => {
                s.push_str(" assigned-to-me");
            }
            Some(PrincipalRef::Group(id)) if viewer.group_ids.contains(id) => {
                s.push_str(" assigned-to-my-group");
            }
            _ => {}
        }
    }
    s
}
