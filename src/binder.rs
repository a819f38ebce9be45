use crate::page::{ButtonRef, GroupId, Page};
use std::collections::BTreeMap;

/// Bind-time index over a page's status buttons: which buttons exist and
/// which group each belongs to.
///
/// The grouping used to be implicit (shared container in the rendered
/// page); here it is an explicit map built once when the page is ready.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    groups: BTreeMap<GroupId, Vec<ButtonRef>>,
}

impl Bindings {
    /// Scans the page and binds every status button it finds.
    #[must_use]
    pub fn bind(page: &Page) -> Self {
        let mut bindings = Self::default();
        bindings.scan(page);
        bindings
    }

    /// Discovers the page's buttons and records them under their group.
    ///
    /// Scanning the same unchanged page again is a no-op: a button already
    /// bound is never bound twice, so a click can never fan out into more
    /// than one submission.
    pub fn scan(&mut self, page: &Page) {
        for (index, listing) in page.listings().iter().enumerate() {
            let group = GroupId(index);
            let members = self.groups.entry(group).or_default();
            for slot in 0..listing.buttons.len() {
                let button = ButtonRef { group, slot };
                if !members.contains(&button) {
                    members.push(button);
                }
            }
        }
    }

    /// All buttons belonging to the given group, the clicked one included.
    #[must_use]
    pub fn members(&self, group: GroupId) -> &[ButtonRef] {
        self.groups.get(&group).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_bound(&self, button: ButtonRef) -> bool {
        self.members(button.group).contains(&button)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }
}
