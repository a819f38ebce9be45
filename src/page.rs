use serde::{Serialize, Serializer};
use std::fmt;

/// Shelf a book can be filed under.
///
/// Unknown values coming from the page are kept verbatim so they reach the
/// server unchanged instead of being rejected client-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    Read,
    Reading,
    Wishlist,
    Other(String),
}

impl Status {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "read" => Self::Read,
            "reading" => Self::Reading,
            "wishlist" => Self::Wishlist,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Read => "read",
            Self::Reading => "reading",
            Self::Wishlist => "wishlist",
            Self::Other(other) => other,
        }
    }

    /// Display name shown on a button that hasn't been clicked yet.
    #[must_use]
    pub fn idle_label(&self) -> &str {
        match self {
            Self::Read => "読んだ本",
            Self::Reading => "積読",
            Self::Wishlist => "読みたい",
            Self::Other(other) => other,
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four named book inputs each listing carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFields {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub thumbnail_url: String,
}

/// Where a single status-change attempt currently is.
///
/// `Confirmed` is permanently terminal for the whole group; `Failed` is
/// terminal for the attempt only and can be re-entered by clicking again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct StatusButton {
    pub status: Status,
    pub label: String,
    pub enabled: bool,
    pub phase: Phase,
}

impl StatusButton {
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            label: status.idle_label().to_owned(),
            status,
            enabled: true,
            phase: Phase::Idle,
        }
    }
}

/// One book on the page: its field values and its group of status buttons.
#[derive(Debug, Clone)]
pub struct BookListing {
    pub fields: BookFields,
    pub buttons: Vec<StatusButton>,
}

impl BookListing {
    /// A listing with the three standard shelf buttons.
    #[must_use]
    pub fn new(fields: BookFields) -> Self {
        Self::with_statuses(
            fields,
            [Status::Read, Status::Reading, Status::Wishlist],
        )
    }

    /// A listing whose buttons declare the given statuses, in order.
    #[must_use]
    pub fn with_statuses(fields: BookFields, statuses: impl IntoIterator<Item = Status>) -> Self {
        Self {
            fields,
            buttons: statuses.into_iter().map(StatusButton::new).collect(),
        }
    }
}

/// Identifies a button group: the listing all its buttons belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of one button: its group plus its position within the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ButtonRef {
    pub group: GroupId,
    pub slot: usize,
}

impl fmt::Display for ButtonRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.slot)
    }
}

/// The rendered page the controller works against: one CSRF token and a
/// list of book listings. Field values are read from here at click time,
/// never cached earlier.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub csrf_token: String,
    listings: Vec<BookListing>,
}

impl Page {
    #[must_use]
    pub fn new(csrf_token: impl Into<String>) -> Self {
        Self {
            csrf_token: csrf_token.into(),
            listings: Vec::new(),
        }
    }

    pub fn push(&mut self, listing: BookListing) -> GroupId {
        self.listings.push(listing);
        GroupId(self.listings.len() - 1)
    }

    pub fn push_listing(&mut self, fields: BookFields) -> GroupId {
        self.push(BookListing::new(fields))
    }

    #[must_use]
    pub fn listings(&self) -> &[BookListing] {
        &self.listings
    }

    #[must_use]
    pub fn listing(&self, group: GroupId) -> Option<&BookListing> {
        self.listings.get(group.0)
    }

    #[must_use]
    pub fn button(&self, button: ButtonRef) -> Option<&StatusButton> {
        self.listing(button.group)?.buttons.get(button.slot)
    }

    pub fn button_mut(&mut self, button: ButtonRef) -> Option<&mut StatusButton> {
        self.listings
            .get_mut(button.group.0)?
            .buttons
            .get_mut(button.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_known_values() {
        assert_eq!(Status::parse("read"), Status::Read);
        assert_eq!(Status::parse("reading"), Status::Reading);
        assert_eq!(Status::parse("wishlist"), Status::Wishlist);
    }

    #[test]
    fn status_parse_keeps_unknown_values_verbatim() {
        let status = Status::parse("favorite");
        assert_eq!(status, Status::Other(String::from("favorite")));
        assert_eq!(status.as_str(), "favorite");
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            r#""favorite""#
        );
    }

    #[test]
    fn new_listing_has_the_three_standard_buttons() {
        let listing = BookListing::new(BookFields::default());
        let statuses: Vec<_> = listing.buttons.iter().map(|b| b.status.clone()).collect();
        assert_eq!(statuses, vec![Status::Read, Status::Reading, Status::Wishlist]);
        for button in &listing.buttons {
            assert!(button.enabled);
            assert_eq!(button.phase, Phase::Idle);
            assert_eq!(button.label, button.status.idle_label());
        }
    }

    #[test]
    fn page_addressing() {
        let mut page = Page::new("token");
        let group = page.push_listing(BookFields {
            isbn: String::from("9784101010014"),
            title: String::from("こころ"),
            author: String::from("夏目漱石"),
            thumbnail_url: String::new(),
        });

        assert_eq!(group, GroupId(0));
        assert_eq!(page.listing(group).unwrap().buttons.len(), 3);
        assert!(page.button(ButtonRef { group, slot: 2 }).is_some());
        assert!(page.button(ButtonRef { group, slot: 3 }).is_none());
        assert!(page.listing(GroupId(1)).is_none());
    }
}
