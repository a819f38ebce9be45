use super::{App, Message};
use crate::binder::Bindings;
use crate::page::{BookFields, ButtonRef, GroupId, Page};
use iced::{
    widget::{column, container, row, scrollable, text, Button, Column, Row, Rule},
    Element, Length,
};

#[derive(Debug)]
pub struct StateShelf {
    pub page: Page,
    pub bindings: Bindings,
    pub alert: Option<String>,
}

impl StateShelf {
    /// Builds the page for a batch of search results and runs the binder
    /// scan once, at page-ready time.
    #[must_use]
    pub fn new(csrf_token: &str, books: Vec<BookFields>) -> Self {
        let mut page = Page::new(csrf_token);
        for fields in books {
            page.push_listing(fields);
        }
        let bindings = Bindings::bind(&page);

        Self {
            page,
            bindings,
            alert: None,
        }
    }
}

impl App {
    #[must_use]
    pub fn view_shelf<'a>(state: &'_ StateShelf) -> Element<'a, Message> {
        // nothing else renders while an alert is up
        if let Some(alert) = &state.alert {
            let dismiss: Button<'_, Message> = Button::new("OK").on_press(Message::AlertDismissed);
            let content = column![text(alert.clone()), dismiss].spacing(20).max_width(800);

            return container(content)
                .width(Length::Fill)
                .height(Length::Fill)
                .padding(40)
                .center_x()
                .center_y()
                .into();
        }

        let new_search: Button<'_, Message> =
            Button::new("別の本を探す").on_press(Message::NewSearchRequested);

        let mut content: Column<'_, Message> = column![new_search, Rule::horizontal(4)]
            .spacing(20)
            .max_width(800);

        for (index, listing) in state.page.listings().iter().enumerate() {
            let group = GroupId(index);

            let mut buttons: Row<'_, Message> = row![].spacing(10);
            for (slot, status_button) in listing.buttons.iter().enumerate() {
                let mut button = Button::new(text(status_button.label.clone()));
                if status_button.enabled {
                    // a disabled button carries no press handler at all, so
                    // a click on it cannot start a submission
                    button = button.on_press(Message::AddBookPressed(ButtonRef { group, slot }));
                }
                buttons = buttons.push(button);
            }

            content = content.push(
                column![
                    text(listing.fields.title.clone()).size(20),
                    text(listing.fields.author.clone()),
                    text(listing.fields.isbn.clone()).size(14),
                    buttons,
                ]
                .spacing(6),
            );
            content = content.push(Rule::horizontal(2));
        }

        scrollable(container(content).width(Length::Fill).padding(40)).into()
    }
}
