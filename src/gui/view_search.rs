use iced::{
    widget::{column, container, scrollable, text, Button, Column, TextInput},
    Element, Length,
};

use super::{App, Message};

#[derive(Debug, Default)]
pub struct StateSearch {
    pub query: String,
    pub searching: bool,
    pub error: Option<String>,
}

impl App {
    pub fn view_search<'a>(state: &'_ StateSearch) -> Element<'a, Message> {
        let query_input = TextInput::new("書名・著者名で検索", state.query.as_str())
            .on_input(Message::QueryInputChanged);

        let mut search_button: Button<'_, Message> = Button::new("検索");
        if !state.searching && !state.query.is_empty() {
            search_button = search_button.on_press(Message::SubmitQuery {
                query: state.query.clone(),
            });
        }

        let mut content: Column<'_, Message> = column![query_input, search_button]
            .spacing(20)
            .max_width(800);

        if state.searching {
            content = content.push(text("検索中..."));
        }
        if let Some(error) = &state.error {
            content = content.push(text(error.clone()));
        }

        scrollable(
            container(content)
                .width(Length::Fill)
                .padding(40)
                .center_x(),
        )
        .into()
    }
}
