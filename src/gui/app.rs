use super::{message::Message, view_search::StateSearch, view_shelf::StateShelf};
use crate::http::ReqwestHttpClient;
use crate::{catalog, submission};
use iced::{Application, Command, Element, Theme};

/// Host configuration handed to [`App::run`] as flags.
///
/// The CSRF token is issued by the page-serving collaborator; the client
/// only echoes it back on submissions.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub csrf_token: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::from("http://127.0.0.1:8000"),
            csrf_token: String::new(),
        }
    }
}

#[derive(Debug)]
pub struct App {
    client: ReqwestHttpClient,
    csrf_token: String,
    screen: Screen,
}

#[derive(Debug)]
enum Screen {
    /// Screen to type a query and search the catalog
    Search(StateSearch),
    /// Page of results, each with its group of status buttons
    Shelf(StateShelf),
}

impl Application for App {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = Config;

    fn new(flags: Config) -> (Self, Command<Self::Message>) {
        (
            Self {
                client: ReqwestHttpClient::new(flags.base_url),
                csrf_token: flags.csrf_token,
                screen: Screen::Search(StateSearch::default()),
            },
            Command::none(),
        )
    }

    fn title(&self) -> String {
        String::from("hondana")
    }

    fn update(&mut self, message: Self::Message) -> Command<Self::Message> {
        match message {
            Message::QueryInputChanged(new_text) => {
                if let Screen::Search(state) = &mut self.screen {
                    state.query = new_text;
                }
            }
            Message::SubmitQuery { query } => {
                if let Screen::Search(state) = &mut self.screen {
                    state.searching = true;
                    state.error = None;
                    return Command::perform(
                        async move { catalog::search(&query).await.map_err(|err| err.to_string()) },
                        Message::SearchCompleted,
                    );
                }
            }
            Message::SearchCompleted(Ok(books)) => {
                self.screen = Screen::Shelf(StateShelf::new(&self.csrf_token, books));
            }
            Message::SearchCompleted(Err(err)) => {
                log::error!("catalog search failed: {err}");
                if let Screen::Search(state) = &mut self.screen {
                    state.searching = false;
                    state.error = Some(err);
                }
            }
            Message::AddBookPressed(button) => {
                if let Screen::Shelf(state) = &mut self.screen {
                    if let Some(request) = submission::begin(&mut state.page, button) {
                        let client = self.client.clone();
                        return Command::perform(
                            async move { submission::submit(&client, &request).await },
                            move |outcome| Message::SubmissionSettled { button, outcome },
                        );
                    }
                }
            }
            Message::SubmissionSettled { button, outcome } => {
                if let Screen::Shelf(state) = &mut self.screen {
                    if let Some(alert) =
                        submission::settle(&mut state.page, &state.bindings, button, &outcome)
                    {
                        state.alert = Some(alert);
                    }
                }
            }
            Message::AlertDismissed => {
                if let Screen::Shelf(state) = &mut self.screen {
                    state.alert = None;
                }
            }
            Message::NewSearchRequested => {
                self.screen = Screen::Search(StateSearch::default());
            }
        }

        Command::none()
    }

    fn view(&self) -> Element<Self::Message> {
        match &self.screen {
            Screen::Search(state) => Self::view_search(state),
            Screen::Shelf(state) => Self::view_shelf(state),
        }
    }
}
