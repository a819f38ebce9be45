use hondana::*;
use iced::{Application, Settings};

fn main() -> iced::Result {
    env_logger::init();

    gui::App::run(Settings {
        window: iced::window::Settings {
            size: (800, 640),
            ..Default::default()
        },
        flags: gui::Config::default(),
        ..Default::default()
    })
}
