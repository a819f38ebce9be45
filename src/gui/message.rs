use crate::page::{BookFields, ButtonRef};
use crate::submission::SubmissionOutcome;

#[derive(Debug, Clone)]
pub enum Message {
    // search view
    QueryInputChanged(String),
    SubmitQuery { query: String },
    SearchCompleted(Result<Vec<BookFields>, String>),

    // shelf view
    AddBookPressed(ButtonRef),
    SubmissionSettled {
        button: ButtonRef,
        outcome: SubmissionOutcome,
    },
    AlertDismissed,
    NewSearchRequested,
}
