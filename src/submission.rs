use crate::binder::Bindings;
use crate::http::HttpClient;
use crate::page::{ButtonRef, Page, Phase, Status};
use serde::{Deserialize, Serialize};

pub const ADD_BOOK_PATH: &str = "/add_book_api/";

pub const LABEL_IN_PROGRESS: &str = "追加中...";
pub const LABEL_RETRY: &str = "再試行";
/// Shown on success for a status outside the known set, which has no
/// status-specific confirmation string.
pub const LABEL_CONFIRMED_FALLBACK: &str = "追加済み";

pub const MSG_NETWORK_ERROR: &str = "エラーが発生しました。";
/// Shown when the server rejects a submission without saying why.
pub const MSG_REJECTED: &str = "登録に失敗しました。";

/// Confirmation string for the submitted status, if it has one.
#[must_use]
pub fn confirmation_label(status: &Status) -> Option<&'static str> {
    match status {
        Status::Read => Some("読んだ本に追加済み"),
        Status::Reading => Some("積読に追加済み"),
        Status::Wishlist => Some("読みたいに追加済み"),
        Status::Other(_) => None,
    }
}

/// One status-change attempt, built fresh from the page at click time and
/// consumed by exactly one network call.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRequest {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub thumbnail_url: String,
    pub status: Status,
    /// Goes out as the `X-CSRFToken` header, never in the body.
    #[serde(skip)]
    pub csrf_token: String,
}

#[derive(Debug, Deserialize)]
struct ServerReply {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// How one attempt ended. A transport failure (request never completed, or
/// a reply that isn't the expected JSON shape) is its own kind, never
/// conflated with the server saying no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted,
    Rejected { message: String },
    TransportFailure,
}

/// Starts an attempt: reads the CSRF token and the book fields from the
/// page as they are right now, then locks the triggering button and puts
/// it in its in-progress look. Siblings stay clickable.
///
/// Returns `None` for a disabled button — a click that reaches a disabled
/// button must be a no-op, which also makes duplicate dispatch harmless.
pub fn begin(page: &mut Page, button: ButtonRef) -> Option<SubmissionRequest> {
    let csrf_token = page.csrf_token.clone();
    let fields = page.listing(button.group)?.fields.clone();

    let btn = page.button_mut(button)?;
    if !btn.enabled {
        return None;
    }

    let status = btn.status.clone();
    btn.enabled = false;
    btn.label = LABEL_IN_PROGRESS.to_owned();
    btn.phase = Phase::Submitting;

    log::info!("submitting {status} for {}", fields.isbn);
    Some(SubmissionRequest {
        isbn: fields.isbn,
        title: fields.title,
        author: fields.author,
        thumbnail_url: fields.thumbnail_url,
        status,
        csrf_token,
    })
}

/// Issues the one network call for an attempt and interprets the reply.
///
/// Never fails: every error path collapses into
/// [`SubmissionOutcome::TransportFailure`] with the detail logged, so the
/// caller always has exactly one outcome to settle with.
pub async fn submit<C: HttpClient + ?Sized>(
    client: &C,
    request: &SubmissionRequest,
) -> SubmissionOutcome {
    let body = match serde_json::to_string(request) {
        Ok(body) => body,
        Err(err) => {
            log::error!("Error: {err}");
            return SubmissionOutcome::TransportFailure;
        }
    };

    match client.post_json(ADD_BOOK_PATH, &request.csrf_token, body).await {
        Ok(response) => match serde_json::from_str::<ServerReply>(&response.body) {
            Ok(reply) if reply.success => SubmissionOutcome::Accepted,
            Ok(reply) => SubmissionOutcome::Rejected {
                message: reply.message.unwrap_or_else(|| MSG_REJECTED.to_owned()),
            },
            Err(err) => {
                log::error!("Error: unexpected reply ({}): {err}", response.status);
                SubmissionOutcome::TransportFailure
            }
        },
        Err(err) => {
            log::error!("Error: {err}");
            SubmissionOutcome::TransportFailure
        }
    }
}

/// Settles a finished attempt into its terminal visual state.
///
/// On `Accepted` the whole group is disabled — the one cross-button side
/// effect in the system; failure touches nothing but the trigger. Returns
/// the text the host must surface through its blocking alert, if any.
pub fn settle(
    page: &mut Page,
    bindings: &Bindings,
    button: ButtonRef,
    outcome: &SubmissionOutcome,
) -> Option<String> {
    match page.button(button) {
        Some(btn) if btn.phase == Phase::Submitting => {}
        Some(btn) => {
            log::warn!("button {button} settled while in {:?}; ignoring", btn.phase);
            return None;
        }
        None => {
            log::warn!("settled unknown button {button}");
            return None;
        }
    }

    match outcome {
        SubmissionOutcome::Accepted => {
            let group_confirmed = bindings.members(button.group).iter().any(|member| {
                page.button(*member)
                    .map_or(false, |b| b.phase == Phase::Confirmed)
            });

            if group_confirmed {
                // the group already settled on another status; the server
                // accepted this row too and owns the deduplication
                log::warn!(
                    "group {} is already confirmed; leaving button {button} inert",
                    button.group
                );
                if let Some(btn) = page.button_mut(button) {
                    btn.phase = Phase::Failed;
                }
                return None;
            }

            if let Some(btn) = page.button_mut(button) {
                btn.phase = Phase::Confirmed;
                btn.label = confirmation_label(&btn.status)
                    .unwrap_or(LABEL_CONFIRMED_FALLBACK)
                    .to_owned();
                log::info!("confirmed {} as {}", button, btn.status);
            }

            // success locks in the whole group, not just the clicked button
            for member in bindings.members(button.group) {
                if let Some(btn) = page.button_mut(*member) {
                    btn.enabled = false;
                }
            }
            None
        }
        SubmissionOutcome::Rejected { message } => {
            log::error!("submission for {button} rejected: {message}");
            relabel_for_retry(page, button);
            Some(message.clone())
        }
        SubmissionOutcome::TransportFailure => {
            // detail was already logged where the error surfaced
            relabel_for_retry(page, button);
            Some(MSG_NETWORK_ERROR.to_owned())
        }
    }
}

fn relabel_for_retry(page: &mut Page, button: ButtonRef) {
    if let Some(btn) = page.button_mut(button) {
        btn.phase = Phase::Failed;
        btn.enabled = true;
        btn.label = LABEL_RETRY.to_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpError, HttpResponse, MockHttpClient};
    use crate::page::{BookFields, BookListing, GroupId};

    const READ: ButtonRef = ButtonRef {
        group: GroupId(0),
        slot: 0,
    };
    const READING: ButtonRef = ButtonRef {
        group: GroupId(0),
        slot: 1,
    };
    const WISHLIST: ButtonRef = ButtonRef {
        group: GroupId(0),
        slot: 2,
    };

    fn kokoro() -> BookFields {
        BookFields {
            isbn: String::from("9784101010014"),
            title: String::from("こころ"),
            author: String::from("夏目漱石"),
            thumbnail_url: String::from("https://books.example/kokoro.jpg"),
        }
    }

    fn shelf() -> (Page, Bindings) {
        let mut page = Page::new("token-a");
        page.push_listing(kokoro());
        let bindings = Bindings::bind(&page);
        (page, bindings)
    }

    #[test]
    fn begin_locks_the_trigger_and_captures_the_form() {
        let (mut page, _) = shelf();

        let request = begin(&mut page, READ).unwrap();
        assert_eq!(request.isbn, "9784101010014");
        assert_eq!(request.title, "こころ");
        assert_eq!(request.author, "夏目漱石");
        assert_eq!(request.thumbnail_url, "https://books.example/kokoro.jpg");
        assert_eq!(request.status, Status::Read);
        assert_eq!(request.csrf_token, "token-a");

        let btn = page.button(READ).unwrap();
        assert!(!btn.enabled);
        assert_eq!(btn.label, LABEL_IN_PROGRESS);
        assert_eq!(btn.phase, Phase::Submitting);

        // only the clicked button is locked while the request is pending
        assert!(page.button(READING).unwrap().enabled);
        assert!(page.button(WISHLIST).unwrap().enabled);
    }

    #[test]
    fn begin_on_a_disabled_button_is_a_noop() {
        let (mut page, _) = shelf();
        page.button_mut(READ).unwrap().enabled = false;

        assert!(begin(&mut page, READ).is_none());
        let btn = page.button(READ).unwrap();
        assert_eq!(btn.label, "読んだ本");
        assert_eq!(btn.phase, Phase::Idle);
    }

    #[test]
    fn duplicate_dispatch_cannot_double_submit() {
        let (mut page, _) = shelf();

        // were a button ever bound twice, the second handler would land on
        // an already-disabled button and start nothing
        assert!(begin(&mut page, READ).is_some());
        assert!(begin(&mut page, READ).is_none());
    }

    #[tokio::test]
    async fn success_confirms_the_trigger_and_disables_the_group() {
        let (mut page, bindings) = shelf();
        let mock = MockHttpClient::new();
        mock.push_ok(r#"{"success": true, "message": "Book added successfully"}"#);

        let request = begin(&mut page, READ).unwrap();
        let outcome = submit(&mock, &request).await;
        assert_eq!(outcome, SubmissionOutcome::Accepted);

        let alert = settle(&mut page, &bindings, READ, &outcome);
        assert_eq!(alert, None);

        let btn = page.button(READ).unwrap();
        assert_eq!(btn.label, "読んだ本に追加済み");
        assert_eq!(btn.phase, Phase::Confirmed);
        for member in bindings.members(GroupId(0)) {
            assert!(!page.button(*member).unwrap().enabled);
        }
        // siblings are disabled but otherwise untouched
        assert_eq!(page.button(READING).unwrap().label, "積読");
        assert_eq!(page.button(WISHLIST).unwrap().label, "読みたい");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn rejection_restores_only_the_trigger() {
        let (mut page, bindings) = shelf();
        let mock = MockHttpClient::new();
        mock.push_ok(r#"{"success": false, "message": "duplicate"}"#);

        let request = begin(&mut page, WISHLIST).unwrap();
        let outcome = submit(&mock, &request).await;
        assert_eq!(
            outcome,
            SubmissionOutcome::Rejected {
                message: String::from("duplicate")
            }
        );

        let alert = settle(&mut page, &bindings, WISHLIST, &outcome);
        assert_eq!(alert.as_deref(), Some("duplicate"));

        let wishlist = page.button(WISHLIST).unwrap();
        assert!(wishlist.enabled);
        assert_eq!(wishlist.label, LABEL_RETRY);
        assert_eq!(wishlist.phase, Phase::Failed);

        // the sibling is exactly as it was before the click
        let read = page.button(READ).unwrap();
        assert!(read.enabled);
        assert_eq!(read.label, "読んだ本");
        assert_eq!(read.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn rejection_without_a_message_falls_back_to_the_fixed_text() {
        let (mut page, bindings) = shelf();
        let mock = MockHttpClient::new();
        mock.push_ok(r#"{"success": false}"#);

        let request = begin(&mut page, READ).unwrap();
        let outcome = submit(&mock, &request).await;
        let alert = settle(&mut page, &bindings, READ, &outcome);
        assert_eq!(alert.as_deref(), Some(MSG_REJECTED));
    }

    #[tokio::test]
    async fn network_failure_shows_the_generic_message_and_allows_retry() {
        let (mut page, bindings) = shelf();
        let mock = MockHttpClient::new();
        mock.push_response(Err(HttpError::Unsent(String::from("connection refused"))));

        let request = begin(&mut page, READ).unwrap();
        let outcome = submit(&mock, &request).await;
        assert_eq!(outcome, SubmissionOutcome::TransportFailure);

        let alert = settle(&mut page, &bindings, READ, &outcome);
        assert_eq!(alert.as_deref(), Some(MSG_NETWORK_ERROR));

        let btn = page.button(READ).unwrap();
        assert!(btn.enabled);
        assert_eq!(btn.label, LABEL_RETRY);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn a_reply_that_is_not_the_expected_shape_is_a_transport_failure() {
        let (mut page, _) = shelf();
        let mock = MockHttpClient::new();
        mock.push_response(Ok(HttpResponse {
            status: 500,
            body: String::from("Internal Server Error"),
        }));

        let request = begin(&mut page, READ).unwrap();
        assert_eq!(submit(&mock, &request).await, SubmissionOutcome::TransportFailure);
    }

    #[tokio::test]
    async fn retry_reads_the_page_fresh_on_the_next_click() {
        let (mut page, bindings) = shelf();
        let mock = MockHttpClient::new();
        mock.push_ok(r#"{"success": false, "message": "duplicate"}"#);
        mock.push_ok(r#"{"success": true}"#);

        let request = begin(&mut page, WISHLIST).unwrap();
        let outcome = submit(&mock, &request).await;
        settle(&mut page, &bindings, WISHLIST, &outcome);

        // the token rotated between the two clicks
        page.csrf_token = String::from("token-b");

        let request = begin(&mut page, WISHLIST).unwrap();
        assert_eq!(request.csrf_token, "token-b");
        let outcome = submit(&mock, &request).await;
        let alert = settle(&mut page, &bindings, WISHLIST, &outcome);
        assert_eq!(alert, None);

        assert_eq!(page.button(WISHLIST).unwrap().label, "読みたいに追加済み");
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.calls()[1].csrf_token, "token-b");
    }

    #[tokio::test]
    async fn the_wire_carries_five_fields_and_the_token_as_a_header() {
        let (mut page, _) = shelf();
        let mock = MockHttpClient::new();
        mock.push_ok(r#"{"success": true}"#);

        let request = begin(&mut page, READ).unwrap();
        submit(&mock, &request).await;

        let calls = mock.calls();
        assert_eq!(calls[0].path, ADD_BOOK_PATH);
        assert_eq!(calls[0].csrf_token, "token-a");

        let body: serde_json::Value = serde_json::from_str(&calls[0].body).unwrap();
        assert_eq!(body["isbn"], "9784101010014");
        assert_eq!(body["title"], "こころ");
        assert_eq!(body["author"], "夏目漱石");
        assert_eq!(body["thumbnail_url"], "https://books.example/kokoro.jpg");
        assert_eq!(body["status"], "read");
        assert_eq!(body.as_object().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn unknown_status_is_sent_verbatim_and_gets_the_fallback_label() {
        let mut page = Page::new("token-a");
        let group = page.push(BookListing::with_statuses(
            kokoro(),
            [Status::parse("favorite")],
        ));
        let bindings = Bindings::bind(&page);
        let button = ButtonRef { group, slot: 0 };

        let mock = MockHttpClient::new();
        mock.push_ok(r#"{"success": true}"#);

        let request = begin(&mut page, button).unwrap();
        let outcome = submit(&mock, &request).await;
        settle(&mut page, &bindings, button, &outcome);

        let body: serde_json::Value = serde_json::from_str(&mock.calls()[0].body).unwrap();
        assert_eq!(body["status"], "favorite");

        let btn = page.button(button).unwrap();
        assert_eq!(btn.label, LABEL_CONFIRMED_FALLBACK);
        assert!(!btn.enabled);
    }

    #[tokio::test]
    async fn only_one_button_per_group_ever_confirms() {
        let (mut page, bindings) = shelf();
        let mock = MockHttpClient::new();
        mock.push_ok(r#"{"success": true}"#);
        mock.push_ok(r#"{"success": true}"#);

        // two attempts in flight on the same group at once
        let wish_request = begin(&mut page, WISHLIST).unwrap();
        let read_request = begin(&mut page, READ).unwrap();
        let wish_outcome = submit(&mock, &wish_request).await;
        let read_outcome = submit(&mock, &read_request).await;

        settle(&mut page, &bindings, WISHLIST, &wish_outcome);
        settle(&mut page, &bindings, READ, &read_outcome);

        let confirmed = bindings
            .members(GroupId(0))
            .iter()
            .filter(|m| page.button(**m).unwrap().phase == Phase::Confirmed)
            .count();
        assert_eq!(confirmed, 1);
        assert_eq!(page.button(WISHLIST).unwrap().label, "読みたいに追加済み");

        let read = page.button(READ).unwrap();
        assert!(!read.enabled);
        assert_ne!(read.label, "読んだ本に追加済み");
    }

    #[test]
    fn settling_a_button_that_never_submitted_changes_nothing() {
        let (mut page, bindings) = shelf();

        let alert = settle(&mut page, &bindings, READ, &SubmissionOutcome::Accepted);
        assert_eq!(alert, None);

        let btn = page.button(READ).unwrap();
        assert!(btn.enabled);
        assert_eq!(btn.phase, Phase::Idle);
    }
}
