//! Application shell state.
//!
//! Every key press becomes an [`Action`] applied with [`AppState::update`];
//! every finished network call comes back as a [`Completion`] applied with
//! [`AppState::complete`]. Both may emit one [`Request`] for the runtime to
//! execute. At most one request is in flight at a time.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::api::{ApiCall, ApiError, Reply};
use crate::form::{ContactForm, FormMode, SubmitError};
use crate::model::{Contact, ContactField, ContactPage};

pub type Ticket = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    Load,
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn describe(self) -> &'static str {
        match self {
            Operation::Load => "Loading contacts",
            Operation::Fetch => "Loading contact",
            Operation::Create => "Creating contact",
            Operation::Update => "Updating contact",
            Operation::Delete => "Deleting contact",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InFlight {
    pub ticket: Ticket,
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBanner {
    pub operation: Operation,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub enum Dialog {
    Form(ContactForm),
    Detail(Contact),
    ConfirmDelete { id: i64, name: String },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Initial load, or an explicit user reload.
    Reload,
    SetSearch(String),
    NextPage,
    PrevPage,
    SelectNext,
    SelectPrev,
    View,
    OpenCreate,
    OpenEdit,
    EditField(ContactField, String),
    SetPhoto(String),
    Submit,
    RequestDelete,
    ConfirmDelete,
    CloseDialog,
    ToggleHelp,
    DismissError,
}

/// A call the runtime must execute and answer with a [`Completion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub ticket: Ticket,
    pub call: ApiCall,
}

#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub result: Result<Reply, ApiError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppState {
    page: u32,
    page_size: u32,
    search_term: String,
    contacts: Option<ContactPage>,
    total_pages: u32,
    selected: usize,
    dialog: Option<Dialog>,
    in_flight: Option<InFlight>,
    pending_load: bool,
    next_ticket: Ticket,
    error: Option<ErrorBanner>,
    status: Option<String>,
}

impl AppState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
            search_term: String::new(),
            contacts: None,
            total_pages: 0,
            selected: 0,
            dialog: None,
            in_flight: None,
            pending_load: false,
            next_ticket: 1,
            error: None,
            status: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn contacts(&self) -> &[Contact] {
        self.contacts
            .as_ref()
            .map(|page| page.content.as_slice())
            .unwrap_or_default()
    }

    pub fn total_elements(&self) -> u64 {
        self.contacts
            .as_ref()
            .map(|page| page.total_elements)
            .unwrap_or(0)
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_contact(&self) -> Option<&Contact> {
        self.contacts().get(self.selected)
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn form(&self) -> Option<&ContactForm> {
        match &self.dialog {
            Some(Dialog::Form(form)) => Some(form),
            _ => None,
        }
    }

    pub fn in_flight(&self) -> Option<InFlight> {
        self.in_flight
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        self.error.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Human page counter, never "of 0".
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page + 1, self.total_pages.max(1))
    }

    pub fn update(&mut self, action: Action) -> Option<Request> {
        self.status = None;
        match action {
            Action::Reload => self.load(),
            Action::SetSearch(term) => {
                // A whitespace-only query lists everything instead of searching for blanks.
                let term = term.trim();
                if term == self.search_term {
                    return None;
                }
                self.search_term = term.to_string();
                self.page = 0;
                self.load()
            }
            Action::NextPage => {
                if self.page + 1 >= self.total_pages {
                    return None;
                }
                self.page += 1;
                self.load()
            }
            Action::PrevPage => {
                if self.page == 0 {
                    return None;
                }
                self.page -= 1;
                self.load()
            }
            Action::SelectNext => {
                if self.selected + 1 < self.contacts().len() {
                    self.selected += 1;
                }
                None
            }
            Action::SelectPrev => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            Action::View => self.view_selected(),
            Action::OpenCreate => {
                self.dialog = Some(Dialog::Form(ContactForm::create()));
                None
            }
            Action::OpenEdit => {
                let source = match &self.dialog {
                    Some(Dialog::Detail(contact)) => Some(contact.clone()),
                    _ => self.selected_contact().cloned(),
                };
                if let Some(contact) = source {
                    self.dialog = Some(Dialog::Form(ContactForm::edit(&contact)));
                }
                None
            }
            Action::EditField(field, value) => {
                if let Some(Dialog::Form(form)) = &mut self.dialog {
                    form.set_field(field, value);
                }
                None
            }
            Action::SetPhoto(path) => {
                if let Some(Dialog::Form(form)) = &mut self.dialog {
                    form.set_photo(path);
                }
                None
            }
            Action::Submit => self.submit(),
            Action::RequestDelete => self.request_delete(),
            Action::ConfirmDelete => self.confirm_delete(),
            Action::CloseDialog => {
                self.dialog = None;
                None
            }
            Action::ToggleHelp => {
                self.dialog = match self.dialog {
                    Some(Dialog::Help) => None,
                    _ => Some(Dialog::Help),
                };
                None
            }
            Action::DismissError => {
                self.error = None;
                None
            }
        }
    }

    pub fn complete(&mut self, completion: Completion) -> Option<Request> {
        let in_flight = match self.in_flight {
            Some(in_flight) if in_flight.ticket == completion.ticket => in_flight,
            _ => {
                debug!(ticket = completion.ticket, "ignoring stale completion");
                return None;
            }
        };
        self.in_flight = None;

        let reload = match completion.result {
            Ok(reply) => {
                self.error = None;
                self.apply_reply(in_flight.operation, reply)
            }
            Err(err) => self.apply_failure(in_flight.operation, err),
        };

        if reload | std::mem::take(&mut self.pending_load) {
            self.load()
        } else {
            None
        }
    }

    /// Returns whether a reload should follow.
    fn apply_reply(&mut self, operation: Operation, reply: Reply) -> bool {
        match (operation, reply) {
            (Operation::Load, Reply::Page(page)) => {
                self.total_pages = page.total_pages;
                self.selected = self.selected.min(page.content.len().saturating_sub(1));
                self.contacts = Some(page);
                false
            }
            (Operation::Fetch, Reply::Contact(fresh)) => {
                if let Some(Dialog::Detail(shown)) = &mut self.dialog {
                    if shown.id == fresh.id {
                        *shown = fresh;
                    }
                }
                false
            }
            (Operation::Create, Reply::Contact(created)) => {
                info!(id = ?created.id, "contact created");
                self.close_form();
                self.page = 0;
                self.status = Some(format!("Created {}", created.full_name()));
                true
            }
            (Operation::Update, Reply::Contact(updated)) => {
                info!(id = ?updated.id, "contact updated");
                self.close_form();
                self.status = Some(format!("Updated {}", updated.full_name()));
                true
            }
            (Operation::Delete, Reply::Deleted) => {
                self.status = Some("Contact deleted".to_string());
                true
            }
            (operation, reply) => {
                warn!(?operation, ?reply, "unexpected reply for operation");
                false
            }
        }
    }

    fn apply_failure(&mut self, operation: Operation, err: ApiError) -> bool {
        error!(?operation, error = %err, "request failed");
        self.error = Some(ErrorBanner {
            operation,
            message: format!("{} failed: {}", operation.describe(), err),
        });
        match operation {
            Operation::Create | Operation::Update => {
                if let Some(form) = self.submitted_form() {
                    form.settle();
                }
                false
            }
            Operation::Delete => true,
            Operation::Load | Operation::Fetch => false,
        }
    }

    /// The open form, if it is the one awaiting the save that just finished.
    ///
    /// Submits are refused while any call is in flight, so a submitting form
    /// always belongs to the current ticket. A form opened after the submitted
    /// one was cancelled is still editing and is left alone.
    fn submitted_form(&mut self) -> Option<&mut ContactForm> {
        match &mut self.dialog {
            Some(Dialog::Form(form)) if form.is_submitting() => Some(form),
            _ => None,
        }
    }

    fn close_form(&mut self) {
        if self.submitted_form().is_some() {
            self.dialog = None;
        }
    }

    fn load(&mut self) -> Option<Request> {
        if self.in_flight.is_some() {
            self.pending_load = true;
            return None;
        }
        let call = if self.search_term.is_empty() {
            ApiCall::List {
                page: self.page,
                size: self.page_size,
            }
        } else {
            ApiCall::Search {
                term: self.search_term.clone(),
                page: self.page,
                size: self.page_size,
            }
        };
        Some(self.issue(Operation::Load, call))
    }

    fn issue(&mut self, operation: Operation, call: ApiCall) -> Request {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(InFlight { ticket, operation });
        debug!(ticket, ?operation, "issuing request");
        Request { ticket, call }
    }

    /// Mutations are refused while another call is outstanding.
    fn reject_if_busy(&mut self, what: &str) -> bool {
        match self.in_flight {
            Some(in_flight) => {
                self.status = Some(format!(
                    "Cannot {} while {} is in progress",
                    what,
                    in_flight.operation.describe().to_lowercase()
                ));
                true
            }
            None => false,
        }
    }

    fn view_selected(&mut self) -> Option<Request> {
        let contact = self.selected_contact()?.clone();
        let id = contact.id;
        self.dialog = Some(Dialog::Detail(contact));
        match id {
            Some(id) if self.in_flight.is_none() => {
                Some(self.issue(Operation::Fetch, ApiCall::Get { id }))
            }
            _ => None,
        }
    }

    fn submit(&mut self) -> Option<Request> {
        if !matches!(self.dialog, Some(Dialog::Form(_))) {
            return None;
        }
        if self.reject_if_busy("save") {
            return None;
        }
        let Some(Dialog::Form(form)) = &mut self.dialog else {
            return None;
        };

        let submission = match form.submit(|submission| submission) {
            Ok(submission) => submission,
            Err(SubmitError::Invalid(errors)) => {
                let fields: Vec<_> = errors.iter().map(|(field, _)| field.label()).collect();
                debug!(?fields, "validation failed");
                self.status = Some(format!("Fix {} highlighted field(s)", errors.len()));
                return None;
            }
            Err(SubmitError::AlreadySubmitting) => return None,
        };

        match submission.mode {
            FormMode::Create => Some(self.issue(
                Operation::Create,
                ApiCall::Create {
                    contact: submission.contact,
                    photo: submission.photo,
                },
            )),
            FormMode::Edit { id: Some(id) } => Some(self.issue(
                Operation::Update,
                ApiCall::Update {
                    id,
                    contact: submission.contact,
                    photo: submission.photo,
                },
            )),
            FormMode::Edit { id: None } => {
                warn!("refusing to update a contact without an id");
                form.settle();
                self.status = Some("Cannot update a contact without an id".to_string());
                None
            }
        }
    }

    fn request_delete(&mut self) -> Option<Request> {
        if self.reject_if_busy("delete") {
            return None;
        }
        let target = match &self.dialog {
            Some(Dialog::Detail(contact)) => Some(contact),
            None => self.selected_contact(),
            _ => None,
        };
        let Some(contact) = target else {
            return None;
        };
        match contact.id {
            Some(id) => {
                let name = contact.full_name();
                self.dialog = Some(Dialog::ConfirmDelete { id, name });
            }
            None => {
                warn!("refusing to delete a contact without an id");
                self.status = Some("Cannot delete a contact without an id".to_string());
            }
        }
        None
    }

    fn confirm_delete(&mut self) -> Option<Request> {
        let Some(Dialog::ConfirmDelete { id, .. }) = self.dialog else {
            return None;
        };
        if self.reject_if_busy("delete") {
            return None;
        }
        self.dialog = None;
        Some(self.issue(Operation::Delete, ApiCall::Delete { id }))
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    fn contact(id: i64, first: &str) -> Contact {
        Contact {
            id: Some(id),
            first_name: first.into(),
            last_name: "Doe".into(),
            email: format!("{}@example.com", first.to_lowercase()),
            ..Default::default()
        }
    }

    fn page(number: u32, total_pages: u32, content: Vec<Contact>) -> ContactPage {
        ContactPage {
            total_elements: content.len() as u64,
            content,
            total_pages,
            number,
            size: 10,
        }
    }

    fn ok(request: &Request, reply: Reply) -> Completion {
        Completion {
            ticket: request.ticket,
            result: Ok(reply),
        }
    }

    fn server_error(request: &Request) -> Completion {
        Completion {
            ticket: request.ticket,
            result: Err(ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".into(),
            }),
        }
    }

    /// State with one loaded page out of `total_pages`.
    fn loaded(total_pages: u32) -> AppState {
        let mut state = AppState::new(10);
        let request = state.update(Action::Reload).unwrap();
        let reply = Reply::Page(page(0, total_pages, vec![contact(1, "Ann"), contact(2, "Bob")]));
        assert_eq!(state.complete(ok(&request, reply)), None);
        state
    }

    fn fill_form(state: &mut AppState) {
        state.update(Action::EditField(ContactField::FirstName, "John".into()));
        state.update(Action::EditField(ContactField::LastName, "Doe".into()));
        state.update(Action::EditField(ContactField::Email, "john@example.com".into()));
    }

    #[test]
    fn test_initial_load_lists_first_page() {
        let mut state = AppState::new(10);
        let request = state.update(Action::Reload).unwrap();
        assert_eq!(request.call, ApiCall::List { page: 0, size: 10 });
        assert!(state.is_loading());
    }

    #[test]
    fn test_search_routes_and_clearing_returns_to_list() {
        let mut state = loaded(3);
        let request = state.update(Action::NextPage).unwrap();
        state.complete(ok(&request, Reply::Page(page(1, 3, vec![contact(3, "Cy")]))));
        assert_eq!(state.page(), 1);

        let request = state.update(Action::SetSearch("  doe ".into())).unwrap();
        assert_eq!(
            request.call,
            ApiCall::Search {
                term: "doe".into(),
                page: 0,
                size: 10
            }
        );
        state.complete(ok(&request, Reply::Page(page(0, 3, vec![contact(1, "Ann")]))));

        let request = state.update(Action::NextPage).unwrap();
        assert!(matches!(request.call, ApiCall::Search { page: 1, .. }));
        state.complete(ok(&request, Reply::Page(page(1, 3, vec![]))));

        let request = state.update(Action::SetSearch(String::new())).unwrap();
        assert_eq!(request.call, ApiCall::List { page: 0, size: 10 });
        assert_eq!(state.page(), 0);
    }

    #[test]
    fn test_whitespace_search_uses_list_endpoint() {
        let mut state = loaded(1);
        assert_eq!(state.update(Action::SetSearch("   ".into())), None);
        assert_eq!(state.search_term(), "");
    }

    #[test]
    fn test_page_bounds_are_no_ops() {
        let mut state = loaded(2);
        assert_eq!(state.update(Action::PrevPage), None);
        assert_eq!(state.page(), 0);

        let request = state.update(Action::NextPage).unwrap();
        assert_eq!(request.call, ApiCall::List { page: 1, size: 10 });
        state.complete(ok(&request, Reply::Page(page(1, 2, vec![contact(3, "Cy")]))));

        assert_eq!(state.update(Action::NextPage), None);
        assert_eq!(state.page(), 1);
        assert_eq!(state.page_label(), "Page 2 of 2");
    }

    #[test]
    fn test_next_before_any_load_is_no_op() {
        let mut state = AppState::new(10);
        assert_eq!(state.update(Action::NextPage), None);
        assert_eq!(state.page_label(), "Page 1 of 1");
    }

    #[test]
    fn test_create_resets_to_first_page_then_reloads() {
        let mut state = loaded(3);
        let request = state.update(Action::NextPage).unwrap();
        state.complete(ok(&request, Reply::Page(page(1, 3, vec![contact(3, "Cy")]))));

        state.update(Action::OpenCreate);
        fill_form(&mut state);
        let request = state.update(Action::Submit).unwrap();
        assert!(matches!(request.call, ApiCall::Create { .. }));
        assert!(state.form().unwrap().is_submitting());

        let reload = state
            .complete(ok(&request, Reply::Contact(contact(9, "John"))))
            .unwrap();
        assert_eq!(state.page(), 0);
        assert_eq!(reload.call, ApiCall::List { page: 0, size: 10 });
        assert!(state.dialog().is_none());
    }

    #[test]
    fn test_invalid_submit_emits_nothing() {
        let mut state = loaded(1);
        state.update(Action::OpenCreate);
        assert_eq!(state.update(Action::Submit), None);
        let form = state.form().unwrap();
        assert_eq!(form.errors().len(), 3);
        assert!(!form.is_submitting());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_update_reloads_current_page() {
        let mut state = loaded(3);
        let request = state.update(Action::NextPage).unwrap();
        state.complete(ok(&request, Reply::Page(page(1, 3, vec![contact(3, "Cy")]))));

        state.update(Action::OpenEdit);
        state.update(Action::EditField(ContactField::Company, "Acme".into()));
        let request = state.update(Action::Submit).unwrap();
        match &request.call {
            ApiCall::Update { id, contact, .. } => {
                assert_eq!(*id, 3);
                assert_eq!(contact.company.as_deref(), Some("Acme"));
            }
            other => panic!("unexpected call {other:?}"),
        }

        let reload = state
            .complete(ok(&request, Reply::Contact(contact(3, "Cy"))))
            .unwrap();
        assert_eq!(reload.call, ApiCall::List { page: 1, size: 10 });
        assert!(state.dialog().is_none());
    }

    #[test]
    fn test_failed_save_keeps_form_open_for_correction() {
        let mut state = loaded(1);
        state.update(Action::OpenCreate);
        fill_form(&mut state);
        let request = state.update(Action::Submit).unwrap();

        assert_eq!(state.complete(server_error(&request)), None);
        let form = state.form().unwrap();
        assert!(!form.is_submitting());
        let banner = state.error().unwrap();
        assert_eq!(banner.operation, Operation::Create);
        assert!(banner.message.contains("500"));

        assert!(state.update(Action::Submit).is_some());
    }

    #[test]
    fn test_late_update_keeps_draft_opened_after_cancel() {
        let mut state = loaded(1);
        state.update(Action::OpenEdit);
        let request = state.update(Action::Submit).unwrap();
        state.update(Action::CloseDialog);
        state.update(Action::OpenCreate);
        state.update(Action::EditField(ContactField::FirstName, "Draft".into()));

        let reload = state
            .complete(ok(&request, Reply::Contact(contact(1, "Ann"))))
            .unwrap();
        assert_eq!(reload.call, ApiCall::List { page: 0, size: 10 });
        let form = state.form().unwrap();
        assert_eq!(form.mode(), FormMode::Create);
        assert_eq!(form.value(ContactField::FirstName), "Draft");
    }

    #[test]
    fn test_late_failure_leaves_new_draft_untouched() {
        let mut state = loaded(1);
        state.update(Action::OpenCreate);
        fill_form(&mut state);
        let request = state.update(Action::Submit).unwrap();
        state.update(Action::CloseDialog);
        state.update(Action::OpenEdit);
        state.update(Action::EditField(ContactField::City, "Paris".into()));

        assert_eq!(state.complete(server_error(&request)), None);
        assert_eq!(state.error().unwrap().operation, Operation::Create);
        let form = state.form().unwrap();
        assert_eq!(form.mode(), FormMode::Edit { id: Some(1) });
        assert_eq!(form.value(ContactField::City), "Paris");
    }

    #[test]
    fn test_edit_without_id_is_refused() {
        let mut state = AppState::new(10);
        let request = state.update(Action::Reload).unwrap();
        let mut orphan = contact(1, "Ann");
        orphan.id = None;
        state.complete(ok(&request, Reply::Page(page(0, 1, vec![orphan]))));

        state.update(Action::OpenEdit);
        assert_eq!(state.update(Action::Submit), None);
        assert!(!state.form().unwrap().is_submitting());
        assert!(state.status().is_some());

        state.update(Action::CloseDialog);
        assert_eq!(state.update(Action::RequestDelete), None);
        assert!(state.dialog().is_none());
    }

    #[test]
    fn test_delete_cancel_leaves_collection_alone() {
        let mut state = loaded(1);
        state.update(Action::SelectNext);
        assert_eq!(state.update(Action::RequestDelete), None);
        assert!(matches!(
            state.dialog(),
            Some(Dialog::ConfirmDelete { id: 2, .. })
        ));
        assert_eq!(state.update(Action::CloseDialog), None);
        assert!(!state.is_loading());
        assert_eq!(state.contacts().len(), 2);
        assert_eq!(state.update(Action::ConfirmDelete), None);
    }

    #[test]
    fn test_delete_confirm_issues_one_delete_then_one_reload() {
        let mut state = loaded(1);
        state.update(Action::RequestDelete);
        let request = state.update(Action::ConfirmDelete).unwrap();
        assert_eq!(request.call, ApiCall::Delete { id: 1 });

        let reload = state.complete(ok(&request, Reply::Deleted)).unwrap();
        assert_eq!(reload.call, ApiCall::List { page: 0, size: 10 });
        let done = state.complete(ok(&reload, Reply::Page(page(0, 1, vec![contact(2, "Bob")]))));
        assert_eq!(done, None);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_failed_delete_still_reloads() {
        let mut state = loaded(1);
        state.update(Action::RequestDelete);
        let request = state.update(Action::ConfirmDelete).unwrap();
        let reload = state.complete(server_error(&request)).unwrap();
        assert!(matches!(reload.call, ApiCall::List { .. }));
        assert_eq!(state.error().unwrap().operation, Operation::Delete);
    }

    #[test]
    fn test_mutations_rejected_while_in_flight() {
        let mut state = loaded(1);
        let in_flight = state.update(Action::Reload).unwrap();

        assert_eq!(state.update(Action::RequestDelete), None);
        assert!(state.dialog().is_none());
        assert!(state.status().unwrap().contains("Cannot delete"));

        state.update(Action::OpenCreate);
        fill_form(&mut state);
        assert_eq!(state.update(Action::Submit), None);
        assert!(!state.form().unwrap().is_submitting());
        assert!(state.status().unwrap().contains("Cannot save"));

        state.complete(ok(&in_flight, Reply::Page(page(0, 1, vec![contact(1, "Ann")]))));
        assert!(state.update(Action::Submit).is_some());
    }

    #[test]
    fn test_loads_while_in_flight_are_coalesced() {
        let mut state = loaded(5);
        let first = state.update(Action::NextPage).unwrap();
        assert_eq!(state.update(Action::NextPage), None);
        assert_eq!(state.update(Action::Reload), None);
        assert_eq!(state.page(), 2);

        let queued = state
            .complete(ok(&first, Reply::Page(page(1, 5, vec![contact(1, "Ann")]))))
            .unwrap();
        assert_eq!(queued.call, ApiCall::List { page: 2, size: 10 });
        assert_eq!(
            state.complete(ok(&queued, Reply::Page(page(2, 5, vec![contact(1, "Ann")])))),
            None
        );
    }

    #[test]
    fn test_reload_after_create_absorbs_queued_load() {
        let mut state = loaded(1);
        state.update(Action::OpenCreate);
        fill_form(&mut state);
        let request = state.update(Action::Submit).unwrap();
        assert_eq!(state.update(Action::Reload), None);

        let reload = state
            .complete(ok(&request, Reply::Contact(contact(9, "John"))))
            .unwrap();
        assert_eq!(
            state.complete(ok(&reload, Reply::Page(page(0, 1, vec![])))),
            None
        );
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut state = loaded(2);
        let before = serde_json::to_value(&state).unwrap();
        let stale = Completion {
            ticket: 999,
            result: Ok(Reply::Page(page(0, 9, vec![]))),
        };
        assert_eq!(state.complete(stale), None);
        assert_eq!(serde_json::to_value(&state).unwrap(), before);
    }

    #[test]
    fn test_view_fetches_fresh_record() {
        let mut state = loaded(1);
        let request = state.update(Action::View).unwrap();
        assert_eq!(request.call, ApiCall::Get { id: 1 });

        let mut fresh = contact(1, "Ann");
        fresh.notes = Some("met at conf".into());
        state.complete(ok(&request, Reply::Contact(fresh)));
        match state.dialog() {
            Some(Dialog::Detail(shown)) => assert_eq!(shown.notes.as_deref(), Some("met at conf")),
            other => panic!("unexpected dialog {other:?}"),
        }

        state.update(Action::OpenEdit);
        assert_eq!(state.form().unwrap().mode(), FormMode::Edit { id: Some(1) });
    }

    #[test]
    fn test_selection_is_clamped_to_loaded_page() {
        let mut state = loaded(1);
        state.update(Action::SelectNext);
        state.update(Action::SelectNext);
        assert_eq!(state.selected(), 1);

        let request = state.update(Action::Reload).unwrap();
        state.complete(ok(&request, Reply::Page(page(0, 1, vec![contact(1, "Ann")]))));
        assert_eq!(state.selected(), 0);
        assert_eq!(state.selected_contact().unwrap().id, Some(1));
    }

    #[test]
    fn test_failed_load_shows_dismissable_banner() {
        let mut state = AppState::new(10);
        let request = state.update(Action::Reload).unwrap();
        state.complete(server_error(&request));
        assert_eq!(state.error().unwrap().operation, Operation::Load);
        state.update(Action::DismissError);
        assert!(state.error().is_none());
    }
}
