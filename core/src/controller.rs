//! View-state controller for the user dashboard.
//!
//! # Design
//! `Dashboard` owns every piece of mutable UI state: the canonical record
//! list, the `loading` and `submitting` flags, the open modal and the live
//! notification. It never performs I/O. Each intent returns the `Effect`s
//! the host must carry out, and the host reports back through `complete`
//! and `dismiss_elapsed`.
//!
//! The list is never patched locally. Every successful mutation is followed
//! by a full refetch, so the displayed records are whatever the server said
//! last. Responses are applied in arrival order with no staleness guard.
//!
//! `loading` and `submitting` are independent flags: a refresh may be in
//! flight while a submit is pending, and vice versa.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::client::UserClient;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{
    Draft, ListPayload, NewUser, Notification, NotificationId, NotificationKind, Record, Role,
    UserChanges,
};
use crate::validate::{validate, Field, ValidationErrors};

/// How long a notification stays up unless dismissed or replaced.
pub const DEFAULT_NOTIFICATION_LIFETIME: Duration = Duration::from_millis(5000);

/// Correlates an outstanding request with its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Work the host must perform on behalf of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Execute `request` once, then call `Dashboard::complete(ticket, ..)`.
    Send { ticket: Ticket, request: HttpRequest },
    /// Arm a one-shot timer that calls `Dashboard::dismiss_elapsed(id)`.
    ScheduleDismiss { id: NotificationId, after: Duration },
    /// Disarm the timer for `id` if it has not fired yet.
    CancelDismiss { id: NotificationId },
}

/// Out-of-band yes/no question asked before a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Coarse lifecycle of the record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet.
    Idle,
    /// A list call is outstanding.
    Loading,
    /// At least one list call has resolved.
    Ready,
}

/// The add/edit form. Edit mode is implied by `editing` holding an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub draft: Draft,
    pub editing: Option<String>,
    pub errors: ValidationErrors,
}

impl Modal {
    pub fn is_edit_mode(&self) -> bool {
        self.editing.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("no form is open")]
    NoModal,
    #[error("email cannot be changed after creation")]
    EmailLocked,
    #[error(transparent)]
    Role(#[from] crate::types::UnknownRole),
}

/// Read-only projection handed to presentation code.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub records: &'a [Record],
    pub phase: Phase,
    pub submitting: bool,
    pub modal: Option<&'a Modal>,
    pub notification: Option<&'a Notification>,
}

#[derive(Debug, Clone)]
enum Call {
    List,
    Create { name: String },
    Update { name: String },
    Delete { name: String },
}

pub struct Dashboard {
    client: UserClient,
    records: Vec<Record>,
    loading: bool,
    loaded: bool,
    submitting: bool,
    modal: Option<Modal>,
    notification: Option<Notification>,
    notification_lifetime: Duration,
    in_flight: HashMap<Ticket, Call>,
    next_ticket: u64,
    next_notification: u64,
}

impl Dashboard {
    pub fn new(client: UserClient) -> Self {
        Self {
            client,
            records: Vec::new(),
            loading: false,
            loaded: false,
            submitting: false,
            modal: None,
            notification: None,
            notification_lifetime: DEFAULT_NOTIFICATION_LIFETIME,
            in_flight: HashMap::new(),
            next_ticket: 0,
            next_notification: 0,
        }
    }

    pub fn with_notification_lifetime(mut self, lifetime: Duration) -> Self {
        self.notification_lifetime = lifetime;
        self
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Number of requests issued but not yet completed.
    pub fn pending_requests(&self) -> usize {
        self.in_flight.len()
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.loaded {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            records: &self.records,
            phase: self.phase(),
            submitting: self.submitting,
            modal: self.modal.as_ref(),
            notification: self.notification.as_ref(),
        }
    }

    /// Initial load on session start.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.fetch(&mut effects);
        effects
    }

    /// User-requested reload. Ignored while a list call is outstanding.
    pub fn refresh(&mut self) -> Vec<Effect> {
        if self.loading {
            debug!("refresh ignored, list already loading");
            return Vec::new();
        }
        self.start()
    }

    pub fn open_add(&mut self) {
        self.modal = Some(Modal {
            draft: Draft::default(),
            editing: None,
            errors: ValidationErrors::new(),
        });
    }

    /// Open the form pre-filled from the record with `id`. Returns `false`
    /// if no such record is in the canonical list.
    pub fn open_edit(&mut self, id: &str) -> bool {
        let Some(record) = self.records.iter().find(|r| r.id == id) else {
            warn!(id, "edit requested for unknown record");
            return false;
        };
        self.modal = Some(Modal {
            draft: Draft::from_record(record),
            editing: Some(record.id.clone()),
            errors: ValidationErrors::new(),
        });
        true
    }

    /// Change one field of the open draft and clear that field's error.
    /// An empty role value clears the selection.
    pub fn set_field(&mut self, field: Field, value: &str) -> Result<(), DraftError> {
        let modal = self.modal.as_mut().ok_or(DraftError::NoModal)?;
        match field {
            Field::Name => modal.draft.name = value.to_string(),
            Field::Email if modal.is_edit_mode() => {
                warn!("email edit rejected, record already exists");
                return Err(DraftError::EmailLocked);
            }
            Field::Email => modal.draft.email = value.to_string(),
            Field::Role if value.trim().is_empty() => modal.draft.role = None,
            Field::Role => modal.draft.role = Some(value.parse::<Role>()?),
        }
        modal.errors.remove(&field);
        Ok(())
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Validate the open draft and, if clean, send create or update.
    ///
    /// Validation failures stay local: the errors are stored on the modal
    /// and no request is issued. Ignored while a submit is outstanding.
    pub fn submit(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.submitting {
            debug!("submit ignored, save already in flight");
            return effects;
        }
        let Some(modal) = self.modal.as_mut() else {
            return effects;
        };

        let errors = validate(&modal.draft, modal.is_edit_mode());
        if !errors.is_empty() {
            debug!(fields = ?errors.keys().collect::<Vec<_>>(), "draft rejected");
            modal.errors = errors;
            return effects;
        }
        modal.errors.clear();

        let draft = &modal.draft;
        let role = draft.role.unwrap_or_default();
        let name = draft.name.clone();
        let built = match &modal.editing {
            Some(id) => self
                .client
                .build_update(
                    id,
                    &UserChanges {
                        name: name.clone(),
                        role,
                    },
                )
                .map(|request| (Call::Update { name }, request)),
            None => self
                .client
                .build_create(&NewUser {
                    name: name.clone(),
                    email: draft.email.clone(),
                    role,
                })
                .map(|request| (Call::Create { name }, request)),
        };

        match built {
            Ok((call, request)) => {
                self.submitting = true;
                self.send(call, request, &mut effects);
            }
            Err(err) => self.fail("Failed to save user", &err, &mut effects),
        }
        effects
    }

    /// Ask `confirm` before deleting the record with `id`. A declined
    /// confirmation or an unknown id issues nothing. `submitting` is not
    /// touched.
    pub fn request_delete<C>(&mut self, id: &str, confirm: &mut C) -> Vec<Effect>
    where
        C: Confirm + ?Sized,
    {
        let mut effects = Vec::new();
        let Some(record) = self.records.iter().find(|r| r.id == id) else {
            warn!(id, "delete requested for unknown record");
            return effects;
        };
        let name = record.name.clone();
        let prompt =
            format!("Are you sure you want to delete \"{name}\"? This action cannot be undone.");
        if !confirm.confirm(&prompt) {
            debug!(id, "delete declined");
            return effects;
        }
        let request = self.client.build_delete(id);
        self.send(Call::Delete { name }, request, &mut effects);
        effects
    }

    pub fn dismiss_notification(&mut self) -> Vec<Effect> {
        self.notification
            .take()
            .map(|n| vec![Effect::CancelDismiss { id: n.id }])
            .unwrap_or_default()
    }

    /// Timer callback. A timer for a notification that was already replaced
    /// or dismissed is ignored.
    pub fn dismiss_elapsed(&mut self, id: NotificationId) {
        if self.notification.as_ref().is_some_and(|n| n.id == id) {
            self.notification = None;
        }
    }

    /// Feed back the outcome of an `Effect::Send`.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<HttpResponse, TransportError>,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(call) = self.in_flight.remove(&ticket) else {
            warn!(?ticket, "completion for unknown request");
            return effects;
        };
        let result = result.map_err(ApiError::from);

        match call {
            Call::List => {
                self.loading = false;
                self.loaded = true;
                match result.and_then(|response| self.client.parse_list(response)) {
                    Ok(payload) => match payload {
                        ListPayload::Envelope { data, .. } | ListPayload::Bare(data) => {
                            debug!(count = data.len(), "records loaded");
                            self.records = data;
                        }
                        ListPayload::Unrecognized(body) => {
                            warn!(%body, "unexpected list response shape");
                            self.records.clear();
                            let message = ApiError::MalformedResponse.to_string();
                            self.notify(NotificationKind::Error, message, &mut effects);
                        }
                    },
                    Err(err) => {
                        self.records.clear();
                        self.fail("Failed to load users", &err, &mut effects);
                    }
                }
            }
            Call::Create { name } => {
                self.submitting = false;
                match result.and_then(|response| self.client.parse_create(response)) {
                    Ok(record) => {
                        info!(id = %record.id, "user created");
                        self.saved(format!("User \"{name}\" created successfully"), &mut effects);
                    }
                    Err(err) => self.fail("Failed to save user", &err, &mut effects),
                }
            }
            Call::Update { name } => {
                self.submitting = false;
                match result.and_then(|response| self.client.parse_update(response)) {
                    Ok(record) => {
                        info!(id = %record.id, "user updated");
                        self.saved(format!("User \"{name}\" updated successfully"), &mut effects);
                    }
                    Err(err) => self.fail("Failed to save user", &err, &mut effects),
                }
            }
            Call::Delete { name } => {
                match result.and_then(|response| self.client.parse_delete(response)) {
                    Ok(_) => {
                        info!(%name, "user deleted");
                        let message = format!("User \"{name}\" deleted successfully");
                        self.notify(NotificationKind::Success, message, &mut effects);
                        self.fetch(&mut effects);
                    }
                    Err(err) => self.fail("Failed to delete user", &err, &mut effects),
                }
            }
        }
        effects
    }

    /// Teardown: disarm the pending dismiss timer, if any.
    pub fn shutdown(mut self) -> Vec<Effect> {
        self.dismiss_notification()
    }

    fn fetch(&mut self, effects: &mut Vec<Effect>) {
        self.loading = true;
        let request = self.client.build_list();
        self.send(Call::List, request, effects);
    }

    fn send(&mut self, call: Call, request: HttpRequest, effects: &mut Vec<Effect>) {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        debug!(?ticket, method = request.method.as_str(), path = %request.path, "request issued");
        self.in_flight.insert(ticket, call);
        effects.push(Effect::Send { ticket, request });
    }

    fn saved(&mut self, message: String, effects: &mut Vec<Effect>) {
        self.notify(NotificationKind::Success, message, effects);
        self.modal = None;
        self.fetch(effects);
    }

    fn fail(&mut self, context: &str, err: &ApiError, effects: &mut Vec<Effect>) {
        error!(error = %err, "{context}");
        self.notify(NotificationKind::Error, format!("{context}: {err}"), effects);
    }

    /// Replace the live notification and restart the dismiss timer.
    fn notify(&mut self, kind: NotificationKind, message: String, effects: &mut Vec<Effect>) {
        if let Some(previous) = self.notification.take() {
            effects.push(Effect::CancelDismiss { id: previous.id });
        }
        let id = NotificationId(self.next_notification);
        self.next_notification += 1;
        self.notification = Some(Notification { id, message, kind });
        effects.push(Effect::ScheduleDismiss {
            id,
            after: self.notification_lifetime,
        });
    }
}
