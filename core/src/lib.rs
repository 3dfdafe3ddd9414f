//! Client core for the user management dashboard.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and drives the dashboard's
//! fetch-render-mutate-refetch cycle as an effect-emitting state machine.
//!
//! # Design
//! - `UserClient` is stateless. It holds only `base_url`.
//! - Each CRUD operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `Dashboard` owns all UI state and answers every intent with a list of
//!   `Effect`s. Hosts execute requests and timers and report back.
//! - `view` renders a read-only `Snapshot`; it never mutates state.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod controller;
pub mod error;
pub mod http;
pub mod types;
pub mod validate;
pub mod view;

pub use client::UserClient;
pub use controller::{Confirm, Dashboard, DraftError, Effect, Modal, Phase, Snapshot, Ticket};
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{
    Draft, ListPayload, NewUser, Notification, NotificationId, NotificationKind, Record, Role,
    UserChanges,
};
pub use validate::{validate, Field, ValidationErrors};
