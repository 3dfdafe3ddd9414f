//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises the client and
//! the dashboard controller over real HTTP using ureq. Send effects are
//! executed synchronously in the order they were emitted; dismiss timers
//! are not run.

use std::collections::VecDeque;

use dashboard_core::{
    Dashboard, Effect, Field, HttpMethod, HttpRequest, HttpResponse, ListPayload, NewUser,
    NotificationKind, Phase, Role, TransportError, UserChanges, UserClient,
};
use mock_server::ListShape;

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data, letting the core interpret status.
fn execute(req: &HttpRequest) -> Result<HttpResponse, TransportError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let result = match (req.method, req.body.as_deref()) {
        (HttpMethod::Get, _) => agent.get(&req.path).header("accept", "application/json").call(),
        (HttpMethod::Delete, _) => agent
            .delete(&req.path)
            .header("accept", "application/json")
            .call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => agent
            .put(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
    };
    let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    Ok(HttpResponse::new(status, body))
}

/// Start the mock server on a random port and return its base URL.
fn spawn_server(shape: ListShape) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, shape).await
        })
        .unwrap();
    });

    format!("http://{addr}/api")
}

/// Run every `Send` effect, feeding completions back until none remain.
/// Returns how many notifications were scheduled along the way.
fn drive(dashboard: &mut Dashboard, effects: Vec<Effect>) -> usize {
    let mut queue: VecDeque<Effect> = effects.into();
    let mut notifications = 0;
    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::Send { ticket, request } => {
                let result = execute(&request);
                queue.extend(dashboard.complete(ticket, result));
            }
            Effect::ScheduleDismiss { .. } => notifications += 1,
            Effect::CancelDismiss { .. } => {}
        }
    }
    notifications
}

fn started(base_url: &str) -> Dashboard {
    let mut dashboard = Dashboard::new(UserClient::new(base_url));
    let effects = dashboard.start();
    assert_eq!(drive(&mut dashboard, effects), 0);
    assert_eq!(dashboard.phase(), Phase::Ready);
    dashboard
}

fn add_user(dashboard: &mut Dashboard, name: &str, email: &str, role: &str) {
    dashboard.open_add();
    dashboard.set_field(Field::Name, name).unwrap();
    dashboard.set_field(Field::Email, email).unwrap();
    dashboard.set_field(Field::Role, role).unwrap();
    let effects = dashboard.submit();
    drive(dashboard, effects);
}

#[test]
fn client_crud_lifecycle() {
    let client = UserClient::new(&spawn_server(ListShape::Envelope));

    let payload = client.parse_list(execute(&client.build_list()).unwrap()).unwrap();
    assert!(matches!(payload, ListPayload::Envelope { ref data, count: Some(0) } if data.is_empty()));

    let input = NewUser {
        name: "Ann".to_string(),
        email: "a@x.com".to_string(),
        role: Role::Admin,
    };
    let req = client.build_create(&input).unwrap();
    let created = client.parse_create(execute(&req).unwrap()).unwrap();
    assert_eq!(created.name, "Ann");

    let changes = UserChanges {
        name: "Annie".to_string(),
        role: Role::Viewer,
    };
    let req = client.build_update(&created.id, &changes).unwrap();
    let updated = client.parse_update(execute(&req).unwrap()).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.email, "a@x.com");

    let req = client.build_delete(&created.id);
    client.parse_delete(execute(&req).unwrap()).unwrap();

    let req = client.build_delete(&created.id);
    let err = client.parse_delete(execute(&req).unwrap()).unwrap_err();
    assert_eq!(err.to_string(), "HTTP 404 Not Found");
}

#[test]
fn create_adds_exactly_one_record() {
    let base_url = spawn_server(ListShape::Envelope);
    let mut dashboard = started(&base_url);
    add_user(&mut dashboard, "Ann", "a@x.com", "Admin");
    let before = dashboard.records().len();

    add_user(&mut dashboard, "Bob", "bob@x.com", "Editor");

    assert_eq!(dashboard.records().len(), before + 1);
    assert!(dashboard
        .records()
        .iter()
        .any(|r| r.name == "Bob" && r.role == Role::Editor));
    assert!(dashboard.modal().is_none());
    assert_eq!(
        dashboard.notification().unwrap().message,
        "User \"Bob\" created successfully"
    );
}

#[test]
fn update_changes_name_and_role_but_not_email() {
    let base_url = spawn_server(ListShape::Envelope);
    let mut dashboard = started(&base_url);
    add_user(&mut dashboard, "Ann", "a@x.com", "Admin");
    let id = dashboard.records()[0].id.clone();

    assert!(dashboard.open_edit(&id));
    dashboard.set_field(Field::Name, "Annie").unwrap();
    dashboard.set_field(Field::Role, "Viewer").unwrap();
    let effects = dashboard.submit();
    drive(&mut dashboard, effects);

    let record = dashboard.records().iter().find(|r| r.id == id).unwrap();
    assert_eq!(record.name, "Annie");
    assert_eq!(record.role, Role::Viewer);
    assert_eq!(record.email, "a@x.com");
}

#[test]
fn delete_removes_record_after_refetch() {
    let base_url = spawn_server(ListShape::Envelope);
    let mut dashboard = started(&base_url);
    add_user(&mut dashboard, "Ann", "a@x.com", "Admin");
    add_user(&mut dashboard, "Bob", "bob@x.com", "Viewer");
    let id = dashboard.records()[0].id.clone();

    let effects = dashboard.request_delete(&id, &mut |_: &str| true);
    drive(&mut dashboard, effects);

    assert!(dashboard.records().iter().all(|r| r.id != id));
    assert_eq!(dashboard.records().len(), 1);
    assert_eq!(
        dashboard.notification().unwrap().kind,
        NotificationKind::Success
    );
}

#[test]
fn blank_name_on_edit_makes_no_request() {
    let base_url = spawn_server(ListShape::Envelope);
    let mut dashboard = started(&base_url);
    add_user(&mut dashboard, "Ann", "a@x.com", "Admin");
    let id = dashboard.records()[0].id.clone();

    dashboard.open_edit(&id);
    dashboard.set_field(Field::Name, "").unwrap();
    assert!(dashboard.submit().is_empty());
    assert_eq!(dashboard.pending_requests(), 0);
    assert_eq!(
        dashboard.modal().unwrap().errors.get(&Field::Name).map(String::as_str),
        Some("Name is required")
    );
}

#[test]
fn bare_array_shape_is_accepted() {
    let base_url = spawn_server(ListShape::Bare);
    let mut dashboard = started(&base_url);
    add_user(&mut dashboard, "Ann", "a@x.com", "Admin");
    assert_eq!(dashboard.records().len(), 1);
}

#[test]
fn unrecognized_shape_yields_empty_list_and_one_error() {
    let base_url = spawn_server(ListShape::Unrecognized);
    let mut dashboard = Dashboard::new(UserClient::new(&base_url));
    let effects = dashboard.start();
    assert_eq!(drive(&mut dashboard, effects), 1);
    assert!(dashboard.records().is_empty());
    let notification = dashboard.notification().unwrap();
    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(notification.message, "Unexpected response format from server");
}

#[test]
fn unreachable_server_is_a_network_error() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let mut dashboard = Dashboard::new(UserClient::new(&format!("http://127.0.0.1:{port}/api")));
    let effects = dashboard.start();
    assert_eq!(drive(&mut dashboard, effects), 1);
    assert!(dashboard.records().is_empty());
    assert!(dashboard
        .notification()
        .unwrap()
        .message
        .starts_with("Failed to load users: network error:"));
}
