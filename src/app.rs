//! Application state management for confdeck.
//!
//! This module contains the core `App` struct that manages all application
//! state: session and guard wiring, cached list data, form state, and
//! background task coordination.

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{
    guard, Credentials, CredentialStore, GuardDecision, RouteRequirements, SessionManager,
    SessionStore,
};
use crate::config::Config;
use crate::models::{Conference, DesignTheme, Speaker, Stakeholder, UserAccount, VenueMap};
use crate::utils::contains_ignore_case;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// 32 is plenty for a refresh (two list fetches) plus queued mutations.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Minimum length the service accepts for a new password; mirrored
/// client-side so the form can refuse before the round-trip.
const MIN_PASSWORD_LENGTH: usize = 3;

/// Number of items to scroll on page up/down
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Maximum concurrent requests when pulling full conference records.
/// Keeps the fan-out polite to the service.
const MAX_CONCURRENT_REQUESTS: usize = 5;

/// Colors preloaded into the design fields of a blank conference form
const DEFAULT_MAIN_COLOR: &str = "#007bff";
const DEFAULT_SECOND_COLOR: &str = "#6c757d";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Conferences,
    Users,
    Account,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Conferences => "Conferences",
            Tab::Users => "Users",
            Tab::Account => "Account",
        }
    }

    /// What the guard demands before this tab may render
    pub fn requirements(&self) -> RouteRequirements {
        match self {
            Tab::Conferences => RouteRequirements::AUTHENTICATED,
            Tab::Users => RouteRequirements::ADMIN,
            Tab::Account => RouteRequirements::AUTHENTICATED,
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Conferences => Tab::Users,
            Tab::Users => Tab::Account,
            Tab::Account => Tab::Conferences,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Conferences => Tab::Account,
            Tab::Users => Tab::Conferences,
            Tab::Account => Tab::Users,
        }
    }
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    LoggingIn,
    EditingConference,
    ChangingPassword,
    ConfirmingDeleteConference,
    ConfirmingDeleteUser,
    ConfirmingPromoteUser,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// The login overlay doubles as the signup screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Change-password form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PasswordFocus {
    Old,
    New,
    Confirm,
    Button,
}

impl PasswordFocus {
    pub fn next(&self) -> Self {
        match self {
            PasswordFocus::Old => PasswordFocus::New,
            PasswordFocus::New => PasswordFocus::Confirm,
            PasswordFocus::Confirm => PasswordFocus::Button,
            PasswordFocus::Button => PasswordFocus::Old,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            PasswordFocus::Old => PasswordFocus::Button,
            PasswordFocus::New => PasswordFocus::Old,
            PasswordFocus::Confirm => PasswordFocus::New,
            PasswordFocus::Button => PasswordFocus::Confirm,
        }
    }
}

// ============================================================================
// Conference Form
// ============================================================================

/// Editable fields of the conference form, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConferenceField {
    Id,
    Title,
    Date,
    Description,
    Img,
    Content,
    Duration,
    AddressL1,
    AddressL2,
    PostalCode,
    City,
    MainColor,
    SecondColor,
    Speakers,
    Stakeholders,
}

impl ConferenceField {
    pub const ALL: [ConferenceField; 15] = [
        ConferenceField::Id,
        ConferenceField::Title,
        ConferenceField::Date,
        ConferenceField::Description,
        ConferenceField::Img,
        ConferenceField::Content,
        ConferenceField::Duration,
        ConferenceField::AddressL1,
        ConferenceField::AddressL2,
        ConferenceField::PostalCode,
        ConferenceField::City,
        ConferenceField::MainColor,
        ConferenceField::SecondColor,
        ConferenceField::Speakers,
        ConferenceField::Stakeholders,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConferenceField::Id => "Id",
            ConferenceField::Title => "Title",
            ConferenceField::Date => "Date (YYYY-MM-DD)",
            ConferenceField::Description => "Description",
            ConferenceField::Img => "Image URL",
            ConferenceField::Content => "Content",
            ConferenceField::Duration => "Duration",
            ConferenceField::AddressL1 => "Address line 1",
            ConferenceField::AddressL2 => "Address line 2",
            ConferenceField::PostalCode => "Postal code",
            ConferenceField::City => "City",
            ConferenceField::MainColor => "Main color",
            ConferenceField::SecondColor => "Second color",
            ConferenceField::Speakers => "Speakers",
            ConferenceField::Stakeholders => "Stakeholders",
        }
    }

    /// Hint rendered next to the free-text list fields
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ConferenceField::Speakers => Some("First Last, First Last"),
            ConferenceField::Stakeholders => Some("First Last (job), First Last"),
            _ => None,
        }
    }
}

/// State of the create/edit conference overlay.
///
/// Values are kept as flat strings while editing; `to_conference` assembles
/// the nested record and applies the same required-field check the service
/// enforces.
pub struct ConferenceForm {
    /// Some(id) when editing an existing record, None when creating
    pub editing_id: Option<String>,
    values: Vec<String>,
    pub selection: usize,
    pub error: Option<String>,
}

impl ConferenceForm {
    pub fn blank() -> Self {
        let mut form = Self {
            editing_id: None,
            values: vec![String::new(); ConferenceField::ALL.len()],
            selection: 0,
            error: None,
        };
        form.set(ConferenceField::MainColor, DEFAULT_MAIN_COLOR.to_string());
        form.set(ConferenceField::SecondColor, DEFAULT_SECOND_COLOR.to_string());
        form
    }

    pub fn from_conference(conference: &Conference) -> Self {
        let mut form = Self::blank();
        form.editing_id = Some(conference.id.clone());
        form.set(ConferenceField::Id, conference.id.clone());
        form.set(ConferenceField::Title, conference.title.clone());
        form.set(ConferenceField::Date, conference.date.clone());
        form.set(ConferenceField::Description, conference.description.clone());
        form.set(ConferenceField::Img, conference.img.clone());
        form.set(ConferenceField::Content, conference.content.clone());
        form.set(
            ConferenceField::Duration,
            conference.duration.clone().unwrap_or_default(),
        );
        if let Some(ref map) = conference.os_map {
            form.set(
                ConferenceField::AddressL1,
                map.address_l1.clone().unwrap_or_default(),
            );
            form.set(
                ConferenceField::AddressL2,
                map.address_l2.clone().unwrap_or_default(),
            );
            form.set(
                ConferenceField::PostalCode,
                map.postal_code.clone().unwrap_or_default(),
            );
            form.set(ConferenceField::City, map.city.clone().unwrap_or_default());
        }
        if let Some(ref design) = conference.design {
            form.set(
                ConferenceField::MainColor,
                design.main_color.clone().unwrap_or_default(),
            );
            form.set(
                ConferenceField::SecondColor,
                design.second_color.clone().unwrap_or_default(),
            );
        }
        form.set(
            ConferenceField::Speakers,
            conference
                .speakers
                .iter()
                .map(Speaker::full_name)
                .collect::<Vec<_>>()
                .join(", "),
        );
        form.set(
            ConferenceField::Stakeholders,
            conference
                .stakeholders
                .iter()
                .map(|s| match s.job.as_deref() {
                    Some(job) if !job.is_empty() => format!("{} ({})", s.full_name(), job),
                    _ => s.full_name(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        );
        form
    }

    fn index(field: ConferenceField) -> usize {
        ConferenceField::ALL
            .iter()
            .position(|f| *f == field)
            .unwrap_or(0)
    }

    pub fn value(&self, field: ConferenceField) -> &str {
        &self.values[Self::index(field)]
    }

    pub fn set(&mut self, field: ConferenceField, value: String) {
        self.values[Self::index(field)] = value;
    }

    pub fn selected_field(&self) -> ConferenceField {
        ConferenceField::ALL[self.selection]
    }

    pub fn push_char(&mut self, c: char) {
        // Id is fixed once a record exists
        if self.editing_id.is_some() && self.selected_field() == ConferenceField::Id {
            return;
        }
        self.values[self.selection].push(c);
    }

    pub fn pop_char(&mut self) {
        if self.editing_id.is_some() && self.selected_field() == ConferenceField::Id {
            return;
        }
        self.values[self.selection].pop();
    }

    pub fn select_next(&mut self) {
        self.selection = (self.selection + 1) % ConferenceField::ALL.len();
    }

    pub fn select_prev(&mut self) {
        self.selection = self
            .selection
            .checked_sub(1)
            .unwrap_or(ConferenceField::ALL.len() - 1);
    }

    /// Assemble the conference record, enforcing the required fields the
    /// service checks on submission.
    pub fn to_conference(&self) -> std::result::Result<Conference, String> {
        let title = self.value(ConferenceField::Title).trim();
        let date = self.value(ConferenceField::Date).trim();
        let description = self.value(ConferenceField::Description).trim();
        if title.is_empty() || date.is_empty() || description.is_empty() {
            return Err("Title, date and description are required".to_string());
        }

        let opt = |field: ConferenceField| {
            let v = self.value(field).trim();
            (!v.is_empty()).then(|| v.to_string())
        };

        let venue_fields = [
            ConferenceField::AddressL1,
            ConferenceField::AddressL2,
            ConferenceField::PostalCode,
            ConferenceField::City,
        ];
        let os_map = venue_fields
            .iter()
            .any(|f| !self.value(*f).trim().is_empty())
            .then(|| VenueMap {
                address_l1: opt(ConferenceField::AddressL1),
                address_l2: opt(ConferenceField::AddressL2),
                postal_code: opt(ConferenceField::PostalCode),
                city: opt(ConferenceField::City),
                coordinates: Vec::new(),
            });

        let design = (opt(ConferenceField::MainColor).is_some()
            || opt(ConferenceField::SecondColor).is_some())
        .then(|| DesignTheme {
            main_color: opt(ConferenceField::MainColor),
            second_color: opt(ConferenceField::SecondColor),
        });

        Ok(Conference {
            id: self
                .editing_id
                .clone()
                .unwrap_or_else(|| self.value(ConferenceField::Id).trim().to_string()),
            title: title.to_string(),
            date: date.to_string(),
            description: description.to_string(),
            img: self.value(ConferenceField::Img).trim().to_string(),
            content: self.value(ConferenceField::Content).trim().to_string(),
            duration: opt(ConferenceField::Duration),
            os_map,
            speakers: Speaker::parse_list(self.value(ConferenceField::Speakers)),
            stakeholders: Stakeholder::parse_list(self.value(ConferenceField::Stakeholders)),
            design,
        })
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background API tasks, sent back over the MPSC channel.
enum TaskResult {
    /// Conference list fetched successfully
    Conferences(Vec<Conference>),
    /// Full record for a single conference
    ConferenceDetail(Conference),
    /// User list fetched successfully (admin only)
    Users(Vec<UserAccount>),
    /// A conference create/update completed
    ConferenceSaved(String),
    /// A conference was deleted (id)
    ConferenceDeleted(String),
    /// A user account was deleted (id)
    UserDeleted(String),
    /// A user account was promoted to admin (id)
    UserPromoted(String),
    /// The password change completed
    PasswordChanged,
    /// Account creation completed (id)
    SignupComplete(String),
    /// An error occurred in a background task
    Error(String),
}

// ============================================================================
// Validation helpers
// ============================================================================

/// Check whether another character fits the username field
pub fn can_add_username_char(current: &str) -> bool {
    current.len() < MAX_USERNAME_LENGTH
}

/// Check whether another character fits a password field
pub fn can_add_password_char(current: &str) -> bool {
    current.len() < MAX_PASSWORD_LENGTH
}

/// Client-side mirror of the service's new-password rules
pub fn validate_new_password(new: &str, confirm: &str) -> std::result::Result<(), String> {
    if new != confirm {
        return Err("New passwords do not match".to_string());
    }
    if new.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "New password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

/// Map an API error to a message fit for the login overlay
fn login_error_message(error: &ApiError) -> String {
    match error {
        ApiError::Unauthorized => "Invalid username or password".to_string(),
        ApiError::Rejected(msg) | ApiError::AccessDenied(msg) => msg.clone(),
        ApiError::Network(_) => {
            "Unable to connect to server. Check your internet connection.".to_string()
        }
        other => format!("Login failed: {}", other),
    }
}

/// Map a background task error to a status-bar message
fn task_error_message(msg: &str) -> String {
    let lower = msg.to_lowercase();
    if lower.contains("unauthorized") {
        "Session expired. Please log in again.".to_string()
    } else if lower.contains("network") || lower.contains("connect") {
        "Network error. Check your connection.".to_string()
    } else {
        format!("Error: {}", msg)
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionManager,
    pub api: ApiClient,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,

    // Login/signup form state
    pub auth_mode: AuthMode,
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
    pub auth_notice: Option<String>,

    // Change-password form state
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
    pub password_focus: PasswordFocus,
    pub account_error: Option<String>,
    pub account_notice: Option<String>,

    // Conference form state
    pub form: Option<ConferenceForm>,

    // Cached data
    pub conferences: Vec<Conference>,
    pub users: Vec<UserAccount>,

    // Selection indices
    pub conference_selection: usize,
    pub user_selection: usize,

    // Pending confirmation targets (ids captured at confirm time)
    pub pending_conference_delete: Option<String>,
    pub pending_user_delete: Option<String>,
    pub pending_user_promote: Option<String>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let base_url = config.api_base_url();
        debug!(base_url = %base_url, "API base URL resolved");
        let api = ApiClient::new(base_url)?;

        let data_dir = config
            .data_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("./data"));
        let session = SessionManager::new(SessionStore::new(data_dir));

        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill the login form from env vars, config and the keychain
        let login_username = std::env::var("CONFDECK_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();

        let login_password = std::env::var("CONFDECK_PASSWORD")
            .ok()
            .or_else(|| {
                (!login_username.is_empty())
                    .then(|| CredentialStore::get_password(&login_username).ok())
                    .flatten()
            })
            .unwrap_or_default();

        Ok(Self {
            config,
            session,
            api,

            state: AppState::Normal,
            current_tab: Tab::Conferences,
            focus: Focus::List,
            search_query: String::new(),

            auth_mode: AuthMode::Login,
            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,
            auth_notice: None,

            old_password: String::new(),
            new_password: String::new(),
            confirm_password: String::new(),
            password_focus: PasswordFocus::Old,
            account_error: None,
            account_notice: None,

            form: None,

            conferences: Vec::new(),
            users: Vec::new(),

            conference_selection: 0,
            user_selection: 0,

            pending_conference_delete: None,
            pending_user_delete: None,
            pending_user_promote: None,

            task_rx,
            task_tx,

            status_message: None,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Validate any stored session. Runs exactly once, before the event
    /// loop; nothing protected is drawn until this returns.
    pub async fn bootstrap(&mut self) {
        self.session.bootstrap(&mut self.api).await;
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.auth_mode = AuthMode::Login;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) {
        let credentials = Credentials {
            id: self.login_username.trim().to_string(),
            password: self.login_password.clone(),
        };

        if credentials.id.is_empty() || credentials.password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return;
        }

        self.login_error = None;

        match self.session.login(&mut self.api, &credentials).await {
            Ok(()) => {
                if let Err(e) = CredentialStore::store(&credentials.id, &credentials.password) {
                    warn!(error = %e, "Failed to store credentials");
                }

                self.config.last_username = Some(credentials.id);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.auth_notice = None;
                self.state = AppState::Normal;
                info!("Login successful");
                self.refresh_data();
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(login_error_message(&e));
            }
        }
    }

    /// Create an account with the credentials from the signup form.
    /// Runs in the background; the overlay flips back to login on success.
    pub fn attempt_signup(&mut self) {
        let id = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        if id.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return;
        }

        self.login_error = None;
        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let credentials = Credentials { id, password };
            let result = match api.signup(&credentials).await {
                Ok(()) => TaskResult::SignupComplete(credentials.id),
                Err(e) => TaskResult::Error(format!("Signup: {}", e)),
            };
            Self::send_result(&tx, result).await;
        });

        self.status_message = Some("Creating account...".to_string());
    }

    /// Sign out and return to the login overlay. Local only; no request.
    pub fn logout(&mut self) {
        self.session.logout(&mut self.api);
        self.conferences.clear();
        self.users.clear();
        self.conference_selection = 0;
        self.user_selection = 0;
        self.current_tab = Tab::Conferences;
        info!("Signed out");
        self.start_login();
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switch to a tab, subject to the route guard. The guard runs on every
    /// navigation; its verdict is never cached.
    pub fn navigate_to(&mut self, tab: Tab) {
        match guard::evaluate(self.session.state(), tab.requirements()) {
            GuardDecision::Render => {
                self.current_tab = tab;
                self.focus = Focus::List;
            }
            GuardDecision::RedirectToLogin => {
                self.start_login();
            }
            GuardDecision::AccessDenied => {
                // Land on the tab anyway; its renderer shows the refusal
                // notice instead of the admin content.
                self.current_tab = tab;
                self.focus = Focus::List;
            }
        }
    }

    /// Guard verdict for the currently displayed tab, evaluated per frame
    pub fn current_tab_decision(&self) -> GuardDecision {
        guard::evaluate(self.session.state(), self.current_tab.requirements())
    }

    // =========================================================================
    // Data access
    // =========================================================================

    /// Conferences filtered by the active search query
    pub fn filtered_conferences(&self) -> Vec<&Conference> {
        if self.search_query.is_empty() {
            return self.conferences.iter().collect();
        }
        self.conferences
            .iter()
            .filter(|c| {
                contains_ignore_case(&c.title, &self.search_query)
                    || contains_ignore_case(&c.description, &self.search_query)
            })
            .collect()
    }

    pub fn selected_conference(&self) -> Option<&Conference> {
        self.filtered_conferences()
            .get(self.conference_selection)
            .copied()
    }

    pub fn selected_user(&self) -> Option<&UserAccount> {
        self.users.get(self.user_selection)
    }

    /// Id of the signed-in account, used to refuse self-deletion
    pub fn current_user_id(&self) -> Option<&str> {
        self.session.user().map(|u| u.id.as_str())
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Helper to send task results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Spawn a background task to refresh the conference list, and the user
    /// list when the session has the admin role.
    pub fn refresh_data(&mut self) {
        if !self.session.is_authenticated() {
            return;
        }

        let api = self.api.clone();
        let include_users = self.session.is_admin();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            match api.fetch_conferences().await {
                Ok(list) => {
                    debug!(count = list.len(), "Conferences fetched");
                    let ids: Vec<String> = list.iter().map(|c| c.id.clone()).collect();
                    Self::send_result(&tx, TaskResult::Conferences(list)).await;

                    // Pull the full record for each entry with limited
                    // concurrency; the list endpoint may omit heavy fields.
                    let detail_api = api.clone();
                    let detail_tx = tx.clone();
                    stream::iter(ids)
                        .map(|id| {
                            let api = detail_api.clone();
                            async move { api.fetch_conference(&id).await }
                        })
                        .buffer_unordered(MAX_CONCURRENT_REQUESTS)
                        .for_each(|result| {
                            let tx = detail_tx.clone();
                            async move {
                                if let Ok(detail) = result {
                                    Self::send_result(&tx, TaskResult::ConferenceDetail(detail))
                                        .await;
                                }
                            }
                        })
                        .await;
                }
                Err(e) => {
                    error!(error = %e, "Conference fetch failed");
                    Self::send_result(&tx, TaskResult::Error(format!("Conferences: {}", e)))
                        .await;
                }
            }

            if include_users {
                match api.fetch_users().await {
                    Ok(list) => {
                        debug!(count = list.len(), "Users fetched");
                        Self::send_result(&tx, TaskResult::Users(list)).await;
                    }
                    Err(e) => {
                        error!(error = %e, "User fetch failed");
                        Self::send_result(&tx, TaskResult::Error(format!("Users: {}", e))).await;
                    }
                }
            }
        });

        self.status_message = Some("Refreshing...".to_string());
    }

    // =========================================================================
    // Conference CRUD (admin)
    // =========================================================================

    /// Open the form for a new conference
    pub fn start_create_conference(&mut self) {
        self.form = Some(ConferenceForm::blank());
        self.state = AppState::EditingConference;
    }

    /// Open the form prefilled with the selected conference
    pub fn start_edit_conference(&mut self) {
        let form = self.selected_conference().map(ConferenceForm::from_conference);
        if let Some(form) = form {
            self.form = Some(form);
            self.state = AppState::EditingConference;
        }
    }

    /// Validate and submit the conference form
    pub fn submit_conference_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };

        let conference = match form.to_conference() {
            Ok(c) => c,
            Err(msg) => {
                form.error = Some(msg);
                return;
            }
        };

        let editing = form.editing_id.clone();
        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let title = conference.title.clone();
            let result = match editing {
                Some(id) => api.update_conference(&id, &conference).await,
                None => api.create_conference(&conference).await,
            };
            let result = match result {
                Ok(()) => TaskResult::ConferenceSaved(title),
                Err(e) => TaskResult::Error(format!("Save conference: {}", e)),
            };
            Self::send_result(&tx, result).await;
        });

        self.form = None;
        self.state = AppState::Normal;
        self.status_message = Some("Saving conference...".to_string());
    }

    pub fn cancel_conference_form(&mut self) {
        self.form = None;
        self.state = AppState::Normal;
    }

    /// Ask for confirmation before deleting the selected conference
    pub fn confirm_delete_conference(&mut self) {
        let id = self.selected_conference().map(|c| c.id.clone());
        if let Some(id) = id {
            self.pending_conference_delete = Some(id);
            self.state = AppState::ConfirmingDeleteConference;
        }
    }

    pub fn delete_confirmed_conference(&mut self) {
        let Some(id) = self.pending_conference_delete.take() else {
            self.state = AppState::Normal;
            return;
        };
        self.state = AppState::Normal;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = match api.delete_conference(&id).await {
                Ok(()) => TaskResult::ConferenceDeleted(id),
                Err(e) => TaskResult::Error(format!("Delete conference: {}", e)),
            };
            Self::send_result(&tx, result).await;
        });
        self.status_message = Some("Deleting conference...".to_string());
    }

    // =========================================================================
    // User administration
    // =========================================================================

    /// Ask for confirmation before promoting the selected user
    pub fn confirm_promote_user(&mut self) {
        let target = self.selected_user().map(|u| (u.id.clone(), u.role));
        if let Some((id, role)) = target {
            if role.is_admin() {
                self.status_message = Some("Already an administrator".to_string());
                return;
            }
            self.pending_user_promote = Some(id);
            self.state = AppState::ConfirmingPromoteUser;
        }
    }

    pub fn promote_confirmed_user(&mut self) {
        let Some(id) = self.pending_user_promote.take() else {
            self.state = AppState::Normal;
            return;
        };
        self.state = AppState::Normal;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = match api.promote_to_admin(&id).await {
                Ok(()) => TaskResult::UserPromoted(id),
                Err(e) => TaskResult::Error(format!("Promote user: {}", e)),
            };
            Self::send_result(&tx, result).await;
        });
        self.status_message = Some("Promoting user...".to_string());
    }

    /// Ask for confirmation before deleting the selected user.
    /// Deleting your own account is refused client-side.
    pub fn confirm_delete_user(&mut self) {
        let own_id = self.current_user_id().map(str::to_string);
        let target = self.selected_user().map(|u| u.id.clone());
        if let Some(id) = target {
            if own_id.as_deref() == Some(id.as_str()) {
                self.status_message = Some("You cannot delete your own account".to_string());
                return;
            }
            self.pending_user_delete = Some(id);
            self.state = AppState::ConfirmingDeleteUser;
        }
    }

    pub fn delete_confirmed_user(&mut self) {
        let Some(id) = self.pending_user_delete.take() else {
            self.state = AppState::Normal;
            return;
        };
        self.state = AppState::Normal;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = match api.delete_user(&id).await {
                Ok(()) => TaskResult::UserDeleted(id),
                Err(e) => TaskResult::Error(format!("Delete user: {}", e)),
            };
            Self::send_result(&tx, result).await;
        });
        self.status_message = Some("Deleting user...".to_string());
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Open the change-password overlay with a fresh form
    pub fn start_change_password(&mut self) {
        self.clear_password_form();
        self.account_error = None;
        self.account_notice = None;
        self.state = AppState::ChangingPassword;
    }

    /// Validate and submit the change-password form
    pub fn submit_password_change(&mut self) {
        self.account_error = None;
        self.account_notice = None;

        if self.old_password.is_empty() {
            self.account_error = Some("Current password required".to_string());
            return;
        }
        if let Err(msg) = validate_new_password(&self.new_password, &self.confirm_password) {
            self.account_error = Some(msg);
            return;
        }

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let old = self.old_password.clone();
        let new = self.new_password.clone();

        tokio::spawn(async move {
            let result = match api.change_password(&old, &new).await {
                Ok(()) => TaskResult::PasswordChanged,
                Err(e) => TaskResult::Error(format!("Change password: {}", e)),
            };
            Self::send_result(&tx, result).await;
        });

        self.status_message = Some("Changing password...".to_string());
    }

    pub fn clear_password_form(&mut self) {
        self.old_password.clear();
        self.new_password.clear();
        self.confirm_password.clear();
        self.password_focus = PasswordFocus::Old;
    }

    // =========================================================================
    // Background task processing
    // =========================================================================

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_task_result(result);
        }
    }

    fn clamp_selections(&mut self) {
        let conference_count = self.filtered_conferences().len();
        if self.conference_selection >= conference_count {
            self.conference_selection = conference_count.saturating_sub(1);
        }
        if self.user_selection >= self.users.len() {
            self.user_selection = self.users.len().saturating_sub(1);
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Conferences(list) => {
                self.conferences = list;
                self.clamp_selections();
                self.status_message = None;
            }
            TaskResult::ConferenceDetail(conference) => {
                if let Some(existing) =
                    self.conferences.iter_mut().find(|c| c.id == conference.id)
                {
                    *existing = conference;
                }
            }
            TaskResult::Users(list) => {
                self.users = list;
                self.clamp_selections();
            }
            TaskResult::ConferenceSaved(title) => {
                self.status_message = Some(format!("Saved \"{}\"", title));
                self.refresh_data();
            }
            TaskResult::ConferenceDeleted(id) => {
                self.conferences.retain(|c| c.id != id);
                self.clamp_selections();
                self.status_message = Some("Conference deleted".to_string());
            }
            TaskResult::UserDeleted(id) => {
                self.users.retain(|u| u.id != id);
                self.clamp_selections();
                self.status_message = Some(format!("Deleted account \"{}\"", id));
            }
            TaskResult::UserPromoted(id) => {
                if let Some(user) = self.users.iter_mut().find(|u| u.id == id) {
                    user.role = crate::models::Role::Admin;
                }
                self.status_message = Some(format!("\"{}\" is now an administrator", id));
            }
            TaskResult::PasswordChanged => {
                self.clear_password_form();
                self.account_notice = Some("Password changed successfully".to_string());
                self.status_message = None;
                if self.state == AppState::ChangingPassword {
                    self.state = AppState::Normal;
                }
            }
            TaskResult::SignupComplete(id) => {
                self.auth_mode = AuthMode::Login;
                self.auth_notice = Some(format!(
                    "Account \"{}\" created. You can now sign in.",
                    id
                ));
                self.login_password.clear();
                self.status_message = None;
            }
            TaskResult::Error(msg) => {
                error!(error = %msg, "Background task error");
                // Password and signup failures belong on their forms, not
                // in the status bar.
                if let Some(rest) = msg.strip_prefix("Change password:") {
                    self.account_error = Some(rest.trim().to_string());
                    self.status_message = None;
                } else if let Some(rest) = msg.strip_prefix("Signup:") {
                    self.login_error = Some(rest.trim().to_string());
                    self.status_message = None;
                } else {
                    self.status_message = Some(task_error_message(&msg));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycle_round_trips() {
        for tab in [Tab::Conferences, Tab::Users, Tab::Account] {
            assert_eq!(tab.next().prev(), tab);
            assert_eq!(tab.prev().next(), tab);
        }
    }

    #[test]
    fn test_tab_requirements() {
        assert!(Tab::Users.requirements().require_admin);
        assert!(!Tab::Conferences.requirements().require_admin);
        assert!(Tab::Conferences.requirements().require_auth);
        assert!(Tab::Account.requirements().require_auth);
    }

    #[test]
    fn test_validate_new_password() {
        assert!(validate_new_password("abc", "abc").is_ok());
        assert!(validate_new_password("abc", "abd").is_err());
        assert!(validate_new_password("ab", "ab").is_err());
    }

    #[test]
    fn test_login_error_messages() {
        assert_eq!(
            login_error_message(&ApiError::Unauthorized),
            "Invalid username or password"
        );
        assert_eq!(
            login_error_message(&ApiError::Rejected("user not found".to_string())),
            "user not found"
        );
    }

    #[test]
    fn test_form_requires_core_fields() {
        let form = ConferenceForm::blank();
        assert!(form.to_conference().is_err());

        let mut form = ConferenceForm::blank();
        form.set(ConferenceField::Title, "RustConf".to_string());
        form.set(ConferenceField::Date, "2025-09-10".to_string());
        form.set(ConferenceField::Description, "talks".to_string());
        let conference = form.to_conference().expect("core fields set");
        assert_eq!(conference.title, "RustConf");
        // Blank venue fields collapse to no venue at all
        assert!(conference.os_map.is_none());
        // The preloaded default colors survive
        assert_eq!(
            conference.design.unwrap().main_color.as_deref(),
            Some("#007bff")
        );
    }

    #[test]
    fn test_form_assembles_nested_sections() {
        let mut form = ConferenceForm::blank();
        form.set(ConferenceField::Title, "t".to_string());
        form.set(ConferenceField::Date, "d".to_string());
        form.set(ConferenceField::Description, "x".to_string());
        form.set(ConferenceField::City, "Nantes".to_string());
        form.set(ConferenceField::Speakers, "Ada Lovelace".to_string());

        let conference = form.to_conference().unwrap();
        assert_eq!(
            conference.os_map.unwrap().city.as_deref(),
            Some("Nantes")
        );
        assert_eq!(conference.speakers.len(), 1);
    }

    #[test]
    fn test_form_round_trip_preserves_record() {
        let mut form = ConferenceForm::blank();
        form.set(ConferenceField::Id, "c1".to_string());
        form.set(ConferenceField::Title, "t".to_string());
        form.set(ConferenceField::Date, "2025-01-01".to_string());
        form.set(ConferenceField::Description, "x".to_string());
        form.set(ConferenceField::Speakers, "Ada Lovelace, Grace Hopper".to_string());
        form.set(ConferenceField::Stakeholders, "Tim Org (Sponsor)".to_string());
        let conference = form.to_conference().unwrap();

        let reopened = ConferenceForm::from_conference(&conference);
        assert_eq!(reopened.editing_id.as_deref(), Some("c1"));
        assert_eq!(
            reopened.value(ConferenceField::Speakers),
            "Ada Lovelace, Grace Hopper"
        );
        assert_eq!(
            reopened.value(ConferenceField::Stakeholders),
            "Tim Org (Sponsor)"
        );
    }

    #[test]
    fn test_form_id_locked_while_editing() {
        let mut form = ConferenceForm::blank();
        form.editing_id = Some("c1".to_string());
        form.set(ConferenceField::Id, "c1".to_string());
        form.selection = 0; // Id field
        form.push_char('x');
        assert_eq!(form.value(ConferenceField::Id), "c1");
    }

    #[test]
    fn test_input_length_limits() {
        assert!(can_add_username_char("short"));
        assert!(!can_add_username_char(&"x".repeat(MAX_USERNAME_LENGTH)));
        assert!(can_add_password_char("short"));
        assert!(!can_add_password_char(&"x".repeat(MAX_PASSWORD_LENGTH)));
    }
}
