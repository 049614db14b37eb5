//! Process-wide client state and view lifecycle
//!
//! [`PulseApp`] is built once per process and owns everything that outlives a
//! single screen: storage, the session flag, the conversation, the activity
//! log and the telemetry hub. Navigating builds a [`Screen`]; a mounted view
//! holds its timers and releases them when dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use config_engine::{validation, PulseConfig};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::activity::{ActivityLog, ActivityRecord};
use crate::alerts::spawn_alert_poller;
use crate::backend::{BackendApi, HttpBackend, IncidentTicket};
use crate::chat::Assistant;
use crate::conversation::{ChatEntry, ConversationStore};
use crate::error::ClientResult;
use crate::feed::{spawn_feed_poller, FeedItem};
use crate::profile::{ProfileEditor, ProfileRecord};
use crate::scheduler::{PollingTask, TimerRegistry};
use crate::session::{resolve, Route, SessionStore, SignupForm};
use crate::storage::{KeyValueStore, SqliteStore};
use crate::telemetry::{TelemetryHub, TelemetryLease};
use crate::vitals::VitalsSnapshot;

pub struct PulseApp {
    config: PulseConfig,
    backend: Arc<dyn BackendApi>,
    session: SessionStore,
    conversation: Arc<ConversationStore>,
    activity: Arc<ActivityLog>,
    timers: TimerRegistry,
    telemetry: Arc<TelemetryHub>,
    // shared by every mounted dashboard, stops with the last one
    alerts: Mutex<Weak<PollingTask>>,
}

impl PulseApp {
    /// Open the configured SQLite store and HTTP backend
    pub async fn boot(config: PulseConfig) -> ClientResult<Self> {
        validation::validate(&config)?;
        let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open(&config.storage.path).await?);
        let backend: Arc<dyn BackendApi> = Arc::new(HttpBackend::new(&config.backend)?);
        Self::with_parts(config, storage, backend).await
    }

    /// Build the client over caller-supplied storage and backend
    ///
    /// `config` is validated here as well, since it need not come from
    /// [`config_engine::ConfigEngine::load`].
    pub async fn with_parts(
        config: PulseConfig,
        storage: Arc<dyn KeyValueStore>,
        backend: Arc<dyn BackendApi>,
    ) -> ClientResult<Self> {
        validation::validate(&config)?;
        let timers = TimerRegistry::new();
        let telemetry = TelemetryHub::new(
            Arc::clone(&backend),
            timers.clone(),
            config.polling.telemetry_period(),
        );
        let activity = Arc::new(ActivityLog::load(Arc::clone(&storage)).await);
        let session = SessionStore::new(storage, config.account.clone());

        tracing::info!(backend = %config.backend.base_url, "client booted");
        Ok(Self {
            config,
            backend,
            session,
            conversation: Arc::new(ConversationStore::new()),
            activity,
            timers,
            telemetry,
            alerts: Mutex::new(Weak::new()),
        })
    }

    /// Guard `path` and mount whatever it resolves to
    pub async fn navigate(&self, path: &str) -> ClientResult<Screen> {
        let logged_in = self.session.is_logged_in().await?;
        let resolution = resolve(path, logged_in);
        if resolution.redirected {
            tracing::debug!(requested = path, target = %resolution.route, "navigation redirected");
        }

        Ok(match resolution.route {
            Route::Landing => Screen::Landing,
            Route::Login => Screen::Login,
            Route::Dashboard => Screen::Dashboard(self.mount_dashboard()),
            Route::Profile => Screen::Profile(self.mount_profile()),
        })
    }

    fn mount_dashboard(&self) -> DashboardView {
        let telemetry = self.telemetry.acquire();
        let alerts = self.alert_poller();
        let assistant = Assistant::new(
            Arc::clone(&self.conversation),
            Arc::clone(&self.activity),
            Arc::clone(&self.backend),
            telemetry.subscribe(),
        );
        tracing::debug!("dashboard mounted");

        DashboardView {
            _alerts: alerts,
            telemetry,
            assistant,
            conversation: Arc::clone(&self.conversation),
            backend: Arc::clone(&self.backend),
            simulating: AtomicBool::new(false),
        }
    }

    /// Join the running alert poller, or start it for the first dashboard
    fn alert_poller(&self) -> Arc<PollingTask> {
        let mut shared = self.alerts.lock();
        if let Some(task) = shared.upgrade() {
            return task;
        }
        let task = Arc::new(spawn_alert_poller(
            &self.timers,
            Arc::clone(&self.conversation),
            Arc::clone(&self.backend),
            self.config.polling.alert_period(),
        ));
        *shared = Arc::downgrade(&task);
        task
    }

    fn mount_profile(&self) -> ProfileView {
        let telemetry = self.telemetry.acquire();
        let (feed_task, feed) = spawn_feed_poller(
            &self.timers,
            Arc::clone(&self.backend),
            self.config.polling.feed_period(),
        );
        tracing::debug!("profile mounted");

        ProfileView {
            _feed_task: feed_task,
            telemetry,
            feed,
            editor: ProfileEditor::new(ProfileRecord::from(&self.config.profile)),
            activity: Arc::clone(&self.activity),
        }
    }

    /// Log in with the mock account; lands on the dashboard
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Route> {
        self.session.login(email, password).await?;
        Ok(Route::Dashboard)
    }

    /// Validate the signup form; the user is sent back to log in
    pub fn signup(&self, form: &SignupForm) -> ClientResult<Route> {
        self.session.signup(form)?;
        Ok(Route::Login)
    }

    pub async fn sign_out(&self) -> ClientResult<Route> {
        self.session.sign_out().await?;
        Ok(Route::Login)
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn conversation(&self) -> &Arc<ConversationStore> {
        &self.conversation
    }

    pub fn activity(&self) -> &Arc<ActivityLog> {
        &self.activity
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    pub fn telemetry(&self) -> &Arc<TelemetryHub> {
        &self.telemetry
    }
}

/// What a navigation mounted
pub enum Screen {
    Landing,
    Login,
    Dashboard(DashboardView),
    Profile(ProfileView),
}

impl Screen {
    pub fn route(&self) -> Route {
        match self {
            Screen::Landing => Route::Landing,
            Screen::Login => Route::Login,
            Screen::Dashboard(_) => Route::Dashboard,
            Screen::Profile(_) => Route::Profile,
        }
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Screen").field(&self.route()).finish()
    }
}

/// Mounted dashboard: live vitals, alert polling and the assistant
pub struct DashboardView {
    _alerts: Arc<PollingTask>,
    telemetry: TelemetryLease,
    assistant: Assistant,
    conversation: Arc<ConversationStore>,
    backend: Arc<dyn BackendApi>,
    simulating: AtomicBool,
}

impl DashboardView {
    pub fn vitals(&self) -> VitalsSnapshot {
        self.telemetry.latest()
    }

    pub fn vitals_updates(&self) -> watch::Receiver<VitalsSnapshot> {
        self.telemetry.subscribe()
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn transcript(&self) -> Vec<ChatEntry> {
        self.conversation.read_all()
    }

    pub fn is_simulating(&self) -> bool {
        self.simulating.load(Ordering::SeqCst)
    }

    /// Start the external crash simulation
    pub async fn trigger_simulation(&self) -> ClientResult<IncidentTicket> {
        self.simulating.store(true, Ordering::SeqCst);
        match self.backend.trigger_simulation().await {
            Ok(ticket) => {
                tracing::info!(incident_id = %ticket.incident_id, "crash simulation started");
                Ok(ticket)
            }
            Err(e) => {
                self.simulating.store(false, Ordering::SeqCst);
                tracing::warn!(error = %e, error_code = e.code(), "crash trigger failed");
                Err(e)
            }
        }
    }

    /// Stop the simulation; the outcome is only logged
    pub async fn cancel_simulation(&self) {
        self.simulating.store(false, Ordering::SeqCst);
        match self.backend.cancel_simulation().await {
            Ok(()) => tracing::info!("crash simulation cancelled"),
            Err(e) => tracing::warn!(error = %e, error_code = e.code(), "crash cancel failed"),
        }
    }
}

/// Mounted profile: live vitals, editable record and both activity lists
pub struct ProfileView {
    _feed_task: PollingTask,
    telemetry: TelemetryLease,
    feed: watch::Receiver<Vec<FeedItem>>,
    editor: ProfileEditor,
    activity: Arc<ActivityLog>,
}

impl ProfileView {
    pub fn vitals(&self) -> VitalsSnapshot {
        self.telemetry.latest()
    }

    /// Latest server feed
    pub fn feed(&self) -> Vec<FeedItem> {
        self.feed.borrow().clone()
    }

    pub fn feed_updates(&self) -> watch::Receiver<Vec<FeedItem>> {
        self.feed.clone()
    }

    /// Local activity log, newest first
    pub async fn local_activity(&self) -> Vec<ActivityRecord> {
        self.activity.read_all().await
    }

    pub fn editor(&self) -> &ProfileEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut ProfileEditor {
        &mut self.editor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackendApi;
    use crate::error::ClientError;
    use crate::storage::{MemoryStore, SESSION_KEY};

    fn quiet_backend() -> MockBackendApi {
        let mut backend = MockBackendApi::new();
        backend.expect_publish_vitals().returning(|_| Ok(()));
        backend.expect_check_alert().returning(|| Ok(None));
        backend.expect_fetch_activity_feed().returning(|| Ok(Vec::new()));
        backend
    }

    async fn app_with(backend: MockBackendApi, storage: MemoryStore) -> PulseApp {
        PulseApp::with_parts(PulseConfig::default(), Arc::new(storage), Arc::new(backend))
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_protected_route_without_session_mounts_nothing() {
        let app = app_with(quiet_backend(), MemoryStore::new()).await;

        let screen = app.navigate("/dashboard").await.unwrap();
        assert_eq!(screen.route(), Route::Login);
        assert_eq!(app.timers().active(), 0);
        assert!(!app.telemetry().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dashboard_and_profile_share_one_simulator() {
        let storage = MemoryStore::new().with_entry(SESSION_KEY, "test@example.com");
        let app = app_with(quiet_backend(), storage).await;

        let dashboard = app.navigate("/dashboard").await.unwrap();
        let profile = app.navigate("/profile").await.unwrap();
        // telemetry + alerts + feed
        assert_eq!(app.timers().active(), 3);
        assert_eq!(app.telemetry().leases(), 2);

        tokio::time::sleep(std::time::Duration::from_secs(31)).await;
        if let (Screen::Dashboard(d), Screen::Profile(p)) = (&dashboard, &profile) {
            assert_eq!(d.vitals(), p.vitals());
        } else {
            panic!("unexpected screens: {dashboard:?} {profile:?}");
        }

        drop(dashboard);
        assert_eq!(app.timers().active(), 2);
        drop(profile);
        assert_eq!(app.timers().active(), 0);
    }

    #[tokio::test]
    async fn test_login_sign_out_round_trip() {
        let app = app_with(quiet_backend(), MemoryStore::new()).await;

        assert!(matches!(app.login("test@example.com", "wrong").await, Err(ClientError::InvalidCredentials)));
        assert_eq!(app.navigate("/").await.unwrap().route(), Route::Landing);

        assert_eq!(app.login("test@example.com", "123456").await.unwrap(), Route::Dashboard);
        assert_eq!(app.navigate("/login").await.unwrap().route(), Route::Dashboard);

        assert_eq!(app.sign_out().await.unwrap(), Route::Login);
        assert_eq!(app.navigate("/profile").await.unwrap().route(), Route::Login);
    }

    #[tokio::test]
    async fn test_conversation_survives_navigation() {
        let storage = MemoryStore::new().with_entry(SESSION_KEY, "test@example.com");
        let app = app_with(quiet_backend(), storage).await;

        let screen = app.navigate("/dashboard").await.unwrap();
        if let Screen::Dashboard(view) = &screen {
            view.assistant().note_typing();
        }
        drop(screen);

        let _profile = app.navigate("/profile").await.unwrap();
        let again = app.navigate("/dashboard").await.unwrap();
        let Screen::Dashboard(view) = again else {
            panic!("expected dashboard");
        };
        assert_eq!(view.transcript().len(), 1);
        assert!(app.conversation().is_suspended());
    }

    #[tokio::test]
    async fn test_failed_trigger_resets_simulating() {
        let mut backend = quiet_backend();
        backend
            .expect_trigger_simulation()
            .returning(|| Err(ClientError::MalformedResponse("non-JSON body".to_string())));
        backend.expect_cancel_simulation().returning(|| Ok(()));
        let storage = MemoryStore::new().with_entry(SESSION_KEY, "test@example.com");
        let app = app_with(backend, storage).await;

        let Screen::Dashboard(view) = app.navigate("/dashboard").await.unwrap() else {
            panic!("expected dashboard");
        };
        assert!(view.trigger_simulation().await.is_err());
        assert!(!view.is_simulating());
        view.cancel_simulation().await;
    }

    #[tokio::test]
    async fn test_zero_period_config_is_rejected() {
        let mut config = PulseConfig::default();
        config.polling.alert_interval_ms = 0;

        let result = PulseApp::with_parts(config, Arc::new(MemoryStore::new()), Arc::new(quiet_backend())).await;
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_dashboards_share_one_alert_poller() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut backend = MockBackendApi::new();
        backend.expect_publish_vitals().returning(|_| Ok(()));
        backend.expect_check_alert().returning(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        });
        let storage = MemoryStore::new().with_entry(SESSION_KEY, "test@example.com");
        let app = app_with(backend, storage).await;

        let left = app.navigate("/dashboard").await.unwrap();
        let right = app.navigate("/dashboard").await.unwrap();
        // telemetry + one alert poller
        assert_eq!(app.timers().active(), 2);

        // ticks at 3s, 6s and 9s
        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        drop(left);
        assert_eq!(app.timers().active(), 2);
        drop(right);
        assert_eq!(app.timers().active(), 0);

        let _again = app.navigate("/dashboard").await.unwrap();
        assert_eq!(app.timers().active(), 2);
    }
}
