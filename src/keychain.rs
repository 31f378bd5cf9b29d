use crate::alarm::{AlarmService, LogNotifier};
use crate::config::ClientConfig;
use crate::control::{Cockpit, CommandDispatcher, CommandSink, ControlState, HttpTransport};
use crate::http_handler::http_client::HTTPClient;
use crate::operator::OperatorIntake;
use crate::persistence::FileStateStore;
use crate::profile::Profile;
use crate::reconcile::{Reconciler, RemoteUnits};
use crate::sequencing::Sequencer;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The wired-up components of one client session.
///
/// Everything here is bound to the profile loaded at session start, the keychain is built
/// once and shared by the background loops and the operator surface.
#[derive(Clone)]
pub struct Keychain {
    /// The HTTP client for all requests to the simulator host.
    client: Arc<HTTPClient>,
    /// The active aircraft profile.
    profile: Arc<Profile>,
    /// Owner of the live control vector.
    reconciler: Arc<Reconciler>,
    /// Gesture intake.
    cockpit: Arc<Cockpit>,
    /// Durable record storage.
    store: Arc<FileStateStore>,
    /// The session's target alarm.
    alarm: Arc<AlarmService>,
    /// Router of operator messages into the cockpit and the alarm.
    intake: Arc<OperatorIntake>,
}

impl Keychain {
    /// Builds the session components for `profile`.
    ///
    /// # Arguments
    /// - `config`: The runtime configuration of the session.
    /// - `client`: The HTTP client shared by the transport and the state poller.
    /// - `profile`: The aircraft profile the session is bound to.
    /// - `teardown`: The session teardown token, running sequences stop with it.
    ///
    /// # Returns
    /// The keychain together with the dispatcher that owns the read end of the command
    /// queue, it is meant to be spawned by the caller.
    pub async fn new(
        config: &ClientConfig,
        client: Arc<HTTPClient>,
        profile: Profile,
        teardown: &CancellationToken,
    ) -> (Self, CommandDispatcher) {
        let profile = Arc::new(profile);
        let units = RemoteUnits::new(profile.flap_detents().clone(), profile.throttle_detents());
        let reconciler =
            Arc::new(Reconciler::new(ControlState::default(), config.suppression_window, units));

        let (sink, rx) = CommandSink::channel();
        let transport = Arc::new(HttpTransport::new(Arc::clone(&client), profile.id()));
        let dispatcher = CommandDispatcher::new(rx, profile.rewrites().clone(), transport);

        let sequencer = Sequencer::new(
            sink.clone(),
            Arc::clone(&reconciler),
            config.timings.frame,
            teardown.clone(),
        );
        let cockpit = Arc::new(Cockpit::new(
            Arc::clone(&profile),
            Arc::clone(&reconciler),
            sequencer,
            sink,
            config.timings,
        ));

        let store = Arc::new(FileStateStore::new(config.state_dir.clone()));
        let alarm = Arc::new(
            AlarmService::restore(Arc::clone(&store), Arc::new(LogNotifier), config.alarm_clear_after).await,
        );
        let intake = Arc::new(OperatorIntake::new(Arc::clone(&cockpit), Arc::clone(&alarm)));
        (Self { client, profile, reconciler, cockpit, store, alarm, intake }, dispatcher)
    }

    pub fn client(&self) -> Arc<HTTPClient> { Arc::clone(&self.client) }
    pub fn profile(&self) -> Arc<Profile> { Arc::clone(&self.profile) }
    pub fn reconciler(&self) -> Arc<Reconciler> { Arc::clone(&self.reconciler) }
    pub fn cockpit(&self) -> Arc<Cockpit> { Arc::clone(&self.cockpit) }
    pub fn store(&self) -> Arc<FileStateStore> { Arc::clone(&self.store) }
    pub fn alarm(&self) -> Arc<AlarmService> { Arc::clone(&self.alarm) }
    pub fn intake(&self) -> Arc<OperatorIntake> { Arc::clone(&self.intake) }
}
