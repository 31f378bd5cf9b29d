#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod alarm;
mod config;
mod control;
mod http_handler;
mod keychain;
mod logger;
mod operator;
mod persistence;
mod profile;
mod reconcile;
mod sequencing;

use crate::config::ClientConfig;
use crate::http_handler::http_client::HTTPClient;
use crate::keychain::Keychain;
use crate::operator::IntakeEndpoint;
use crate::persistence::{PersistenceWriter, restore_plan};
use crate::profile::Profile;
use crate::reconcile::StatePoller;
use std::{process::ExitCode, sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const PROFILE_RETRY: Duration = Duration::from_secs(5);

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = ClientConfig::from_env();
    let endpoint = match IntakeEndpoint::bind(&config.intake_addr).await {
        Ok(endpoint) => endpoint,
        Err(e) => {
            error!("Unable to open operator intake on {}: {e}", config.intake_addr);
            return ExitCode::FAILURE;
        }
    };
    info!("Connecting to simulator host at {} with profile {}", config.base_url, config.profile_id);
    let client = Arc::new(HTTPClient::new(&config.base_url));
    let Some(profile) = load_profile(&client, &config.profile_id).await else {
        return ExitCode::FAILURE;
    };

    let teardown = CancellationToken::new();
    let (keychain, dispatcher) = Keychain::new(&config, client, profile, &teardown).await;
    restore_controls(&keychain).await;

    let dispatch_handle = tokio::spawn(dispatcher.run(teardown.child_token()));
    let poll_handle = {
        let poller = StatePoller::new(keychain.client(), keychain.reconciler(), config.poll_period);
        let c_tok = teardown.child_token();
        tokio::spawn(async move { poller.run(c_tok).await })
    };
    let writer_handle = {
        let writer = PersistenceWriter::new(
            keychain.store(),
            keychain.reconciler(),
            keychain.profile().id(),
            config.persist_interval,
        );
        let c_tok = teardown.child_token();
        tokio::spawn(async move { writer.run(c_tok).await })
    };
    let alarm_handle = {
        let alarm = keychain.alarm();
        let c_tok = teardown.child_token();
        tokio::spawn(async move { alarm.run(c_tok).await })
    };
    let intake_handle = tokio::spawn(endpoint.run(keychain.intake(), teardown.child_token()));
    info!("Session for {} running, press Ctrl-C to quit", keychain.profile().name());

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for shutdown signal: {e}");
    }
    log!("Shutting down session");
    teardown.cancel();
    // the writer stores a final snapshot, the dispatcher flushes what is still queued
    for (name, handle) in [
        ("operator intake", intake_handle),
        ("persistence writer", writer_handle),
        ("command dispatcher", dispatch_handle),
        ("state poller", poll_handle),
        ("alarm", alarm_handle),
    ] {
        join_task(name, handle).await;
    }
    ExitCode::SUCCESS
}

/// Fetches the session profile, retrying while the host cannot deliver it.
///
/// # Arguments
/// - `client`: The HTTP client of the session.
/// - `id`: The configured profile id.
///
/// # Returns
/// The profile, or `None` if the id was rejected and the session must not start.
async fn load_profile(client: &HTTPClient, id: &str) -> Option<Profile> {
    loop {
        match Profile::fetch(client, id).await {
            Ok(profile) => return Some(profile),
            Err(e) if e.is_retryable() => {
                warn!("Profile {id} could not be fetched: {e}, retrying in {}s", PROFILE_RETRY.as_secs());
                tokio::time::sleep(PROFILE_RETRY).await;
            }
            Err(e) => {
                error!("Profile {id} cannot be loaded: {e}, refusing to start");
                return None;
            }
        }
    }
}

async fn restore_controls(keychain: &Keychain) {
    let Some(saved) = keychain.store().load_controls().await else {
        log!("No saved control state found");
        return;
    };
    let profile = keychain.profile();
    match restore_plan(&saved, profile.id()) {
        Some(replay) => keychain.cockpit().restore(&saved, replay).await,
        None => log!("Saved control state of {} not restored into {}", saved.profile, profile.id()),
    }
}

async fn join_task(name: &str, handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        error!("Task {name} ended abnormally: {e}");
    }
}
