use super::{AutopilotVariant, ButtonMap, Detent, DetentSet, ProfileVariant, ReverseBehavior, RewriteTable};
use crate::control::{DEFAULT_SNAP_THRESHOLD, ResponseCurve};
use crate::http_handler::{
    http_client::HTTPClient,
    http_request::{profile_get::ProfileRequest, request_common::NoBodyHTTPRequestType},
    http_response::{
        profile::{DetentEntry, ProfileResponse},
        response_common::ResponseError,
    },
};
use crate::log;
use strum_macros::Display;

/// A selectable simulator camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Camera {
    pub id: u32,
    pub name: String,
}

/// Immutable per-aircraft description, fetched once per session.
///
/// All fields are resolved: anything the document omits or gets wrong is replaced by its
/// default during construction, consumers never see an optional profile field.
#[derive(Debug, Clone)]
pub struct Profile {
    id: String,
    name: String,
    cameras: Vec<Camera>,
    flap_detents: DetentSet,
    throttle_detents: DetentSet,
    curve: ResponseCurve,
    throttle_snap: f64,
    reverse: Option<ReverseBehavior>,
    arm_spoilers_button: bool,
    buttons: ButtonMap,
    variant: ProfileVariant,
}

#[derive(Debug, Display)]
pub enum ProfileLoadError {
    Transport(ResponseError),
    Invalid(String),
}

impl std::error::Error for ProfileLoadError {}

impl ProfileLoadError {
    /// Whether fetching again can succeed. Transport failures are transient, a rejected
    /// profile id stays rejected.
    pub fn is_retryable(&self) -> bool { matches!(self, ProfileLoadError::Transport(_)) }
}

impl From<ResponseError> for ProfileLoadError {
    fn from(value: ResponseError) -> Self { ProfileLoadError::Transport(value) }
}

fn detent_set(entries: Option<&Vec<DetentEntry>>) -> DetentSet {
    let mut rows: Vec<&DetentEntry> = entries.into_iter().flatten().collect();
    // flap rows are keyed by handle index, the document order is not authoritative for them
    if rows.iter().all(|r| r.index.is_some()) {
        rows.sort_by_key(|r| r.index);
    }
    DetentSet::new(rows.into_iter().map(|r| Detent::new(r.label.clone(), r.val)))
}

impl Profile {
    /// Fetches and resolves the profile `id` from the simulator host.
    ///
    /// # Arguments
    /// - `client`: The HTTP client of the session.
    /// - `id`: The profile id, a plain file stem without path separators or dots.
    ///
    /// # Returns
    /// The resolved profile, [`ProfileLoadError::Invalid`] for an id that is never sent to
    /// the host or [`ProfileLoadError::Transport`] if the host could not deliver the document.
    pub(crate) async fn fetch(client: &HTTPClient, id: &str) -> Result<Self, ProfileLoadError> {
        if id.is_empty() || id.contains(['/', '\\', '.']) {
            return Err(ProfileLoadError::Invalid(format!("illegal profile id '{id}'")));
        }
        let response = ProfileRequest::new(id).send_request(client).await?;
        let profile = Self::from_response(id, &response);
        log!(
            "Loaded profile {} ({}): {} flap and {} throttle detents, {} cameras",
            profile.id,
            profile.name,
            profile.flap_detents.len(),
            profile.throttle_detents.len(),
            profile.cameras.len()
        );
        Ok(profile)
    }

    /// Resolves a profile document, replacing every missing or malformed field by its default.
    ///
    /// # Arguments
    /// - `id`: The profile id the document was fetched for, it selects the profile variant.
    /// - `response`: The leniently parsed document.
    ///
    /// # Returns
    /// A fully resolved `Profile`.
    pub(crate) fn from_response(id: &str, response: &ProfileResponse) -> Self {
        let ui = response.ui().cloned().unwrap_or_default();
        let reverse = ui.reverse_behavior.as_ref().map(ReverseBehavior::from);
        let throttle_snap = ui
            .throttle_detent_snap
            .filter(|t| t.is_finite() && *t >= 0.0)
            .unwrap_or(DEFAULT_SNAP_THRESHOLD);
        Self {
            id: id.to_string(),
            name: response.name().unwrap_or(id).to_string(),
            cameras: ui
                .camera_config
                .unwrap_or_default()
                .into_iter()
                .map(|c| Camera { id: c.id, name: c.name })
                .collect(),
            flap_detents: detent_set(ui.flap_detents.as_ref()),
            throttle_detents: detent_set(ui.throttle_detents.as_ref()),
            curve: ResponseCurve::new(ui.control_response, ui.control_sensitivity),
            throttle_snap,
            reverse,
            arm_spoilers_button: ui.arm_spoilers_button.unwrap_or(false),
            buttons: ButtonMap::from_entries(response.vjoy()),
            variant: ProfileVariant::resolve(id, reverse.as_ref()),
        }
    }

    /// A profile with every field at its default, used when the document is empty.
    pub fn generic(id: &str) -> Self { Self::from_response(id, &ProfileResponse::default()) }

    pub fn id(&self) -> &str { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn cameras(&self) -> &[Camera] { &self.cameras }
    pub fn flap_detents(&self) -> &DetentSet { &self.flap_detents }
    pub fn throttle_detents(&self) -> &DetentSet { &self.throttle_detents }
    pub fn curve(&self) -> ResponseCurve { self.curve }
    pub fn throttle_snap(&self) -> f64 { self.throttle_snap }
    pub fn reverse_behavior(&self) -> Option<&ReverseBehavior> { self.reverse.as_ref() }
    pub fn arm_spoilers_button(&self) -> bool { self.arm_spoilers_button }
    pub fn buttons(&self) -> &ButtonMap { &self.buttons }
    pub fn autopilot(&self) -> AutopilotVariant { self.variant.autopilot() }
    pub fn rewrites(&self) -> &RewriteTable { self.variant.rewrites() }
}
