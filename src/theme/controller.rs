use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    task::{self, JoinHandle},
};
use tracing::{debug, info, warn};

use crate::{
    color::{
        Argb,
        quantizer::{QuantizerOptions, extract_seed_color},
        scheme::{ColorScheme, derive_scheme},
        tonal::{TonalPaletteSet, build_palettes},
    },
    decode::{ImageDecoder, ImageReference},
    theme::{
        ActiveTrack, ArtSource, ThemeError,
        presentation::SchemePresenter,
        state_machine::{
            RequestReason, RequestSeq, Resolution, ThemePhase, ThemeRequest, ThemeStateMachine,
        },
        validate_seed,
    },
};

const INPUT_CAPACITY: usize = 32;

/// Signal pushed by player and preference collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeInput {
    /// Active track changed; `None` means nothing is playing.
    Track(Option<ActiveTrack>),
    /// Dark-mode preference changed.
    Appearance {
        /// New dark-mode flag.
        dark: bool,
    },
}

/// Knobs of the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeSettings {
    /// Quantizer tuning.
    pub quantizer: QuantizerOptions,
    /// Seed used when no vibrant swatch exists or a seed is rejected.
    pub fallback_seed: Argb,
    /// Dark-mode flag before any preference is received.
    pub initial_dark: bool,
}

/// Observable state of the controller task, republished after every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerStatus {
    /// Phase of the active-track slot.
    pub phase: ThemePhase,
    /// Latest request sequence issued.
    pub latest_seq: RequestSeq,
    /// Sequence of the last applied scheme.
    pub last_applied_seq: Option<RequestSeq>,
    /// Results dropped because a newer request superseded them.
    pub discarded: u64,
    /// Requests that had to decode artwork.
    pub decode_runs: u64,
    /// Dark-mode flag in effect.
    pub dark: bool,
}

/// Cheap, cloneable handle onto the controller task.
#[derive(Debug, Clone)]
pub struct ThemeHandle {
    inputs: mpsc::Sender<ThemeInput>,
    status: watch::Receiver<ControllerStatus>,
}

impl ThemeHandle {
    /// Forward a signal to the controller.
    pub async fn send(&self, input: ThemeInput) -> Result<(), ThemeError> {
        self.inputs
            .send(input)
            .await
            .map_err(|_| ThemeError::ControllerStopped)
    }

    /// Set or clear the active track.
    pub async fn set_track(&self, track: Option<ActiveTrack>) -> Result<(), ThemeError> {
        self.send(ThemeInput::Track(track)).await
    }

    /// Update the dark-mode flag.
    pub async fn set_dark_mode(&self, dark: bool) -> Result<(), ThemeError> {
        self.send(ThemeInput::Appearance { dark }).await
    }

    /// Latest published status.
    pub fn status(&self) -> ControllerStatus {
        *self.status.borrow()
    }

    /// Watch status updates.
    pub fn subscribe(&self) -> watch::Receiver<ControllerStatus> {
        self.status.clone()
    }

    /// Whether the controller task has exited.
    pub fn is_closed(&self) -> bool {
        self.inputs.is_closed()
    }
}

/// Start the controller task. It runs until every [`ThemeHandle`] is dropped.
pub fn spawn(
    decoder: Arc<dyn ImageDecoder>,
    presenter: Arc<dyn SchemePresenter>,
    settings: ThemeSettings,
) -> (ThemeHandle, JoinHandle<()>) {
    let (input_tx, input_rx) = mpsc::channel(INPUT_CAPACITY);
    let (completion_tx, completion_rx) = mpsc::unbounded_channel();
    let controller = Controller::new(decoder, presenter, settings, completion_tx);
    let (status_tx, status_rx) = watch::channel(controller.status());

    let join = tokio::spawn(controller.run(input_rx, completion_rx, status_tx));
    (
        ThemeHandle {
            inputs: input_tx,
            status: status_rx,
        },
        join,
    )
}

struct Completion {
    seq: RequestSeq,
    track: ActiveTrack,
    elapsed: Duration,
    outcome: Result<Derived, ThemeError>,
}

struct Derived {
    palettes: Arc<TonalPaletteSet>,
    scheme: ColorScheme,
}

enum Job {
    Derive(Arc<TonalPaletteSet>),
    Seed(Argb),
    Decode(ImageReference),
}

struct Controller {
    machine: ThemeStateMachine,
    decoder: Arc<dyn ImageDecoder>,
    presenter: Arc<dyn SchemePresenter>,
    settings: ThemeSettings,
    completions: mpsc::UnboundedSender<Completion>,
    track: Option<ActiveTrack>,
    is_dark: bool,
    palettes: Option<Arc<TonalPaletteSet>>,
    discarded: u64,
    decode_runs: u64,
}

impl Controller {
    fn new(
        decoder: Arc<dyn ImageDecoder>,
        presenter: Arc<dyn SchemePresenter>,
        settings: ThemeSettings,
        completions: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        Self {
            machine: ThemeStateMachine::new(),
            decoder,
            presenter,
            settings,
            completions,
            track: None,
            is_dark: settings.initial_dark,
            palettes: None,
            discarded: 0,
            decode_runs: 0,
        }
    }

    async fn run(
        mut self,
        mut inputs: mpsc::Receiver<ThemeInput>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
        status: watch::Sender<ControllerStatus>,
    ) {
        info!(dark = self.is_dark, "theme controller started");
        loop {
            tokio::select! {
                input = inputs.recv() => match input {
                    Some(input) => self.handle_input(input),
                    None => break,
                },
                Some(done) = completions.recv() => self.handle_completion(done),
            }
            status.send_replace(self.status());
        }
        info!("theme controller stopped");
    }

    fn status(&self) -> ControllerStatus {
        let snapshot = self.machine.snapshot();
        ControllerStatus {
            phase: snapshot.phase,
            latest_seq: snapshot.latest,
            last_applied_seq: snapshot.last_applied,
            discarded: self.discarded,
            decode_runs: self.decode_runs,
            dark: self.is_dark,
        }
    }

    fn handle_input(&mut self, input: ThemeInput) {
        match input {
            ThemeInput::Track(Some(track)) => {
                if self.track.as_ref() == Some(&track) && self.machine.phase() != ThemePhase::Idle {
                    debug!(track_id = %track.track_id, "track unchanged");
                    return;
                }
                self.palettes = None;
                self.track = Some(track.clone());
                self.issue(track, RequestReason::TrackChanged);
            }
            ThemeInput::Track(None) => {
                self.track = None;
                self.palettes = None;
                let seq = self.machine.clear();
                info!(seq, "track cleared; resetting scheme");
                self.presenter.apply_scheme(&ColorScheme::empty());
            }
            ThemeInput::Appearance { dark } => {
                if dark == self.is_dark {
                    return;
                }
                self.is_dark = dark;
                match (&self.track, self.machine.phase()) {
                    (Some(track), ThemePhase::Loading { .. } | ThemePhase::Applied { .. }) => {
                        let track = track.clone();
                        self.issue(track, RequestReason::AppearanceChanged);
                    }
                    _ => debug!(dark, "appearance changed without an active theme"),
                }
            }
        }
    }

    fn issue(&mut self, track: ActiveTrack, reason: RequestReason) {
        let request = self.machine.issue(track, self.is_dark, reason);
        let job = match (&self.palettes, &request.track.art) {
            (Some(palettes), _) => Job::Derive(Arc::clone(palettes)),
            (None, ArtSource::Seed(seed)) => Job::Seed(*seed),
            (None, ArtSource::Image(image)) => {
                self.decode_runs += 1;
                Job::Decode(image.clone())
            }
        };
        debug!(
            seq = request.seq,
            track_id = %request.track.track_id,
            dark = request.is_dark,
            ?reason,
            "theme request issued"
        );

        let decoder = Arc::clone(&self.decoder);
        let settings = self.settings;
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let ThemeRequest {
                seq,
                track,
                is_dark,
                issued_at,
                ..
            } = request;
            let outcome = execute(job, is_dark, decoder, settings).await;
            let _ = completions.send(Completion {
                seq,
                track,
                elapsed: issued_at.elapsed(),
                outcome,
            });
        });
    }

    fn handle_completion(&mut self, done: Completion) {
        let Completion {
            seq,
            track,
            elapsed,
            outcome,
        } = done;

        match self.machine.resolve(seq, outcome.is_ok()) {
            Resolution::Apply { seq } => {
                let Ok(derived) = outcome else { return };
                info!(
                    seq,
                    track_id = %track.track_id,
                    seed = %derived.palettes.seed(),
                    dark = self.is_dark,
                    ?elapsed,
                    "applying theme"
                );
                self.presenter.apply_scheme(&derived.scheme);
                self.palettes = Some(derived.palettes);
            }
            Resolution::Reset { seq } => {
                if let Err(error) = &outcome {
                    warn!(
                        seq,
                        track_id = %track.track_id,
                        %error,
                        "theme request failed; resetting scheme"
                    );
                }
                self.palettes = None;
                self.presenter.apply_scheme(&ColorScheme::empty());
            }
            Resolution::Stale { seq, latest } => {
                self.discarded += 1;
                debug!(seq, latest, ?elapsed, "discarding superseded theme result");
            }
        }
    }
}

async fn execute(
    job: Job,
    is_dark: bool,
    decoder: Arc<dyn ImageDecoder>,
    settings: ThemeSettings,
) -> Result<Derived, ThemeError> {
    let pixels = match job {
        Job::Derive(palettes) => {
            return blocking(move || Derived {
                scheme: derive_scheme(&palettes, is_dark),
                palettes,
            })
            .await;
        }
        Job::Seed(seed) => {
            let seed = checked_seed(seed, settings.fallback_seed);
            return blocking(move || derive_from_seed(seed, is_dark)).await;
        }
        Job::Decode(image) => decoder.decode(image).await?,
    };

    blocking(move || {
        let seed = extract_seed_color(&pixels, &settings.quantizer, settings.fallback_seed);
        derive_from_seed(checked_seed(seed, settings.fallback_seed), is_dark)
    })
    .await
}

fn derive_from_seed(seed: Argb, is_dark: bool) -> Derived {
    let palettes = Arc::new(build_palettes(seed));
    Derived {
        scheme: derive_scheme(&palettes, is_dark),
        palettes,
    }
}

fn checked_seed(seed: Argb, fallback: Argb) -> Argb {
    validate_seed(seed).unwrap_or_else(|error| {
        warn!(%error, %fallback, "substituting fallback seed");
        fallback
    })
}

async fn blocking<T, F>(work: F) -> Result<T, ThemeError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|err| ThemeError::Worker(err.to_string()))
}
