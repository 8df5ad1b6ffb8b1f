use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use album_theme_back::{
    color::{
        Argb,
        quantizer::QuantizerOptions,
        scheme::{ColorScheme, Role},
    },
    decode::{DecodeError, ImageDecoder, ImageReference, PixelBuffer},
    state::SseHub,
    theme::{
        self, ActiveTrack, ArtSource, ControllerStatus, PresentationLayer, SchemePresenter,
        ThemeHandle, ThemePhase, ThemeSettings,
    },
};
use futures::future::BoxFuture;
use tokio::{sync::Semaphore, time::timeout};

const WAIT: Duration = Duration::from_secs(5);
const PURPLE: [u8; 4] = [0x62, 0x00, 0xEE, 0xFF];
const RED: [u8; 4] = [0xE0, 0x20, 0x20, 0xFF];

#[derive(Clone)]
struct Artwork {
    rgba: [u8; 4],
    gate: Option<Arc<Semaphore>>,
    fail: bool,
}

/// Decoder returning solid images per path, optionally held back or failing.
#[derive(Default)]
struct FakeDecoder {
    artwork: HashMap<PathBuf, Artwork>,
    calls: Arc<AtomicUsize>,
}

impl FakeDecoder {
    fn with(mut self, path: &str, rgba: [u8; 4]) -> Self {
        self.artwork.insert(
            path.into(),
            Artwork {
                rgba,
                gate: None,
                fail: false,
            },
        );
        self
    }

    fn gated(mut self, path: &str, rgba: [u8; 4]) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.artwork.insert(
            path.into(),
            Artwork {
                rgba,
                gate: Some(gate.clone()),
                fail: false,
            },
        );
        (self, gate)
    }

    fn failing(mut self, path: &str) -> Self {
        self.artwork.insert(
            path.into(),
            Artwork {
                rgba: [0; 4],
                gate: None,
                fail: true,
            },
        );
        self
    }
}

impl ImageDecoder for FakeDecoder {
    fn decode(&self, image: ImageReference) -> BoxFuture<'static, Result<PixelBuffer, DecodeError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let artwork = image
            .as_path()
            .and_then(|path| self.artwork.get(path))
            .cloned();
        Box::pin(async move {
            let Some(artwork) = artwork else {
                return Err(DecodeError::Rejected("unknown artwork".into()));
            };
            if let Some(gate) = artwork.gate {
                let _permit = gate
                    .acquire()
                    .await
                    .map_err(|e| DecodeError::Join(e.to_string()))?;
            }
            if artwork.fail {
                return Err(DecodeError::Empty);
            }
            PixelBuffer::solid(8, 8, artwork.rgba)
        })
    }
}

/// Presenter remembering every scheme it was handed.
#[derive(Default)]
struct RecordingPresenter {
    applied: Mutex<Vec<ColorScheme>>,
}

impl RecordingPresenter {
    fn applied(&self) -> Vec<ColorScheme> {
        self.applied.lock().unwrap().clone()
    }

    fn last(&self) -> Option<ColorScheme> {
        self.applied().last().cloned()
    }
}

impl SchemePresenter for RecordingPresenter {
    fn apply_scheme(&self, scheme: &ColorScheme) {
        self.applied.lock().unwrap().push(scheme.clone());
    }
}

fn settings() -> ThemeSettings {
    ThemeSettings {
        quantizer: QuantizerOptions {
            sample_step: 1,
            ..QuantizerOptions::default()
        },
        fallback_seed: Argb(0xFF62_00EE),
        initial_dark: false,
    }
}

fn track(id: &str, path: &str) -> ActiveTrack {
    ActiveTrack {
        track_id: id.into(),
        art: ArtSource::Image(ImageReference::path(path)),
    }
}

async fn wait_until(handle: &ThemeHandle, condition: impl FnMut(&ControllerStatus) -> bool) {
    let mut status = handle.subscribe();
    timeout(WAIT, status.wait_for(condition))
        .await
        .expect("controller status did not reach the expected state")
        .expect("controller stopped");
}

fn start(decoder: FakeDecoder) -> (ThemeHandle, Arc<RecordingPresenter>, Arc<AtomicUsize>) {
    let calls = decoder.calls.clone();
    let presenter = Arc::new(RecordingPresenter::default());
    let (handle, _join) = theme::spawn(Arc::new(decoder), presenter.clone(), settings());
    (handle, presenter, calls)
}

#[tokio::test]
async fn later_request_wins_when_it_completes_first() {
    let (decoder, slow_gate) = FakeDecoder::default()
        .with("fast.png", PURPLE)
        .gated("slow.png", RED);
    let (handle, presenter, _) = start(decoder);

    handle.set_track(Some(track("r1", "slow.png"))).await.unwrap();
    handle.set_track(Some(track("r2", "fast.png"))).await.unwrap();
    wait_until(&handle, |s| s.last_applied_seq == Some(2)).await;

    slow_gate.add_permits(1);
    wait_until(&handle, |s| s.discarded == 1).await;

    let applied = presenter.applied();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].get(Role::Primary), Some(Argb(0xFF6D_23F8)));
    assert_eq!(handle.status().phase, ThemePhase::Applied { seq: 2 });
}

#[tokio::test]
async fn clearing_the_track_resets_immediately_and_drops_late_results() {
    let (decoder, gate) = FakeDecoder::default().gated("slow.png", PURPLE);
    let (handle, presenter, _) = start(decoder);

    handle.set_track(Some(track("r1", "slow.png"))).await.unwrap();
    wait_until(&handle, |s| s.phase == ThemePhase::Loading { seq: 1 }).await;

    handle.set_track(None).await.unwrap();
    wait_until(&handle, |s| s.latest_seq == 2 && s.phase == ThemePhase::Idle).await;
    assert_eq!(presenter.applied(), vec![ColorScheme::empty()]);

    gate.add_permits(1);
    wait_until(&handle, |s| s.discarded == 1).await;
    assert_eq!(presenter.applied(), vec![ColorScheme::empty()]);
    assert_eq!(handle.status().phase, ThemePhase::Idle);
}

#[tokio::test]
async fn decode_failure_resets_without_stopping_the_controller() {
    let decoder = FakeDecoder::default()
        .failing("broken.png")
        .with("ok.png", PURPLE);
    let (handle, presenter, _) = start(decoder);

    handle.set_track(Some(track("bad", "broken.png"))).await.unwrap();
    wait_until(&handle, |s| s.latest_seq == 1 && s.phase == ThemePhase::Idle).await;
    assert_eq!(presenter.last(), Some(ColorScheme::empty()));
    assert_eq!(handle.status().last_applied_seq, None);

    handle.set_track(Some(track("good", "ok.png"))).await.unwrap();
    wait_until(&handle, |s| s.last_applied_seq == Some(2)).await;
    assert!(!handle.is_closed());
    assert_eq!(
        presenter.last().and_then(|scheme| scheme.get(Role::Primary)),
        Some(Argb(0xFF6D_23F8))
    );
}

#[tokio::test]
async fn dark_mode_flip_rederives_without_decoding_again() {
    let decoder = FakeDecoder::default().with("cover.png", PURPLE);
    let (handle, presenter, calls) = start(decoder);

    handle.set_track(Some(track("t", "cover.png"))).await.unwrap();
    wait_until(&handle, |s| s.last_applied_seq == Some(1)).await;

    handle.set_dark_mode(true).await.unwrap();
    wait_until(&handle, |s| s.last_applied_seq == Some(2)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(handle.status().decode_runs, 1);
    assert!(handle.status().dark);

    let applied = presenter.applied();
    assert_eq!(applied.len(), 2);
    assert_eq!(applied[0].get(Role::Primary), Some(Argb(0xFF6D_23F8)));
    assert_eq!(applied[1].get(Role::Primary), Some(Argb(0xFFD0_BCFF)));
    assert_eq!(applied[1].get(Role::Surface), Some(Argb(0xFF1C_1B1E)));
}

#[tokio::test]
async fn dark_mode_flip_while_loading_supersedes_the_pending_request() {
    let (decoder, gate) = FakeDecoder::default().gated("cover.png", PURPLE);
    let (handle, presenter, calls) = start(decoder);

    handle.set_track(Some(track("t", "cover.png"))).await.unwrap();
    wait_until(&handle, |s| s.phase == ThemePhase::Loading { seq: 1 }).await;

    handle.set_dark_mode(true).await.unwrap();
    wait_until(&handle, |s| s.phase == ThemePhase::Loading { seq: 2 }).await;

    gate.add_permits(2);
    wait_until(&handle, |s| s.last_applied_seq == Some(2) && s.discarded == 1).await;

    let applied = presenter.applied();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].get(Role::Primary), Some(Argb(0xFFD0_BCFF)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(handle.status().phase, ThemePhase::Applied { seq: 2 });
}

#[tokio::test]
async fn repeated_signals_are_ignored() {
    let decoder = FakeDecoder::default().with("cover.png", PURPLE);
    let (handle, presenter, calls) = start(decoder);

    handle.set_track(Some(track("t", "cover.png"))).await.unwrap();
    handle.set_track(Some(track("t", "cover.png"))).await.unwrap();
    handle.set_dark_mode(false).await.unwrap();
    wait_until(&handle, |s| s.last_applied_seq == Some(1)).await;

    assert_eq!(handle.status().latest_seq, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(presenter.applied().len(), 1);
}

#[tokio::test]
async fn precomputed_seed_skips_the_decoder() {
    let (handle, presenter, calls) = start(FakeDecoder::default());

    handle
        .set_track(Some(ActiveTrack {
            track_id: "seeded".into(),
            art: ArtSource::Seed(Argb(0xFF62_00EE)),
        }))
        .await
        .unwrap();
    wait_until(&handle, |s| s.last_applied_seq == Some(1)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(handle.status().decode_runs, 0);
    assert_eq!(
        presenter.last().and_then(|scheme| scheme.get(Role::OnPrimaryContainer)),
        Some(Argb(0xFF21_005E))
    );
}

#[tokio::test]
async fn solid_purple_artwork_reaches_the_presentation_layer() {
    let hub = SseHub::new(16);
    let mut events = hub.subscribe();
    let presentation = Arc::new(PresentationLayer::new("/player", hub));
    let decoder = FakeDecoder::default().with("cover.png", PURPLE);
    let (handle, _join) = theme::spawn(Arc::new(decoder), presentation.clone(), settings());

    handle.set_track(Some(track("a", "cover.png"))).await.unwrap();
    wait_until(&handle, |s| s.last_applied_seq == Some(1)).await;

    let state = presentation.snapshot();
    assert_eq!(state.variables["primary"], "#6D23F8");
    assert_eq!(state.variables["primaryRgb"], "109,35,248");
    assert_eq!(state.title_bar_accent.as_deref(), Some("#FFFBFE"));
    let event = timeout(WAIT, events.recv()).await.unwrap().unwrap();
    assert_eq!(event.event.as_deref(), Some("theme.applied"));

    handle.set_track(None).await.unwrap();
    wait_until(&handle, |s| s.phase == ThemePhase::Idle).await;
    let state = presentation.snapshot();
    assert!(state.variables.values().all(String::is_empty));
    assert_eq!(state.title_bar_accent, None);
    let event = timeout(WAIT, events.recv()).await.unwrap().unwrap();
    assert_eq!(event.event.as_deref(), Some("theme.reset"));
}
