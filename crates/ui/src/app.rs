use engine::{
    CarouselKey, Command, EditingUpdate, Event, ShortLength, StudioConfig, StudioSnapshot,
    TransitionStyle,
};
use iced::keyboard::{self, Key, key::Named};
use iced::widget::{column, container, scrollable, text};
use iced::{Element, Length, Subscription, Task};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::bridge::{BridgeEvent, StudioCommandSender, studio_subscription};
use crate::widgets::{carousel, generator};

/// UI messages handled by the iced app update loop.
#[derive(Debug, Clone)]
pub enum Message {
    UrlChanged(String),
    GeneratePressed,
    ShortLengthSelected(ShortLength),
    TransitionSelected(TransitionStyle),
    HighlightToggled(String),
    NextPressed,
    PreviousPressed,
    CarouselFocused,
    KeyPressed(CarouselKey),
    EditingChanged(String, EditingUpdate),
    ShareClicked(&'static str),
    Bridge(BridgeEvent),
}

/// Root UI state.
pub struct AppState {
    config: StudioConfig,
    studio_tx: Option<StudioCommandSender>,
    snapshot: Option<StudioSnapshot>,
    url_input: String,
    error: Option<String>,
    carousel_focused: bool,
    status: String,
}

impl AppState {
    /// Boots the app; the studio worker starts with the bridge subscription.
    pub fn boot(config: StudioConfig) -> (Self, Task<Message>) {
        (Self::with_config(config), Task::none())
    }

    fn with_config(config: StudioConfig) -> Self {
        Self {
            config,
            studio_tx: None,
            snapshot: None,
            url_input: String::new(),
            error: None,
            carousel_focused: false,
            status: String::from("starting studio"),
        }
    }

    /// Handles one UI message.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::UrlChanged(url) => {
                self.carousel_focused = false;
                self.url_input = url.clone();
                self.send_command(Command::SetInputUrl { url });
            }
            Message::GeneratePressed => {
                self.carousel_focused = false;
                if self.is_processing() {
                    debug!("generate ignored while a run is in flight");
                } else {
                    self.send_command(Command::Submit {
                        url: self.url_input.clone(),
                    });
                }
            }
            Message::ShortLengthSelected(length) => {
                self.carousel_focused = false;
                self.send_command(Command::SetShortLength { length });
            }
            Message::TransitionSelected(style) => {
                self.carousel_focused = false;
                self.send_command(Command::SetTransition { style });
            }
            Message::HighlightToggled(segment_id) => {
                self.carousel_focused = false;
                self.send_command(Command::ToggleHighlight { segment_id });
            }
            Message::NextPressed => {
                self.carousel_focused = true;
                self.send_command(Command::NextClip);
            }
            Message::PreviousPressed => {
                self.carousel_focused = true;
                self.send_command(Command::PreviousClip);
            }
            Message::CarouselFocused => {
                self.carousel_focused = true;
            }
            Message::KeyPressed(key) => {
                if self.carousel_focused {
                    self.send_command(Command::CarouselKey { key });
                }
            }
            Message::EditingChanged(clip_id, update) => {
                if !update.is_empty() {
                    self.send_command(Command::UpdateEditing { clip_id, update });
                }
            }
            Message::ShareClicked(destination) => {
                if let Err(err) = open::that(destination) {
                    warn!(%err, destination, "failed to open share destination");
                    self.status = format!("could not open {destination}");
                }
            }
            Message::Bridge(BridgeEvent::Ready(sender)) => {
                self.studio_tx = Some(sender);
                self.status = String::from("studio ready");
            }
            Message::Bridge(BridgeEvent::Event(event)) => {
                self.apply_studio_event(event);
            }
            Message::Bridge(BridgeEvent::Disconnected) => {
                self.status = String::from("studio event channel closed");
                self.studio_tx = None;
            }
        }

        Task::none()
    }

    fn is_processing(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(StudioSnapshot::is_processing)
    }

    fn send_command(&mut self, command: Command) -> bool {
        let Some(sender) = &self.studio_tx else {
            self.status = String::from("studio is not ready");
            return false;
        };
        match sender.try_send(command) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.status = String::from("studio command queue is full");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.status = String::from("studio command channel closed");
                self.studio_tx = None;
                false
            }
        }
    }

    fn apply_studio_event(&mut self, event: Event) {
        match event {
            Event::StudioChanged(snapshot) => {
                self.error = snapshot.last_error.clone();
                self.status = snapshot.status_label.to_owned();
                self.snapshot = Some(snapshot);
            }
            Event::ProgressChanged { progress, .. } => {
                if let Some(snapshot) = self.snapshot.as_mut() {
                    snapshot.progress = progress;
                }
            }
            Event::RunCompleted { run, clip_count } => {
                debug!(run, clip_count, "run completed");
            }
            Event::ActiveClipChanged { index } => {
                if let Some(snapshot) = self.snapshot.as_mut() {
                    snapshot.active_index = index;
                }
            }
            Event::EditingChanged {
                clip_id,
                state,
                bounds,
            } => {
                let clip = self
                    .snapshot
                    .as_mut()
                    .and_then(|snapshot| snapshot.clips.iter_mut().find(|clip| clip.short.id == clip_id));
                if let Some(clip) = clip {
                    clip.editing = state;
                    clip.bounds = bounds;
                }
            }
            Event::Error(error) => {
                self.status = format!("error: {}", error.message);
                self.error = Some(error.message);
            }
        }
    }

    /// Renders the UI tree.
    pub fn view(&self) -> Element<'_, Message> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            let content = column![
                generator::header(),
                generator::form(&self.url_input, false, self.error.as_deref()),
                text(format!("Status: {}", self.status)),
            ]
            .spacing(16)
            .padding(24);
            return container(content).width(Length::Fill).into();
        };

        let content = column![
            generator::header(),
            generator::form(&self.url_input, snapshot.is_processing(), self.error.as_deref()),
            generator::options(snapshot),
            generator::highlights(snapshot),
            generator::progress(snapshot),
            carousel::view(snapshot, self.carousel_focused),
            text(format!("Status: {}", self.status)),
        ]
        .spacing(20)
        .padding(24);

        scrollable(content).height(Length::Fill).into()
    }

    /// Subscribes to studio bridge events and carousel key presses.
    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            studio_subscription(self.config.clone()).map(Message::Bridge),
            keyboard::on_key_press(map_key_press),
        ])
    }

    #[cfg(test)]
    fn from_sender_for_test(studio_tx: StudioCommandSender) -> Self {
        let mut app = Self::with_config(StudioConfig::default());
        app.studio_tx = Some(studio_tx);
        app.status = String::from("idle");
        app
    }
}

fn map_key_press(key: Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    let key = match key.as_ref() {
        Key::Named(Named::ArrowLeft) => CarouselKey::ArrowLeft,
        Key::Named(Named::ArrowRight) => CarouselKey::ArrowRight,
        _ => return None,
    };
    Some(Message::KeyPressed(key))
}

#[cfg(test)]
mod tests {
    use engine::{
        CarouselKey, Command, EditingUpdate, Event, FixedIncrements, ManualScheduler, Phase,
        ShortLength, Studio, StudioErrorEvent, StudioErrorKind, TransitionStyle,
    };
    use iced::keyboard::{Key, Modifiers, key::Named};
    use tokio::sync::mpsc;
    use tokio::sync::mpsc::error::TryRecvError;

    use crate::bridge::BridgeEvent;

    use super::{AppState, Message, map_key_press};

    fn app_with_channel() -> (AppState, mpsc::Receiver<Command>) {
        let (command_tx, command_rx) = mpsc::channel(8);
        (AppState::from_sender_for_test(command_tx), command_rx)
    }

    fn snapshot_event(phase: Phase) -> Event {
        let mut studio = Studio::new(ManualScheduler::new(), FixedIncrements::new(vec![10.0]));
        if phase == Phase::Processing {
            studio
                .handle_command(Command::Submit {
                    url: "https://youtu.be/abc".to_owned(),
                })
                .expect("valid url");
        }
        Event::StudioChanged(studio.snapshot())
    }

    #[test]
    fn generate_button_dispatches_submit_with_typed_url() {
        let (mut app, mut command_rx) = app_with_channel();

        let _ = app.update(Message::UrlChanged("https://youtu.be/abc".to_owned()));
        let _ = app.update(Message::GeneratePressed);

        assert_eq!(
            command_rx.try_recv().expect("set input command"),
            Command::SetInputUrl {
                url: "https://youtu.be/abc".to_owned()
            }
        );
        assert_eq!(
            command_rx.try_recv().expect("submit command"),
            Command::Submit {
                url: "https://youtu.be/abc".to_owned()
            }
        );
    }

    #[test]
    fn generate_is_ignored_while_processing() {
        let (mut app, mut command_rx) = app_with_channel();
        let _ = app.update(Message::Bridge(BridgeEvent::Event(snapshot_event(
            Phase::Processing,
        ))));

        let _ = app.update(Message::GeneratePressed);

        assert!(matches!(command_rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn arrow_keys_only_reach_the_studio_when_carousel_is_focused() {
        let (mut app, mut command_rx) = app_with_channel();

        let _ = app.update(Message::KeyPressed(CarouselKey::ArrowRight));
        assert!(matches!(command_rx.try_recv(), Err(TryRecvError::Empty)));

        let _ = app.update(Message::CarouselFocused);
        let _ = app.update(Message::KeyPressed(CarouselKey::ArrowRight));
        assert_eq!(
            command_rx.try_recv().expect("carousel key command"),
            Command::CarouselKey {
                key: CarouselKey::ArrowRight
            }
        );
    }

    #[test]
    fn interaction_outside_carousel_drops_arrow_key_focus() {
        let outside = [
            Message::HighlightToggled("segment-3".to_owned()),
            Message::ShortLengthSelected(ShortLength::Sixty),
            Message::TransitionSelected(TransitionStyle::CinematicZoom),
            Message::UrlChanged("https://youtu.be/abc".to_owned()),
        ];

        for message in outside {
            let (mut app, mut command_rx) = app_with_channel();
            let _ = app.update(Message::CarouselFocused);
            let _ = app.update(message.clone());
            let _ = command_rx.try_recv().expect("outside command");

            let _ = app.update(Message::KeyPressed(CarouselKey::ArrowRight));

            assert!(
                matches!(command_rx.try_recv(), Err(TryRecvError::Empty)),
                "arrow key still navigated after {message:?}"
            );
        }
    }

    #[test]
    fn completed_run_status_follows_snapshot_label() {
        let (mut app, _command_rx) = app_with_channel();

        let _ = app.update(Message::Bridge(BridgeEvent::Event(Event::RunCompleted {
            run: 1,
            clip_count: 3,
        })));
        let _ = app.update(Message::Bridge(BridgeEvent::Event(snapshot_event(Phase::Idle))));

        assert_eq!(app.status, "Awaiting input");
    }

    #[test]
    fn key_press_mapping_keeps_only_arrow_keys() {
        assert!(matches!(
            map_key_press(Key::Named(Named::ArrowLeft), Modifiers::default()),
            Some(Message::KeyPressed(CarouselKey::ArrowLeft))
        ));
        assert!(map_key_press(Key::Named(Named::Enter), Modifiers::default()).is_none());
    }

    #[test]
    fn empty_editing_update_is_not_sent() {
        let (mut app, mut command_rx) = app_with_channel();

        let _ = app.update(Message::EditingChanged(
            "short-segment-1".to_owned(),
            EditingUpdate::default(),
        ));
        assert!(matches!(command_rx.try_recv(), Err(TryRecvError::Empty)));

        let _ = app.update(Message::EditingChanged(
            "short-segment-1".to_owned(),
            EditingUpdate::default().sound_level(40),
        ));
        assert!(matches!(
            command_rx.try_recv(),
            Ok(Command::UpdateEditing { ref clip_id, .. }) if clip_id == "short-segment-1"
        ));
    }

    #[test]
    fn error_event_is_shown_inline() {
        let (mut app, _command_rx) = app_with_channel();

        let _ = app.update(Message::Bridge(BridgeEvent::Event(Event::Error(
            StudioErrorEvent {
                kind: StudioErrorKind::EmptyUrl,
                message: "Paste a YouTube URL to begin.".to_owned(),
            },
        ))));

        assert_eq!(app.error.as_deref(), Some("Paste a YouTube URL to begin."));
    }

    #[test]
    fn progress_and_active_index_events_patch_the_snapshot() {
        let (mut app, _command_rx) = app_with_channel();
        let _ = app.update(Message::Bridge(BridgeEvent::Event(snapshot_event(
            Phase::Processing,
        ))));

        let _ = app.update(Message::Bridge(BridgeEvent::Event(Event::ProgressChanged {
            run: 1,
            progress: 42.5,
        })));
        let _ = app.update(Message::Bridge(BridgeEvent::Event(Event::ActiveClipChanged {
            index: 2,
        })));

        let snapshot = app.snapshot.as_ref().expect("snapshot");
        assert_eq!(snapshot.progress, 42.5);
        assert_eq!(snapshot.active_index, 2);
    }

    #[test]
    fn commands_without_bridge_report_not_ready() {
        let mut app = AppState::with_config(Default::default());

        let _ = app.update(Message::NextPressed);

        assert_eq!(app.status, "studio is not ready");
    }
}
