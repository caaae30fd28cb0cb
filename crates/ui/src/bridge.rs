use std::sync::mpsc;
use std::thread;

use engine::{
    Command, Event, IncrementSource, Scheduler, Studio, StudioConfig, StudioErrorEvent,
    TimerSignal,
};
use iced::futures::{SinkExt, StreamExt, channel::mpsc as futures_mpsc, executor};
use iced::{Subscription, stream};
use tokio::runtime::Builder;
use tokio::sync::mpsc as tokio_mpsc;
use tracing::{error, info};

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const SUBSCRIPTION_CHANNEL_CAPACITY: usize = 32;

/// Sender used by the UI thread to dispatch commands to the studio worker.
pub type StudioCommandSender = tokio_mpsc::Sender<Command>;

/// Receiver used by the UI thread to read events emitted by the studio worker.
pub type StudioEventReceiver = mpsc::Receiver<Event>;

/// Messages emitted by the studio bridge subscription.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    Ready(StudioCommandSender),
    Event(Event),
    Disconnected,
}

/// Builds a subscription that starts the studio bridge and forwards events.
pub fn studio_subscription(config: StudioConfig) -> Subscription<BridgeEvent> {
    Subscription::run_with_id(
        "studio-bridge",
        bridge_worker_stream_with(move || spawn_studio_bridge(config)),
    )
}

fn bridge_worker_stream_with<F>(spawn_bridge: F) -> impl iced::futures::Stream<Item = BridgeEvent>
where
    F: FnOnce() -> (StudioCommandSender, StudioEventReceiver) + Send + 'static,
{
    stream::channel(
        SUBSCRIPTION_CHANNEL_CAPACITY,
        move |mut output| async move {
            let (studio_tx, studio_rx) = spawn_bridge();
            let _ = output.send(BridgeEvent::Ready(studio_tx)).await;

            let (forward_tx, mut forward_rx) =
                futures_mpsc::channel::<BridgeEvent>(SUBSCRIPTION_CHANNEL_CAPACITY);

            thread::spawn(move || {
                let mut forward_tx = forward_tx;
                while let Ok(event) = studio_rx.recv() {
                    if executor::block_on(forward_tx.send(BridgeEvent::Event(event))).is_err() {
                        return;
                    }
                }
                let _ = executor::block_on(forward_tx.send(BridgeEvent::Disconnected));
            });

            while let Some(event) = forward_rx.next().await {
                if output.send(event).await.is_err() {
                    break;
                }
            }
        },
    )
}

/// Spawns the worker thread that owns the studio and its timers.
///
/// The worker runs its own single-threaded tokio runtime, so commands and
/// fired timers are applied one at a time. The first event is always a
/// snapshot of the idle studio. Dropping every command sender
/// tears the studio down and closes the event channel.
pub fn spawn_studio_bridge(config: StudioConfig) -> (StudioCommandSender, StudioEventReceiver) {
    let (command_tx, command_rx) = tokio_mpsc::channel::<Command>(COMMAND_CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel::<Event>();

    thread::spawn(move || {
        let runtime = match Builder::new_current_thread().enable_time().build() {
            Ok(runtime) => runtime,
            Err(err) => {
                error!(%err, "studio runtime failed to start");
                return;
            }
        };

        runtime.block_on(async move {
            match Studio::with_tokio(config, tokio::runtime::Handle::current()) {
                Ok((studio, signal_rx)) => run_worker(studio, command_rx, signal_rx, event_tx).await,
                Err(err) => {
                    let _ = event_tx.send(Event::Error(StudioErrorEvent::from_error(&err)));
                }
            }
        });
    });

    (command_tx, event_rx)
}

async fn run_worker<S, I>(
    mut studio: Studio<S, I>,
    mut command_rx: tokio_mpsc::Receiver<Command>,
    mut signal_rx: tokio_mpsc::UnboundedReceiver<TimerSignal>,
    event_tx: mpsc::Sender<Event>,
) where
    S: Scheduler,
    I: IncrementSource,
{
    info!("studio worker started");
    if event_tx.send(Event::StudioChanged(studio.snapshot())).is_err() {
        return;
    }
    loop {
        let command = tokio::select! {
            command = command_rx.recv() => match command {
                Some(command) => command,
                None => break,
            },
            Some(signal) = signal_rx.recv() => Command::Timer(signal),
        };
        if !dispatch(&mut studio, command, &event_tx) {
            break;
        }
    }

    let _ = studio.handle_command(Command::Teardown);
    info!("studio worker stopped");
}

fn dispatch<S, I>(studio: &mut Studio<S, I>, command: Command, event_tx: &mpsc::Sender<Event>) -> bool
where
    S: Scheduler,
    I: IncrementSource,
{
    let events = match studio.handle_command(command) {
        Ok(events) => events,
        Err(err) => vec![Event::Error(StudioErrorEvent::from_error(&err))],
    };
    events.into_iter().all(|event| event_tx.send(event).is_ok())
}
