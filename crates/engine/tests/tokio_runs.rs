use std::time::Duration;

use engine::{Command, Event, Phase, RunId, Studio, StudioConfig, TimerSignal};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;

const VALID_URL: &str = "https://www.youtube.com/watch?v=abc";

type TokioStudio = Studio<engine::TokioScheduler, engine::RandomIncrements<rand::rngs::StdRng>>;

fn submit(studio: &mut TokioStudio, url: &str) {
    studio
        .handle_command(Command::Submit {
            url: url.to_owned(),
        })
        .expect("valid url");
}

async fn drive_until_complete(
    studio: &mut TokioStudio,
    signal_rx: &mut UnboundedReceiver<TimerSignal>,
) -> (RunId, Vec<Event>) {
    let mut events = Vec::new();
    while let Some(signal) = signal_rx.recv().await {
        let emitted = studio
            .handle_command(Command::Timer(signal))
            .expect("timer commands never fail");
        for event in emitted {
            if let Event::RunCompleted { run, .. } = event {
                events.push(event);
                return (run, events);
            }
            events.push(event);
        }
    }
    panic!("signal channel closed before the run completed");
}

#[tokio::test(start_paused = true)]
async fn run_completes_after_completion_delay_with_monotonic_progress() {
    let (mut studio, mut signal_rx) =
        Studio::with_tokio(StudioConfig::default(), Handle::current()).expect("default config");
    let started = tokio::time::Instant::now();
    submit(&mut studio, VALID_URL);

    let (run, events) = drive_until_complete(&mut studio, &mut signal_rx).await;

    assert_eq!(run, 1);
    assert!(started.elapsed() >= Duration::from_millis(2_500));
    let progress: Vec<f64> = events
        .iter()
        .filter_map(|event| match event {
            Event::ProgressChanged { progress, .. } => Some(*progress),
            _ => None,
        })
        .collect();
    assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]), "{progress:?}");
    assert_eq!(progress.last(), Some(&100.0));
    assert_eq!(studio.phase(), Phase::Ready);
    assert_eq!(studio.shorts().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn resubmission_only_applies_the_newest_run() {
    let (mut studio, mut signal_rx) =
        Studio::with_tokio(StudioConfig::default(), Handle::current()).expect("default config");
    submit(&mut studio, VALID_URL);

    tokio::time::sleep(Duration::from_millis(2_000)).await;
    submit(&mut studio, "https://youtu.be/next");
    tokio::time::sleep(Duration::from_millis(1_000)).await;

    let (run, events) = drive_until_complete(&mut studio, &mut signal_rx).await;

    assert_eq!(run, 2);
    assert!(events.iter().all(|event| match event {
        Event::ProgressChanged { run, .. } | Event::RunCompleted { run, .. } => *run == 2,
        _ => true,
    }));
    assert_eq!(studio.phase(), Phase::Ready);
}

#[tokio::test(start_paused = true)]
async fn teardown_stops_further_signals() {
    let (mut studio, mut signal_rx) =
        Studio::with_tokio(StudioConfig::default(), Handle::current()).expect("default config");
    submit(&mut studio, VALID_URL);

    studio
        .handle_command(Command::Teardown)
        .expect("teardown");
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert!(signal_rx.try_recv().is_err());
    assert_eq!(studio.phase(), Phase::Idle);
}
