use anyhow::{Context, Result};
use url::Url;

use sitefx_core::frame::{FrameClock, IntervalClock, SteppedClock};
use sitefx_core::headless::{HeadlessHost, HeadlessMask};
use sitefx_core::navigation::{HttpContentSource, NavigationOutcome, Navigator};
use sitefx_core::transition::TransitionMaskAnimator;
use sitefx_core::AppConfig;

/// Viewport width assumed for the headless page
const VIEWPORT_WIDTH: f64 = 1440.0;

pub async fn run(config: &AppConfig, from: &str, to: &str, realtime: bool) -> Result<()> {
    let from = Url::parse(from).with_context(|| format!("invalid url: {}", from))?;
    let to = Url::parse(to).with_context(|| format!("invalid url: {}", to))?;

    if realtime {
        navigate(config, from, to, IntervalClock::new(60)).await
    } else {
        navigate(config, from, to, SteppedClock::at_fps(60)).await
    }
}

async fn navigate<C: FrameClock>(config: &AppConfig, from: Url, to: Url, clock: C) -> Result<()> {
    let source = HttpContentSource::new(config)?;
    let animator = TransitionMaskAnimator::new(
        HeadlessMask::default(),
        config.transition.clone(),
        VIEWPORT_WIDTH,
    );
    let navigator = Navigator::new(source, HeadlessHost::new(), animator, clock, from);

    let outcome = navigator.navigate(to.clone(), true).await;
    let (_, host, animator, _) = navigator.into_parts();

    match outcome {
        NavigationOutcome::Completed => {
            println!("Navigated to {}", to);
            println!("  title: {}", host.title);
            println!("  body:  {} bytes", host.body.len());
            println!("  history: {:?}", host.history.iter().map(Url::as_str).collect::<Vec<_>>());
            println!(
                "  mask: {:?} after {} vertex writes",
                animator.mask().phase,
                animator.mask().vertex_writes
            );
        }
        NavigationOutcome::AlreadyCurrent => println!("Already showing {}", to),
        NavigationOutcome::Ignored => println!("Another navigation was running"),
        NavigationOutcome::FellBack => {
            println!("Transition failed; a browser would now load {} directly", to);
        }
    }

    Ok(())
}
