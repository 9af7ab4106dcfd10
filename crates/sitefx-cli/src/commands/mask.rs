use anyhow::Result;

use sitefx_core::frame::{FrameClock, SteppedClock};
use sitefx_core::headless::HeadlessMask;
use sitefx_core::transition::{MaskDirection, MaskFrame, TransitionMaskAnimator};
use sitefx_core::AppConfig;

pub async fn run(
    config: &AppConfig,
    direction: MaskDirection,
    width: f64,
    fps: u32,
    json: bool,
) -> Result<()> {
    let mut animator =
        TransitionMaskAnimator::new(HeadlessMask::default(), config.transition.clone(), width);
    let clock = SteppedClock::at_fps(fps);
    let profile = animator.profile();

    if !json {
        println!(
            "{:?} at {}px ({:?} profile: {}ms, pair delay {}ms)\n",
            direction,
            width,
            animator.viewport_class(),
            profile.duration_ms,
            profile.pair_delay_ms
        );
    }

    let animation = animator.begin(direction, clock.next_frame().await);
    let mut frames = 0;
    loop {
        let frame = animation.sample(clock.next_frame().await);
        animator.apply(&frame);
        frames += 1;

        if json {
            println!("{}", serde_json::to_string(&frame)?);
        } else {
            print_frame(&frame);
        }
        if frame.complete {
            break;
        }
    }
    animator.finish(direction);

    if !json {
        println!(
            "\n{} frames, mask {:?}",
            frames,
            animator.mask().phase
        );
    }

    Ok(())
}

fn print_frame(frame: &MaskFrame) {
    let points: Vec<String> = frame
        .points
        .iter()
        .map(|p| format!("({:>6.2},{:>6.2})", p.x, p.y))
        .collect();
    println!("{:>8.1}ms  {}", frame.elapsed_ms, points.join(" "));
}
