use scrollable::{QueueName, ScrollConfig, ScrollEventKind, Scroller, Size};
use scrollable_adapter::{Easing, MemoryDom, TweenAnimator, json};
use serde_json::json;

fn main() -> scrollable::Result<()> {
    // Example: a headless host driving queued scrolls on an in-memory page.
    //
    // A real adapter would:
    // - implement `Dom` over its document and `Animator` over its tween engine
    // - translate caller arguments (here: JSON) into positions and options
    // - call tick(now_ms) once per frame and forward clicks to pointer_down
    // - dispatch the drained events to its callbacks
    let mut dom = MemoryDom::new();
    let page = dom.add_window(Size::new(1280.0, 720.0), Size::new(1280.0, 6000.0));
    let mut s = Scroller::new(
        dom,
        TweenAnimator::new(Easing::Swing),
        ScrollConfig::default(),
    );

    let first = json::position_from_json(&json!("bottom"))?;
    s.scroll_to(page.window, first, &json::options_from_json(&json!(null))?, 0)?;

    let second = json::position_from_json(&json!("-=30%"))?;
    let append = json::options_from_json(&json!({ "append": true, "duration": "slow" }))?;
    s.scroll_to(page.window, second, &append, 0)?;

    s.notify_scroll_callbacks(page.window, json!({ "source": "demo" }), None, None)?;

    for info in s.queued_scrolls(page.window, &QueueName::Internal) {
        println!(
            "queued id={} target={:?} running={}",
            info.id.0, info.position, info.running
        );
    }

    let mut now_ms = 0u64;
    while s.is_animating(page.window) {
        now_ms += 16;
        s.tick(now_ms);
        for event in s.drain_events() {
            match event.kind {
                ScrollEventKind::Start => println!("t={now_ms} start id={}", event.animation.0),
                ScrollEventKind::Done { state, message, .. } => {
                    println!("t={now_ms} done at {state:?} message={message:?}");
                }
                ScrollEventKind::Fail {
                    cancelled, message, ..
                } => println!("t={now_ms} fail cancelled={cancelled:?} message={message:?}"),
                _ => {}
            }
        }
    }

    println!("final offset={:?}", s.dom().offset(page.window));
    Ok(())
}
