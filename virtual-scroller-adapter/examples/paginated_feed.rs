use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use virtual_scroller::{Viewport, ViewportEvent, WindowViewport};
use virtual_scroller_adapter::{RenderOutput, VirtualScroller, VirtualScrollerOptions};

fn main() {
    // Example: load the next page when the viewport gets near the end of the list.
    //
    // Zone callbacks run synchronously inside the scroller, so they only record the request;
    // the host loop fetches and hands the longer list back with `set_items`.
    let wants_more = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&wants_more);

    let page = |start: u32| (start..start + 20).collect::<Vec<u32>>();
    let options = VirtualScrollerOptions::new(
        "feed",
        page(0),
        |i: &u32| format!("post-{i}"),
        |i: &u32, slot: &mut virtual_scroller_adapter::FocusableSlot| {
            slot.set(true);
            format!("post #{i}")
        },
    )
    .with_assumed_item_height(120.0)
    .on_near_end(move |cause| {
        println!("near end ({cause:?})");
        flag.store(true, Ordering::SeqCst);
    });

    let mut s = VirtualScroller::new(options, WindowViewport::new(600.0));
    let mut now = 0;
    s.on_mount(now);

    let mut items = page(0);
    for step in 0..12 {
        for _ in 0..5 {
            if let RenderOutput::Cells(cells) = s.render() {
                for cell in &cells {
                    s.on_item_height_changed(&cell.id, 120.0);
                }
            }
            now += 16;
            s.tick(now);
        }

        if wants_more.swap(false, Ordering::SeqCst) {
            let next = items.len() as u32;
            items.extend(page(next));
            s.set_items(items.clone(), now);
            println!("step {step}: loaded page, {} items", items.len());
        }

        s.viewport_mut().user_scroll_by(600.0);
        s.on_viewport_event(now, ViewportEvent::Scroll);
    }

    println!(
        "scroll_y={} slice={:?}",
        s.viewport().scroll_y(),
        s.renderer().slice()
    );
}
