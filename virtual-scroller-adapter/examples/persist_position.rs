use virtual_scroller::{Viewport, ViewportEvent, WindowViewport};
use virtual_scroller_adapter::{
    CustomLocation, FocusableSlot, LocationConfig, RenderOutput, VirtualScroller,
    VirtualScrollerOptions,
};

fn options() -> VirtualScrollerOptions<u32, String> {
    VirtualScrollerOptions::new(
        "inbox",
        (0..100).collect::<Vec<u32>>(),
        |i: &u32| format!("mail-{i}"),
        |i: &u32, _: &mut FocusableSlot| format!("mail #{i}"),
    )
    .with_assumed_item_height(80.0)
    .on_position_restored(|| println!("position restored"))
}

fn main() {
    // Example: leave a list and come back to the same position.
    //
    // The scroller saves the on-screen anchors into its location after every layout. Handing the
    // location (and the measured heights) to the next scroller restores the position on mount.
    let location = CustomLocation::new(LocationConfig::new("/inbox"));
    let mut s = VirtualScroller::with_location(options(), WindowViewport::new(400.0), location);
    let mut now = 0;
    s.on_mount(now);
    for frame in 0..40 {
        if frame == 10 {
            s.viewport_mut().user_scroll_by(1_000.0);
            s.on_viewport_event(now, ViewportEvent::Scroll);
        }
        if let RenderOutput::Cells(cells) = s.render() {
            for cell in &cells {
                s.on_item_height_changed(&cell.id, 80.0);
            }
        }
        now += 16;
        s.tick(now);
    }
    println!("left at scroll_y={}", s.viewport().scroll_y());
    println!("saved: {:?}", s.location().saved_position());

    let heights = s.renderer().height_cache().clone();
    s.on_unmount();
    let location = s.set_location(CustomLocation::new(LocationConfig::default()));

    let mut back = VirtualScroller::with_location(options(), WindowViewport::new(400.0), location)
        .with_height_cache(heights);
    back.on_mount(0);
    for t in 1..=3 {
        back.tick(t * 16);
    }
    println!(
        "back at scroll_y={} restored from {:?}",
        back.viewport().scroll_y(),
        back.restoration_anchor()
    );
}
