// Example: capture restoration anchors, then rebuild the position in a fresh renderer.
use virtual_scroller::{
    DataItem, InitialAnchor, RendererOptions, Viewport, ViewportEvent, VirtualScrollerRenderer,
    WindowViewport,
};

fn main() {
    let list: Vec<DataItem<u32>> = (0..200)
        .map(|i| DataItem::new(format!("row-{i}"), i))
        .collect();

    let options = RendererOptions::new("rows").with_assumed_item_height(40.0);
    let mut r = VirtualScrollerRenderer::new(options.clone(), WindowViewport::new(400.0))
        .with_list(list.clone());
    let mut now = 0;
    r.on_mount(now);
    for _ in 0..10 {
        let ids: Vec<String> = r
            .rendered_anchors()
            .iter()
            .map(|a| a.item_id.clone())
            .collect();
        for id in &ids {
            r.on_item_height_changed(id, 40.0);
        }
        now += 16;
        r.tick(now);
    }

    r.viewport_mut().user_scroll_by(1_000.0);
    r.on_viewport_event(now, ViewportEvent::Scroll);
    now += 300;
    r.tick(now);

    let anchors = r.get_anchors();
    println!("captured {} anchors, first={:?}", anchors.len(), anchors.first());
    let heights = r.height_cache().clone();

    let Some(first) = anchors.into_iter().next() else {
        return;
    };
    let options = options.with_initial_anchor(Some(InitialAnchor::Restore(first)));
    let mut restored = VirtualScrollerRenderer::new(options, WindowViewport::new(400.0))
        .with_height_cache(heights)
        .with_list(list);
    restored.on_mount(0);
    for t in 1..=3 {
        restored.tick(t * 16);
    }
    println!(
        "restored: scroll_y={} first anchor={:?}",
        restored.viewport().scroll_y(),
        restored.get_anchors().first()
    );
}
