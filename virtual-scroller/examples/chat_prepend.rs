// Example: load older messages above the viewport without moving what the user is reading.
use virtual_scroller::{
    DataItem, RendererEvent, RendererOptions, Viewport, VirtualScrollerRenderer, WindowViewport,
};

fn messages(prefix: &str, n: usize) -> Vec<DataItem<String>> {
    (0..n)
        .map(|i| DataItem::new(format!("{prefix}{i}"), format!("message {prefix}{i}")))
        .collect()
}

// Stand-in for a real host: mounts every rendered cell and reports a fixed height.
fn paint(r: &mut VirtualScrollerRenderer<String, WindowViewport>) {
    let ids: Vec<String> = r.rendered_anchors().iter().map(|a| a.item_id.clone()).collect();
    for id in &ids {
        r.on_item_mounted(id);
        r.on_item_height_changed(id, 120.0);
    }
}

fn main() {
    let options = RendererOptions::new("thread-1").with_assumed_item_height(100.0);
    let mut r = VirtualScrollerRenderer::new(options, WindowViewport::new(600.0))
        .with_list(messages("m", 50));

    let mut now = 0;
    r.on_mount(now);
    for _ in 0..20 {
        paint(&mut r);
        now += 16;
        r.tick(now);
    }
    println!(
        "before: scroll_y={} slice={:?}",
        r.viewport().scroll_y(),
        r.slice()
    );

    let mut list = messages("old", 10);
    list.extend(messages("m", 50));
    r.set_list(list);
    now += 16;
    r.tick(now);

    for event in r.drain_events() {
        if let RendererEvent::PositionUpdate(p) = event {
            let m0 = p.rendered_items.iter().find(|i| i.id == "m0");
            println!(
                "viewport={:?} m0={:?}",
                p.viewport_rect,
                m0.map(|i| i.rect.top() - p.viewport_rect.top())
            );
        }
    }
    println!("after: scroll_y={}", r.viewport().scroll_y());
}
