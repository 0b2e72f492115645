use crate::*;

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_i64(&mut self, start: i64, end_exclusive: i64) -> i64 {
        debug_assert!(start < end_exclusive);
        let span = (end_exclusive - start) as u64;
        start + (self.next_u64() % span) as i64
    }

    fn gen_f64(&mut self, start: i64, end_exclusive: i64) -> f64 {
        self.gen_range_i64(start, end_exclusive) as f64
    }
}

type TestRenderer = VirtualScrollerRenderer<usize, WindowViewport>;

fn list_of(prefix: &str, n: usize) -> Vec<DataItem<usize>> {
    (0..n)
        .map(|i| DataItem::new(format!("{prefix}{i}"), i))
        .collect()
}

fn renderer(
    options: RendererOptions,
    viewport_height: f64,
    list: Vec<DataItem<usize>>,
) -> TestRenderer {
    VirtualScrollerRenderer::new(options, WindowViewport::new(viewport_height)).with_list(list)
}

// Mirrors what a host does after each render: (un)mount cells and report their heights.
fn sync_cells(r: &mut TestRenderer, height_of: &dyn Fn(&str) -> f64) {
    let rendered: Vec<ItemId> = r
        .rendered_anchors()
        .iter()
        .map(|a| a.item_id.clone())
        .collect();
    for id in r.mounted_item_ids() {
        if !rendered.contains(&id) {
            r.on_item_unmounted(&id);
        }
    }
    for id in &rendered {
        if !r.is_item_mounted(id) {
            r.on_item_mounted(id);
        }
    }
    for id in &rendered {
        r.on_item_height_changed(id, height_of(id));
    }
}

fn run_frames(r: &mut TestRenderer, now: &mut u64, frames: usize, height_of: &dyn Fn(&str) -> f64) {
    for _ in 0..frames {
        sync_cells(r, height_of);
        *now += 16;
        r.tick(*now);
    }
}

fn offset_of(r: &TestRenderer, id: &str) -> Option<f64> {
    r.rendered_anchors()
        .iter()
        .find(|a| a.item_id == id)
        .map(|a| a.offset)
}

fn last_positioning(events: &[RendererEvent]) -> Option<&Positioning> {
    events.iter().rev().find_map(|e| match e {
        RendererEvent::PositionUpdate(p) => Some(p),
        _ => None,
    })
}

fn focus_changes(events: &[RendererEvent]) -> Vec<ItemId> {
    events
        .iter()
        .filter_map(|e| match e {
            RendererEvent::FocusChanged(id) => Some(id.clone()),
            _ => None,
        })
        .collect()
}

fn positioning(
    list_top: f64,
    list_height: f64,
    viewport_top: f64,
    viewport_height: f64,
    len: usize,
) -> Positioning {
    Positioning {
        viewport_rect: Rectangle::new(viewport_top, viewport_height),
        list_rect: Rectangle::new(list_top, list_height),
        list_length: len,
        rendered_items: Vec::new(),
    }
}

// A chat-like list of ten 300px messages, mounted and settled with the viewport at the top.
fn settled_chat(now: &mut u64) -> TestRenderer {
    let options = RendererOptions::new("chat").with_assumed_item_height(300.0);
    let mut r = renderer(options, 800.0, list_of("a", 10));
    r.on_mount(*now);
    run_frames(&mut r, now, 30, &|_| 300.0);
    r.drain_events();
    r
}

#[test]
fn rect_intersection_is_symmetric_and_half_open() {
    let mut rng = Lcg::new(7);
    for _ in 0..2_000 {
        let a = Rectangle::new(rng.gen_f64(-500, 500), rng.gen_f64(0, 300));
        let b = Rectangle::new(rng.gen_f64(-500, 500), rng.gen_f64(0, 300));
        assert_eq!(a.intersects(&b), b.intersects(&a), "{a:?} vs {b:?}");
        assert_eq!(a.translate_by(17.0).height(), a.height());
    }

    let a = Rectangle::new(0.0, 100.0);
    assert!(!a.intersects(&Rectangle::new(100.0, 50.0)));
    assert!(a.intersects(&Rectangle::new(99.0, 50.0)));
    // Zero height intervals still intersect when their top lies inside the other one.
    assert!(a.intersects(&Rectangle::new(50.0, 0.0)));

    let expanded = Rectangle::new(0.0, 800.0).expand_by_ratio(2.5);
    assert_eq!(expanded, Rectangle::new(-2000.0, 4800.0));
    assert_eq!(a.overlap(&Rectangle::new(60.0, 100.0)), 40.0);
    assert_eq!(a.overlap(&Rectangle::new(200.0, 100.0)), 0.0);
}

#[test]
fn smooth_slice_keeps_short_covering_slices() {
    assert_eq!(
        smooth_slice(Slice::new(10, 20), Slice::new(12, 18), 50),
        Slice::new(10, 20)
    );
    assert_eq!(
        smooth_slice(Slice::new(10, 20), Slice::new(30, 40), 50),
        Slice::new(30, 40)
    );
    assert_eq!(
        smooth_slice(Slice::new(10, 20), Slice::new(15, 25), 50),
        Slice::new(15, 25)
    );
    assert_eq!(
        smooth_slice(Slice::new(10, 20), Slice::new(8, 18), 50),
        Slice::new(8, 18)
    );
    // Growing at the end must not underflow the current end.
    assert_eq!(smooth_slice(Slice::new(0, 1), Slice::new(0, 5), 50), Slice::new(0, 5));
}

#[test]
fn smooth_slice_always_covers_the_candidates() {
    let mut rng = Lcg::new(42);
    for _ in 0..5_000 {
        let cs = rng.gen_range_i64(0, 100) as usize;
        let ce = cs + rng.gen_range_i64(0, 60) as usize;
        let ks = rng.gen_range_i64(0, 100) as usize;
        let ke = ks + rng.gen_range_i64(1, 60) as usize;
        let current = Slice::new(cs, ce);
        let candidate = Slice::new(ks, ke);
        let out = smooth_slice(current, candidate, 50);
        assert!(out.start <= out.end);
        if out != current {
            assert!(out.contains(&candidate), "{current:?} + {candidate:?} -> {out:?}");
        }
    }
}

#[test]
fn slice_clamps_to_list_length() {
    assert_eq!(Slice::new(3, 12).clamp_to(10), Slice::new(3, 10));
    assert_eq!(Slice::new(12, 15).clamp_to(10), Slice::new(10, 10));
    assert!(Slice::new(4, 4).is_empty());
    assert_eq!(Slice::new(4, 9).len(), 5);
}

#[test]
fn smooth_slice_keeps_random_short_covering_slices() {
    let mut rng = Lcg::new(99);
    for _ in 0..5_000 {
        let start = rng.gen_range_i64(0, 200) as usize;
        let current = Slice::new(start, start + rng.gen_range_i64(0, 51) as usize);
        let ks = current.start + rng.gen_range_i64(0, current.len() as i64 + 1) as usize;
        let ke = ks + rng.gen_range_i64(0, (current.end - ks) as i64 + 1) as usize;
        let candidate = Slice::new(ks, ke);
        assert_eq!(
            smooth_slice(current, candidate, 50),
            current,
            "{current:?} should cover {candidate:?}"
        );
    }
}

fn item_height(id: &str) -> f64 {
    id[1..]
        .parse::<u64>()
        .map_or(100.0, |n| 40.0 + (n * 37 % 160) as f64)
}

#[test]
fn emptying_the_list_resets_the_slice() {
    let mut now = 0;
    let mut r = settled_chat(&mut now);
    assert!(!r.slice().is_empty());

    r.set_list(Vec::new());
    now += 16;
    r.tick(now);
    assert_eq!(r.slice(), Slice::default());
    assert!(r.rendered_anchors().is_empty());
    assert_eq!(r.list_height_with_headroom(), 0.0);
    assert_eq!(r.current_headroom(), 0.0);

    r.set_list(list_of("b", 2));
    run_frames(&mut r, &mut now, 5, &|_| 300.0);
    assert_eq!(r.slice(), Slice::new(0, 2));
    assert_eq!(offset_of(&r, "b0"), Some(0.0));
}

#[test]
fn slice_stays_within_the_list_across_random_mutations() {
    let mut rng = Lcg::new(2024);
    let options = RendererOptions::new("random").with_assumed_item_height(120.0);
    let mut items = list_of("i", 30);
    let mut next_id = items.len();
    let mut r = renderer(options, 600.0, items.clone());
    let mut now = 0;
    r.on_mount(now);
    run_frames(&mut r, &mut now, 5, &item_height);

    for step in 0..400 {
        let len = items.len() as i64;
        match rng.gen_range_i64(0, 6) {
            op @ (0 | 1) => {
                let n = rng.gen_range_i64(1, 8) as usize;
                let mut fresh: Vec<DataItem<usize>> = (next_id..next_id + n)
                    .map(|i| DataItem::new(format!("i{i}"), i))
                    .collect();
                next_id += n;
                if op == 0 {
                    fresh.append(&mut items);
                    items = fresh;
                } else {
                    items.append(&mut fresh);
                }
            }
            2 => items.truncate(rng.gen_range_i64(0, len + 1) as usize),
            3 => {
                items.drain(..rng.gen_range_i64(0, len + 1) as usize);
            }
            4 => items.clear(),
            _ => {
                let y = rng.gen_f64(0, (len * 120).max(1));
                r.viewport_mut().user_scroll_to(y);
                r.on_viewport_event(now, ViewportEvent::Scroll);
            }
        }
        r.set_list(items.clone());
        run_frames(&mut r, &mut now, 3, &item_height);

        let slice = r.slice();
        assert!(
            slice.start <= slice.end && slice.end <= items.len(),
            "step {step}: {slice:?} len {}",
            items.len()
        );
        assert_eq!(r.rendered_anchors().len(), slice.len(), "step {step}");
        if items.is_empty() {
            assert_eq!(slice, Slice::default(), "step {step}");
        }
    }
}

#[test]
fn preferred_band_windows_a_large_list_around_the_anchor() {
    let options = RendererOptions::new("big").with_assumed_item_height(400.0);
    let r = renderer(options, 800.0, list_of("item-", 1000));

    let candidates = r.render_candidates(&Anchor::at("item-500", 0.0), Rectangle::new(0.0, 800.0));
    assert!(candidates.are_preferred_items_rendered);
    assert_eq!(candidates.slice, Slice::new(495, 502));
    assert_eq!(candidates.all_items_with_positions.len(), 1000);
    assert_eq!(candidates.new_rendered_items.len(), 7);
    assert_eq!(candidates.new_rendered_items[0].item_id, "item-495");
    assert_eq!(candidates.new_rendered_items[0].offset, -2000.0);
    assert!(candidates.new_rendered_items.iter().all(|a| !a.visible));
}

#[test]
fn items_with_positions_lays_out_from_the_anchor() {
    let options = RendererOptions::new("layout").with_assumed_item_height(50.0);
    let mut r = renderer(options, 800.0, list_of("item-", 5));
    r.height_cache_mut().insert("item-1", 120.0);

    let anchor = Anchor::at("item-2", 300.0);
    assert_eq!(r.distance_from_top("item-2"), 170.0);
    assert_eq!(r.distance_from_top("missing"), 0.0);

    let items = r.items_with_positions(&anchor);
    let offsets: Vec<f64> = items.iter().map(|a| a.offset).collect();
    assert_eq!(offsets, [130.0, 180.0, 300.0, 350.0, 400.0]);
    assert!(items[1].visible);
    assert!(!items[2].visible);
    assert_eq!(items[1].height, 120.0);
}

#[test]
fn mount_settles_into_the_preferred_slice_and_keeps_it_while_scrolling() {
    let options = RendererOptions::new("feed").with_assumed_item_height(400.0);
    let mut r = renderer(options, 800.0, list_of("item-", 1000));
    let mut now = 0;

    r.on_mount(now);
    assert!(r.is_initial_anchoring());
    assert_eq!(r.slice(), Slice::new(0, 3));
    assert!(r.drain_events().is_empty());

    run_frames(&mut r, &mut now, 30, &|_| 400.0);
    assert!(!r.is_initial_anchoring());
    assert_eq!(r.slice(), Slice::new(0, 7));
    let events = r.drain_events();
    let p = last_positioning(&events).expect("positioning");
    assert_eq!(p.list_rect, Rectangle::new(0.0, 400_000.0));
    assert_eq!(p.list_length, 1000);
    assert_eq!(p.rendered_items.len(), 7);

    r.viewport_mut().user_scroll_by(400.0);
    r.on_viewport_event(now, ViewportEvent::Scroll);
    assert!(!r.is_idle());
    assert_eq!(r.scroll_direction(), Some(ScrollDirection::Forward));
    now += 16;
    r.tick(now);
    assert_eq!(r.slice(), Slice::new(0, 7));
    assert_eq!(r.viewport().scroll_y(), 400.0);

    now += 300;
    r.tick(now);
    assert!(r.is_idle());
    let events = r.drain_events();
    assert!(events.contains(&RendererEvent::ScrollEnd));
    assert_eq!(r.slice(), Slice::new(0, 8));
}

#[test]
fn prepending_items_keeps_the_anchor_on_screen() {
    let mut now = 0;
    let mut r = settled_chat(&mut now);
    assert_eq!(offset_of(&r, "a0"), Some(0.0));
    assert_eq!(r.viewport().scroll_y(), 0.0);

    let mut list = list_of("p", 3);
    list.extend(list_of("a", 10));
    r.set_list(list);
    now += 16;
    r.tick(now);

    assert_eq!(r.viewport().scroll_y(), 900.0);
    assert_eq!(offset_of(&r, "a0"), Some(900.0));
    assert_eq!(offset_of(&r, "p0"), Some(0.0));
    assert!(!r.should_animate());

    let events = r.drain_events();
    let p = last_positioning(&events).expect("positioning");
    assert_eq!(p.viewport_rect.top(), 900.0);
    assert_eq!(p.list_rect, Rectangle::new(0.0, 3900.0));
    let a0 = p.rendered_items.iter().find(|i| i.id == "a0").expect("a0 rendered");
    assert_eq!(a0.rect.top() - p.viewport_rect.top(), 0.0);
    assert_eq!(p.distance_to_list_start(), 900.0);

    // A second pass over the same state is a no-op.
    r.update();
    assert_eq!(r.viewport().scroll_y(), 900.0);
    assert_eq!(offset_of(&r, "a0"), Some(900.0));
    let anchor = r.anchor().expect("anchor");
    assert_eq!(anchor.item_id, "a0");
    assert_eq!(r.list_offset(&anchor), 0.0);
}

#[test]
fn growing_item_below_the_anchor_does_not_move_it() {
    let mut now = 0;
    let mut r = settled_chat(&mut now);

    r.on_item_height_changed("a1", 500.0);
    assert_eq!(r.height_cache().get("a1"), Some(500.0));
    assert_eq!(offset_of(&r, "a0"), Some(0.0));
    assert_eq!(offset_of(&r, "a2"), Some(800.0));
    assert_eq!(r.viewport().scroll_y(), 0.0);
}

#[test]
fn bottom_growing_list_gets_top_headroom() {
    let options = RendererOptions::new("bottom")
        .with_assumed_item_height(100.0)
        .with_new_content_at_bottom(true);
    let mut r = renderer(options, 800.0, list_of("m", 2));
    r.viewport_mut().set_content_height(Some(800.0));
    let mut now = 0;

    r.on_mount(now);
    run_frames(&mut r, &mut now, 20, &|_| 100.0);

    assert_eq!(offset_of(&r, "m0"), Some(600.0));
    assert_eq!(offset_of(&r, "m1"), Some(700.0));
    assert_eq!(r.current_headroom(), 600.0);
    assert_eq!(r.list_height_with_headroom(), 800.0);
    assert_eq!(r.viewport().scroll_y(), 0.0);
    assert!(r.is_at_newest());

    let events = r.drain_events();
    let p = last_positioning(&events).expect("positioning");
    assert_eq!(p.list_rect, Rectangle::new(600.0, 200.0));
}

#[test]
fn without_headroom_disables_padding() {
    let options = RendererOptions::new("bare")
        .with_assumed_item_height(100.0)
        .with_headroom(false);
    let mut r = renderer(options, 800.0, list_of("m", 2));
    let mut now = 0;
    r.on_mount(now);
    run_frames(&mut r, &mut now, 5, &|_| 100.0);
    assert_eq!(r.current_headroom(), 0.0);
    assert_eq!(r.list_height_with_headroom(), 200.0);
}

#[test]
fn restoring_a_position_rebuilds_the_same_distances() {
    let anchor = RestorationAnchor {
        id: ItemId::from("item-5"),
        distance_to_viewport_top: 50.0,
        was_focused: false,
    };
    let options = RendererOptions::new("restore")
        .with_assumed_item_height(100.0)
        .with_initial_anchor(Some(InitialAnchor::Restore(anchor)));
    let mut r = renderer(options, 300.0, list_of("item-", 20));
    for i in 0..20 {
        r.height_cache_mut().insert(&format!("item-{i}"), 100.0);
    }

    r.on_mount(0);
    let initial: Vec<(String, f64)> = r
        .rendered_anchors()
        .iter()
        .map(|a| (a.item_id.clone(), a.offset))
        .collect();
    assert_eq!(
        initial,
        [
            (String::from("item-4"), -50.0),
            (String::from("item-5"), 50.0),
            (String::from("item-6"), 150.0),
            (String::from("item-7"), 250.0),
        ]
    );

    // The first measuring pass waits for two painted frames.
    r.tick(16);
    r.tick(32);
    assert_eq!(r.viewport().scroll_y(), 0.0);
    r.tick(48);
    assert!(!r.is_initial_anchoring());
    assert_eq!(r.viewport().scroll_y(), 450.0);
    assert_eq!(offset_of(&r, "item-5"), Some(500.0));

    let anchors = r.get_anchors();
    let ids: Vec<&str> = anchors.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["item-4", "item-5", "item-6", "item-7"]);
    assert_eq!(anchors[0].distance_to_viewport_top, -50.0);
    assert_eq!(anchors[1].distance_to_viewport_top, 50.0);
    assert!(anchors.iter().all(|a| !a.was_focused));
}

#[test]
fn keyboard_focus_walks_focusable_items() {
    let anchor = RestorationAnchor {
        id: ItemId::from("item-5"),
        distance_to_viewport_top: 50.0,
        was_focused: false,
    };
    let options = RendererOptions::new("focus")
        .with_assumed_item_height(100.0)
        .with_initial_anchor(Some(InitialAnchor::Restore(anchor)));
    let mut r = renderer(options, 300.0, list_of("item-", 20));
    for i in 0..20 {
        r.height_cache_mut().insert(&format!("item-{i}"), 100.0);
    }
    r.on_mount(0);
    for t in 1..=3 {
        r.tick(t * 16);
    }
    assert_eq!(r.viewport().scroll_y(), 450.0);
    r.drain_events();

    r.set_item_focusable("item-5", true);
    r.set_item_focusable("item-6", true);

    r.focus_next();
    assert_eq!(r.active_entry_id(), Some("item-5"));
    assert_eq!(r.viewport().scroll_y(), 500.0);

    r.focus_next();
    assert_eq!(r.active_entry_id(), Some("item-6"));
    assert_eq!(r.viewport().scroll_y(), 600.0);

    // Nothing focusable past item-6: focus stays put.
    r.focus_next();
    assert_eq!(r.active_entry_id(), Some("item-6"));

    r.focus_previous();
    assert_eq!(r.active_entry_id(), Some("item-5"));
    assert_eq!(r.viewport().scroll_y(), 500.0);

    let events = r.drain_events();
    assert_eq!(focus_changes(&events), ["item-5", "item-6", "item-5"]);

    let anchors = r.get_anchors();
    assert_eq!(anchors[0].id, "item-5");
    assert_eq!(anchors[0].distance_to_viewport_top, 0.0);
    assert!(anchors[0].was_focused);
    assert!(anchors[1..].iter().all(|a| !a.was_focused));
}

#[test]
fn focusing_an_unmeasured_item_is_ignored() {
    let mut now = 0;
    let mut r = settled_chat(&mut now);
    assert!(!r.focus_item("missing", Align::Start));
    assert!(r.focus_item("a1", Align::Auto));
    assert!(!r.focus_item("a1", Align::Auto));
    assert_eq!(r.active_entry_id(), Some("a1"));
}

#[test]
fn height_reports_while_animating_wait_for_the_animation() {
    let mut now = 0;
    let mut r = settled_chat(&mut now);

    let hint = TransitionHint::new(300, Easing::SmoothStep);
    r.on_animation_started("a1", Some(hint), now);
    assert_eq!(r.transition_hint(), hint);
    assert!(r.has_animations());
    assert_eq!(r.next_deadline(), Some(now + 1000));

    r.on_item_height_changed("a1", 500.0);
    assert_eq!(r.height_cache().get("a1"), Some(300.0));
    assert!(r.needs_frame());

    r.on_animation_ended("a1");
    assert!(!r.has_animations());
    assert_eq!(r.transition_hint(), TransitionHint::DEFAULT);
    assert_eq!(r.height_cache().get("a1"), Some(500.0));
    assert_eq!(offset_of(&r, "a2"), Some(800.0));
}

#[test]
fn animation_ttl_ends_forgotten_animations() {
    let mut now = 0;
    let mut r = settled_chat(&mut now);
    r.on_animation_started("a2", None, now);
    r.tick(now + 999);
    assert!(r.has_animations());
    r.tick(now + 1000);
    assert!(!r.has_animations());
    assert_eq!(r.next_deadline(), None);
}

#[test]
fn first_zero_height_report_is_ignored() {
    let options = RendererOptions::new("zero").with_assumed_item_height(100.0);
    let mut r = renderer(options, 800.0, list_of("a", 3));

    r.on_item_height_changed("a0", 0.0);
    assert!(r.is_item_mounted("a0"));
    r.update();
    assert_eq!(r.height_cache().get("a0"), None);

    r.on_item_height_changed("a0", -5.0);
    r.on_item_height_changed("a0", f64::NAN);
    assert_eq!(r.height_cache().get("a0"), None);

    r.on_item_height_changed("a0", 120.0);
    assert_eq!(r.height_cache().get("a0"), Some(120.0));
}

#[test]
fn fullscreen_suspends_recomputation() {
    let mut now = 0;
    let mut r = settled_chat(&mut now);

    r.on_viewport_event(now, ViewportEvent::FullscreenEnter);
    assert!(r.is_suspended());
    let mut list = list_of("p", 2);
    list.extend(list_of("a", 10));
    r.set_list(list);
    now += 16;
    r.tick(now);
    assert_eq!(r.viewport().scroll_y(), 0.0);
    assert_eq!(offset_of(&r, "a0"), Some(0.0));

    r.on_viewport_event(now, ViewportEvent::FullscreenExit);
    now += 16;
    r.tick(now);
    assert_eq!(r.viewport().scroll_y(), 600.0);
    assert_eq!(offset_of(&r, "a0"), Some(600.0));
}

#[test]
fn scroll_to_newest_focuses_on_the_next_tick() {
    let mut now = 0;
    let mut r = settled_chat(&mut now);
    r.viewport_mut().user_scroll_to(700.0);
    r.on_viewport_event(now, ViewportEvent::Scroll);
    assert!(!r.is_at_newest());
    now += 300;
    r.tick(now);
    r.set_item_focusable("a0", true);

    r.scroll_to_newest(true);
    assert_eq!(r.viewport().scroll_y(), 0.0);
    assert!(r.has_user_changed_focus());
    assert_eq!(r.active_entry_id(), None);

    now += 16;
    r.tick(now);
    assert_eq!(r.active_entry_id(), Some("a0"));
}

fn assert_in_view(r: &TestRenderer, id: &str) {
    let top = offset_of(r, id).expect("item rendered");
    let view = r.relative_viewport_rect().expect("laid out");
    let item = Rectangle::new(top, r.height_for_id(id));
    assert!(
        item.top() >= view.top() && item.bottom() <= view.bottom(),
        "{id} at {item:?} outside {view:?}"
    );
}

#[test]
fn follow_item_keeps_the_newest_edge_in_view() {
    let options = RendererOptions::new("typing")
        .with_assumed_item_height(100.0)
        .with_follow_item_id(Some(ItemId::from("typing")));
    let mut r = renderer(options, 800.0, list_of("a", 20));
    let mut now = 0;
    r.on_mount(now);
    run_frames(&mut r, &mut now, 20, &|_| 100.0);

    // A fresh list without an initial anchor counts as being at the newest edge.
    let mut list = list_of("a", 20);
    list.insert(0, DataItem::new("typing", 99).with_can_be_anchor(false));
    r.set_list(list);
    assert!(r.is_following_newest());
    run_frames(&mut r, &mut now, 30, &|_| 100.0);

    assert_eq!(r.viewport().scroll_y(), 0.0);
    assert_eq!(offset_of(&r, "typing"), Some(0.0));
    assert_eq!(offset_of(&r, "a0"), Some(100.0));
    assert_in_view(&r, "typing");

    // Scrolling away hands the position back to regular anchoring.
    r.viewport_mut().user_scroll_to(400.0);
    r.on_viewport_event(now, ViewportEvent::Scroll);
    assert!(!r.is_following_newest());
    run_frames(&mut r, &mut now, 30, &|_| 100.0);

    let mut list = list_of("a", 20);
    list.insert(0, DataItem::new("n0", 98));
    list.insert(0, DataItem::new("typing", 99).with_can_be_anchor(false));
    r.set_list(list);
    assert!(!r.is_following_newest());
    run_frames(&mut r, &mut now, 30, &|_| 100.0);
    assert_eq!(r.viewport().scroll_y(), 500.0);
    assert_eq!(offset_of(&r, "a3"), Some(500.0));
}

#[test]
fn follow_item_keeps_the_newest_edge_in_view_when_growing_at_the_bottom() {
    let options = RendererOptions::new("typing-bottom")
        .with_assumed_item_height(100.0)
        .with_new_content_at_bottom(true)
        .with_follow_item_id(Some(ItemId::from("typing")));
    let mut r = renderer(options, 800.0, list_of("m", 20));
    let mut now = 0;
    r.on_mount(now);
    run_frames(&mut r, &mut now, 20, &|_| 100.0);
    assert_eq!(r.list_height_with_headroom(), 2000.0);

    r.viewport_mut().user_scroll_to(1200.0);
    r.on_viewport_event(now, ViewportEvent::Scroll);
    assert!(r.is_at_newest());
    run_frames(&mut r, &mut now, 30, &|_| 100.0);
    assert_eq!(r.viewport().scroll_y(), 1200.0);

    let mut list = list_of("m", 20);
    list.push(DataItem::new("typing", 99).with_can_be_anchor(false));
    r.set_list(list);
    run_frames(&mut r, &mut now, 30, &|_| 100.0);

    assert_eq!(offset_of(&r, "typing"), Some(2000.0));
    assert_eq!(r.list_height_with_headroom(), 2100.0);
    assert_eq!(r.viewport().scroll_y(), 1300.0);
    assert_in_view(&r, "typing");
    assert!(r.is_at_newest());
}

#[test]
fn follow_item_waits_for_the_newest_edge_after_a_restore() {
    let options = RendererOptions::new("typing-restore")
        .with_assumed_item_height(100.0)
        .with_follow_item_id(Some(ItemId::from("typing")))
        .with_initial_anchor(Some(InitialAnchor::Focused { id: ItemId::from("a5") }));
    let mut r = renderer(options, 800.0, list_of("a", 20));
    let mut now = 0;
    r.on_mount(now);
    run_frames(&mut r, &mut now, 20, &|_| 100.0);

    let mut list = list_of("a", 20);
    list.insert(0, DataItem::new("typing", 99).with_can_be_anchor(false));
    r.set_list(list);
    assert!(!r.is_following_newest());
}

#[test]
fn pin_to_newest_anchors_the_first_item_at_the_top() {
    let options = RendererOptions::new("pin")
        .with_assumed_item_height(100.0)
        .with_pin_to_newest_when_at_newest(true);
    let mut r = renderer(options, 800.0, list_of("a", 20));
    let mut now = 0;
    r.on_mount(now);
    run_frames(&mut r, &mut now, 20, &|_| 100.0);

    let mut list = list_of("n", 2);
    list.extend(list_of("a", 20));
    r.set_list(list);
    now += 16;
    r.tick(now);
    assert_eq!(offset_of(&r, "n0"), Some(0.0));
    assert_eq!(r.viewport().scroll_y(), 0.0);
}

#[test]
fn device_pixel_ratio_snaps_heights_up() {
    let options = RendererOptions::new("dpr")
        .with_assumed_item_height(10.0)
        .with_device_pixel_ratio(2.0);
    let mut r = renderer(options, 800.0, list_of("a", 2));
    r.height_cache_mut().insert("a0", 100.3);
    assert_eq!(r.height_for_id("a0"), 100.5);
    assert_eq!(r.height_for_id("a1"), 10.0);
}

#[test]
fn remount_switches_cache_scope_and_keeps_the_old_one() {
    let mut now = 0;
    let mut r = settled_chat(&mut now);
    assert_eq!(r.height_cache().get("a3"), Some(300.0));

    r.remount("other", None, now);
    assert_eq!(r.options().cache_key, "other");
    assert_eq!(r.height_cache().active_scope(), "other");
    assert_eq!(r.height_cache().get("a3"), None);
    assert_eq!(r.height_cache().get_in("chat", "a3"), Some(300.0));
    assert!(r.is_initial_anchoring());
    assert_eq!(r.active_entry_id(), None);
}

#[test]
fn set_options_with_new_cache_key_remounts() {
    let mut now = 0;
    let mut r = settled_chat(&mut now);
    r.update_options(|o| o.cache_key = String::from("thread-2"));
    assert_eq!(r.height_cache().active_scope(), "thread-2");
    assert!(r.height_cache().has_scope("chat"));
    assert!(r.is_mounted());
}

#[test]
fn edge_proximity_reports_causes() {
    let fired = Arc::new(AtomicUsize::new(0));
    let causes = Arc::new(std::sync::Mutex::new(Vec::new()));
    let zone = {
        let fired = Arc::clone(&fired);
        let causes = Arc::clone(&causes);
        Zone::new(ZoneCondition::NearBottomRatio(1.75), move |cause| {
            fired.fetch_add(1, Ordering::Relaxed);
            causes.lock().unwrap().push(cause);
        })
    };
    let mut proximity = EdgeProximity::new([zone]);
    assert_eq!(proximity.proximity(0), None);

    // 3000px from the end: outside the 1400px band.
    proximity.handle_positioning_update(&positioning(0.0, 5000.0, 1200.0, 800.0, 10));
    assert_eq!(proximity.proximity(0), Some(Proximity::Outside));
    assert_eq!(fired.load(Ordering::Relaxed), 0);

    // 1300px from the end.
    proximity.handle_positioning_update(&positioning(0.0, 5000.0, 2900.0, 800.0, 10));
    assert_eq!(fired.load(Ordering::Relaxed), 1);
    proximity.handle_positioning_update(&positioning(0.0, 5000.0, 2950.0, 800.0, 10));
    assert_eq!(fired.load(Ordering::Relaxed), 1);

    // More items arrive below: 2250px from the end is outside again.
    proximity.handle_positioning_update(&positioning(0.0, 6000.0, 2950.0, 800.0, 12));
    assert_eq!(proximity.proximity(0), Some(Proximity::Outside));
    proximity.handle_positioning_update(&positioning(0.0, 6000.0, 4000.0, 800.0, 12));
    // Exactly on the threshold counts as inside.
    proximity.handle_positioning_update(&positioning(0.0, 6200.0, 4000.0, 800.0, 14));

    let causes = causes.lock().unwrap().clone();
    assert_eq!(
        causes,
        [TriggerCause::Movement, TriggerCause::Movement, TriggerCause::ListUpdate]
    );
}

#[test]
fn edge_proximity_initial_position_fires_once() {
    let fired = Arc::new(AtomicUsize::new(0));
    let zone = {
        let fired = Arc::clone(&fired);
        Zone::new(ZoneCondition::NearTop(5.0), move |cause| {
            assert_eq!(cause, TriggerCause::InitialPosition);
            fired.fetch_add(1, Ordering::Relaxed);
        })
    };
    let custom = Zone::new(
        ZoneCondition::Custom(Arc::new(|list: Rectangle, viewport: Rectangle| {
            viewport.bottom() > list.bottom()
        })),
        |_| {},
    );
    let mut proximity = EdgeProximity::new([zone, custom]);
    assert_eq!(proximity.len(), 2);
    proximity.handle_positioning_update(&positioning(0.0, 5000.0, 0.0, 800.0, 10));
    proximity.handle_positioning_update(&positioning(0.0, 5000.0, 2.0, 800.0, 10));
    assert_eq!(fired.load(Ordering::Relaxed), 1);
    assert_eq!(proximity.proximity(1), Some(Proximity::Outside));
}

#[test]
fn height_cache_scopes_are_isolated() {
    let mut cache = HeightCache::new("a");
    assert!(cache.insert("x", 10.0));
    assert!(!cache.insert("y", -1.0));
    assert!(!cache.insert("y", f64::INFINITY));
    assert_eq!(cache.len(), 1);

    cache.activate("b");
    assert_eq!(cache.get("x"), None);
    cache.insert("x", 20.0);
    cache.activate("a");
    assert_eq!(cache.get("x"), Some(10.0));
    assert_eq!(cache.get_in("b", "x"), Some(20.0));

    assert_eq!(cache.remove("x"), Some(10.0));
    assert!(cache.is_empty());
}

#[test]
fn height_cache_evicts_least_recently_activated_scope() {
    let mut cache = HeightCache::new("a").with_max_scopes(Some(2));
    cache.insert("x", 1.0);
    cache.activate("b");
    cache.activate("a");
    cache.activate("c");
    assert_eq!(cache.scope_count(), 2);
    assert!(cache.has_scope("a"));
    assert!(!cache.has_scope("b"));
    assert_eq!(cache.get_in("a", "x"), Some(1.0));
}

#[test]
fn debounce_collapses_bursts() {
    let mut d = Debounce::new(200);
    d.request(0);
    d.request(100);
    assert_eq!(d.deadline(), Some(300));
    assert!(!d.poll(299));
    assert!(d.poll(300));
    assert!(!d.poll(400));
    assert!(!d.is_pending());
}

#[test]
fn throttle_runs_leading_and_trailing() {
    let mut t = Throttle::new(100);
    assert!(t.request(0));
    assert!(!t.request(50));
    assert!(!t.request(60));
    assert_eq!(t.deadline(), Some(100));
    assert!(!t.poll(99));
    assert!(t.poll(100));
    assert!(!t.poll(150));
    assert!(!t.request(150));
    assert!(t.poll(200));
}

#[test]
fn frame_queue_delays_critical_work() {
    let mut q = FrameQueue::default();
    q.request_critical_after(2);
    assert!(!q.is_empty());
    assert!(!q.take_frame());
    assert!(!q.take_frame());
    assert!(q.take_frame());
    assert!(!q.take_frame());
    assert!(q.is_empty());

    q.request_idle();
    assert!(q.take_idle());
    assert!(!q.take_idle());
}

#[test]
fn idle_work_waits_for_the_idle_callback() {
    let options = RendererOptions::new("idle")
        .with_assumed_item_height(100.0)
        .with_idle_callback(true)
        .with_timings(200, 100, 10);
    let mut r = renderer(options, 800.0, list_of("a", 40));
    for i in 0..40 {
        r.height_cache_mut().insert(&format!("a{i}"), 100.0);
    }

    r.on_mount(0);
    assert!(!r.is_initial_anchoring());
    assert_eq!(r.slice(), Slice::new(0, 12));

    // The settle delay hands the widening pass to the idle queue.
    r.tick(20);
    assert_eq!(r.slice(), Slice::new(0, 12));
    r.on_idle(20);
    assert_eq!(r.slice(), Slice::new(0, 28));
}

#[test]
fn transition_hint_interpolates() {
    let hint = TransitionHint::DEFAULT;
    assert_eq!(hint.progress(75), 0.5);
    assert_eq!(hint.progress(1_000), 1.0);
    assert_eq!(hint.interpolate(0.0, 100.0, 75), 50.0);
    assert_eq!(Easing::SmoothStep.sample(0.5), 0.5);
    assert_eq!(Easing::EaseInOutCubic.sample(1.0), 1.0);
}

#[test]
fn window_viewport_clamps_and_notifies() {
    let seen = Arc::new(AtomicUsize::new(0));
    let mut v = WindowViewport::new(800.0).with_offsets(60.0, 40.0);
    v.set_content_height(Some(2000.0));
    let id = {
        let seen = Arc::clone(&seen);
        v.add_programmatic_scroll_listener(move |delta| {
            seen.fetch_add(delta as usize, Ordering::Relaxed);
        })
    };

    assert_eq!(v.rect(), Rectangle::new(60.0, 700.0));
    assert_eq!(v.scroll_by(5000.0), 1200.0);
    assert_eq!(v.scroll_y(), 1200.0);
    assert_eq!(seen.load(Ordering::Relaxed), 1200);
    assert_eq!(v.root_top(), Some(-1200.0));
    assert_eq!(v.scroll_to_top(), -1200.0);

    assert!(v.remove_listener(id));
    assert!(!v.remove_listener(id));
    v.scroll_to_bottom();
    assert_eq!(seen.load(Ordering::Relaxed), 1200);
}

#[test]
fn element_viewport_correction_uses_its_own_top() {
    let viewport = WindowViewport::new(600.0)
        .with_kind(ViewportKind::Element)
        .with_offsets(100.0, 0.0)
        .with_list_top(Some(160.0));
    let r: TestRenderer = VirtualScrollerRenderer::new(RendererOptions::new("el"), viewport)
        .with_list(list_of("a", 3));
    assert_eq!(r.viewport_offset_correction(), 60.0);
    assert_eq!(
        r.relative_viewport_rect(),
        Some(Rectangle::new(-60.0, 500.0))
    );
}

#[test]
fn data_item_flags() {
    let header = DataItem::new(HEADER_ID, ()).with_can_be_anchor(false);
    assert!(header.is_synthetic());
    assert!(!header.can_be_anchor);
    let item = DataItem::new("m1", ()).with_sort_index(Some(3));
    assert!(!item.is_synthetic());
    assert_eq!(item.sort_index, Some(3));
}
