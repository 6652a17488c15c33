use uuid::Uuid;

use super::*;
use crate::input::PointerKind;
use crate::mapper::{FixedViewport, Point, ScreenRect};

// =============================================================
// Helpers
// =============================================================

fn marker(fx: f64, fy: f64, note: &str, created_at: i64) -> Marker {
    let mut m = Marker::new(FracPoint { fx, fy }, note);
    m.created_at = created_at;
    m
}

fn two_markers() -> Vec<Marker> {
    vec![marker(0.25, 0.5, "ear", 2_000), marker(0.75, 0.5, "tail <sore>", 1_000)]
}

// =============================================================
// legend
// =============================================================

#[test]
fn legend_numbers_by_creation_time() {
    let markers = two_markers();
    let entries = legend(&markers);
    assert_eq!(entries[0].number, 1);
    assert_eq!(entries[0].note, "tail <sore>");
    assert_eq!(entries[1].number, 2);
    assert_eq!(entries[1].id, markers[0].id);
}

#[test]
fn legend_ties_keep_list_order() {
    let markers = vec![marker(0.1, 0.1, "a", 5), marker(0.2, 0.2, "b", 5)];
    let entries = legend(&markers);
    assert_eq!(entries[0].note, "a");
    assert_eq!(entries[1].note, "b");
}

#[test]
fn legend_of_nothing_is_empty() {
    assert!(legend(&[]).is_empty());
}

// =============================================================
// Export mode
// =============================================================

#[test]
fn export_is_self_contained() {
    let markers = two_markers();
    let bg = Background::Silhouette;
    let scene = Scene { selected: Some(markers[0].id), hovered: Some(markers[1].id), ..Scene::still(&markers, &bg) };
    let svg = overlay_svg(&scene, RenderMode::Export);
    assert!(!svg.contains("class="));
    assert!(!svg.contains("stroke-dasharray"));
    assert!(!svg.contains("data-"));
    assert!(!svg.contains("<title>"));
    assert!(svg.contains(MARKER_FILL));
}

#[test]
fn export_has_fixed_logical_size() {
    let bg = Background::Silhouette;
    let svg = overlay_svg(&Scene::still(&[], &bg), RenderMode::Export);
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"width="400""#));
    assert!(svg.contains(r#"height="300""#));
    assert!(svg.ends_with("</svg>"));
}

#[test]
fn export_recolors_silhouette_without_photo() {
    let bg = Background::Silhouette;
    let svg = overlay_svg(&Scene::still(&[], &bg), RenderMode::Export);
    assert!(svg.contains(SILHOUETTE_PATH));
    assert!(svg.contains(EXPORT_SILHOUETTE_STROKE));
}

#[test]
fn export_omits_silhouette_over_photo() {
    let markers = two_markers();
    let bg = Background::Photo { url: "rex.jpg".into() };
    let svg = overlay_svg(&Scene::still(&markers, &bg), RenderMode::Export);
    assert!(!svg.contains(SILHOUETTE_PATH));
    assert_eq!(svg.matches("<circle").count(), 2);
}

#[test]
fn export_skips_draft_pin() {
    let bg = Background::Silhouette;
    let scene = Scene { draft: Some(FracPoint { fx: 0.5, fy: 0.5 }), ..Scene::still(&[], &bg) };
    let svg = overlay_svg(&scene, RenderMode::Export);
    assert!(!svg.contains("<circle"));
}

#[test]
fn export_places_pins_in_logical_units() {
    let markers = vec![marker(0.5, 80.0 / 150.0, "", 1)];
    let bg = Background::Silhouette;
    let svg = overlay_svg(&Scene::still(&markers, &bg), RenderMode::Export);
    assert!(svg.contains(r#"cx="200.00""#));
    assert!(svg.contains(r#"cy="160.00""#));
}

#[test]
fn export_labels_pins_with_legend_numbers() {
    let markers = two_markers();
    let bg = Background::Silhouette;
    let svg = overlay_svg(&Scene::still(&markers, &bg), RenderMode::Export);
    // First marker in the list was created second.
    let first_label = svg.find(">2</text>").unwrap();
    let second_label = svg.find(">1</text>").unwrap();
    assert!(first_label < second_label);
}

// =============================================================
// Interactive mode
// =============================================================

#[test]
fn interactive_stretches_to_canvas_box() {
    let bg = Background::Silhouette;
    let svg = overlay_svg(&Scene::still(&[], &bg), RenderMode::Interactive);
    assert!(svg.contains(r#"preserveAspectRatio="none""#));
    assert!(svg.contains("hm-silhouette"));
}

#[test]
fn interactive_root_opts_out_of_touch_scrolling() {
    let bg = Background::Silhouette;
    let svg = overlay_svg(&Scene::still(&[], &bg), RenderMode::Interactive);
    assert!(svg.contains(r#"style="touch-action: none""#));
    let exported = overlay_svg(&Scene::still(&[], &bg), RenderMode::Export);
    assert!(!exported.contains("touch-action"));
}

#[test]
fn interactive_marks_selection_and_hover() {
    let markers = two_markers();
    let bg = Background::Silhouette;
    let scene = Scene { selected: Some(markers[0].id), hovered: Some(markers[1].id), ..Scene::still(&markers, &bg) };
    let svg = overlay_svg(&scene, RenderMode::Interactive);
    assert!(svg.contains("hm-marker--selected"));
    assert!(svg.contains("hm-marker--hover"));
    assert!(svg.contains("hm-selection-ring"));
    assert!(svg.contains("stroke-dasharray"));
    assert!(svg.contains(&markers[0].id.to_string()));
}

#[test]
fn interactive_escapes_note_tooltips() {
    let markers = two_markers();
    let bg = Background::Silhouette;
    let svg = overlay_svg(&Scene::still(&markers, &bg), RenderMode::Interactive);
    assert!(svg.contains("<title>tail &lt;sore&gt;</title>"));
    assert!(!svg.contains("<sore>"));
}

#[test]
fn interactive_shows_draft_pin() {
    let bg = Background::Silhouette;
    let scene = Scene { draft: Some(FracPoint { fx: 0.1, fy: 0.9 }), ..Scene::still(&[], &bg) };
    let svg = overlay_svg(&scene, RenderMode::Interactive);
    assert!(svg.contains("hm-marker--draft"));
}

#[test]
fn selection_of_unknown_marker_draws_no_ring() {
    let bg = Background::Silhouette;
    let scene = Scene { selected: Some(Uuid::new_v4()), ..Scene::still(&[], &bg) };
    let svg = overlay_svg(&scene, RenderMode::Interactive);
    assert!(!svg.contains("hm-selection-ring"));
}

#[test]
fn scene_from_engine_captures_draft() {
    let mut engine = Engine::new(Uuid::new_v4(), FixedViewport::mounted(ScreenRect::sized(400.0, 300.0)));
    engine.on_pointer_down(Point::new(40.0, 30.0), PointerKind::Mouse);
    let scene = Scene::from_engine(&engine);
    let draft = scene.draft.unwrap();
    assert!((draft.fx - 0.1).abs() < 1e-9);
    assert!(scene.selected.is_none());
}

// =============================================================
// escape_xml
// =============================================================

#[test]
fn escape_xml_handles_all_specials() {
    assert_eq!(escape_xml(r#"<a & 'b' "c">"#), "&lt;a &amp; &apos;b&apos; &quot;c&quot;&gt;");
}

#[test]
fn escape_xml_passes_plain_text() {
    assert_eq!(escape_xml("itchy paw"), "itchy paw");
}
