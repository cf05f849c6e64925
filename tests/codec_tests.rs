use comic_bubbles::app::{InMemorySurface, Notify, SurfaceHost};
use comic_bubbles::codec::{read_bubble_spec, write_bubble_spec, CodecError};
use comic_bubbles::core::default_bubble_spec;
use comic_bubbles::{decode_bubble_spec, encode_bubble_spec, BubbleSpec, Rect, TailSpec};
use glam::Vec2;

#[test]
fn test_attribute_value_contains_no_double_quotes() {
    let mut spec = BubbleSpec::new(
        r#"say "hi" `now`"#,
        2,
        vec![TailSpec::new(Vec2::new(10.5, 20.0), Vec2::new(5.0, 6.0), false)],
    )
    .with_order(4);
    spec.background_colors = Some(vec!["#ffeedd".into()]);

    let encoded = encode_bubble_spec(&spec).expect("Spec kodierbar");
    assert!(!encoded.contains('"'), "Attribut-Wert ohne Anführungszeichen: {encoded}");

    let decoded = decode_bubble_spec(&encoded).expect("eigene Ausgabe dekodierbar");
    assert_eq!(decoded, spec);
    assert_eq!(decoded.background_color(), Some([1.0, 238.0 / 255.0, 221.0 / 255.0, 1.0]));
}

#[test]
fn test_malformed_value_is_hard_error() {
    let result = decode_bubble_spec("{`style`:");
    assert!(matches!(result, Err(CodecError::MalformedSpec(_))));
}

#[test]
fn test_missing_attribute_reads_as_none_style() {
    let mut surface = InMemorySurface::new(Vec2::new(300.0, 200.0));
    let content = surface.add_region(Rect::new(10.0, 10.0, 50.0, 30.0), None);

    let spec = read_bubble_spec(&surface, content).expect("fehlendes Attribut ist kein Fehler");
    assert_eq!(spec, BubbleSpec::none());
    assert_eq!(spec.level, 1);
    assert!(!spec.has_outline());
}

#[test]
fn test_written_spec_reads_back_from_host() {
    let mut surface = InMemorySurface::new(Vec2::new(300.0, 200.0));
    let content_box = Rect::new(10.0, 10.0, 50.0, 30.0);
    let content = surface.add_region(content_box, None);
    let spec = default_bubble_spec("shout", content_box, surface.surface_size());

    write_bubble_spec(&mut surface, content, &spec, Notify::Silent).expect("Schreiben");

    assert_eq!(surface.write_count(content), 1);
    assert_eq!(read_bubble_spec(&surface, content).expect("Lesen"), spec);
    assert_eq!(spec.tails.len(), 1);
    let tip = spec.tails[0].tip();
    assert!((0.0..=300.0).contains(&tip.x) && (0.0..=200.0).contains(&tip.y));
}
