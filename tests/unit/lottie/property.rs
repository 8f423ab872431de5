use super::*;

fn parse<T: serde::de::DeserializeOwned>(json: &str) -> T {
    serde_json::from_str(json).unwrap()
}

#[test]
fn static_scalar_accepts_bare_and_wrapped_numbers() {
    let p: Property<Numbers> = parse(r#"{ "a": 0, "k": 75 }"#);
    assert_eq!(p.sample(0.0).first(), 75.0);

    let p: Property<Numbers> = parse(r#"{ "a": 0, "k": [75] }"#);
    assert_eq!(p.sample(10.0).first(), 75.0);
    assert!(!p.is_animated());
}

#[test]
fn static_vector_keeps_all_components() {
    let p: Property<Numbers> = parse(r#"{ "a": 0, "k": [10, 20, 0] }"#);
    assert_eq!(p.sample(3.0), Numbers(vec![10.0, 20.0, 0.0]));
}

#[test]
fn linear_keyframes_interpolate_and_clamp() {
    let p: Property<Numbers> = parse(
        r#"{ "a": 1, "k": [
            { "t": 0,  "s": [0, 0] },
            { "t": 10, "s": [100, 50] }
        ] }"#,
    );
    assert!(p.is_animated());
    assert_eq!(p.sample(-5.0), Numbers(vec![0.0, 0.0]));
    assert_eq!(p.sample(5.0), Numbers(vec![50.0, 25.0]));
    assert_eq!(p.sample(10.0), Numbers(vec![100.0, 50.0]));
    assert_eq!(p.sample(99.0), Numbers(vec![100.0, 50.0]));
}

#[test]
fn legacy_end_values_drive_the_segment() {
    let p: Property<Numbers> = parse(
        r#"{ "a": 1, "k": [
            { "t": 0, "s": [0], "e": [40] },
            { "t": 20 }
        ] }"#,
    );
    assert_eq!(p.sample(10.0).first(), 20.0);
    // The trailing key has no value of its own and holds the previous end.
    assert_eq!(p.sample(30.0).first(), 40.0);
}

#[test]
fn hold_keyframes_step() {
    let p: Property<Numbers> = parse(
        r#"{ "a": 1, "k": [
            { "t": 0,  "s": [1], "h": 1 },
            { "t": 10, "s": [2] }
        ] }"#,
    );
    assert_eq!(p.sample(9.9).first(), 1.0);
    assert_eq!(p.sample(10.0).first(), 2.0);
}

#[test]
fn bezier_handles_shape_the_progress() {
    let p: Property<Numbers> = parse(
        r#"{ "a": 1, "k": [
            { "t": 0, "s": [0], "o": { "x": [0.9], "y": [0] }, "i": { "x": [1], "y": [0.1] } },
            { "t": 10, "s": [100] }
        ] }"#,
    );
    // Strong ease-in: well behind linear at the midpoint.
    assert!(p.sample(5.0).first() < 40.0);
    assert_eq!(p.sample(10.0).first(), 100.0);
}

#[test]
fn unsorted_keyframes_are_ordered_by_time() {
    let p: Property<Numbers> = parse(
        r#"{ "a": 1, "k": [
            { "t": 10, "s": [10] },
            { "t": 0, "s": [0] }
        ] }"#,
    );
    assert_eq!(p.sample(5.0).first(), 5.0);
}

#[test]
fn path_property_decodes_static_and_keyframed_forms() {
    let p: Property<PathData> = parse(
        r#"{ "a": 0, "k": { "c": true, "v": [[0,0],[10,0],[10,10]], "i": [[0,0],[0,0],[0,0]], "o": [[0,0],[0,0],[0,0]] } }"#,
    );
    let d = p.sample(0.0);
    assert!(d.closed);
    assert_eq!(d.vertices.len(), 3);

    let p: Property<PathData> = parse(
        r#"{ "a": 1, "k": [
            { "t": 0,  "s": [{ "c": false, "v": [[0,0],[10,0]], "i": [[0,0],[0,0]], "o": [[0,0],[0,0]] }] },
            { "t": 10, "s": [{ "c": false, "v": [[0,10],[20,0]], "i": [[0,0],[0,0]], "o": [[0,0],[0,0]] }] }
        ] }"#,
    );
    let mid = p.sample(5.0);
    assert_eq!(mid.vertices, vec![[0.0, 5.0], [15.0, 0.0]]);
}

#[test]
fn mismatched_paths_switch_at_the_end() {
    let a = PathData {
        closed: true,
        vertices: vec![[0.0, 0.0]],
        in_tangents: vec![[0.0, 0.0]],
        out_tangents: vec![[0.0, 0.0]],
    };
    let b = PathData::default();
    assert_eq!(PathData::lerp(&a, &b, 0.5), a);
    assert_eq!(PathData::lerp(&a, &b, 1.0), b);
}

#[test]
fn empty_keyframe_list_samples_default() {
    let p: Property<Numbers> = parse(r#"{ "a": 1, "k": [] }"#);
    assert_eq!(p.sample(0.0), Numbers::default());
}
