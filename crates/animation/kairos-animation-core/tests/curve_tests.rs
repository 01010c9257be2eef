use approx::assert_relative_eq;
use kairos_animation_core::{
    AnimationError, Curve, CurveKind, Interval, KeyFrame, Time, Type, TypeKind, Value,
};

fn num(curve: &Curve, t: f64) -> f64 {
    curve
        .get_value(Time::new(t), &Type::number())
        .as_number()
        .expect("number")
}

fn linear(points: &[(f64, f64)]) -> Curve {
    let frames: Vec<KeyFrame> = points
        .iter()
        .map(|(t, v)| KeyFrame::new(*t, Value::Number(*v)))
        .collect();
    Curve::linear(&Type::number(), Some(&frames)).expect("valid frames")
}

#[test]
fn linear_hits_keyframes_and_clamps() {
    let c = linear(&[(0.0, 3.0), (2.0, 7.0), (6.0, -1.0)]);
    assert_eq!(num(&c, 0.0), 3.0);
    assert_eq!(num(&c, 2.0), 7.0);
    assert_eq!(num(&c, 6.0), -1.0);
    assert_eq!(num(&c, -10.0), 3.0);
    assert_eq!(num(&c, 60.0), -1.0);
    assert_relative_eq!(num(&c, 1.0), 5.0);
    assert_relative_eq!(num(&c, 4.0), 3.0);
}

#[test]
fn linear_converts_to_boolean() {
    let c = linear(&[(0.0, 0.0), (1.0, 1.0)]);
    assert!(c.is_type_supported(&Type::boolean()));
    assert_eq!(c.get_value(Time::new(0.25), &Type::boolean()), Value::Bool(false));
    assert_eq!(c.get_value(Time::new(0.75), &Type::boolean()), Value::Bool(true));
}

#[test]
fn step_holds_value_until_next_keyframe() {
    let frames = vec![
        KeyFrame::new(1.0, Value::vec2(1.0, 1.0)),
        KeyFrame::new(2.0, Value::vec2(2.0, 2.0)),
        KeyFrame::new(4.0, Value::vec2(4.0, 4.0)),
    ];
    let c = Curve::step(&Type::vector2(), Some(&frames)).unwrap();
    for (i, window) in frames.windows(2).enumerate() {
        let (lo, hi) = (window[0].time.as_f64(), window[1].time.as_f64());
        for k in 0..10 {
            let t = lo + (hi - lo) * k as f64 / 10.0;
            assert_eq!(c.get_value(Time::new(t), &Type::vector2()), frames[i].value, "t={t}");
        }
    }
    assert_eq!(c.get_value(Time::new(0.0), &Type::vector2()), frames[0].value);
    assert_eq!(c.get_value(Time::new(9.0), &Type::vector2()), frames[2].value);
}

#[test]
fn step_invariance_is_contiguous() {
    let frames = vec![
        KeyFrame::new(0.0, Value::Bool(false)),
        KeyFrame::new(1.0, Value::Bool(true)),
    ];
    let c = Curve::step(&Type::boolean(), Some(&frames)).unwrap();
    let regions: Vec<Interval> = c
        .get_invariance(Interval::UNIVERSAL)
        .intervals()
        .copied()
        .collect();
    assert_eq!(
        regions,
        vec![
            Interval::new(Time::MIN, Time::new(1.0), false, true),
            Interval::new(Time::new(1.0), Time::MAX, false, false),
        ]
    );
}

#[test]
fn every_region_reaches_into_the_requested_interval() {
    let c = linear(&[(0.0, 0.0), (10.0, 1.0)]);
    for query in [
        Interval::closed(-5.0, -1.0),
        Interval::closed(2.0, 3.0),
        Interval::closed(-1.0, 11.0),
        Interval::closed(12.0, 13.0),
    ] {
        for region in c.get_invariance(query).intervals() {
            assert!(region.is_proper());
            assert!(!region.get_intersection(&query).is_empty(), "{region} vs {query}");
        }
    }
}

#[test]
fn slerp_stays_on_the_unit_sphere() {
    let frames = vec![
        KeyFrame::new(0.0, Value::vec4(0.0, 0.0, 0.0, 1.0)),
        KeyFrame::new(1.0, Value::vec4(1.0, 0.0, 0.0, 0.0)),
        KeyFrame::new(2.0, Value::vec4(0.0, 1.0, 0.0, 0.0)),
    ];
    let c = Curve::slerp(Some(&frames)).unwrap();
    for k in 0..=20 {
        let t = k as f64 * 0.1;
        let Value::Vec4(q) = c.get_value(Time::new(t), &Type::vector4()) else {
            panic!("expected vec4");
        };
        let norm = q.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-9);
    }
    assert_eq!(c.key_frames().unwrap().len(), 3);
    assert_eq!(c.value_type(), Type::vector4());
}

#[test]
fn composite_follows_its_children() {
    let x = linear(&[(0.0, 0.0), (4.0, 4.0)]);
    let y = Curve::constant(&Type::number(), Some(Value::Number(-1.0))).unwrap();
    let flag = Curve::constant(&Type::boolean(), Some(Value::Bool(true))).unwrap();
    let c = Curve::composite(&Type::vector3(), Some(vec![x.clone(), y, flag])).unwrap();
    assert_eq!(
        c.get_value(Time::new(1.0), &Type::vector3()),
        Value::vec3(1.0, -1.0, 1.0)
    );
    assert!(matches!(&*c.kind(), CurveKind::Composite(inner) if inner.len() == 3));
    assert_eq!(c.child(0), Some(x));
}

#[test]
fn mutations_must_match_the_variant() {
    let c = linear(&[(0.0, 0.0), (1.0, 1.0)]);
    assert!(matches!(
        c.set_constant_value(Value::Number(1.0)),
        Err(AnimationError::UnsupportedOperation { .. })
    ));
    assert!(matches!(
        c.set_child(0, linear(&[(0.0, 0.0), (1.0, 1.0)])),
        Err(AnimationError::UnsupportedOperation { .. })
    ));
    assert!(matches!(
        c.set_key_frames(&[KeyFrame::new(1.0, Value::Number(0.0)), KeyFrame::new(0.0, Value::Number(1.0))]),
        Err(AnimationError::InvalidKeyFrames { .. })
    ));
    assert_eq!(num(&c, 0.5), 0.5);
}

#[test]
fn registry_rejects_duplicates_and_unknown_names() {
    let angle = Type::register("curve_tests.angle", TypeKind::Number).unwrap();
    assert_eq!(Type::find("curve_tests.angle").unwrap(), angle);
    assert_ne!(angle, Type::number());
    assert!(matches!(
        Type::register("curve_tests.angle", TypeKind::Number),
        Err(AnimationError::DuplicateType { .. })
    ));
    assert!(matches!(
        Type::register("number", TypeKind::Number),
        Err(AnimationError::DuplicateType { .. })
    ));
    assert!(matches!(
        Type::find("curve_tests.missing"),
        Err(AnimationError::UnknownType { .. })
    ));
    assert_eq!(Type::find("vector3").unwrap(), Type::vector3());

    // identity, not structure: a registered number type is a different type
    let c = Curve::constant(&angle, Some(Value::Number(0.5))).unwrap();
    assert!(c.is_type_supported(&angle));
    assert!(!c.is_type_supported(&Type::string()));
}
