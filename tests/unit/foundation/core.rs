use super::*;

#[test]
fn resolution_parses_w_by_h() {
    let r: Resolution = "240x240".parse().unwrap();
    assert_eq!(r, Resolution::new(240, 240).unwrap());

    let r: Resolution = "320x180".parse().unwrap();
    assert_eq!((r.width, r.height), (320, 180));
    assert_eq!(r.to_string(), "320x180");
}

#[test]
fn resolution_rejects_missing_separator_and_zero() {
    assert!("240".parse::<Resolution>().is_err());
    assert!("240*240".parse::<Resolution>().is_err());
    assert!("0x100".parse::<Resolution>().is_err());
    assert!("100x0".parse::<Resolution>().is_err());
    assert!("-5x100".parse::<Resolution>().is_err());
    assert!("ax100".parse::<Resolution>().is_err());
}

#[test]
fn rgb_parses_six_hex_digits() {
    let c = Rgb8::from_hex("fa7410").unwrap();
    assert_eq!(c, Rgb8::new(0xfa, 0x74, 0x10));
    assert_eq!(Rgb8::from_hex("#FFFFFF").unwrap(), Rgb8::new(255, 255, 255));
    assert_eq!(c.to_string(), "#fa7410");
}

#[test]
fn rgb_rejects_malformed_input() {
    assert!(Rgb8::from_hex("fff").is_err());
    assert!(Rgb8::from_hex("gg0000").is_err());
    assert!(Rgb8::from_hex("1234567").is_err());
    assert!(Rgb8::from_hex("").is_err());
}

#[test]
fn fit_scale_preserves_aspect_ratio() {
    let natural = Size::new(100.0, 50.0);
    let target = Resolution::new(200, 200).unwrap();
    let scale = natural.fit_scale(target);
    assert_eq!(scale, 2.0);
    assert_eq!(natural.scaled(scale), Size::new(200.0, 100.0));
    assert_eq!(natural.scaled(scale).to_pixels(), (200, 100));
}

#[test]
fn to_pixels_never_collapses_to_zero() {
    assert_eq!(Size::new(0.2, 0.4).to_pixels(), (1, 1));
    assert_eq!(Size::new(99.5, 10.4).to_pixels(), (100, 10));
}
