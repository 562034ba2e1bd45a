//! Display color generation for new groups.
//!
//! Colors are picked in HSL so they come out vivid and legible: any hue,
//! saturation 60-90%, lightness 45-65%, then converted to the `rgba(...)`
//! string the UI stores verbatim.

use rand::Rng;

/// Semi-transparent alpha shared by all generated colors.
const ALPHA: &str = "0.4";

pub fn random_color() -> String {
  let mut rng = rand::thread_rng();
  let hue = rng.gen_range(0..360) as f32;
  let saturation = rng.gen_range(60..=90) as f32 / 100.0;
  let lightness = rng.gen_range(45..=65) as f32 / 100.0;
  let (r, g, b) = hsl_to_rgb(hue, saturation, lightness);
  format!("rgba({r}, {g}, {b}, {ALPHA})")
}

/// Convert HSL (hue 0-360, saturation/lightness 0-1) to RGB bytes.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
  if s == 0.0 {
    let v = (l * 255.0).round() as u8;
    return (v, v, v);
  }

  let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
  let p = 2.0 * l - q;
  let h = h / 360.0;

  let channel = |t: f32| -> u8 {
    let t = if t < 0.0 {
      t + 1.0
    } else if t > 1.0 {
      t - 1.0
    } else {
      t
    };
    let v = if t < 1.0 / 6.0 {
      p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
      q
    } else if t < 2.0 / 3.0 {
      p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
      p
    };
    (v * 255.0).round() as u8
  };

  (channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}
