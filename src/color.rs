use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Chart series colors
// ---------------------------------------------------------------------------

/// Generate `n` visually distinct series colours by stepping the hue with
/// the golden angle, so neighbouring series stay far apart even for small
/// `n`.
pub fn series_palette(n: usize) -> Vec<Color32> {
    const GOLDEN_ANGLE: f32 = 137.508;

    (0..n)
        .map(|i| {
            let hue = (210.0 + i as f32 * GOLDEN_ANGLE) % 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}
