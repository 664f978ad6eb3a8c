use eframe::egui::Color32;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    pub highlight: Color32,
    pub muted: Color32,
    /// Base colour of the drifting background orbs.
    pub orb: Color32,
    pub h1_size: f32,
    pub h2_size: f32,
    pub h3_size: f32,
    pub body_size: f32,
    pub chrome_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x0B, 0x0D, 0x12),
            foreground: Color32::from_rgb(0xC9, 0xCD, 0xD6),
            heading_color: Color32::WHITE,
            accent: Color32::from_rgb(0xFF, 0xB3, 0x47),
            highlight: Color32::from_rgb(0x3A, 0x2C, 0x10),
            muted: Color32::from_rgb(0x5C, 0x61, 0x6E),
            orb: Color32::from_rgb(0x6A, 0x4C, 0xFF),
            h1_size: 88.0,
            h2_size: 64.0,
            h3_size: 48.0,
            body_size: 36.0,
            chrome_size: 16.0,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(0xF4, 0xF1, 0xEA),
            foreground: Color32::from_rgb(0x2A, 0x2A, 0x33),
            heading_color: Color32::from_rgb(0x11, 0x12, 0x18),
            accent: Color32::from_rgb(0xC2, 0x5B, 0x12),
            highlight: Color32::from_rgb(0xFF, 0xE2, 0x9A),
            muted: Color32::from_rgb(0x8E, 0x8A, 0x80),
            orb: Color32::from_rgb(0xE8, 0x9A, 0x5A),
            h1_size: 88.0,
            h2_size: 64.0,
            h3_size: 48.0,
            body_size: 36.0,
            chrome_size: 16.0,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.name == "dark"
    }

    pub fn toggled(&self) -> Self {
        if self.is_dark() {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// The palette a slide is painted with: light slides always use the
    /// light palette.
    pub fn for_slide(&self, light: bool) -> Self {
        if light && self.is_dark() {
            Self::light()
        } else {
            self.clone()
        }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        let alpha = (opacity.clamp(0.0, 1.0) * color.a() as f32) as u8;
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
    }

    pub fn heading_size(&self, level: u8) -> f32 {
        match level {
            1 => self.h1_size,
            2 => self.h2_size,
            3 => self.h3_size,
            _ => self.body_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_scales_alpha() {
        let c = Theme::with_opacity(Color32::WHITE, 0.5);
        assert_eq!(c.a(), 127);
        assert_eq!(Theme::with_opacity(Color32::WHITE, 2.0).a(), 255);
    }

    #[test]
    fn light_slides_use_light_palette() {
        assert_eq!(Theme::dark().for_slide(true).name, "light");
        assert_eq!(Theme::dark().for_slide(false).name, "dark");
        assert_eq!(Theme::light().for_slide(true).name, "light");
        assert_eq!(Theme::from_name("unknown").name, "dark");
    }
}
