// THEORY:
// The `Pixel` module is the most fundamental unit of the tracker. It is a
// "dumb" data container for a single RGB pixel plus the handful of single-pixel
// color heuristics the mask extractor needs. Nothing in here looks at a
// neighbour or at a previous frame.
//
// Channel forms kept on the struct:
// - raw bytes (0..255), exactly as they came off the frame buffer
// - normalized (0..1 sRGB), the raw byte divided by 255.0, still gamma-encoded
//
// Heuristic families:
// - Hue:        angle on the color wheel in degrees [0, 360)
// - Strength:   chroma (max - min), HSV saturation (chroma / value)
// - Brightness: HSV value (max channel)
// - Encoding:   `to_hsv8`, the 8-bit HSV triple used by `ColorRange` bounds
//
// The 8-bit HSV encoding follows the common camera-tooling convention:
// H is degrees / 2 (0..=179), S and V are scaled to 0..=255. Target colors
// picked with an off-the-shelf HSV picker can be pasted in directly.

pub mod pixel {
    pub type Byte = u8;
    pub type Channel = Byte;
    pub type NormalizedChannel = f32;
    pub type Hue = f32;
    pub type Chroma = f32;
    pub type SaturationHSV = f32;
    pub type ValueHSV = f32;

    /// Largest hue code in the 8-bit HSV encoding.
    pub const HUE8_MAX: u8 = 179;

    /// A "dumb" data container representing a single RGB pixel.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The red channel value (0.0-1.0).
        pub red_normalized: NormalizedChannel,
        /// The green channel value (0.0-1.0).
        pub green_normalized: NormalizedChannel,
        /// The blue channel value (0.0-1.0).
        pub blue_normalized: NormalizedChannel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                red_normalized: red as NormalizedChannel / 255.0f32,
                green_normalized: green as NormalizedChannel / 255.0f32,
                blue_normalized: blue as NormalizedChannel / 255.0f32,
            }
        }

        #[inline]
        fn max_channel(&self) -> NormalizedChannel {
            self.red_normalized
                .max(self.green_normalized.max(self.blue_normalized))
        }

        #[inline]
        fn min_channel(&self) -> NormalizedChannel {
            self.red_normalized
                .min(self.green_normalized.min(self.blue_normalized))
        }

        /// Hue angle in degrees [0, 360).
        ///
        /// - Uses normalized sRGB channels, no linearization.
        /// - Achromatic pixels (grays) report 0.
        pub fn hue(&self) -> Hue {
            let maximum_channel = self.max_channel();
            let chroma = maximum_channel - self.min_channel();

            if chroma <= 1e-6 {
                return 0.0;
            }

            let inverse_chroma = 1.0 / chroma;

            let (base_difference, sector_offset) = if maximum_channel == self.red_normalized {
                (self.green_normalized - self.blue_normalized, 0.0)
            } else if maximum_channel == self.green_normalized {
                (self.blue_normalized - self.red_normalized, 2.0)
            } else {
                (self.red_normalized - self.green_normalized, 4.0)
            };

            let mut hue_degrees = (base_difference * inverse_chroma + sector_offset) * 60.0;
            if hue_degrees < 0.0 {
                hue_degrees += 360.0;
            }
            hue_degrees
        }

        /// Chroma (C): color purity = max(R,G,B) - min(R,G,B).
        pub fn chroma(&self) -> Chroma {
            self.max_channel() - self.min_channel()
        }

        /// HSV Value (V): brightness defined as max(R, G, B).
        pub fn value_hsv(&self) -> ValueHSV {
            self.max_channel()
        }

        /// HSV Saturation (S): chroma / value, 0 for black.
        pub fn saturation_hsv(&self) -> SaturationHSV {
            let value = self.value_hsv();
            if value <= 1e-6 {
                return 0.0;
            }
            self.chroma() / value
        }

        /// The pixel as an 8-bit HSV triple `[h, s, v]`, h in 0..=179.
        pub fn to_hsv8(&self) -> [u8; 3] {
            let hue_code = (self.hue() / 2.0).round() as u16 % (HUE8_MAX as u16 + 1);
            let saturation = (self.saturation_hsv() * 255.0).round().clamp(0.0, 255.0);
            let value = (self.value_hsv() * 255.0).round().clamp(0.0, 255.0);
            [hue_code as u8, saturation as u8, value as u8]
        }

        /// The raw channels as `[r, g, b]`.
        pub fn to_rgb8(&self) -> [u8; 3] {
            [self.red, self.green, self.blue]
        }
    }

    /// Builds a pixel from the first three bytes of an RGB-ordered slice.
    impl From<&[Byte]> for Pixel {
        fn from(bytes: &[Byte]) -> Self {
            let channel = |i: usize| bytes.get(i).copied().unwrap_or(0);
            Pixel::new(channel(0), channel(1), channel(2))
        }
    }

}
