use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Sequential colormaps, one per cut slot
// ---------------------------------------------------------------------------

/// A sequential colormap: evenly spaced sRGB stops blended in linear light.
#[derive(Debug, Clone, Copy)]
pub struct Colormap {
    pub name: &'static str,
    stops: &'static [[u8; 3]],
}

pub const VIRIDIS: Colormap = Colormap {
    name: "viridis",
    stops: &[
        [68, 1, 84],
        [59, 82, 139],
        [33, 145, 140],
        [94, 201, 98],
        [253, 231, 37],
    ],
};

pub const WINTER: Colormap = Colormap {
    name: "winter",
    stops: &[[0, 0, 255], [0, 255, 128]],
};

pub const PLASMA: Colormap = Colormap {
    name: "plasma",
    stops: &[
        [13, 8, 135],
        [126, 3, 168],
        [204, 71, 120],
        [248, 149, 64],
        [240, 249, 33],
    ],
};

pub const GNBU: Colormap = Colormap {
    name: "GnBu",
    stops: &[
        [247, 252, 240],
        [204, 235, 197],
        [123, 204, 196],
        [43, 140, 190],
        [8, 64, 129],
    ],
};

pub const COOL: Colormap = Colormap {
    name: "cool",
    stops: &[[0, 255, 255], [255, 0, 255]],
};

/// Colormap of each slot, in slot order.
pub const SLOT_COLORMAPS: [Colormap; 5] = [VIRIDIS, WINTER, PLASMA, GNBU, COOL];

/// Colormap used for the dimension in `slot`; wraps past the last one.
pub fn colormap_for_slot(slot: usize) -> Colormap {
    SLOT_COLORMAPS[slot % SLOT_COLORMAPS.len()]
}

impl Colormap {
    /// Colour at position `t` in `[0, 1]`; out-of-range positions clamp.
    pub fn sample(&self, t: f64) -> Srgb<u8> {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) } as f32;
        let last = self.stops.len() - 1;
        let pos = t * last as f32;
        let i = (pos.floor() as usize).min(last.saturating_sub(1));
        let j = (i + 1).min(last);
        let mixed = linear(self.stops[i]).mix(linear(self.stops[j]), pos - i as f32);
        Srgb::<f32>::from_linear(mixed).into_format()
    }

    /// `n` evenly spaced colours, for a legend strip.
    pub fn gradient(&self, n: usize) -> Vec<Srgb<u8>> {
        match n {
            0 => Vec::new(),
            1 => vec![self.sample(0.5)],
            _ => (0..n)
                .map(|i| self.sample(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }
}

fn linear(rgb: [u8; 3]) -> LinSrgb {
    Srgb::new(rgb[0], rgb[1], rgb[2])
        .into_format::<f32>()
        .into_linear()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hit_first_and_last_stop() {
        assert_eq!(VIRIDIS.sample(0.0), Srgb::new(68, 1, 84));
        assert_eq!(VIRIDIS.sample(1.0), Srgb::new(253, 231, 37));
        assert_eq!(WINTER.sample(-3.0), Srgb::new(0, 0, 255));
        assert_eq!(WINTER.sample(f64::NAN), Srgb::new(0, 0, 255));
    }

    #[test]
    fn slots_cycle_through_five_maps() {
        assert_eq!(colormap_for_slot(0).name, "viridis");
        assert_eq!(colormap_for_slot(4).name, "cool");
        assert_eq!(colormap_for_slot(5).name, "viridis");
    }

    #[test]
    fn gradient_spans_the_whole_map() {
        let strip = PLASMA.gradient(3);
        assert_eq!(strip.len(), 3);
        assert_eq!(strip[0], PLASMA.sample(0.0));
        assert_eq!(strip[2], PLASMA.sample(1.0));
        assert_eq!(COOL.gradient(1), vec![COOL.sample(0.5)]);
    }
}
