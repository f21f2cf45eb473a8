//! Display color systems and the CIE XYZ to linear RGB transform.

use serde::Deserialize;

/// Chromaticities of a display's primaries and white point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSystem {
    red: (f32, f32),
    green: (f32, f32),
    blue: (f32, f32),
    white: (f32, f32),
}

const ILLUMINANT_C: (f32, f32) = (0.3101, 0.3162);
const ILLUMINANT_D65: (f32, f32) = (0.3127, 0.3291);
const ILLUMINANT_E: (f32, f32) = (0.333_333_33, 0.333_333_33);

pub const EBU: ColorSystem = ColorSystem {
    red: (0.64, 0.33),
    green: (0.29, 0.60),
    blue: (0.15, 0.06),
    white: ILLUMINANT_D65,
};
pub const SMPTE: ColorSystem = ColorSystem {
    red: (0.630, 0.340),
    green: (0.310, 0.595),
    blue: (0.155, 0.070),
    white: ILLUMINANT_D65,
};
pub const HDTV: ColorSystem = ColorSystem {
    red: (0.670, 0.330),
    green: (0.210, 0.710),
    blue: (0.150, 0.060),
    white: ILLUMINANT_D65,
};
pub const REC709: ColorSystem = ColorSystem {
    red: (0.64, 0.33),
    green: (0.30, 0.60),
    blue: (0.15, 0.06),
    white: ILLUMINANT_D65,
};
pub const NTSC: ColorSystem = ColorSystem {
    red: (0.67, 0.33),
    green: (0.21, 0.71),
    blue: (0.14, 0.08),
    white: ILLUMINANT_C,
};
pub const CIE: ColorSystem = ColorSystem {
    red: (0.7355, 0.2645),
    green: (0.2658, 0.7243),
    blue: (0.1669, 0.0085),
    white: ILLUMINANT_E,
};

impl ColorSystem {
    /// XYZ to linear RGB, with the matrix rows normalized so the white point
    /// maps to equal channels, and negative (out-of-gamut) results lifted by
    /// subtracting the minimum channel.
    pub fn xyz_to_rgb(&self, [x, y, z]: [f32; 3]) -> [f32; 3] {
        let (xr, yr) = self.red;
        let zr = 1f32 - xr - yr;
        let (xg, yg) = self.green;
        let zg = 1f32 - xg - yg;
        let (xb, yb) = self.blue;
        let zb = 1f32 - xb - yb;
        let (xw, yw) = self.white;
        let zw = 1f32 - xw - yw;

        let (rx, ry, rz) = (yg * zb - yb * zg, xb * zg - xg * zb, xg * yb - xb * yg);
        let (gx, gy, gz) = (yb * zr - yr * zb, xr * zb - xb * zr, xb * yr - xr * yb);
        let (bx, by, bz) = (yr * zg - yg * zr, xg * zr - xr * zg, xr * yg - xg * yr);

        let rw = (rx * xw + ry * yw + rz * zw) / yw;
        let gw = (gx * xw + gy * yw + gz * zw) / yw;
        let bw = (bx * xw + by * yw + bz * zw) / yw;

        let r = (rx * x + ry * y + rz * z) / rw;
        let g = (gx * x + gy * y + gz * z) / gw;
        let b = (bx * x + by * y + bz * z) / bw;

        let lift = 0f32.min(r).min(g).min(b);
        [r - lift, g - lift, b - lift]
    }
}

/// Configuration-facing color system selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Ebu,
    Smpte,
    Hdtv,
    Rec709,
    Ntsc,
    Cie,
}
impl ColorSpace {
    pub fn system(self) -> ColorSystem {
        match self {
            ColorSpace::Ebu => EBU,
            ColorSpace::Smpte => SMPTE,
            ColorSpace::Hdtv => HDTV,
            ColorSpace::Rec709 => REC709,
            ColorSpace::Ntsc => NTSC,
            ColorSpace::Cie => CIE,
        }
    }
}
