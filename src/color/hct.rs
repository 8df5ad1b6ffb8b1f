//! Hue / chroma / tone conversions.
//!
//! Hue and chroma come from CAM16 under the standard viewing conditions (D65 white,
//! `200/π` lux adapting luminance, L* 50 background, average surround). Tone is CIE L*.
//! Going back to RGB searches CAM16 lightness for the requested tone and lowers chroma
//! until the result lands inside sRGB.

use std::{f64::consts::PI, sync::LazyLock};

use super::Argb;

const SRGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.41233895, 0.35762064, 0.18051042],
    [0.2126, 0.7152, 0.0722],
    [0.01932141, 0.11916382, 0.95034478],
];

const XYZ_TO_SRGB: [[f64; 3]; 3] = [
    [3.2413774792388685, -1.5376652402851851, -0.49885366846268053],
    [-0.9691452513005321, 1.8758853451067872, 0.04156585616912061],
    [0.05562093689691305, -0.20395524564742123, 1.0571799111220335],
];

const XYZ_TO_CAM16_RGB: [[f64; 3]; 3] = [
    [0.401288, 0.650173, -0.051461],
    [-0.250268, 1.204414, 0.045854],
    [-0.002079, 0.048952, 0.953127],
];

const CAM16_RGB_TO_XYZ: [[f64; 3]; 3] = [
    [1.86206786, -1.01125463, 0.14918677],
    [0.38752654, 0.62144744, -0.00897398],
    [-0.01584150, -0.03412294, 1.04996444],
];

const WHITE_POINT_D65: [f64; 3] = [95.047, 100.0, 108.883];

/// Bisection stops once the CAM16 lightness window is narrower than this.
const LIGHTNESS_SEARCH_ENDPOINT: f64 = 0.01;
/// Bisection stops once the chroma window is narrower than this.
const CHROMA_SEARCH_ENDPOINT: f64 = 0.4;
/// Largest accepted L* error for a candidate color.
const DL_MAX: f64 = 0.2;
/// Largest accepted hue/chroma drift (CAM16-UCS ΔE) introduced by gamut clipping.
const DE_MAX: f64 = 1.0;

static STANDARD: LazyLock<ViewingConditions> = LazyLock::new(|| {
    ViewingConditions::new(
        WHITE_POINT_D65,
        200.0 / PI * y_from_lstar(50.0) / 100.0,
        50.0,
        2.0,
        false,
    )
});

/// Precomputed CAM16 environment parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewingConditions {
    n: f64,
    aw: f64,
    nbb: f64,
    ncb: f64,
    c: f64,
    nc: f64,
    rgb_d: [f64; 3],
    fl: f64,
    fl_root: f64,
    z: f64,
}

impl ViewingConditions {
    /// Conditions shared by every conversion in this crate.
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    fn new(
        white_point: [f64; 3],
        adapting_luminance: f64,
        background_lstar: f64,
        surround: f64,
        discounting: bool,
    ) -> Self {
        let rgb_w = mat_mul(&XYZ_TO_CAM16_RGB, white_point);
        let f = 0.8 + surround / 10.0;
        let c = if f >= 0.9 {
            lerp(0.59, 0.69, (f - 0.9) * 10.0)
        } else {
            lerp(0.525, 0.59, (f - 0.8) * 10.0)
        };
        let d = if discounting {
            1.0
        } else {
            f * (1.0 - (1.0 / 3.6) * ((-adapting_luminance - 42.0) / 92.0).exp())
        }
        .clamp(0.0, 1.0);
        let rgb_d = rgb_w.map(|w| d * (100.0 / w) + 1.0 - d);

        let k = 1.0 / (5.0 * adapting_luminance + 1.0);
        let k4 = k.powi(4);
        let k4f = 1.0 - k4;
        let fl = k4 * adapting_luminance + 0.1 * k4f * k4f * (5.0 * adapting_luminance).cbrt();
        let n = y_from_lstar(background_lstar) / white_point[1];
        let z = 1.48 + n.sqrt();
        let nbb = 0.725 / n.powf(0.2);

        let rgb_a = [0, 1, 2].map(|i| {
            let factor = (fl * rgb_d[i] * rgb_w[i] / 100.0).powf(0.42);
            400.0 * factor / (factor + 27.13)
        });
        let aw = (2.0 * rgb_a[0] + rgb_a[1] + 0.05 * rgb_a[2]) * nbb;

        Self {
            n,
            aw,
            nbb,
            ncb: nbb,
            c,
            nc: f,
            rgb_d,
            fl,
            fl_root: fl.powf(0.25),
            z,
        }
    }
}

/// Color appearance coordinates, with the CAM16-UCS terms used for distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cam16 {
    hue: f64,
    chroma: f64,
    j: f64,
    jstar: f64,
    astar: f64,
    bstar: f64,
}

impl Cam16 {
    /// Appearance of an RGB color.
    pub fn from_argb(argb: Argb) -> Self {
        let vc = ViewingConditions::standard();
        let xyz = xyz_from_argb(argb);
        let rgb_c = mat_mul(&XYZ_TO_CAM16_RGB, xyz);
        let rgb_a = [0, 1, 2].map(|i| {
            let adapted = vc.rgb_d[i] * rgb_c[i];
            let factor = (vc.fl * adapted.abs() / 100.0).powf(0.42);
            adapted.signum() * 400.0 * factor / (factor + 27.13)
        });
        let [r_a, g_a, b_a] = rgb_a;

        let a = (11.0 * r_a - 12.0 * g_a + b_a) / 11.0;
        let b = (r_a + g_a - 2.0 * b_a) / 9.0;
        let u = (20.0 * r_a + 20.0 * g_a + 21.0 * b_a) / 20.0;
        let p2 = (40.0 * r_a + 20.0 * g_a + b_a) / 20.0;

        let hue = b.atan2(a).to_degrees().rem_euclid(360.0);
        let ac = p2 * vc.nbb;
        let j = 100.0 * (ac / vc.aw).powf(vc.c * vc.z);

        let hue_prime = if hue < 20.14 { hue + 360.0 } else { hue };
        let e_hue = 0.25 * ((hue_prime.to_radians() + 2.0).cos() + 3.8);
        let p1 = 50000.0 / 13.0 * e_hue * vc.nc * vc.ncb;
        let t = p1 * a.hypot(b) / (u + 0.305);
        let alpha = t.powf(0.9) * (1.64 - 0.29_f64.powf(vc.n)).powf(0.73);
        let chroma = alpha * (j / 100.0).sqrt();

        Self::from_jch(j, chroma, hue)
    }

    /// Build from lightness `j`, chroma and hue in degrees.
    pub fn from_jch(j: f64, chroma: f64, hue: f64) -> Self {
        let vc = ViewingConditions::standard();
        let m = chroma * vc.fl_root;
        let hue_radians = hue.to_radians();
        let jstar = (1.0 + 100.0 * 0.007) * j / (1.0 + 0.007 * j);
        let mstar = 1.0 / 0.0228 * (1.0 + 0.0228 * m).ln();
        Self {
            hue,
            chroma,
            j,
            jstar,
            astar: mstar * hue_radians.cos(),
            bstar: mstar * hue_radians.sin(),
        }
    }

    /// Hue angle in degrees.
    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Colorfulness relative to the viewing conditions.
    pub fn chroma(&self) -> f64 {
        self.chroma
    }

    /// Lightness.
    pub fn j(&self) -> f64 {
        self.j
    }

    /// Perceptual distance in CAM16-UCS.
    pub fn distance(&self, other: &Self) -> f64 {
        let dj = self.jstar - other.jstar;
        let da = self.astar - other.astar;
        let db = self.bstar - other.bstar;
        1.41 * (dj * dj + da * da + db * db).sqrt().powf(0.63)
    }

    /// Convert back to RGB, clipping each channel into sRGB.
    pub fn to_argb(&self) -> Argb {
        let vc = ViewingConditions::standard();
        let alpha = if self.chroma == 0.0 || self.j == 0.0 {
            0.0
        } else {
            self.chroma / (self.j / 100.0).sqrt()
        };
        let t = (alpha / (1.64 - 0.29_f64.powf(vc.n)).powf(0.73)).powf(1.0 / 0.9);
        let hue_radians = self.hue.to_radians();
        let e_hue = 0.25 * ((hue_radians + 2.0).cos() + 3.8);
        let ac = vc.aw * (self.j / 100.0).powf(1.0 / vc.c / vc.z);
        let p1 = e_hue * (50000.0 / 13.0) * vc.nc * vc.ncb;
        let p2 = ac / vc.nbb;
        let (h_sin, h_cos) = hue_radians.sin_cos();
        let gamma = 23.0 * (p2 + 0.305) * t / (23.0 * p1 + 11.0 * t * h_cos + 108.0 * t * h_sin);
        let a = gamma * h_cos;
        let b = gamma * h_sin;

        let rgb_a = [
            (460.0 * p2 + 451.0 * a + 288.0 * b) / 1403.0,
            (460.0 * p2 - 891.0 * a - 261.0 * b) / 1403.0,
            (460.0 * p2 - 220.0 * a - 6300.0 * b) / 1403.0,
        ];
        let rgb_f = [0, 1, 2].map(|i| {
            let adapted = rgb_a[i];
            let base = (27.13 * adapted.abs() / (400.0 - adapted.abs())).max(0.0);
            adapted.signum() * (100.0 / vc.fl) * base.powf(1.0 / 0.42) / vc.rgb_d[i]
        });

        argb_from_xyz(mat_mul(&CAM16_RGB_TO_XYZ, rgb_f))
    }
}

/// A color expressed as hue (degrees), chroma and tone (L*).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hct {
    hue: f64,
    chroma: f64,
    tone: f64,
}

impl Hct {
    /// Measure an RGB color.
    pub fn from_argb(argb: Argb) -> Self {
        let cam = Cam16::from_argb(argb);
        Self {
            hue: cam.hue,
            chroma: cam.chroma,
            tone: lstar_from_argb(argb),
        }
    }

    /// Hue in `[0, 360)`.
    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Chroma, never negative.
    pub fn chroma(&self) -> f64 {
        self.chroma
    }

    /// Tone in `[0, 100]`.
    pub fn tone(&self) -> f64 {
        self.tone
    }

    /// Whether every coordinate is a finite number inside its documented range.
    pub fn is_valid(&self) -> bool {
        self.hue.is_finite()
            && self.chroma.is_finite()
            && self.tone.is_finite()
            && (0.0..360.0).contains(&self.hue)
            && self.chroma >= 0.0
            && (0.0..=100.0).contains(&self.tone)
    }

    /// Nearest in-gamut RGB color.
    pub fn to_argb(&self) -> Argb {
        solve_to_argb(self.hue, self.chroma, self.tone)
    }
}

/// Find the sRGB color with the given hue and tone whose chroma is as close as
/// possible to (and never above) the requested chroma.
///
/// Tones that round to 0 or 100, and chroma below 1, collapse to the gray of that tone.
pub fn solve_to_argb(hue: f64, chroma: f64, tone: f64) -> Argb {
    let tone = tone.clamp(0.0, 100.0);
    if chroma < 1.0 || tone.round() <= 0.0 || tone.round() >= 100.0 {
        return argb_from_lstar(tone);
    }

    let hue = hue.rem_euclid(360.0);
    let mut low: f64 = 0.0;
    let mut high = chroma;
    let mut mid = chroma;
    let mut first_attempt = true;
    let mut answer = None;

    while (low - high).abs() >= CHROMA_SEARCH_ENDPOINT {
        let candidate = find_cam_by_j(hue, mid, tone);
        if first_attempt {
            if let Some(cam) = candidate {
                return cam.to_argb();
            }
            first_attempt = false;
            mid = low + (high - low) / 2.0;
            continue;
        }

        match candidate {
            Some(cam) => {
                answer = Some(cam);
                low = mid;
            }
            None => high = mid,
        }
        mid = low + (high - low) / 2.0;
    }

    answer.map_or_else(|| argb_from_lstar(tone), |cam| cam.to_argb())
}

/// Bisect CAM16 lightness for a color of the requested tone, keeping the best
/// candidate whose clipped hue/chroma stay close to the request.
fn find_cam_by_j(hue: f64, chroma: f64, tone: f64) -> Option<Cam16> {
    let mut low: f64 = 0.0;
    let mut high: f64 = 100.0;
    let mut best_dl: f64 = 1000.0;
    let mut best_de: f64 = 1000.0;
    let mut best = None;

    while (low - high).abs() > LIGHTNESS_SEARCH_ENDPOINT {
        let mid = low + (high - low) / 2.0;
        let clipped = Cam16::from_jch(mid, chroma, hue).to_argb();
        let clipped_lstar = lstar_from_argb(clipped);
        let dl = (tone - clipped_lstar).abs();

        if dl < DL_MAX {
            let cam = Cam16::from_argb(clipped);
            let de = cam.distance(&Cam16::from_jch(cam.j, cam.chroma, hue));
            if de <= DE_MAX && de <= best_de {
                best_dl = dl;
                best_de = de;
                best = Some(cam);
            }
        }

        if best_dl == 0.0 && best_de == 0.0 {
            break;
        }

        if clipped_lstar < tone {
            low = mid;
        } else {
            high = mid;
        }
    }

    best
}

/// CIE L* of an RGB color.
pub fn lstar_from_argb(argb: Argb) -> f64 {
    let y = xyz_from_argb(argb)[1];
    116.0 * lab_f(y / 100.0) - 16.0
}

/// The neutral gray with the given L*.
pub fn argb_from_lstar(lstar: f64) -> Argb {
    let component = delinearized(y_from_lstar(lstar));
    Argb::from_rgb(component, component, component)
}

/// Relative luminance (0..=100) for an L* value.
pub fn y_from_lstar(lstar: f64) -> f64 {
    100.0 * lab_invf((lstar + 16.0) / 116.0)
}

/// sRGB channel to linear light in `0..=100`.
pub fn linearized(component: u8) -> f64 {
    let normalized = f64::from(component) / 255.0;
    if normalized <= 0.040449936 {
        normalized / 12.92 * 100.0
    } else {
        ((normalized + 0.055) / 1.055).powf(2.4) * 100.0
    }
}

/// Linear light in `0..=100` back to a clipped sRGB channel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn delinearized(linear: f64) -> u8 {
    let normalized = linear / 100.0;
    let encoded = if normalized <= 0.0031308 {
        normalized * 12.92
    } else {
        1.055 * normalized.powf(1.0 / 2.4) - 0.055
    };
    (encoded * 255.0).round().clamp(0.0, 255.0) as u8
}

fn xyz_from_argb(argb: Argb) -> [f64; 3] {
    let linear = [
        linearized(argb.red()),
        linearized(argb.green()),
        linearized(argb.blue()),
    ];
    mat_mul(&SRGB_TO_XYZ, linear)
}

fn argb_from_xyz(xyz: [f64; 3]) -> Argb {
    let [r, g, b] = mat_mul(&XYZ_TO_SRGB, xyz).map(delinearized);
    Argb::from_rgb(r, g, b)
}

fn lab_f(t: f64) -> f64 {
    const E: f64 = 216.0 / 24389.0;
    const KAPPA: f64 = 24389.0 / 27.0;
    if t > E {
        t.powf(1.0 / 3.0)
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

fn lab_invf(ft: f64) -> f64 {
    const E: f64 = 216.0 / 24389.0;
    const KAPPA: f64 = 24389.0 / 27.0;
    let ft3 = ft * ft * ft;
    if ft3 > E {
        ft3
    } else {
        (116.0 * ft - 16.0) / KAPPA
    }
}

#[inline]
fn mat_mul(matrix: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    matrix.map(|row| row[0] * v[0] + row[1] * v[1] + row[2] * v[2])
}

#[inline]
fn lerp(start: f64, stop: f64, amount: f64) -> f64 {
    (1.0 - amount) * start + amount * stop
}
