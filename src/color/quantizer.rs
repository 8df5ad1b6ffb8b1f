//! Seed color extraction.
//!
//! Pixels are binned into a 5-bit-per-channel histogram, the occupied space is split by
//! median cut into at most `max_colors` boxes, and each box becomes a [`Swatch`] whose
//! color is the exact mean of its pixels. Swatches are then classified into vibrant and
//! muted roles by how close their saturation and lightness sit to each role's target.

use std::cmp::Ordering;

use palette::{FromColor, Hsl, Srgb};
use serde::{Deserialize, Serialize};

use crate::{color::Argb, decode::PixelBuffer};

const SIGNIFICANT_BITS: usize = 5;
const SHIFT: usize = 8 - SIGNIFICANT_BITS;
const SIDE: usize = 1 << SIGNIFICANT_BITS;
const HISTOGRAM_LEN: usize = SIDE * SIDE * SIDE;

/// Share of the box budget spent splitting by population before switching to
/// population × volume.
const FRACTION_BY_POPULATION: f64 = 0.75;
/// Pixels more transparent than this are ignored.
const MIN_ALPHA: u8 = 125;
/// Pixels with every channel above this are treated as background white.
const WHITE_CUTOFF: u8 = 250;

const WEIGHT_SATURATION: f32 = 3.0;
const WEIGHT_LIGHTNESS: f32 = 6.5;
const WEIGHT_POPULATION: f32 = 0.5;

const TARGET_DARK_LIGHTNESS: f32 = 0.26;
const MAX_DARK_LIGHTNESS: f32 = 0.45;
const MIN_LIGHT_LIGHTNESS: f32 = 0.55;
const TARGET_LIGHT_LIGHTNESS: f32 = 0.74;
const MIN_NORMAL_LIGHTNESS: f32 = 0.3;
const TARGET_NORMAL_LIGHTNESS: f32 = 0.5;
const MAX_NORMAL_LIGHTNESS: f32 = 0.7;
const TARGET_MUTED_SATURATION: f32 = 0.3;
const MAX_MUTED_SATURATION: f32 = 0.4;
const TARGET_VIBRANT_SATURATION: f32 = 1.0;
const MIN_VIBRANT_SATURATION: f32 = 0.35;

/// Tuning knobs for swatch extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizerOptions {
    /// Only every `sample_step`-th pixel is inspected.
    pub sample_step: usize,
    /// Upper bound on the number of candidate swatches.
    pub max_colors: usize,
    /// Swatches holding less than this share of the sampled pixels are dropped.
    pub min_population_fraction: f64,
}

impl Default for QuantizerOptions {
    fn default() -> Self {
        Self {
            sample_step: 5,
            max_colors: 64,
            min_population_fraction: 0.001,
        }
    }
}

/// Visual role a swatch was selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwatchRole {
    /// Saturated, mid lightness.
    Vibrant,
    /// Saturated, light.
    LightVibrant,
    /// Saturated, dark.
    DarkVibrant,
    /// Desaturated, mid lightness.
    Muted,
    /// Desaturated, light.
    LightMuted,
    /// Desaturated, dark.
    DarkMuted,
}

/// Candidate color produced by the median cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swatch {
    /// Mean color of the pixels in the box.
    pub color: Argb,
    /// Number of sampled pixels in the box (0 for synthesized swatches).
    pub population: u32,
    /// Role assigned during classification, if any.
    pub role: Option<SwatchRole>,
}

impl Swatch {
    fn hsl(&self) -> Hsl {
        let rgb = Srgb::new(self.color.red(), self.color.green(), self.color.blue());
        Hsl::from_color(rgb.into_format::<f32>())
    }
}

struct RoleTarget {
    role: SwatchRole,
    target_lightness: f32,
    min_lightness: f32,
    max_lightness: f32,
    target_saturation: f32,
    min_saturation: f32,
    max_saturation: f32,
}

const ROLE_TARGETS: [RoleTarget; 6] = [
    RoleTarget {
        role: SwatchRole::Vibrant,
        target_lightness: TARGET_NORMAL_LIGHTNESS,
        min_lightness: MIN_NORMAL_LIGHTNESS,
        max_lightness: MAX_NORMAL_LIGHTNESS,
        target_saturation: TARGET_VIBRANT_SATURATION,
        min_saturation: MIN_VIBRANT_SATURATION,
        max_saturation: 1.0,
    },
    RoleTarget {
        role: SwatchRole::LightVibrant,
        target_lightness: TARGET_LIGHT_LIGHTNESS,
        min_lightness: MIN_LIGHT_LIGHTNESS,
        max_lightness: 1.0,
        target_saturation: TARGET_VIBRANT_SATURATION,
        min_saturation: MIN_VIBRANT_SATURATION,
        max_saturation: 1.0,
    },
    RoleTarget {
        role: SwatchRole::DarkVibrant,
        target_lightness: TARGET_DARK_LIGHTNESS,
        min_lightness: 0.0,
        max_lightness: MAX_DARK_LIGHTNESS,
        target_saturation: TARGET_VIBRANT_SATURATION,
        min_saturation: MIN_VIBRANT_SATURATION,
        max_saturation: 1.0,
    },
    RoleTarget {
        role: SwatchRole::Muted,
        target_lightness: TARGET_NORMAL_LIGHTNESS,
        min_lightness: MIN_NORMAL_LIGHTNESS,
        max_lightness: MAX_NORMAL_LIGHTNESS,
        target_saturation: TARGET_MUTED_SATURATION,
        min_saturation: 0.0,
        max_saturation: MAX_MUTED_SATURATION,
    },
    RoleTarget {
        role: SwatchRole::LightMuted,
        target_lightness: TARGET_LIGHT_LIGHTNESS,
        min_lightness: MIN_LIGHT_LIGHTNESS,
        max_lightness: 1.0,
        target_saturation: TARGET_MUTED_SATURATION,
        min_saturation: 0.0,
        max_saturation: MAX_MUTED_SATURATION,
    },
    RoleTarget {
        role: SwatchRole::DarkMuted,
        target_lightness: TARGET_DARK_LIGHTNESS,
        min_lightness: 0.0,
        max_lightness: MAX_DARK_LIGHTNESS,
        target_saturation: TARGET_MUTED_SATURATION,
        min_saturation: 0.0,
        max_saturation: MAX_MUTED_SATURATION,
    },
];

/// Pick the vibrant representative of an image, or `fallback` when nothing qualifies.
///
/// Pure and deterministic: the same pixels and options always produce the same color.
pub fn extract_seed_color(pixels: &PixelBuffer, options: &QuantizerOptions, fallback: Argb) -> Argb {
    extract_swatches(pixels, options)
        .into_iter()
        .find(|swatch| swatch.role == Some(SwatchRole::Vibrant))
        .map_or(fallback, |swatch| swatch.color)
}

/// Median-cut the image and classify the candidates, most populous first.
pub fn extract_swatches(pixels: &PixelBuffer, options: &QuantizerOptions) -> Vec<Swatch> {
    let (histogram, sampled) = build_histogram(pixels, options.sample_step);
    let Some(initial) = ColorBox::fit(&histogram, [0; 3], [SIDE - 1; 3]) else {
        return Vec::new();
    };

    let max_colors = options.max_colors.max(1);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let by_population = ((max_colors as f64) * FRACTION_BY_POPULATION).ceil() as usize;

    let mut boxes = vec![initial];
    split_until(&mut boxes, &histogram, by_population, |b| b.population);
    split_until(&mut boxes, &histogram, max_colors, |b| b.population * b.volume());

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let min_population = ((f64::from(sampled) * options.min_population_fraction).ceil() as u64).max(1);

    let mut swatches: Vec<Swatch> = boxes
        .iter()
        .filter(|b| b.population >= min_population)
        .map(|b| Swatch {
            color: b.average(&histogram),
            population: u32::try_from(b.population).unwrap_or(u32::MAX),
            role: None,
        })
        .collect();
    swatches.sort_by(|a, b| {
        b.population
            .cmp(&a.population)
            .then_with(|| a.color.cmp(&b.color))
    });

    classify(&mut swatches);
    swatches
}

/// Assign roles in priority order, each swatch taking at most one role, then fill a
/// missing Vibrant from its dark or light sibling.
fn classify(swatches: &mut Vec<Swatch>) {
    let max_population = swatches.iter().map(|s| s.population).max().unwrap_or(0);

    for target in &ROLE_TARGETS {
        if let Some(index) = best_for(swatches, target, max_population) {
            swatches[index].role = Some(target.role);
        }
    }

    let has_vibrant = swatches
        .iter()
        .any(|s| s.role == Some(SwatchRole::Vibrant));
    if has_vibrant {
        return;
    }

    let sibling = [SwatchRole::DarkVibrant, SwatchRole::LightVibrant]
        .into_iter()
        .find_map(|role| swatches.iter().find(|s| s.role == Some(role)).copied());
    if let Some(sibling) = sibling {
        let hsl = sibling.hsl();
        let relit: Srgb = Srgb::from_color(Hsl::new(
            hsl.hue.into_positive_degrees(),
            hsl.saturation,
            TARGET_NORMAL_LIGHTNESS,
        ));
        let rgb = relit.into_format::<u8>();
        swatches.push(Swatch {
            color: Argb::from_rgb(rgb.red, rgb.green, rgb.blue),
            population: 0,
            role: Some(SwatchRole::Vibrant),
        });
    }
}

/// Highest scoring unassigned swatch inside the target's windows.
fn best_for(swatches: &[Swatch], target: &RoleTarget, max_population: u32) -> Option<usize> {
    swatches
        .iter()
        .enumerate()
        .filter(|(_, swatch)| swatch.role.is_none())
        .filter_map(|(index, swatch)| {
            let hsl = swatch.hsl();
            let in_window = (target.min_saturation..=target.max_saturation)
                .contains(&hsl.saturation)
                && (target.min_lightness..=target.max_lightness).contains(&hsl.lightness);
            in_window.then(|| Candidate {
                index,
                score: score(
                    hsl.saturation,
                    hsl.lightness,
                    swatch.population,
                    max_population,
                    target,
                ),
                population: swatch.population,
                saturation: hsl.saturation,
            })
        })
        .max_by(rank)
        .map(|candidate| candidate.index)
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    score: f32,
    population: u32,
    saturation: f32,
}

/// Orders candidates by score. Ties go to the larger population, then to the higher
/// saturation, then to the earlier (more populous box) index.
fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    a.score
        .partial_cmp(&b.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.population.cmp(&b.population))
        .then_with(|| a.saturation.partial_cmp(&b.saturation).unwrap_or(Ordering::Equal))
        .then_with(|| b.index.cmp(&a.index))
}

fn score(
    saturation: f32,
    lightness: f32,
    population: u32,
    max_population: u32,
    target: &RoleTarget,
) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let population_share = if max_population == 0 {
        0.0
    } else {
        population as f32 / max_population as f32
    };
    let weighted = WEIGHT_SATURATION * (1.0 - (saturation - target.target_saturation).abs())
        + WEIGHT_LIGHTNESS * (1.0 - (lightness - target.target_lightness).abs())
        + WEIGHT_POPULATION * population_share;
    weighted / (WEIGHT_SATURATION + WEIGHT_LIGHTNESS + WEIGHT_POPULATION)
}

#[derive(Debug, Clone, Copy, Default)]
struct Bin {
    count: u64,
    red: u64,
    green: u64,
    blue: u64,
}

fn build_histogram(pixels: &PixelBuffer, sample_step: usize) -> (Vec<Bin>, u32) {
    let mut histogram = vec![Bin::default(); HISTOGRAM_LEN];
    let mut sampled = 0u32;

    for &[r, g, b, a] in pixels.pixels().iter().step_by(sample_step.max(1)) {
        if a < MIN_ALPHA || (r > WHITE_CUTOFF && g > WHITE_CUTOFF && b > WHITE_CUTOFF) {
            continue;
        }
        let bin = &mut histogram[bin_index([
            usize::from(r) >> SHIFT,
            usize::from(g) >> SHIFT,
            usize::from(b) >> SHIFT,
        ])];
        bin.count += 1;
        bin.red += u64::from(r);
        bin.green += u64::from(g);
        bin.blue += u64::from(b);
        sampled += 1;
    }

    (histogram, sampled)
}

#[inline]
fn bin_index([r, g, b]: [usize; 3]) -> usize {
    (r << (2 * SIGNIFICANT_BITS)) | (g << SIGNIFICANT_BITS) | b
}

/// Axis-aligned region of the histogram, always shrunk to its occupied bins.
#[derive(Debug, Clone, Copy)]
struct ColorBox {
    min: [usize; 3],
    max: [usize; 3],
    population: u64,
}

impl ColorBox {
    /// Smallest box inside `[min, max]` covering every occupied bin, if any.
    fn fit(histogram: &[Bin], min: [usize; 3], max: [usize; 3]) -> Option<Self> {
        let mut lo = [usize::MAX; 3];
        let mut hi = [0usize; 3];
        let mut population = 0;

        for r in min[0]..=max[0] {
            for g in min[1]..=max[1] {
                for b in min[2]..=max[2] {
                    let count = histogram[bin_index([r, g, b])].count;
                    if count == 0 {
                        continue;
                    }
                    population += count;
                    for (axis, value) in [r, g, b].into_iter().enumerate() {
                        lo[axis] = lo[axis].min(value);
                        hi[axis] = hi[axis].max(value);
                    }
                }
            }
        }

        (population > 0).then_some(Self {
            min: lo,
            max: hi,
            population,
        })
    }

    fn volume(&self) -> u64 {
        (0..3)
            .map(|axis| (self.max[axis] - self.min[axis] + 1) as u64)
            .product()
    }

    fn is_splittable(&self) -> bool {
        self.min != self.max
    }

    fn average(&self, histogram: &[Bin]) -> Argb {
        let mut sums = [0u64; 3];
        let mut count = 0u64;
        self.for_each_bin(|index| {
            let bin = &histogram[index];
            count += bin.count;
            sums[0] += bin.red;
            sums[1] += bin.green;
            sums[2] += bin.blue;
        });
        #[allow(clippy::cast_possible_truncation)]
        let [r, g, b] = sums.map(|sum| ((sum + count / 2) / count.max(1)).min(255) as u8);
        Argb::from_rgb(r, g, b)
    }

    fn for_each_bin(&self, mut visit: impl FnMut(usize)) {
        for r in self.min[0]..=self.max[0] {
            for g in self.min[1]..=self.max[1] {
                for b in self.min[2]..=self.max[2] {
                    visit(bin_index([r, g, b]));
                }
            }
        }
    }

    /// Cut along the longest axis near the population median, leaning toward the
    /// larger remaining side.
    fn split(&self, histogram: &[Bin]) -> Option<(Self, Self)> {
        if !self.is_splittable() {
            return None;
        }

        let axis = (0..3)
            .max_by_key(|&axis| (self.max[axis] - self.min[axis], std::cmp::Reverse(axis)))
            .unwrap_or(0);
        let (start, end) = (self.min[axis], self.max[axis]);

        let mut slices = vec![0u64; end - start + 1];
        self.for_each_bin(|index| {
            let coordinate = match axis {
                0 => index >> (2 * SIGNIFICANT_BITS),
                1 => (index >> SIGNIFICANT_BITS) & (SIDE - 1),
                _ => index & (SIDE - 1),
            };
            slices[coordinate - start] += histogram[index].count;
        });

        let half = self.population / 2;
        let mut cumulative = 0;
        let mut median = end;
        for (offset, count) in slices.iter().enumerate() {
            cumulative += count;
            if cumulative > half {
                median = start + offset;
                break;
            }
        }

        let left = median - start;
        let right = end - median;
        let cut = if left <= right {
            (median + right / 2).min(end - 1)
        } else {
            median.saturating_sub(1 + left / 2).max(start)
        };

        let mut lower_max = self.max;
        lower_max[axis] = cut;
        let mut upper_min = self.min;
        upper_min[axis] = cut + 1;

        let lower = Self::fit(histogram, self.min, lower_max)?;
        let upper = Self::fit(histogram, upper_min, self.max)?;
        Some((lower, upper))
    }
}

/// Repeatedly split the box with the largest `priority` until `target` boxes exist or
/// nothing can be split further.
fn split_until(
    boxes: &mut Vec<ColorBox>,
    histogram: &[Bin],
    target: usize,
    priority: impl Fn(&ColorBox) -> u64,
) {
    while boxes.len() < target {
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_splittable())
            .max_by_key(|(index, b)| (priority(b), std::cmp::Reverse(*index)))
            .map(|(index, _)| index);
        let Some(index) = candidate else {
            break;
        };

        let parent = boxes.swap_remove(index);
        match parent.split(histogram) {
            Some((lower, upper)) => {
                boxes.push(lower);
                boxes.push(upper);
            }
            None => {
                boxes.push(parent);
                break;
            }
        }
    }
}
