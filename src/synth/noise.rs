//! Stochastic noise generators
//!
//! Each color is a per-sample recursive process driven by uniform white noise
//! in [-1, 1). State lives in the generator and is never shared, so two
//! sessions playing the same color evolve independently.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::NoiseColor;

/// Paul Kellet's pink filter: pole and input weight per accumulator
const PINK_POLES: [f64; 6] = [0.99886, 0.99332, 0.96900, 0.86650, 0.55000, -0.7616];
const PINK_WEIGHTS: [f64; 6] = [0.0555179, 0.0750759, 0.1538520, 0.3104856, 0.5329522, -0.0168980];
const PINK_DELAY_WEIGHT: f64 = 0.115926;
const PINK_DIRECT_WEIGHT: f64 = 0.5362;
const PINK_GAIN: f64 = 0.11;

const BROWN_STEP: f64 = 0.02;
const BROWN_GAIN: f64 = 3.5;

const AM_FEEDFORWARD: [f64; 2] = [0.7, 0.2];
const AM_FEEDBACK: f64 = 0.3;
const AM_CRACKLE_PROBABILITY: f64 = 0.03;
const AM_INTERFERENCE_STEP: f64 = 0.00005;
const AM_INTERFERENCE_GAIN: f64 = 0.15;
const AM_MIX: f64 = 0.6;
const AM_CLIP_THRESHOLD: f64 = 0.8;

/// AM radio filter memory, crackle countdown and interference phase
#[derive(Debug, Clone, Default)]
pub struct AmRadioState {
    x_prev: f64,
    y_prev: f64,
    crackle_remaining: u32,
    crackle_intensity: f64,
    interference_phase: f64,
}

/// Per-color filter state
#[derive(Debug, Clone)]
pub enum NoiseState {
    White,
    Brown { last: f64 },
    Pink { poles: [f64; 6], delayed: f64 },
    AmRadio(AmRadioState),
}

impl NoiseState {
    fn new(color: NoiseColor) -> Self {
        match color {
            NoiseColor::White => NoiseState::White,
            NoiseColor::Brown => NoiseState::Brown { last: 0.0 },
            NoiseColor::Pink => NoiseState::Pink {
                poles: [0.0; 6],
                delayed: 0.0,
            },
            NoiseColor::AmRadio => NoiseState::AmRadio(AmRadioState::default()),
        }
    }
}

/// A single noise voice with its own random stream
pub struct NoiseGenerator {
    color: NoiseColor,
    state: NoiseState,
    rng: StdRng,
}

impl NoiseGenerator {
    /// Create a generator seeded from the OS entropy source
    pub fn new(color: NoiseColor) -> Self {
        Self::from_rng(color, StdRng::from_entropy())
    }

    /// Create a reproducible generator
    pub fn with_seed(color: NoiseColor, seed: u64) -> Self {
        Self::from_rng(color, StdRng::seed_from_u64(seed))
    }

    fn from_rng(color: NoiseColor, rng: StdRng) -> Self {
        Self {
            color,
            state: NoiseState::new(color),
            rng,
        }
    }

    pub fn color(&self) -> NoiseColor {
        self.color
    }

    /// Produce the next sample
    pub fn advance(&mut self) -> f64 {
        let white = self.rng.gen_range(-1.0..1.0);

        match &mut self.state {
            NoiseState::White => white,
            NoiseState::Brown { last } => {
                *last = (*last + BROWN_STEP * white) / (1.0 + BROWN_STEP);
                *last * BROWN_GAIN
            }
            NoiseState::Pink { poles, delayed } => {
                let mut sum = 0.0;
                for ((b, pole), weight) in poles.iter_mut().zip(PINK_POLES).zip(PINK_WEIGHTS) {
                    *b = pole * *b + white * weight;
                    sum += *b;
                }
                let out = (sum + *delayed + white * PINK_DIRECT_WEIGHT) * PINK_GAIN;
                *delayed = white * PINK_DELAY_WEIGHT;
                out
            }
            NoiseState::AmRadio(state) => am_radio(state, &mut self.rng, white),
        }
    }

    /// Fill a buffer with consecutive samples
    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.advance() as f32;
        }
    }
}

fn am_radio(state: &mut AmRadioState, rng: &mut StdRng, white: f64) -> f64 {
    let filtered = AM_FEEDBACK * state.y_prev
        + AM_FEEDFORWARD[0] * white
        + AM_FEEDFORWARD[1] * state.x_prev;
    state.x_prev = white;
    state.y_prev = filtered;

    let mut y = filtered;

    if state.crackle_remaining == 0 && rng.gen::<f64>() < AM_CRACKLE_PROBABILITY {
        state.crackle_remaining = rng.gen_range(100..1600);
        state.crackle_intensity = rng.gen_range(0.3..1.0);
    }
    if state.crackle_remaining > 0 {
        let envelope = (state.crackle_remaining as f64 / 100.0).min(1.0) * state.crackle_intensity;
        y += rng.gen_range(-1.0..1.0) * envelope;
        state.crackle_remaining -= 1;
    }

    state.interference_phase += AM_INTERFERENCE_STEP;
    if state.interference_phase > 1.0 {
        state.interference_phase -= 1.0;
    }
    let phase = state.interference_phase * 2.0 * PI;
    let interference = (phase * 60.0).sin() * (phase * 15.0).sin() * AM_INTERFERENCE_GAIN;

    soft_clip(y * AM_MIX + interference)
}

/// Halve anything beyond the ±0.8 knee
fn soft_clip(x: f64) -> f64 {
    if x > AM_CLIP_THRESHOLD {
        AM_CLIP_THRESHOLD + (x - AM_CLIP_THRESHOLD) * 0.5
    } else if x < -AM_CLIP_THRESHOLD {
        -AM_CLIP_THRESHOLD + (x + AM_CLIP_THRESHOLD) * 0.5
    } else {
        x
    }
}
