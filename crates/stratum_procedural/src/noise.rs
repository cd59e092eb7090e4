//! # Simplex Noise Implementation
//!
//! Deterministic 3D gradient noise for volumetric terrain.
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, this implementation will produce
//! **exactly** the same values on any platform, any time. There is no
//! process-wide noise state: every generator owns its permutation table.

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0xDEAD_BEEF_CAFE_BABE)
    }
}

/// 12 gradients pointing at the edge midpoints of a cube.
const GRAD3: [[i8; 3]; 12] = [
    [1, 1, 0], [-1, 1, 0], [1, -1, 0], [-1, -1, 0],
    [1, 0, 1], [-1, 0, 1], [1, 0, -1], [-1, 0, -1],
    [0, 1, 1], [0, -1, 1], [0, 1, -1], [0, -1, -1],
];

/// Pre-computed permutation table for noise.
///
/// This is computed once from the seed and reused.
#[derive(Clone)]
struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
}

impl PermutationTable {
    /// Creates a new permutation table from a seed.
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];

        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates shuffle driven by xorshift64; a zero state would
        // never advance, so it is remapped.
        let mut rng_state = if seed.value() == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed.value() };
        for i in (1..256).rev() {
            rng_state ^= rng_state << 13;
            rng_state ^= rng_state >> 7;
            rng_state ^= rng_state << 17;

            let j = (rng_state as usize) % (i + 1);
            perm.swap(i, j);
        }

        perm.copy_within(0..256, 256);

        Self { perm }
    }

    /// Gets a permutation value (with automatic wrapping).
    #[inline]
    fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }

    /// Hashes a lattice point to a gradient index.
    #[inline]
    fn gradient_index(&self, i: usize, j: usize, k: usize) -> usize {
        self.get(i + self.get(j + self.get(k))) % 12
    }
}

/// 3D Simplex noise generator.
///
/// Produces smooth, continuous noise values roughly in the range [-1, 1].
///
/// # Example
///
/// ```rust
/// use stratum_procedural::{SimplexNoise, WorldSeed};
///
/// let noise = SimplexNoise::new(WorldSeed::new(42));
/// let value = noise.sample(1.5, -2.25, 0.75);
/// assert!(value.abs() <= 1.1);
/// ```
#[derive(Clone)]
pub struct SimplexNoise {
    /// The permutation table.
    perm_table: PermutationTable,
}

impl SimplexNoise {
    /// Skewing factor for the 3D simplex grid.
    const F3: f64 = 1.0 / 3.0;
    /// Unskewing factor for the 3D simplex grid.
    const G3: f64 = 1.0 / 6.0;

    /// Creates a new simplex noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
        }
    }

    /// Samples 3D simplex noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value roughly in the range [-1, 1].
    #[must_use]
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        // Skew input space to find the containing simplex cell
        let skew = (x + y + z) * Self::F3;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);
        let k = fast_floor(z + skew);

        let unskew = f64::from(i + j + k) * Self::G3;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);
        let z0 = z - (f64::from(k) - unskew);

        // Which of the six tetrahedra are we in?
        let (i1, j1, k1, i2, j2, k2): (i32, i32, i32, i32, i32, i32) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let x1 = x0 - f64::from(i1) + Self::G3;
        let y1 = y0 - f64::from(j1) + Self::G3;
        let z1 = z0 - f64::from(k1) + Self::G3;
        let x2 = x0 - f64::from(i2) + 2.0 * Self::G3;
        let y2 = y0 - f64::from(j2) + 2.0 * Self::G3;
        let z2 = z0 - f64::from(k2) + 2.0 * Self::G3;
        let x3 = x0 - 1.0 + 3.0 * Self::G3;
        let y3 = y0 - 1.0 + 3.0 * Self::G3;
        let z3 = z0 - 1.0 + 3.0 * Self::G3;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let kk = (k & 255) as usize;
        let (i1, j1, k1) = (i1 as usize, j1 as usize, k1 as usize);
        let (i2, j2, k2) = (i2 as usize, j2 as usize, k2 as usize);

        let table = &self.perm_table;
        let gi0 = table.gradient_index(ii, jj, kk);
        let gi1 = table.gradient_index(ii + i1, jj + j1, kk + k1);
        let gi2 = table.gradient_index(ii + i2, jj + j2, kk + k2);
        let gi3 = table.gradient_index(ii + 1, jj + 1, kk + 1);

        let n0 = contribution(x0, y0, z0, gi0);
        let n1 = contribution(x1, y1, z1, gi1);
        let n2 = contribution(x2, y2, z2, gi2);
        let n3 = contribution(x3, y3, z3, gi3);

        // Scale the sum to roughly [-1, 1]
        32.0 * (n0 + n1 + n2 + n3)
    }
}

/// Calculates the contribution from one corner of the simplex.
#[inline]
fn contribution(x: f64, y: f64, z: f64, gradient_index: usize) -> f64 {
    let t = 0.6 - x * x - y * y - z * z;
    if t < 0.0 {
        0.0
    } else {
        let grad = GRAD3[gradient_index];
        let t2 = t * t;
        t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]) + z * f64::from(grad[2]))
    }
}

/// Fast floor function.
///
/// Faster than `f64::floor()` for our use case.
#[inline]
fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) { xi - 1 } else { xi }
}
