//! RMSD-optimal rigid superposition of two paired point sets.
//!
//! Accumulates `(x, y)` pairs and, on demand, finds the rotation `M` and
//! translation minimizing `Σ |M·(x - c0) + c1 - y|²` by diagonalizing the
//! covariance matrix with cyclic Jacobi rotations. This is the same idea as the
//! classic Kabsch algorithm, expressed without an SVD routine so the whole solver
//! stays self-contained in 3x3 arithmetic.

use crate::{Matrix3x3, Vec3};

const JACOBI_TOLERANCE: f64 = 1e-12;
const REFLECTION_THRESHOLD: f64 = 1e-8;
const MAX_SWEEPS: usize = 100;

/// An append-only bag of paired 3D vectors plus a lazily-computed alignment.
///
/// Any [`Superposition::append`] call invalidates the cached alignment; any
/// observer (`rmsd`, `rmsd100`, `centroids`, `rotation`) recomputes it first if
/// stale. This mirrors the reference engine's `upToDate` flag contract.
pub struct Superposition {
    pairs: Vec<(Vec3, Vec3)>,
    cache: Option<Alignment>,
}

#[derive(Clone)]
struct Alignment {
    centroid_x: Vec3,
    centroid_y: Vec3,
    rotation: Matrix3x3,
    rmsd: f64,
    rmsd100: f64,
    det_x: f64,
}

impl Default for Superposition {
    fn default() -> Self { Superposition::new() }
}

impl Superposition {
    pub fn new() -> Superposition { Superposition { pairs: Vec::new(), cache: None } }

    /// Adds a pair `(x, y)` and marks the cached alignment stale.
    pub fn append(&mut self, x: Vec3, y: Vec3) {
        self.pairs.push((x, y));
        self.cache = None;
    }

    pub fn len(&self) -> usize { self.pairs.len() }
    pub fn is_empty(&self) -> bool { self.pairs.is_empty() }

    fn ensure_cached(&mut self) -> &Alignment {
        if self.cache.is_none() {
            self.cache = Some(Self::compute(&self.pairs));
        }
        self.cache.as_ref().unwrap()
    }

    /// Root-mean-square deviation of the optimal alignment.
    ///
    /// ```
    /// use jess_geom::{Superposition, Vec3};
    /// let mut sup = Superposition::new();
    /// let p = Vec3::new(1.0, 2.0, 3.0);
    /// sup.append(p, p);
    /// assert_eq!(sup.rmsd(), 0.0);
    /// ```
    pub fn rmsd(&mut self) -> f64 { self.ensure_cached().rmsd }

    /// RMSD normalized for the number of paired atoms: `rmsd / (1 + 0.5 ln(n/100))`.
    pub fn rmsd100(&mut self) -> f64 { self.ensure_cached().rmsd100 }

    /// Centroids of the `x` set and the `y` set, respectively.
    pub fn centroids(&mut self) -> (Vec3, Vec3) {
        let a = self.ensure_cached();
        (a.centroid_x, a.centroid_y)
    }

    /// The rotation `M` with `y ≈ M·(x - centroid_x) + centroid_y`.
    pub fn rotation(&mut self) -> Matrix3x3 { self.ensure_cached().rotation }

    /// Determinant of the (uncentred) cross-covariance `Aᵀ B`; a reflected pairing
    /// (improper alignment) has `det < 0`. Callers should report a diagnostic when
    /// `rotation().det()` is not close to `+1`.
    pub fn covariance_det(&mut self) -> f64 { self.ensure_cached().det_x }

    /// Transforms `x` into the `y` frame using the cached alignment.
    pub fn transform(&mut self, x: &Vec3) -> Vec3 {
        let a = self.ensure_cached().clone();
        let mut centred = *x;
        centred -= &a.centroid_x;
        let mut out = a.rotation.mul_vec(&centred);
        out += &a.centroid_y;
        out
    }

    fn compute(pairs: &[(Vec3, Vec3)]) -> Alignment {
        let n = pairs.len();
        if n == 0 {
            return Alignment {
                centroid_x: Vec3::from_float(0.0),
                centroid_y: Vec3::from_float(0.0),
                rotation: Matrix3x3::identity(),
                rmsd: 0.0,
                rmsd100: 0.0,
                det_x: 1.0,
            };
        }

        let mut centroid_x = Vec3::from_float(0.0);
        let mut centroid_y = Vec3::from_float(0.0);
        for (x, y) in pairs {
            centroid_x += x;
            centroid_y += y;
        }
        centroid_x /= n as f64;
        centroid_y /= n as f64;

        if n == 1 {
            return Alignment {
                centroid_x,
                centroid_y,
                rotation: Matrix3x3::identity(),
                rmsd: 0.0,
                rmsd100: 0.0,
                det_x: 1.0,
            };
        }

        let centred: Vec<(Vec3, Vec3)> = pairs
            .iter()
            .map(|(x, y)| {
                let mut cx = *x;
                cx -= &centroid_x;
                let mut cy = *y;
                cy -= &centroid_y;
                (cx, cy)
            })
            .collect();

        // Covariance X = Aᵀ B, accumulated column-by-column: X[i][j] = Σ A_k[i] B_k[j].
        let mut x_cov = Matrix3x3::new();
        let mut sum_a2 = 0.0;
        let mut sum_b2 = 0.0;
        for (a, b) in &centred {
            for i in 0..3 {
                for j in 0..3 {
                    x_cov.set(i, j, x_cov.at(i, j) + a[i] * b[j]);
                }
            }
            sum_a2 += a.length_squared();
            sum_b2 += b.length_squared();
        }

        let w = x_cov.transpose().mul_mat(&x_cov);
        let (p, eigen) = jacobi_eigen_symmetric(&w);
        let det_x = x_cov.det();

        let mut sqrt_e = [eigen[0].max(0.0).sqrt(), eigen[1].max(0.0).sqrt(), eigen[2].max(0.0).sqrt()];
        let mut sum_e: f64 = sqrt_e.iter().sum();

        let reflected = det_x < REFLECTION_THRESHOLD;
        if reflected {
            let min_idx = (0..3).min_by(|&i, &j| eigen[i].partial_cmp(&eigen[j]).unwrap()).unwrap();
            sum_e -= 2.0 * sqrt_e[min_idx];
            sqrt_e[min_idx] = -sqrt_e[min_idx];
        }

        let rmsd = ((sum_a2 + sum_b2 - 2.0 * sum_e).max(0.0) / n as f64).sqrt();
        let rmsd100 = rmsd / (1.0 + 0.5 * (n as f64 / 100.0).ln());

        // T[i,j] = Σ_k X[i,k] P[k,j] / factor(j); M[i,j] = Σ_k P[i,k] T[j,k].
        let mut t = Matrix3x3::new();
        for i in 0..3 {
            for j in 0..3 {
                let mut s = 0.0;
                for k in 0..3 {
                    s += x_cov.at(i, k) * p.at(k, j);
                }
                let factor = if sqrt_e[j].abs() > 1e-300 { sqrt_e[j] } else { 1.0 };
                t.set(i, j, s / factor);
            }
        }
        let mut rotation = Matrix3x3::new();
        for i in 0..3 {
            for j in 0..3 {
                let mut s = 0.0;
                for k in 0..3 {
                    s += p.at(i, k) * t.at(j, k);
                }
                rotation.set(i, j, s);
            }
        }

        Alignment { centroid_x, centroid_y, rotation, rmsd, rmsd100, det_x }
    }
}

/// Diagonalizes a symmetric 3x3 matrix by cyclic Jacobi sweeps over the three
/// off-diagonal positions, using the exact zeroing angle
/// `θ = ½ atan2(2W[p,q], W[q,q] − W[p,p])` at each step.
///
/// Returns `(eigenvectors, eigenvalues)` with eigenvectors as columns and
/// eigenvalues clamped to `≥ 0`.
fn jacobi_eigen_symmetric(w: &Matrix3x3) -> (Matrix3x3, [f64; 3]) {
    let mut a = *w;
    let mut v = Matrix3x3::identity();

    for _ in 0..MAX_SWEEPS {
        let off = a.at(0, 1).abs() + a.at(0, 2).abs() + a.at(1, 2).abs();
        if off < JACOBI_TOLERANCE {
            break;
        }
        for &(p, q) in &[(0usize, 1usize), (0, 2), (1, 2)] {
            rotate(&mut a, &mut v, p, q);
        }
    }

    let eigenvalues = [a.at(0, 0).max(0.0), a.at(1, 1).max(0.0), a.at(2, 2).max(0.0)];
    (v, eigenvalues)
}

fn rotate(a: &mut Matrix3x3, v: &mut Matrix3x3, p: usize, q: usize) {
    let apq = a.at(p, q);
    if apq.abs() < 1e-300 {
        return;
    }
    let theta = 0.5 * (2.0 * apq).atan2(a.at(q, q) - a.at(p, p));
    let (s, c) = theta.sin_cos();

    let third = 3 - p - q;
    let a_kp = a.at(third, p);
    let a_kq = a.at(third, q);
    let new_kp = c * a_kp - s * a_kq;
    let new_kq = s * a_kp + c * a_kq;
    a.set(third, p, new_kp);
    a.set(p, third, new_kp);
    a.set(third, q, new_kq);
    a.set(q, third, new_kq);

    let app = a.at(p, p);
    let aqq = a.at(q, q);
    let new_pp = c * c * app - 2.0 * s * c * apq + s * s * aqq;
    let new_qq = s * s * app + 2.0 * s * c * apq + c * c * aqq;
    a.set(p, p, new_pp);
    a.set(q, q, new_qq);
    a.set(p, q, 0.0);
    a.set(q, p, 0.0);

    for k in 0..3 {
        let v_kp = v.at(k, p);
        let v_kq = v.at(k, q);
        v.set(k, p, c * v_kp - s * v_kq);
        v.set(k, q, s * v_kp + c * v_kq);
    }
}
