use crate::tableau::{ColumnKind, Tableau};
use bigm_model::LinearProgram;

/// Outcome of a solve call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The pivot loop hit the iteration cap without converging
    IterationLimit,
}

/// Big-M single-phase simplex engine.
///
/// One engine solves one model at a time; the tableau it pivots on is private
/// to the call and rebuilt from scratch every time. Independent models can be
/// solved in parallel with independent engines.
pub struct Simplex {
    /// Maximum pivots before giving up (the pivot rule has no anti-cycling
    /// guarantee, so degenerate inputs may cycle)
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    /// Print the augmented system to stderr after setup and each pivot
    trace: bool,
    /// Solution vector, one entry per decision column, overwritten wholesale
    /// by every solve call
    pub x: Vec<f64>,
    /// Value of the true objective at `x` (never the penalized cost row)
    pub objective_value: f64,
}

impl Default for Simplex {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
            trace: false,
            x: Vec::new(),
            objective_value: 0.0,
        }
    }
}

impl Simplex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Solve `lp` in the given direction.
    ///
    /// Overwrites `self.x` and `self.objective_value` and mirrors them into
    /// `lp.x` and `lp.objective_value` (whichever engine solved the model
    /// last wins). The model's coefficients, right-hand sides and relations
    /// are never modified; sign normalization happens on the engine's own
    /// copy inside the tableau.
    pub fn optimize(&mut self, lp: &mut LinearProgram, minimize: bool) -> SolveStatus {
        self.x = vec![0.0; lp.cols];
        self.objective_value = 0.0;

        let status = if lp.is_valid() {
            let mut tableau = Tableau::build(lp, minimize);
            if self.trace {
                eprintln!("initial tableau (minimize = {minimize})\n{tableau}");
            }

            let status = self.run(&mut tableau);
            let status = self.classify(&tableau, status);
            if matches!(status, SolveStatus::Optimal | SolveStatus::Unbounded) {
                self.extract(&tableau, lp);
            }
            status
        } else {
            // a malformed model is rejected up front, never mid-pivot
            SolveStatus::Infeasible
        };

        lp.x = self.x.clone();
        lp.objective_value = self.objective_value;
        status
    }

    /// The pivot loop: pick a column, pick a row, eliminate, repeat.
    fn run(&self, tableau: &mut Tableau) -> SolveStatus {
        for iteration in 0..self.max_iterations {
            let Some(pc) = self.pivot_col(tableau) else {
                return SolveStatus::Optimal;
            };
            let Some(pr) = self.pivot_row(tableau, pc) else {
                // no positive entry in the pivot column: the objective can
                // decrease without bound along this direction
                return SolveStatus::Unbounded;
            };
            self.pivot(tableau, pr, pc);
            if self.trace {
                eprintln!("pivot {iteration}: row {pr}, col {pc}\n{tableau}");
            }
        }
        SolveStatus::IterationLimit
    }

    /// Column with the most negative reduced cost, first occurrence on ties.
    /// `None` once every reduced cost is nonnegative.
    fn pivot_col(&self, tableau: &Tableau) -> Option<usize> {
        let mut best = -self.tolerance;
        let mut col = None;
        for (j, &cost) in tableau.c.iter().enumerate() {
            if cost < best {
                best = cost;
                col = Some(j);
            }
        }
        col
    }

    /// Row minimizing `b[i] / a[i][pc]` over rows with a strictly positive
    /// pivot-column entry, first occurrence on ties. `None` means unbounded.
    fn pivot_row(&self, tableau: &Tableau, pc: usize) -> Option<usize> {
        let mut best = f64::INFINITY;
        let mut row = None;
        for i in 0..tableau.rows {
            let entry = tableau.a[i][pc];
            if entry > self.tolerance {
                let ratio = tableau.b[i] / entry;
                if ratio < best {
                    best = ratio;
                    row = Some(i);
                }
            }
        }
        row
    }

    /// Gauss-Jordan elimination on the pivot element, over the full augmented
    /// width of `A`, `B` and the cost row.
    fn pivot(&self, tableau: &mut Tableau, pr: usize, pc: usize) {
        let pivot = tableau.a[pr][pc];
        for entry in &mut tableau.a[pr] {
            *entry /= pivot;
        }
        tableau.b[pr] /= pivot;

        for i in 0..tableau.rows {
            if i == pr {
                continue;
            }
            let factor = tableau.a[i][pc];
            if factor == 0.0 {
                continue;
            }
            for j in 0..tableau.augmented_cols {
                tableau.a[i][j] -= factor * tableau.a[pr][j];
            }
            tableau.b[i] -= factor * tableau.b[pr];
        }

        let factor = tableau.c[pc];
        if factor != 0.0 {
            for j in 0..tableau.augmented_cols {
                tableau.c[j] -= factor * tableau.a[pr][j];
            }
        }

        tableau.basic[pr] = pc;
    }

    /// An artificial variable still basic at a strictly positive value means
    /// the constraints could not be satisfied, whatever the loop reported.
    fn classify(&self, tableau: &Tableau, status: SolveStatus) -> SolveStatus {
        match status {
            SolveStatus::Optimal | SolveStatus::Unbounded => {
                for i in 0..tableau.rows {
                    if tableau.kinds[tableau.basic[i]].is_artificial()
                        && tableau.b[i] > self.tolerance
                    {
                        return SolveStatus::Infeasible;
                    }
                }
                status
            }
            other => other,
        }
    }

    /// Read the decision variables off the final basis and recompute the
    /// objective from the model's true cost vector, so the reported optimum
    /// never carries Big-M artifacts.
    fn extract(&mut self, tableau: &Tableau, lp: &LinearProgram) {
        for i in 0..tableau.rows {
            if let ColumnKind::Decision(j) = tableau.kinds[tableau.basic[i]] {
                self.x[j] = tableau.b[i];
            }
        }
        self.objective_value = lp.c.iter().zip(&self.x).map(|(c, x)| c * x).sum();
    }
}
