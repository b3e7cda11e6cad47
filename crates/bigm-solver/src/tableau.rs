use bigm_model::{LinearProgram, Relation};
use std::fmt;

/// What an augmented column stands for. The payload is the column's ordinal
/// within its own kind (the j-th decision variable, the i-th slack, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Decision(usize),
    Slack(usize),
    Surplus(usize),
    Artificial(usize),
}

impl ColumnKind {
    pub fn is_artificial(self) -> bool {
        matches!(self, ColumnKind::Artificial(_))
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Decision(j) => write!(f, "x{j}"),
            ColumnKind::Slack(i) => write!(f, "s{i}"),
            ColumnKind::Surplus(i) => write!(f, "u{i}"),
            ColumnKind::Artificial(i) => write!(f, "a{i}"),
        }
    }
}

/// The augmented standard-form tableau for one solve call.
///
/// Built from scratch at the start of every solve, mutated in place by each
/// pivot, and discarded when the loop terminates. The source model is copied
/// during construction and never written to.
pub struct Tableau {
    pub rows: usize,
    /// Number of decision columns (the model's `cols`)
    pub decision_cols: usize,
    pub augmented_cols: usize,
    /// rows x augmented_cols constraint coefficients
    pub a: Vec<Vec<f64>>,
    /// Right-hand sides, sign-normalized so every entry starts >= 0
    pub b: Vec<f64>,
    /// Reduced costs, one per augmented column
    pub c: Vec<f64>,
    /// What each augmented column stands for
    pub kinds: Vec<ColumnKind>,
    /// Per row, the augmented column currently basic in that row
    pub basic: Vec<usize>,
    /// The penalty constant, 0 when no artificial column was needed
    pub big_m: f64,
}

impl Tableau {
    /// Build the augmented tableau for `lp` in the given direction.
    ///
    /// Rows with a negative right-hand side are sign-normalized on an owned
    /// copy: coefficients and rhs negated, `<=`/`>=` flipped, `==` kept.
    /// Per row, `<=` contributes a slack column (basic), `==` an artificial
    /// column (basic, penalized), and `>=` an artificial column (basic,
    /// penalized) followed by a `-1` surplus column.
    pub fn build(lp: &LinearProgram, minimize: bool) -> Self {
        let rows = lp.rows;
        let cols = lp.cols;

        // sign normalization, on copies
        let mut a = lp.a.clone();
        let mut b = lp.b.clone();
        let mut relations = lp.relations.clone();
        for i in 0..rows {
            if b[i] < 0.0 {
                b[i] = -b[i];
                relations[i] = relations[i].flipped();
                for coeff in &mut a[i] {
                    *coeff = -*coeff;
                }
            }
        }

        let mut extras = 0;
        let mut needs_big_m = false;
        for relation in &relations {
            match relation {
                Relation::Le => extras += 1,
                Relation::Eq => {
                    extras += 1;
                    needs_big_m = true;
                }
                Relation::Ge => {
                    extras += 2;
                    needs_big_m = true;
                }
            }
        }

        // M must dominate any feasible objective contribution; 128x the
        // largest magnitude in the normalized system leaves plenty of room.
        let big_m = if needs_big_m {
            let mut max = 1.0f64;
            for row in &a {
                for &coeff in row {
                    max = max.max(coeff.abs());
                }
            }
            for &rhs in &b {
                max = max.max(rhs.abs());
            }
            for &cost in &lp.c {
                max = max.max(cost.abs());
            }
            max * 128.0
        } else {
            0.0
        };

        let augmented_cols = cols + extras;
        let mut tableau = Tableau {
            rows,
            decision_cols: cols,
            augmented_cols,
            a: vec![vec![0.0; augmented_cols]; rows],
            b,
            c: vec![0.0; augmented_cols],
            kinds: (0..cols).map(ColumnKind::Decision).collect(),
            basic: vec![0; rows],
            big_m,
        };

        // decision costs, sign-flipped for maximization
        for j in 0..cols {
            tableau.c[j] = if minimize { lp.c[j] } else { -lp.c[j] };
        }

        let mut next = cols;
        let mut n_slack = 0;
        let mut n_surplus = 0;
        let mut n_artificial = 0;
        for i in 0..rows {
            tableau.a[i][..cols].copy_from_slice(&a[i]);

            match relations[i] {
                Relation::Le => {
                    tableau.a[i][next] = 1.0;
                    tableau.basic[i] = next;
                    tableau.kinds.push(ColumnKind::Slack(n_slack));
                    n_slack += 1;
                    next += 1;
                }
                Relation::Eq => {
                    tableau.a[i][next] = 1.0;
                    tableau.basic[i] = next;
                    tableau.c[next] = big_m;
                    tableau.kinds.push(ColumnKind::Artificial(n_artificial));
                    n_artificial += 1;
                    next += 1;
                }
                Relation::Ge => {
                    tableau.a[i][next] = 1.0;
                    tableau.basic[i] = next;
                    tableau.c[next] = big_m;
                    tableau.kinds.push(ColumnKind::Artificial(n_artificial));
                    n_artificial += 1;
                    next += 1;

                    tableau.a[i][next] = -1.0;
                    tableau.kinds.push(ColumnKind::Surplus(n_surplus));
                    n_surplus += 1;
                    next += 1;
                }
            }
        }

        // Big-M row elimination: subtract M times each artificial row across
        // the full augmented width, so every basic column starts with a zero
        // reduced cost and surplus columns carry the +M they owe.
        for i in 0..rows {
            if tableau.kinds[tableau.basic[i]].is_artificial() {
                for j in 0..augmented_cols {
                    tableau.c[j] -= big_m * tableau.a[i][j];
                }
            }
        }

        tableau
    }

    /// How many rows currently have an artificial basic variable. Recomputed
    /// by scanning the basis rather than patched incrementally.
    pub fn artificial_count(&self) -> usize {
        self.basic
            .iter()
            .filter(|&&col| self.kinds[col].is_artificial())
            .count()
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &cost in &self.c {
            write!(f, "{cost:10.2} ")?;
        }
        writeln!(f, "| C")?;
        for i in 0..self.rows {
            for &coeff in &self.a[i] {
                write!(f, "{coeff:10.2} ")?;
            }
            writeln!(f, "| {:10.2}  basic {}", self.b[i], self.kinds[self.basic[i]])?;
        }
        for kind in &self.kinds {
            write!(f, "{:>10} ", kind.to_string())?;
        }
        writeln!(f, "|")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigm_model::LinearProgram;

    fn mixed_model() -> LinearProgram {
        // x + y <= 10
        // x - y == 2
        // x + 2y >= 3
        LinearProgram::from_parts(
            vec![
                vec![1.0, 1.0],
                vec![1.0, -1.0],
                vec![1.0, 2.0],
            ],
            vec![10.0, 2.0, 3.0],
            vec![4.0, 1.0],
            vec![Relation::Le, Relation::Eq, Relation::Ge],
        )
        .unwrap()
    }

    #[test]
    fn test_extras_per_relation() {
        // <= adds 1 slack, == adds 1 artificial, >= adds artificial + surplus
        let t = Tableau::build(&mixed_model(), true);
        assert_eq!(t.augmented_cols, 2 + 4);
        assert_eq!(
            t.kinds,
            vec![
                ColumnKind::Decision(0),
                ColumnKind::Decision(1),
                ColumnKind::Slack(0),
                ColumnKind::Artificial(0),
                ColumnKind::Artificial(1),
                ColumnKind::Surplus(0),
            ]
        );
    }

    #[test]
    fn test_basic_marking_and_artificial_count() {
        let t = Tableau::build(&mixed_model(), true);
        assert_eq!(t.kinds[t.basic[0]], ColumnKind::Slack(0));
        assert_eq!(t.kinds[t.basic[1]], ColumnKind::Artificial(0));
        assert_eq!(t.kinds[t.basic[2]], ColumnKind::Artificial(1));
        assert_eq!(t.artificial_count(), 2);
    }

    #[test]
    fn test_surplus_column_sign() {
        let t = Tableau::build(&mixed_model(), true);
        // >= row: +1 artificial then -1 surplus
        assert_eq!(t.a[2][4], 1.0);
        assert_eq!(t.a[2][5], -1.0);
        // surplus is not basic anywhere
        assert!(t.basic.iter().all(|&col| col != 5));
    }

    #[test]
    fn test_basic_columns_have_zero_reduced_cost() {
        let t = Tableau::build(&mixed_model(), true);
        for &col in &t.basic {
            assert!(t.c[col].abs() < 1e-9, "c[{}] = {}", col, t.c[col]);
        }
        // the surplus column owes +M after elimination of its row
        assert!((t.c[5] - t.big_m).abs() < 1e-9);
    }

    #[test]
    fn test_big_m_dominates_magnitudes() {
        let t = Tableau::build(&mixed_model(), true);
        assert_eq!(t.big_m, 10.0 * 128.0);

        // all <= rows: no penalty needed at all
        let lp = LinearProgram::from_parts(
            vec![vec![1.0]],
            vec![2.0],
            vec![1.0],
            vec![Relation::Le],
        )
        .unwrap();
        assert_eq!(Tableau::build(&lp, true).big_m, 0.0);
    }

    #[test]
    fn test_maximize_negates_decision_costs() {
        let lp = mixed_model();
        let min = Tableau::build(&lp, true);
        let max = Tableau::build(&lp, false);
        // decision reduced costs differ by the sign of the raw objective;
        // both then get the same Big-M penalty from the artificial rows
        let penalty_x = min.c[0] - lp.c[0];
        assert!((max.c[0] - (-lp.c[0] + penalty_x)).abs() < 1e-9);
    }

    #[test]
    fn test_negative_rhs_is_normalized_without_touching_the_model() {
        // -x <= -5 normalizes to x >= 5
        let lp = LinearProgram::from_parts(
            vec![vec![-1.0]],
            vec![-5.0],
            vec![1.0],
            vec![Relation::Le],
        )
        .unwrap();
        let t = Tableau::build(&lp, true);
        assert_eq!(t.b[0], 5.0);
        assert_eq!(t.a[0][0], 1.0);
        // normalized row became >=, so it carries an artificial + surplus
        assert_eq!(t.augmented_cols, 3);
        assert!(t.kinds[t.basic[0]].is_artificial());

        // the caller's model is untouched
        assert_eq!(lp.b[0], -5.0);
        assert_eq!(lp.a[0][0], -1.0);
        assert_eq!(lp.relations[0], Relation::Le);
    }

    #[test]
    fn test_equality_rows_are_never_flipped() {
        let lp = LinearProgram::from_parts(
            vec![vec![1.0]],
            vec![-4.0],
            vec![1.0],
            vec![Relation::Eq],
        )
        .unwrap();
        let t = Tableau::build(&lp, true);
        assert_eq!(t.b[0], 4.0);
        assert_eq!(t.a[0][0], -1.0);
        assert!(t.kinds[t.basic[0]].is_artificial());
    }
}
