use thiserror::Error;

/// Relation between a constraint row's left-hand side and its right-hand side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    /// Less than or equal (<=)
    #[default]
    Le,
    /// Equal (==)
    Eq,
    /// Greater than or equal (>=)
    Ge,
}

impl Relation {
    /// The relation with its direction reversed; equality is its own reverse.
    pub fn flipped(self) -> Self {
        match self {
            Relation::Le => Relation::Ge,
            Relation::Eq => Relation::Eq,
            Relation::Ge => Relation::Le,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Eq => "==",
            Relation::Ge => ">=",
        }
    }
}

/// Where to insert a new row or column relative to an existing position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("row index {index} out of range (rows = {rows})")]
    RowOutOfRange { index: usize, rows: usize },
    #[error("column index {index} out of range (cols = {cols})")]
    ColOutOfRange { index: usize, cols: usize },
}

/// A linear program: optimize `c * x` subject to `a * x (<=|==|>=) b`, `x >= 0`.
///
/// Fields are public in the same spirit as the rest of the workspace; the
/// shape invariants (`a` is rows x cols, `b`/`relations` have `rows` entries,
/// `c`/`x` have `cols` entries) are established by the constructors and
/// checked again by [`LinearProgram::is_valid`] before solving.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearProgram {
    pub rows: usize,
    pub cols: usize,
    /// Constraint coefficients, one inner vector per row
    pub a: Vec<Vec<f64>>,
    /// Right-hand sides, one per row
    pub b: Vec<f64>,
    /// Objective coefficients, one per column
    pub c: Vec<f64>,
    /// Constraint relations, one per row
    pub relations: Vec<Relation>,
    /// Solution placeholder, overwritten by whichever engine last solved this model
    pub x: Vec<f64>,
    /// Last computed optimum
    pub objective_value: f64,
    /// Direction flag, so a model loaded from a file is self-describing
    pub minimize: bool,
    /// Cosmetic row labels, never used numerically
    pub row_labels: Vec<String>,
    /// Cosmetic column labels, never used numerically
    pub col_labels: Vec<String>,
    /// Cosmetic label for the objective row
    pub objective_label: String,
}

impl LinearProgram {
    /// An all-zero model of the given shape, every relation defaulting to `<=`.
    pub fn zeroed(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            a: vec![vec![0.0; cols]; rows],
            b: vec![0.0; rows],
            c: vec![0.0; cols],
            relations: vec![Relation::Le; rows],
            x: vec![0.0; cols],
            objective_value: 0.0,
            minimize: true,
            row_labels: vec![String::new(); rows],
            col_labels: vec![String::new(); cols],
            objective_label: "Z".to_string(),
        }
    }

    /// Wrap caller-supplied arrays, checking that all dimensions agree.
    pub fn from_parts(
        a: Vec<Vec<f64>>,
        b: Vec<f64>,
        c: Vec<f64>,
        relations: Vec<Relation>,
    ) -> Result<Self, ModelError> {
        let rows = a.len();
        let cols = c.len();
        if rows == 0 || cols == 0 {
            return Err(ModelError::DimensionMismatch(
                "model must have at least one row and one column".to_string(),
            ));
        }
        if b.len() != rows || relations.len() != rows {
            return Err(ModelError::DimensionMismatch(format!(
                "a has {} rows but b has {} entries and relations has {}",
                rows,
                b.len(),
                relations.len()
            )));
        }
        if let Some(bad) = a.iter().position(|row| row.len() != cols) {
            return Err(ModelError::DimensionMismatch(format!(
                "row {} has {} coefficients, expected {}",
                bad,
                a[bad].len(),
                cols
            )));
        }

        Ok(Self {
            rows,
            cols,
            a,
            b,
            c,
            relations,
            x: vec![0.0; cols],
            objective_value: 0.0,
            minimize: true,
            row_labels: vec![String::new(); rows],
            col_labels: vec![String::new(); cols],
            objective_label: "Z".to_string(),
        })
    }

    /// True iff every core array is present with a shape consistent with
    /// `rows`/`cols`. Says nothing about whether the values form a sensible LP.
    pub fn is_valid(&self) -> bool {
        self.rows > 0
            && self.cols > 0
            && self.a.len() == self.rows
            && self.a.iter().all(|row| row.len() == self.cols)
            && self.b.len() == self.rows
            && self.c.len() == self.cols
            && self.relations.len() == self.rows
    }

    pub fn get_a(&self, i: usize, j: usize) -> Option<f64> {
        self.a.get(i)?.get(j).copied()
    }

    pub fn set_a(&mut self, i: usize, j: usize, value: f64) -> Result<(), ModelError> {
        let rows = self.rows;
        let cols = self.cols;
        let row = self.a.get_mut(i).ok_or(ModelError::RowOutOfRange { index: i, rows })?;
        let slot = row.get_mut(j).ok_or(ModelError::ColOutOfRange { index: j, cols })?;
        *slot = value;
        Ok(())
    }

    pub fn get_b(&self, i: usize) -> Option<f64> {
        self.b.get(i).copied()
    }

    pub fn set_b(&mut self, i: usize, value: f64) -> Result<(), ModelError> {
        let rows = self.rows;
        let slot = self.b.get_mut(i).ok_or(ModelError::RowOutOfRange { index: i, rows })?;
        *slot = value;
        Ok(())
    }

    pub fn get_c(&self, j: usize) -> Option<f64> {
        self.c.get(j).copied()
    }

    pub fn set_c(&mut self, j: usize, value: f64) -> Result<(), ModelError> {
        let cols = self.cols;
        let slot = self.c.get_mut(j).ok_or(ModelError::ColOutOfRange { index: j, cols })?;
        *slot = value;
        Ok(())
    }

    pub fn get_relation(&self, i: usize) -> Option<Relation> {
        self.relations.get(i).copied()
    }

    pub fn set_relation(&mut self, i: usize, relation: Relation) -> Result<(), ModelError> {
        let rows = self.rows;
        let slot = self
            .relations
            .get_mut(i)
            .ok_or(ModelError::RowOutOfRange { index: i, rows })?;
        *slot = relation;
        Ok(())
    }

    /// Insert a constraint row before or after the 0-based position `at`.
    ///
    /// `coeffs` must have `cols` entries. All parallel row arrays grow by one.
    pub fn add_row(
        &mut self,
        side: Side,
        at: usize,
        coeffs: Vec<f64>,
        relation: Relation,
        rhs: f64,
        label: impl Into<String>,
    ) -> Result<(), ModelError> {
        if at >= self.rows {
            return Err(ModelError::RowOutOfRange { index: at, rows: self.rows });
        }
        if coeffs.len() != self.cols {
            return Err(ModelError::DimensionMismatch(format!(
                "new row has {} coefficients, expected {}",
                coeffs.len(),
                self.cols
            )));
        }

        let insert = match side {
            Side::Before => at,
            Side::After => at + 1,
        };
        self.a.insert(insert, coeffs);
        self.b.insert(insert, rhs);
        self.relations.insert(insert, relation);
        self.row_labels.insert(insert, label.into());
        self.rows += 1;
        Ok(())
    }

    /// Insert a decision column before or after the 0-based position `at`.
    ///
    /// `coeffs` must have `rows` entries (one per constraint row). The solution
    /// placeholder grows with the model and is reset to zero.
    pub fn add_col(
        &mut self,
        side: Side,
        at: usize,
        coeffs: Vec<f64>,
        cost: f64,
        label: impl Into<String>,
    ) -> Result<(), ModelError> {
        if at >= self.cols {
            return Err(ModelError::ColOutOfRange { index: at, cols: self.cols });
        }
        if coeffs.len() != self.rows {
            return Err(ModelError::DimensionMismatch(format!(
                "new column has {} coefficients, expected {}",
                coeffs.len(),
                self.rows
            )));
        }

        let insert = match side {
            Side::Before => at,
            Side::After => at + 1,
        };
        for (row, &coeff) in self.a.iter_mut().zip(coeffs.iter()) {
            row.insert(insert, coeff);
        }
        self.c.insert(insert, cost);
        self.col_labels.insert(insert, label.into());
        self.cols += 1;
        self.x = vec![0.0; self.cols];
        Ok(())
    }
}
