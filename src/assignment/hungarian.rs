//! Minimum-cost bipartite assignment (Hungarian algorithm).
//!
//! This is the shortest-augmenting-path formulation with row and column
//! potentials. It runs in O(n²·m) for an n×m matrix with n ≤ m; taller
//! matrices are solved transposed. Every row of the shorter side is matched,
//! so the result has `min(rows, cols)` pairs and the minimum total cost among
//! all assignments of that size.

/// A dense, rectangular matrix of finite assignment costs.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl CostMatrix {
    /// Creates a `rows × cols` matrix with every cell set to `fill`.
    #[must_use]
    pub fn filled(rows: usize, cols: usize, fill: f64) -> Self {
        Self {
            rows,
            cols,
            cells: vec![fill; rows * cols],
        }
    }

    /// Builds a matrix from row vectors.
    ///
    /// # Panics
    ///
    /// Panics if the rows do not all have the same length.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == cols),
            "cost matrix rows must all have {cols} columns"
        );
        Self {
            rows: rows.len(),
            cols,
            cells: rows.into_iter().flatten().collect(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// The cost of pairing `row` with `col`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) out of bounds");
        self.cells[row * self.cols + col]
    }

    /// Overwrites one cell.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, cost: f64) {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) out of bounds");
        self.cells[row * self.cols + col] = cost;
    }

    /// Sum of the costs of an assignment as returned by [`solve`].
    #[must_use]
    pub fn total_cost(&self, assignment: &[Option<usize>]) -> f64 {
        assignment
            .iter()
            .enumerate()
            .filter_map(|(row, col)| col.map(|col| self.get(row, col)))
            .sum()
    }
}

/// Solves the assignment problem for `matrix`.
///
/// Returns one entry per row: the matched column, or `None` when the row is
/// left over because there are more rows than columns.
///
/// Among several optimal assignments the one returned is whichever the
/// augmenting order (rows top to bottom, columns left to right) reaches
/// first. It is deterministic for a given matrix.
///
/// # Panics
///
/// Panics if any cost is NaN or infinite.
#[must_use]
pub fn solve(matrix: &CostMatrix) -> Vec<Option<usize>> {
    assert!(
        matrix.cells.iter().all(|cost| cost.is_finite()),
        "cost matrix contains a non-finite cost"
    );

    if matrix.rows == 0 || matrix.cols == 0 {
        return vec![None; matrix.rows];
    }

    if matrix.rows <= matrix.cols {
        solve_wide(matrix.rows, matrix.cols, |row, col| matrix.get(row, col))
    } else {
        let by_col = solve_wide(matrix.cols, matrix.rows, |col, row| matrix.get(row, col));
        let mut by_row = vec![None; matrix.rows];
        for (col, row) in by_col.into_iter().enumerate() {
            if let Some(row) = row {
                by_row[row] = Some(col);
            }
        }
        by_row
    }
}

/// Core of the algorithm for `n ≤ m`. Every one of the `n` rows gets a column.
fn solve_wide(n: usize, m: usize, cost: impl Fn(usize, usize) -> f64) -> Vec<Option<usize>> {
    debug_assert!(n <= m);

    // 1-based; index 0 of the column arrays is a virtual column.
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; m + 1];
    // owner[j]: row matched to column j (0 = free)
    let mut owner = vec![0_usize; m + 1];
    let mut way = vec![0_usize; m + 1];

    for row in 1..=n {
        owner[0] = row;
        let mut j0 = 0;
        let mut min_slack = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let slack = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if slack < min_slack[j] {
                    min_slack[j] = slack;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }

        // augment along the alternating path
        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![None; n];
    for j in 1..=m {
        if owner[j] != 0 {
            assignment[owner[j] - 1] = Some(j - 1);
        }
    }
    assignment
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn matrix(rows: &[&[f64]]) -> CostMatrix {
        CostMatrix::from_rows(rows.iter().map(|row| row.to_vec()).collect())
    }

    /// Cheapest assignment of `min(rows, cols)` pairs by exhaustive search.
    fn brute_force(matrix: &CostMatrix) -> f64 {
        fn search(
            matrix: &CostMatrix,
            transposed: bool,
            line: usize,
            used: &mut Vec<bool>,
            acc: f64,
            best: &mut f64,
        ) {
            let (lines, others) = if transposed {
                (matrix.cols(), matrix.rows())
            } else {
                (matrix.rows(), matrix.cols())
            };
            if line == lines {
                *best = best.min(acc);
                return;
            }
            for other in 0..others {
                if used[other] {
                    continue;
                }
                used[other] = true;
                let cost = if transposed {
                    matrix.get(other, line)
                } else {
                    matrix.get(line, other)
                };
                search(matrix, transposed, line + 1, used, acc + cost, best);
                used[other] = false;
            }
        }

        let transposed = matrix.rows() > matrix.cols();
        let others = matrix.rows().max(matrix.cols());
        let mut best = f64::INFINITY;
        search(matrix, transposed, 0, &mut vec![false; others], 0.0, &mut best);
        best
    }

    fn assert_valid(matrix: &CostMatrix, assignment: &[Option<usize>]) {
        assert_eq!(assignment.len(), matrix.rows());
        let matched: Vec<usize> = assignment.iter().flatten().copied().collect();
        assert_eq!(matched.len(), matrix.rows().min(matrix.cols()));
        let mut distinct = matched.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct.len(), matched.len(), "column used twice");
        assert!(matched.iter().all(|&col| col < matrix.cols()));
    }

    #[test]
    fn solves_square_matrix() {
        let costs = matrix(&[&[4.0, 1.0, 3.0], &[2.0, 0.0, 5.0], &[3.0, 2.0, 2.0]]);
        let assignment = solve(&costs);
        assert_eq!(assignment, vec![Some(1), Some(0), Some(2)]);
        assert!((costs.total_cost(&assignment) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn leaves_extra_rows_unmatched() {
        // the worked example: A, B, C against X, Y
        let costs = matrix(&[&[1.0, 2.0], &[1.0, -5.0], &[-5.0, -5.0]]);
        let assignment = solve(&costs);
        assert_eq!(assignment, vec![None, Some(1), Some(0)]);
        assert!((costs.total_cost(&assignment) + 10.0).abs() < 1e-9);
    }

    #[test]
    fn leaves_extra_columns_free() {
        let costs = matrix(&[&[9.0, 1.0, 5.0, 7.0]]);
        assert_eq!(solve(&costs), vec![Some(1)]);
    }

    #[test]
    fn handles_empty_dimensions() {
        assert_eq!(solve(&CostMatrix::filled(3, 0, 0.0)), vec![None, None, None]);
        assert!(solve(&CostMatrix::filled(0, 3, 0.0)).is_empty());
    }

    #[test]
    #[should_panic(expected = "non-finite")]
    fn rejects_nan() {
        let _ = solve(&matrix(&[&[1.0, f64::NAN]]));
    }

    #[test]
    #[should_panic(expected = "must all have")]
    fn rejects_ragged_rows() {
        let _ = CostMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
    }

    fn small_matrix() -> impl Strategy<Value = CostMatrix> {
        (1_usize..=6, 1_usize..=6).prop_flat_map(|(rows, cols)| {
            prop::collection::vec(prop::collection::vec(-20_i32..20, cols), rows).prop_map(
                |rows| {
                    CostMatrix::from_rows(
                        rows.into_iter()
                            .map(|row| row.into_iter().map(f64::from).collect())
                            .collect(),
                    )
                },
            )
        })
    }

    proptest! {
        #[test]
        fn matches_brute_force(costs in small_matrix()) {
            let assignment = solve(&costs);
            assert_valid(&costs, &assignment);
            let expected = brute_force(&costs);
            prop_assert!((costs.total_cost(&assignment) - expected).abs() < 1e-9);
        }
    }
}
