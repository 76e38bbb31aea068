use ndarray::Array2;

/// Greedy threshold-gated assignment over a distance matrix
/// (rows = pool identities, columns = frame candidates).
///
/// Repeatedly commits the globally smallest remaining cell at or below
/// `accept_dist`, then removes its row and column from consideration.
/// Ties go to the first cell found in row-major scan order. This is a
/// greedy assignment, not a globally optimal one.
pub fn greedy_assign(distances: &Array2<f64>, accept_dist: f64) -> Vec<(usize, usize)> {
    let (rows, cols) = distances.dim();
    let mut row_used = vec![false; rows];
    let mut col_used = vec![false; cols];
    let mut pairs = Vec::with_capacity(rows.min(cols));

    loop {
        let mut best: Option<(usize, usize, f64)> = None;
        for r in 0..rows {
            if row_used[r] {
                continue;
            }
            for c in 0..cols {
                if col_used[c] {
                    continue;
                }
                let d = distances[[r, c]];
                if best.map_or(true, |(_, _, bd)| d < bd) {
                    best = Some((r, c, d));
                }
            }
        }

        match best {
            Some((r, c, d)) if d <= accept_dist => {
                row_used[r] = true;
                col_used[c] = true;
                pairs.push((r, c));
            }
            _ => break,
        }
    }

    pairs
}
