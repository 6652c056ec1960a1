use super::RegressionError;

fn check_lengths(expected: usize, actual: usize) -> Result<(), RegressionError> {
    if expected == 0 {
        return Err(RegressionError::Empty);
    }
    if expected != actual {
        return Err(RegressionError::ShapeMismatch {
            what: "predictions",
            expected,
            actual,
        });
    }
    Ok(())
}

/// Fraction of predictions equal to the true label.
#[expect(clippy::cast_precision_loss)]
pub fn accuracy_score(y_true: &[bool], y_pred: &[bool]) -> Result<f64, RegressionError> {
    check_lengths(y_true.len(), y_pred.len())?;
    let correct = y_true.iter().zip(y_pred).filter(|(a, b)| a == b).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Area under the ROC curve of `scores` against `y_true`.
///
/// Computed as the Mann-Whitney statistic with average ranks for tied
/// scores. Undefined (an error) when only one class is present or a score
/// is not finite.
///
/// # Examples
///
/// ```
/// use medstat_stats::regression::metrics::roc_auc_score;
///
/// let auc = roc_auc_score(&[false, false, true, true], &[0.1, 0.4, 0.35, 0.8]).unwrap();
/// assert!((auc - 0.75).abs() < 1e-12);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn roc_auc_score(y_true: &[bool], scores: &[f64]) -> Result<f64, RegressionError> {
    check_lengths(y_true.len(), scores.len())?;
    let positives = y_true.iter().filter(|&&v| v).count();
    let negatives = y_true.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(RegressionError::SingleClass);
    }

    if let Some(row) = scores.iter().position(|v| !v.is_finite()) {
        return Err(RegressionError::NonFiniteScore { row });
    }

    let mut order = (0..scores.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j < order.len() && scores[order[j]].total_cmp(&scores[order[i]]).is_eq() {
            j += 1;
        }
        // ranks i+1 ..= j share their mean
        let mean_rank = (i + 1 + j) as f64 / 2.0;
        positive_rank_sum += mean_rank * order[i..j].iter().filter(|&&k| y_true[k]).count() as f64;
        i = j;
    }

    let n_pos = positives as f64;
    let n_neg = negatives as f64;
    Ok((positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}
