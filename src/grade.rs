use tracing::debug;

use crate::model::{StudentRecord, TotalMark};
use crate::warning::{NormalizeWarning, WarningCode};

/// The only examination type CGPA is defined for.
pub const REGULAR_EXAMINATION: &str = "REGULAR";

#[must_use]
pub fn grade_point(marks: u32) -> u32 {
    match marks {
        90.. => 10,
        75..=89 => 9,
        65..=74 => 8,
        55..=64 => 7,
        50..=54 => 6,
        45..=49 => 5,
        40..=44 => 4,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct WeightedPoints {
    points: u64,
    credits: u64,
    /// Scored totals with no credit at the same position.
    unpaired: usize,
}

fn weighted_points(totals: &[TotalMark], credits: &[u32]) -> WeightedPoints {
    let mut weighted = WeightedPoints::default();
    for (index, marks) in totals
        .iter()
        .enumerate()
        .filter_map(|(index, total)| total.score().map(|marks| (index, marks)))
    {
        let Some(&credit) = credits.get(index) else {
            weighted.unpaired += 1;
            continue;
        };
        weighted.points += u64::from(credit) * u64::from(grade_point(marks));
        weighted.credits += u64::from(credit);
    }
    weighted
}

/// Exact ties go to the even neighbour, so `8.125` becomes `8.12`.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[allow(clippy::cast_precision_loss)]
fn ratio(weighted: WeightedPoints) -> f64 {
    if weighted.credits == 0 {
        return 0.0;
    }
    round2(weighted.points as f64 / weighted.credits as f64)
}

/// Credit-weighted grade point average rounded to two decimals.
///
/// `None` for any examination other than [`REGULAR_EXAMINATION`]. When no
/// total pairs with a credit the result is `0.0`.
#[must_use]
pub fn cgpa(examination: Option<&str>, totals: &[TotalMark], credits: &[u32]) -> Option<f64> {
    if examination != Some(REGULAR_EXAMINATION) {
        return None;
    }
    Some(ratio(weighted_points(totals, credits)))
}

/// Sets `record.cgpa`, recording the guarded fallbacks it hit.
pub fn annotate(record: &mut StudentRecord, warnings: &mut Vec<NormalizeWarning>) {
    if record.examination.as_deref() != Some(REGULAR_EXAMINATION) {
        record.cgpa = None;
        return;
    }

    let weighted = weighted_points(&record.totals, &record.credits);
    let enrollment = record.enrollment_no.clone().unwrap_or_default();

    if weighted.unpaired > 0 {
        debug!(enrollment = %enrollment, unpaired = weighted.unpaired, "totals without credits");
        warnings.push(
            NormalizeWarning::new(
                WarningCode::CreditTotalMismatch,
                format!(
                    "{} total(s) for '{enrollment}' have no credit at the same position",
                    weighted.unpaired
                ),
            )
            .with_field("credits"),
        );
    }

    if weighted.credits == 0 {
        debug!(enrollment = %enrollment, "no credit-weighted totals, CGPA falls back to 0");
        warnings.push(
            NormalizeWarning::new(
                WarningCode::ZeroCreditFallback,
                format!("no scored totals with credits for '{enrollment}'"),
            )
            .with_field("totals"),
        );
    }

    record.cgpa = Some(ratio(weighted));
}
