//! Household aggregation of per-appliance series.

use tracing::debug;

use super::types::LoadSeries;

/// Element-wise sum of `series` over their common index.
///
/// Alignment is an inner join: a timestamp contributes only if every input
/// has a sample there. Returns `None` when there are no inputs.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use loadprofile_gen::series::aggregate::aggregate;
/// use loadprofile_gen::series::types::LoadSeries;
///
/// let t = |h| NaiveDate::from_ymd_opt(2010, 1, 1).unwrap().and_hms_opt(h, 0, 0).unwrap();
/// let a = LoadSeries::from_points(vec![(t(0), 1.0), (t(1), 2.0)]).unwrap();
/// let b = LoadSeries::from_points(vec![(t(1), 10.0), (t(2), 20.0)]).unwrap();
///
/// let total = aggregate(&[a, b]).unwrap();
/// assert_eq!(total.points(), &[(t(1), 12.0)]);
/// ```
pub fn aggregate<'a, I>(series: I) -> Option<LoadSeries>
where
    I: IntoIterator<Item = &'a LoadSeries>,
{
    let mut inputs = series.into_iter();
    let first = inputs.next()?;
    let rest: Vec<&LoadSeries> = inputs.collect();

    let points: Vec<_> = first
        .points()
        .iter()
        .filter_map(|&(ts, value)| {
            rest.iter()
                .try_fold(value, |acc, other| other.get(ts).map(|v| acc + v))
                .map(|total| (ts, total))
        })
        .collect();

    debug!(
        inputs = rest.len() + 1,
        rows = points.len(),
        dropped = first.len() - points.len(),
        "aggregated series"
    );
    Some(LoadSeries::from_sorted(points))
}
