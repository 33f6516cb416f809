use super::*;
use crate::error::{AppError, AppResult, StatsError};

fn histogram_of(values: &[u64]) -> Histogram<u64> {
    let mut hist = Histogram::new();
    for value in values {
        hist.add(*value);
    }
    hist
}

fn close_to(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}

#[test]
fn percentile_zero_is_minimum() -> AppResult<()> {
    let hist = histogram_of(&[42, 7, 19, 7, 100]);
    let p0 = hist.percentile(0.0)?;
    if p0 != 7 {
        return Err(AppError::stats(format!("Expected min 7, got {}", p0)));
    }
    if hist.min()? != p0 {
        return Err(AppError::stats("percentile(0) must equal min()"));
    }
    Ok(())
}

#[test]
fn percentile_one_is_maximum() -> AppResult<()> {
    let hist = histogram_of(&[5, 1, 9, 3]);
    let p100 = hist.percentile(1.0)?;
    if p100 != 9 || hist.max()? != 9 {
        return Err(AppError::stats(format!("Expected max 9, got {}", p100)));
    }
    Ok(())
}

#[test]
fn percentile_rejects_out_of_range() -> AppResult<()> {
    let hist = histogram_of(&[1, 2, 3]);
    for p in [-0.01, 1.01, f64::NAN] {
        match hist.percentile(p) {
            Err(StatsError::PercentileOutOfRange { .. }) => {}
            Ok(value) => {
                return Err(AppError::stats(format!(
                    "Expected rejection for p={}, got {}",
                    p, value
                )));
            }
            Err(err) => {
                return Err(AppError::stats(format!(
                    "Unexpected error for p={}: {}",
                    p, err
                )));
            }
        }
    }
    Ok(())
}

#[test]
fn percentile_is_monotonic() -> AppResult<()> {
    let values: Vec<u64> = (0..500).map(|idx| (idx * 7919) % 1013).collect();
    let hist = histogram_of(&values);
    let mut previous = hist.percentile(0.0)?;
    for step in 1..=100 {
        let p = f64::from(step) / 100.0;
        let current = hist.percentile(p)?;
        if current < previous {
            return Err(AppError::stats(format!(
                "percentile({}) = {} fell below {}",
                p, current, previous
            )));
        }
        previous = current;
    }
    Ok(())
}

#[test]
fn percentile_picks_smallest_value_reaching_target() -> AppResult<()> {
    // 4 samples: target for p=0.5 is 2.0; cumulative after value 10 is 2.
    let hist = histogram_of(&[10, 10, 20, 30]);
    let median = hist.median()?;
    if median != 10 {
        return Err(AppError::stats(format!("Expected median 10, got {}", median)));
    }
    let p75 = hist.percentile(0.75)?;
    if p75 != 20 {
        return Err(AppError::stats(format!("Expected p75 20, got {}", p75)));
    }
    Ok(())
}

#[test]
fn empty_histogram_queries_are_rejected() -> AppResult<()> {
    let hist: Histogram<u64> = Histogram::new();
    if hist.min().is_ok() || hist.max().is_ok() {
        return Err(AppError::stats("min/max on empty histogram must fail"));
    }
    if hist.percentile(0.5).is_ok() || hist.mean().is_ok() {
        return Err(AppError::stats("percentile/mean on empty histogram must fail"));
    }
    if hist.histogram_csv_full(10).is_ok() {
        return Err(AppError::stats("csv over empty range must fail"));
    }
    Ok(())
}

#[test]
fn merge_is_commutative() -> AppResult<()> {
    let a = histogram_of(&[1, 2, 2, 5]);
    let b = histogram_of(&[2, 9, 9]);

    let mut ab = a.clone();
    ab.merge(&b);
    let mut ba = b.clone();
    ba.merge(&a);

    if ab != ba {
        return Err(AppError::stats("merge(a, b) != merge(b, a)"));
    }
    if ab.sample_count() != 7 {
        return Err(AppError::stats(format!(
            "Expected 7 samples, got {}",
            ab.sample_count()
        )));
    }
    Ok(())
}

#[test]
fn merge_is_associative() -> AppResult<()> {
    let a = histogram_of(&[3, 3, 4]);
    let b = histogram_of(&[4, 8]);
    let c = histogram_of(&[1, 3, 8, 8]);

    let mut left = a.clone();
    left.merge(&b);
    left.merge(&c);

    let mut bc = b.clone();
    bc.merge(&c);
    let mut right = a.clone();
    right.merge(&bc);

    if left != right {
        return Err(AppError::stats("merge is not associative"));
    }
    Ok(())
}

#[test]
fn mean_and_standard_deviation_are_population_statistics() -> AppResult<()> {
    let hist = histogram_of(&[2, 4, 4, 4, 5, 5, 7, 9]);
    let mean = hist.mean()?;
    if !close_to(mean, 5.0) {
        return Err(AppError::stats(format!("Expected mean 5, got {}", mean)));
    }
    let std_dev = hist.standard_deviation()?;
    if !close_to(std_dev, 2.0) {
        return Err(AppError::stats(format!(
            "Expected standard deviation 2, got {}",
            std_dev
        )));
    }
    Ok(())
}

#[test]
fn mean_works_for_signed_samples() -> AppResult<()> {
    let mut hist: Histogram<i64> = Histogram::new();
    for value in [-4, -2, 0, 2, 4, 6] {
        hist.add(value);
    }
    let mean = hist.mean()?;
    if !close_to(mean, 1.0) {
        return Err(AppError::stats(format!("Expected mean 1, got {}", mean)));
    }
    Ok(())
}

#[test]
fn csv_bins_account_for_every_sample() -> AppResult<()> {
    let values: Vec<u64> = (0..1000).map(|idx| (idx * 37) % 997).collect();
    let hist = histogram_of(&values);
    for bins in [1_usize, 2, 3, 7, 10, 64, 1000, 5000] {
        let csv = hist.histogram_csv_full(bins)?;
        if csv.bins().len() != bins {
            return Err(AppError::stats(format!(
                "Expected {} bins, got {}",
                bins,
                csv.bins().len()
            )));
        }
        let total: u64 = csv.bins().iter().map(|bin| bin.count).sum();
        let last_cumulative = csv.bins().last().map_or(0, |bin| bin.cumulative);
        if total != hist.sample_count() || last_cumulative != hist.sample_count() {
            return Err(AppError::stats(format!(
                "bins={} total={} cumulative={} samples={}",
                bins,
                total,
                last_cumulative,
                hist.sample_count()
            )));
        }
    }
    Ok(())
}

#[test]
fn csv_last_bin_includes_high_and_others_exclude_upper_bound() -> AppResult<()> {
    let hist = histogram_of(&[0, 5, 10]);
    let csv = hist.histogram_csv(2, 0, 10)?;
    let counts: Vec<u64> = csv.bins().iter().map(|bin| bin.count).collect();
    // 5 sits exactly on the first bin's upper bound and belongs to the second.
    if counts != vec![1, 2] {
        return Err(AppError::stats(format!("Unexpected bin counts {:?}", counts)));
    }
    let rendered = csv.to_string();
    if rendered != "5,1,1\n10,2,3\n" {
        return Err(AppError::stats(format!("Unexpected csv {:?}", rendered)));
    }
    Ok(())
}

#[test]
fn csv_rejects_zero_bins_and_inverted_ranges() -> AppResult<()> {
    let hist = histogram_of(&[1, 2]);
    if !matches!(hist.histogram_csv(0, 1, 2), Err(StatsError::ZeroBins)) {
        return Err(AppError::stats("zero bins must be rejected"));
    }
    if !matches!(
        hist.histogram_csv(4, 9, 1),
        Err(StatsError::InvertedRange { .. })
    ) {
        return Err(AppError::stats("inverted range must be rejected"));
    }
    Ok(())
}

#[test]
fn raw_csv_is_ascending() -> AppResult<()> {
    let hist = histogram_of(&[30, 10, 20, 10]);
    let raw = hist.raw_csv();
    if raw != "10,2\n20,1\n30,1\n" {
        return Err(AppError::stats(format!("Unexpected raw csv {:?}", raw)));
    }
    Ok(())
}
