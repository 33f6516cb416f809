use std::path::Path;

use tokio::io::{AsyncWriteExt, BufWriter};

use super::latency::LatencyHistograms;
use crate::error::{AppError, AppResult};
use crate::stats::Histogram;

/// Writes the binned latency histograms to `path`.
///
/// Layout: the clock's ticks per second and a blank line, then
/// `upper,count,cumulative` rows over each histogram's own `[min, max]`
/// range. Without delay injection the inclusive rows follow directly.
/// With it, `Delay` (when recorded), `Exclusive` and `Inclusive` sections
/// each start with their name and are separated by a blank line.
///
/// # Errors
///
/// Returns an error when a histogram cannot be binned or the file cannot be
/// written.
pub async fn write_histogram_dump(
    path: &Path,
    latency: &LatencyHistograms,
    ticks_per_second: u64,
    bins: usize,
) -> AppResult<()> {
    let mut body = format!("{}\n\n", ticks_per_second);
    let Some(exclusive) = &latency.exclusive else {
        body.push_str(&binned(&latency.inclusive, bins)?);
        return write_file(path, &body).await;
    };

    let mut sections: Vec<(&str, &Histogram<u64>)> = Vec::new();
    if let Some(delay) = &latency.delay {
        sections.push(("Delay", delay));
    }
    sections.push(("Exclusive", exclusive));
    sections.push(("Inclusive", &latency.inclusive));

    let mut rendered = Vec::with_capacity(sections.len());
    for (name, histogram) in sections {
        rendered.push(format!("{}\n{}", name, binned(histogram, bins)?));
    }
    body.push_str(&rendered.join("\n"));
    write_file(path, &body).await
}

fn binned(histogram: &Histogram<u64>, bins: usize) -> AppResult<String> {
    histogram
        .histogram_csv_full(bins)
        .map(|csv| csv.to_string())
        .map_err(AppError::stats)
}

async fn write_file(path: &Path, body: &str) -> AppResult<()> {
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    writer.write_all(body.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
