use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::{
    opts, register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

pub static MESSAGES_SENT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "gpd_messages_sent_total",
        "Total number of messages published to the GPD topic"
    ))
    .expect("Failed to register gpd_messages_sent_total metric")
});

pub static MESSAGES_FAILED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!(
            "gpd_messages_failed_total",
            "Total number of messages rejected or not published, by failure kind"
        ),
        &["kind"]
    )
    .expect("Failed to register gpd_messages_failed_total metric")
});

pub static BULK_LINES_SKIPPED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "gpd_bulk_lines_skipped_total",
        "Total number of blank or comment lines skipped in uploaded files"
    ))
    .expect("Failed to register gpd_bulk_lines_skipped_total metric")
});

pub fn gather_metrics() -> Result<String> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode(&metric_families, &mut buffer)?;

    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_includes_ingestion_metrics() {
        MESSAGES_SENT_TOTAL.inc();
        MESSAGES_FAILED_TOTAL.with_label_values(&["ParseError"]).inc();

        let text = gather_metrics().unwrap();
        assert!(text.contains("gpd_messages_sent_total"));
        assert!(text.contains("gpd_messages_failed_total{kind=\"ParseError\"}"));
    }
}
