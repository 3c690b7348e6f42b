use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, HistogramVec,
    IntCounterVec, IntGauge,
};

/// Broker-acknowledged records, by topic
pub static KAFKA_PRODUCE_SUCCESS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "kafka_produce_success_total",
        "Total number of records acknowledged by the broker",
        &["topic"]
    )
    .expect("Failed to register kafka_produce_success_total metric")
});

/// Records the broker or the local queue rejected, by topic
pub static KAFKA_PRODUCE_FAILURE: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "kafka_produce_failure_total",
        "Total number of records that failed to publish",
        &["topic"]
    )
    .expect("Failed to register kafka_produce_failure_total metric")
});

/// Enqueue-to-acknowledgment latency. Event Hubs acks usually land in the
/// tens of milliseconds, throttled namespaces push them into seconds.
pub static KAFKA_PRODUCE_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "kafka_produce_latency_seconds",
        "Time from enqueue to broker acknowledgment in seconds",
        &["topic"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("Failed to register kafka_produce_latency_seconds metric")
});

/// 1 while the producer is started, 0 otherwise
pub static KAFKA_PRODUCER_READY: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "kafka_producer_ready",
        "Whether the Kafka producer is connected and accepting sends"
    )
    .expect("Failed to register kafka_producer_ready metric")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_are_labelled_by_topic() {
        KAFKA_PRODUCE_SUCCESS.with_label_values(&["gpd"]).inc();
        KAFKA_PRODUCE_FAILURE.with_label_values(&["gpd"]).inc();
        KAFKA_PRODUCE_LATENCY.with_label_values(&["gpd"]).observe(0.02);

        assert!(KAFKA_PRODUCE_SUCCESS.with_label_values(&["gpd"]).get() >= 1);
        assert!(
            KAFKA_PRODUCE_LATENCY
                .with_label_values(&["gpd"])
                .get_sample_count()
                >= 1
        );
    }
}
