use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUESTS: MetricDef = MetricDef {
    name: "rotor.requests",
    metric_type: MetricType::Counter,
    description: "Rotation requests received",
};

pub const REQUEST_ERRORS: MetricDef = MetricDef {
    name: "rotor.request_errors",
    metric_type: MetricType::Counter,
    description: "Rotation requests that ended in a failure response",
};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "rotor.request.duration",
    metric_type: MetricType::Histogram,
    description: "Rotation request duration in seconds",
};

pub const ALL_METRICS: &[MetricDef] = &[REQUESTS, REQUEST_ERRORS, REQUEST_DURATION];
