use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("asclepius.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("asclepius.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("asclepius.client.request_duration_seconds");

pub(crate) static SESSION_INITIALIZATIONS: Counter =
    Counter::new("asclepius.session.initializations");
pub(crate) static SESSION_INITIALIZATION_FAILURES: Counter =
    Counter::new("asclepius.session.initialization_failures");

pub(crate) static CONTROLLER_SENDS: Counter = Counter::new("asclepius.controller.sends");
pub(crate) static CONTROLLER_SEND_FAILURES: Counter =
    Counter::new("asclepius.controller.send_failures");
pub(crate) static CONTROLLER_REJECTED_SENDS: Counter =
    Counter::new("asclepius.controller.rejected_sends");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_INITIALIZATIONS);
    collector.register_counter(&SESSION_INITIALIZATION_FAILURES);

    collector.register_counter(&CONTROLLER_SENDS);
    collector.register_counter(&CONTROLLER_SEND_FAILURES);
    collector.register_counter(&CONTROLLER_REJECTED_SENDS);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_without_panicking() {
        register_biometrics(Collector::new());
    }
}
