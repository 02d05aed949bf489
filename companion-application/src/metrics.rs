use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    events_received: AtomicU64,
    records_reported: AtomicU64,
    records_suppressed: AtomicU64,
    jobs_dropped: AtomicU64,
    submissions_ok: AtomicU64,
    submissions_failed: AtomicU64,
    evidence_uploaded: AtomicU64,
    heartbeats_sent: AtomicU64,
    session_expirations: AtomicU64,
}

impl Metrics {
    pub fn record_events(&self, event_count: usize) {
        self.events_received
            .fetch_add(event_count as u64, Ordering::Relaxed);
    }

    pub fn record_reported(&self) {
        self.records_reported.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suppressed(&self) {
        self.records_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_job_dropped(&self) {
        self.jobs_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_submission(&self, ok: bool) {
        if ok {
            self.submissions_ok.fetch_add(1, Ordering::Relaxed);
        } else {
            self.submissions_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_evidence_uploaded(&self) {
        self.evidence_uploaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_heartbeat(&self) {
        self.heartbeats_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_expired(&self) {
        self.session_expirations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn submissions_ok(&self) -> u64 {
        self.submissions_ok.load(Ordering::Relaxed)
    }

    pub fn heartbeats_sent(&self) -> u64 {
        self.heartbeats_sent.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let counters = [
            ("bingo_events_received_total", &self.events_received),
            ("bingo_records_reported_total", &self.records_reported),
            ("bingo_records_suppressed_total", &self.records_suppressed),
            ("bingo_jobs_dropped_total", &self.jobs_dropped),
            ("bingo_submissions_ok_total", &self.submissions_ok),
            ("bingo_submissions_failed_total", &self.submissions_failed),
            ("bingo_evidence_uploaded_total", &self.evidence_uploaded),
            ("bingo_heartbeats_sent_total", &self.heartbeats_sent),
            ("bingo_session_expirations_total", &self.session_expirations),
        ];
        let mut out = String::new();
        for (name, counter) in counters {
            out.push_str(&format!(
                "# TYPE {name} counter\n{name} {}\n",
                counter.load(Ordering::Relaxed)
            ));
        }
        out
    }
}
