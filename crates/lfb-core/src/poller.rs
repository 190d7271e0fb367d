use std::{sync::Arc, time::Duration};

use lfb_model::{BuildStatusSnapshot, StatusClass, Target};
use tracing::{debug, warn};

use crate::{
    clock::Clock,
    coalescer::{RefreshCoalescer, RefreshDecision},
    describe::describe,
    error::FetchError,
    policy::PollPolicy,
    markup::{self, BuildLink, BuilderLink},
    render::Renderer,
};

const TRANSPORT_ERROR_TEXT: &str = "error getting status";

/// Content and class of one grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub html: String,
    pub class: StatusClass,
}

/// Display update plus the follow-up poll delay, if any.
///
/// `next == None` suspends polling of the target until the inventory sweep re-arms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    pub cell: CellUpdate,
    pub next: Option<Duration>,
}

/// Map one fetch result to a cell and a next delay.
pub fn classify(
    target: &Target,
    result: &Result<BuildStatusSnapshot, FetchError>,
    now_secs: f64,
    policy: &PollPolicy,
) -> PollOutcome {
    let snapshot = match result {
        Ok(snapshot) => snapshot,
        Err(_) => {
            return PollOutcome {
                cell: CellUpdate {
                    html: TRANSPORT_ERROR_TEXT.to_string(),
                    class: StatusClass::None,
                },
                next: Some(policy.error_retry),
            };
        }
    };

    match snapshot {
        BuildStatusSnapshot::Running { number, step } => PollOutcome {
            cell: CellUpdate {
                html: markup::render(&BuildLink {
                    target,
                    number: *number,
                    text: step,
                }),
                class: StatusClass::Running,
            },
            next: Some(policy.running_interval),
        },
        BuildStatusSnapshot::Succeeded { finished_at } => PollOutcome {
            cell: CellUpdate {
                html: markup::render(&BuilderLink {
                    target,
                    text: &describe(*finished_at, now_secs),
                }),
                class: StatusClass::Success,
            },
            next: Some(policy.success_interval(now_secs - finished_at)),
        },
        BuildStatusSnapshot::Failed { number, text } => PollOutcome {
            cell: CellUpdate {
                html: markup::render(&BuildLink {
                    target,
                    number: *number,
                    text: &text.join(" "),
                }),
                class: StatusClass::Failure,
            },
            next: None,
        },
        BuildStatusSnapshot::Unknown { code } => PollOutcome {
            cell: CellUpdate {
                html: match code {
                    Some(code) => format!("unknown: {code}"),
                    None => "unknown: null".to_string(),
                },
                class: StatusClass::None,
            },
            next: None,
        },
    }
}

/// Applies fetch results to the display and schedules each target's next poll.
///
/// Every reschedule goes through the owned [`RefreshCoalescer`].
pub struct BuildPoller {
    coalescer: RefreshCoalescer,
    renderer: Arc<dyn Renderer>,
    clock: Arc<dyn Clock>,
    policy: PollPolicy,
}

impl BuildPoller {
    pub fn new(
        coalescer: RefreshCoalescer,
        renderer: Arc<dyn Renderer>,
        clock: Arc<dyn Clock>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            coalescer,
            renderer,
            clock,
            policy,
        }
    }

    pub fn on_result(
        &mut self,
        target: &Target,
        result: Result<BuildStatusSnapshot, FetchError>,
    ) -> PollOutcome {
        if let Err(e) = &result {
            warn!(builder = %target, "status fetch failed: {e}");
        }

        let outcome = classify(target, &result, self.clock.now_secs(), &self.policy);
        self.renderer
            .update_cell(target, &outcome.cell.html, outcome.cell.class);

        match outcome.next {
            Some(delay) => {
                self.coalescer.request_refresh(target, delay);
            }
            None => debug!(builder = %target, class = outcome.cell.class.as_str(), "polling suspended"),
        }
        outcome
    }

    /// Poll `target` on the next loop tick.
    pub fn refresh_now(&mut self, target: &Target) -> RefreshDecision {
        self.coalescer.request_refresh(target, Duration::ZERO)
    }

    /// First polls of a discovery batch, spread `stagger_step` apart.
    pub fn stagger<'a, I>(&mut self, targets: I) -> usize
    where
        I: IntoIterator<Item = &'a Target>,
    {
        let mut count = 0;
        for (i, target) in targets.into_iter().enumerate() {
            let delay = self.policy.stagger_delay(i);
            self.coalescer.request_refresh(target, delay);
            count += 1;
        }
        count
    }

    pub fn coalescer(&self) -> &RefreshCoalescer {
        &self.coalescer
    }

    pub fn coalescer_mut(&mut self) -> &mut RefreshCoalescer {
        &mut self.coalescer
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::ManualClock, test_support::RecordingRenderer};

    const NOW_MS: u64 = 1_700_000_000_000;

    fn setup() -> (ManualClock, Arc<RecordingRenderer>, BuildPoller) {
        let clock = ManualClock::at(NOW_MS);
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());
        let renderer = Arc::new(RecordingRenderer::default());
        let poller = BuildPoller::new(
            RefreshCoalescer::new(Arc::clone(&shared)),
            renderer.clone(),
            shared,
            PollPolicy::default(),
        );
        (clock, renderer, poller)
    }

    fn fire_at(poller: &BuildPoller, t: &Target) -> Option<u64> {
        poller.coalescer().pending(t).map(|p| p.fire_at)
    }

    #[test]
    fn running_build_shows_step_and_polls_in_15s() {
        let (_clock, renderer, mut poller) = setup();
        let t = Target::from("lsb-sdk-x86");

        let outcome = poller.on_result(
            &t,
            Ok(BuildStatusSnapshot::Running {
                number: 12,
                step: "compile".into(),
            }),
        );

        assert_eq!(outcome.cell.class, StatusClass::Running);
        assert_eq!(
            outcome.cell.html,
            "<a href='builders/lsb-sdk-x86/builds/12'>compile</a>"
        );
        assert_eq!(fire_at(&poller, &t), Some(NOW_MS + 15_000));
        assert_eq!(
            renderer.last_cell(&t),
            Some((outcome.cell.html.clone(), StatusClass::Running))
        );
    }

    #[test]
    fn fresh_success_shows_age_and_polls_in_a_minute() {
        let (_clock, _renderer, mut poller) = setup();
        let t = Target::from("lsb-sdk-x86");
        let finished_at = NOW_MS as f64 / 1000.0 - 120.0;

        let outcome = poller.on_result(&t, Ok(BuildStatusSnapshot::Succeeded { finished_at }));

        assert_eq!(outcome.cell.class, StatusClass::Success);
        assert_eq!(
            outcome.cell.html,
            "<a href='builders/lsb-sdk-x86'>2 minutes ago</a>"
        );
        assert_eq!(fire_at(&poller, &t), Some(NOW_MS + 60_000));
    }

    #[test]
    fn older_successes_back_off() {
        let (_clock, _renderer, mut poller) = setup();
        let now = NOW_MS as f64 / 1000.0;
        let mid = Target::from("mid-x86");
        let old = Target::from("old-x86");

        poller.on_result(
            &mid,
            Ok(BuildStatusSnapshot::Succeeded {
                finished_at: now - 1_200.0,
            }),
        );
        poller.on_result(
            &old,
            Ok(BuildStatusSnapshot::Succeeded {
                finished_at: now - 90_000.0,
            }),
        );

        assert_eq!(fire_at(&poller, &mid), Some(NOW_MS + 300_000));
        assert_eq!(fire_at(&poller, &old), Some(NOW_MS + 1_800_000));
    }

    #[test]
    fn failed_build_is_shown_and_not_rescheduled() {
        let (_clock, renderer, mut poller) = setup();
        let t = Target::from("lsb-sdk-x86");

        let outcome = poller.on_result(
            &t,
            Ok(BuildStatusSnapshot::Failed {
                number: 3,
                text: vec!["compile".into(), "failed".into()],
            }),
        );

        assert_eq!(outcome.next, None);
        assert_eq!(
            renderer.last_cell(&t),
            Some((
                "<a href='builders/lsb-sdk-x86/builds/3'>compile failed</a>".to_string(),
                StatusClass::Failure
            ))
        );
        assert!(!poller.coalescer().is_pending(&t));
    }

    #[test]
    fn unknown_code_is_terminal() {
        let (_clock, _renderer, mut poller) = setup();
        let t = Target::from("lsb-sdk-x86");

        let outcome = poller.on_result(&t, Ok(BuildStatusSnapshot::Unknown { code: Some(4) }));

        assert_eq!(outcome.cell.html, "unknown: 4");
        assert_eq!(outcome.cell.class, StatusClass::None);
        assert_eq!(outcome.next, None);
        assert_eq!(poller.coalescer().live_count(), 0);
    }

    #[test]
    fn transport_error_retries_in_15s() {
        let (_clock, renderer, mut poller) = setup();
        let t = Target::from("lsb-sdk-x86");

        poller.on_result(&t, Err(FetchError::Transport("connection refused".into())));

        assert_eq!(
            renderer.last_cell(&t),
            Some(("error getting status".to_string(), StatusClass::None))
        );
        assert_eq!(fire_at(&poller, &t), Some(NOW_MS + 15_000));
    }

    #[test]
    fn step_names_are_escaped() {
        let t = Target::from("a-x86");
        let outcome = classify(
            &t,
            &Ok(BuildStatusSnapshot::Running {
                number: 1,
                step: "<script>".into(),
            }),
            0.0,
            &PollPolicy::default(),
        );
        assert!(outcome.cell.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn stagger_spreads_first_polls() {
        let (_clock, _renderer, mut poller) = setup();
        let targets: Vec<Target> = ["a-x86", "b-x86", "c-x86"]
            .into_iter()
            .map(Target::from)
            .collect();

        assert_eq!(poller.stagger(&targets), 3);
        let deadlines: Vec<_> = targets.iter().map(|t| fire_at(&poller, t)).collect();
        assert_eq!(
            deadlines,
            vec![Some(NOW_MS), Some(NOW_MS + 100), Some(NOW_MS + 200)]
        );
    }

    #[test]
    fn running_signal_preempts_long_success_timer() {
        let (_clock, _renderer, mut poller) = setup();
        let t = Target::from("a-x86");
        let now = NOW_MS as f64 / 1000.0;

        poller.on_result(
            &t,
            Ok(BuildStatusSnapshot::Succeeded {
                finished_at: now - 7_200.0,
            }),
        );
        assert_eq!(fire_at(&poller, &t), Some(NOW_MS + 1_800_000));

        assert_eq!(poller.refresh_now(&t), RefreshDecision::Replaced);
        assert_eq!(fire_at(&poller, &t), Some(NOW_MS));
        assert_eq!(poller.coalescer().live_count(), 1);
    }
}
