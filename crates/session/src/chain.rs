//! Chain replay in a hidden session.

use {
    skein_common::{Chain, SerializedAction},
    tracing::{info, warn},
};

use crate::{error::SessionError, hidden::HiddenSession, host::BrowserHost};

/// What the step loop needs from a session: perform one action, and wait out
/// a navigation it may have caused.
trait StepRunner {
    async fn perform(&self, action: &SerializedAction) -> Result<(), SessionError>;
    async fn settle_navigation(&self) -> String;
}

impl StepRunner for HiddenSession {
    async fn perform(&self, action: &SerializedAction) -> Result<(), SessionError> {
        HiddenSession::perform(self, action).await
    }

    async fn settle_navigation(&self) -> String {
        HiddenSession::settle_navigation(self).await
    }
}

/// Replays a committed chain, all or nothing. The first action navigates to
/// its target href; each later action is re-found by locator and clicked,
/// with a best-effort navigation wait after navigational steps. Any failure
/// abandons the chain and surfaces the failing action's label. The hidden
/// session is closed on every exit path.
pub struct ChainExecutor<'a> {
    host: &'a BrowserHost,
}

impl<'a> ChainExecutor<'a> {
    #[must_use]
    pub fn new(host: &'a BrowserHost) -> Self {
        Self { host }
    }

    /// Execute the chain and return the final URL the hidden session landed
    /// on. The caller decides what to do with it (typically redirect the
    /// visible tab).
    pub async fn execute(&self, chain: &Chain) -> Result<String, SessionError> {
        let first = chain.first();
        // Chain construction guarantees the opening action carries a target.
        let href = first
            .target_href
            .as_deref()
            .ok_or_else(|| SessionError::ActionFailed(first.label.clone()))?;

        info!(steps = chain.len(), start = href, "executing chain");
        let session = HiddenSession::open(self.host, href).await?;

        match run_steps(&session, chain).await {
            Ok(()) => {
                let final_url = session.current_url().await;
                session.close().await;
                info!(final_url, "chain complete");
                Ok(final_url)
            },
            Err(e) => {
                session.close().await;
                Err(e)
            },
        }
    }
}

/// Run every step after the opening navigation, in order, stopping at the
/// first failure. Later steps are never attempted once one fails.
async fn run_steps<R: StepRunner>(runner: &R, chain: &Chain) -> Result<(), SessionError> {
    for (step, action) in chain.rest().iter().enumerate() {
        if let Err(e) = runner.perform(action).await {
            warn!(step = step + 1, label = %action.label, error = %e, "chain step failed");
            return Err(SessionError::ActionFailed(action.label.clone()));
        }
        if action.is_navigational() {
            let url = runner.settle_navigation().await;
            info!(step = step + 1, url, "chain step navigated");
        }
    }
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use {super::*, skein_common::ActionKind};

    /// Records every perform and navigation wait; fails on a chosen label.
    struct ScriptedRunner {
        fail_on: Option<&'static str>,
        performed: Mutex<Vec<String>>,
        waits: Mutex<usize>,
    }

    impl ScriptedRunner {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self { fail_on, performed: Mutex::new(Vec::new()), waits: Mutex::new(0) }
        }
    }

    impl StepRunner for ScriptedRunner {
        async fn perform(&self, action: &SerializedAction) -> Result<(), SessionError> {
            self.performed.lock().unwrap().push(action.label.clone());
            if self.fail_on == Some(action.label.as_str()) {
                return Err(SessionError::ElementNotFound(action.label.clone()));
            }
            Ok(())
        }

        async fn settle_navigation(&self) -> String {
            *self.waits.lock().unwrap() += 1;
            "https://example.com/next".into()
        }
    }

    fn link(label: &str) -> SerializedAction {
        SerializedAction {
            id: format!("action-{label}"),
            label: label.into(),
            raw_label: label.into(),
            kind: ActionKind::Link,
            target_href: Some(format!("https://example.com/{label}")),
            locator: format!("#{label}"),
            bounds: None,
        }
    }

    fn button(label: &str) -> SerializedAction {
        SerializedAction {
            id: format!("action-{label}"),
            label: label.into(),
            raw_label: label.into(),
            kind: ActionKind::Button,
            target_href: None,
            locator: format!("#{label}"),
            bounds: None,
        }
    }

    #[tokio::test]
    async fn failing_step_stops_the_chain_and_names_the_action() {
        let runner = ScriptedRunner::new(Some("Edit"));
        let chain = Chain::new(vec![link("Open"), button("Edit"), button("Save")]).unwrap();

        let err = run_steps(&runner, &chain).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to execute action: Edit");

        // The step after the failure is never attempted.
        let performed = runner.performed.lock().unwrap().clone();
        assert_eq!(performed, ["Edit"]);
    }

    #[tokio::test]
    async fn steps_run_in_order_on_success() {
        let runner = ScriptedRunner::new(None);
        let chain =
            Chain::new(vec![link("Open"), button("Edit"), link("Next"), button("Save")])
                .unwrap();

        run_steps(&runner, &chain).await.unwrap();
        let performed = runner.performed.lock().unwrap().clone();
        assert_eq!(performed, ["Edit", "Next", "Save"]);
    }

    #[tokio::test]
    async fn navigation_wait_applies_only_to_navigational_steps() {
        let runner = ScriptedRunner::new(None);
        let chain =
            Chain::new(vec![link("Open"), button("Edit"), link("Next"), button("Save")])
                .unwrap();

        run_steps(&runner, &chain).await.unwrap();
        assert_eq!(*runner.waits.lock().unwrap(), 1);
    }
}
