mod fake_ledger;

use std::time::Duration;

use tokio::sync::watch;

use crate::EngineView;

const WAIT: Duration = Duration::from_secs(5);

/// Wait until the view satisfies `predicate`, failing the test after [`WAIT`].
pub(super) async fn wait_for_view(
    view: &mut watch::Receiver<EngineView>,
    predicate: impl FnMut(&EngineView) -> bool,
) -> EngineView {
    tokio::time::timeout(WAIT, view.wait_for(predicate))
        .await
        .expect("view did not reach the expected state in time")
        .expect("engine state dropped")
        .clone()
}
