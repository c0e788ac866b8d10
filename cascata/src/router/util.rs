use std::future::Future;
use std::time::Duration;

use cascata_core::{Capability, CascataError};

/// Bound `fut` by an optional request-level deadline.
///
/// # Errors
/// Returns `RequestTimeout` for `label` when the deadline elapses first, or
/// whatever `fut` itself returns.
pub async fn with_request_deadline<T, Fut>(
    deadline: Option<Duration>,
    label: &str,
    fut: Fut,
) -> Result<T, CascataError>
where
    Fut: Future<Output = Result<T, CascataError>>,
{
    match deadline {
        Some(d) => tokio::time::timeout(d, fut)
            .await
            .unwrap_or_else(|_| Err(CascataError::request_timeout(label))),
        None => fut.await,
    }
}

/// Run keyed tasks concurrently, each bounded by the same optional deadline.
///
/// Every task yields its own outcome; one task failing or timing out never
/// cancels the others. Output order matches input order.
pub async fn join_with_deadline<K, I, F, T>(
    tasks: I,
    deadline: Option<Duration>,
    cap: Capability,
) -> Vec<(K, Result<T, CascataError>)>
where
    I: IntoIterator<Item = (K, F)>,
    F: Future<Output = Result<T, CascataError>>,
{
    let futs = tasks.into_iter().map(|(k, fut)| async move {
        let res = with_request_deadline(deadline, cap.as_str(), fut).await;
        (k, res)
    });
    futures::future::join_all(futs).await
}

/// Cache-key segment for a set of already-normalized members.
pub(crate) fn key_list<'a>(members: impl IntoIterator<Item = &'a str>) -> String {
    members.into_iter().collect::<Vec<_>>().join(",")
}
