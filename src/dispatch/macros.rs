/// Build a [`PendingPath`](crate::dispatch::PendingPath) with member-access syntax.
///
/// ```rust,no_run
/// # async fn demo(youtube: dynapi::ApiClient) -> dynapi::Result<()> {
/// use dynapi::api_path;
/// use serde_json::json;
///
/// let items = api_path!(youtube => playlistItems.list)
///     .call(json!({"part": "snippet", "playlistId": "PL123"}))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! api_path {
    ($client:expr => $first:ident $(. $rest:ident)*) => {
        $client
            .root()
            .get(stringify!($first))
            $(.get(stringify!($rest)))*
    };
}
