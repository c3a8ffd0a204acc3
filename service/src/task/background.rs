//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
    iter,
};

use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::task;
use tracing as log;

#[cfg(doc)]
use crate::Task;

/// Boxed error of a failed [`Task`].
type BoxError = Box<dyn Error + 'static>;

/// Background environment running the [`Task`]s of a [`Service`] on the
/// current thread.
///
/// Resolves once every spawned [`Task`] finishes, or as soon as any of them
/// fails.
///
/// [`Service`]: crate::Service
#[derive(Debug, Default)]
pub struct Background {
    /// Local set the [`Task`]s are driven by.
    local: task::LocalSet,

    /// Names and handles of the spawned [`Task`]s.
    tasks: Vec<(&'static str, task::JoinHandle<Result<(), BoxError>>)>,
}

impl Background {
    /// Spawns a new named [`Task`] inside this [`Background`] environment.
    pub fn spawn<F, E>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        log::debug!("spawning `{name}` background task");
        let handle = self
            .local
            .spawn_local(future.map_err(BoxError::from));
        self.tasks.push((name, handle));
    }
}

impl IntoFuture for Background {
    type Output = Result<(), BoxError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { local, tasks } = self;

        let tasks = tasks.into_iter().map(|(name, handle)| {
            handle
                .map(move |joined| {
                    let res = joined.unwrap_or_else(|e| Err(BoxError::from(e)));
                    if let Err(e) = &res {
                        log::error!("`{name}` background task failed: {e}");
                    }
                    res
                })
                .boxed_local()
        });
        future::try_join_all(
            iter::once(local.map(Ok).boxed_local()).chain(tasks),
        )
        .map_ok(drop)
        .boxed_local()
    }
}
